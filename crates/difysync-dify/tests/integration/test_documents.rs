//! Document operations against a mocked Dify API, directly and through
//! the RemoteDirectory adapter

use std::sync::Arc;

use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use difysync_core::domain::{CollectionId, DocumentId};
use difysync_core::ports::{RemoteDirectory, RemoteError};
use difysync_dify::DifyRemoteDirectory;

use crate::common::{self, entries, mount_page};

#[tokio::test]
async fn test_list_documents_follows_has_more() {
    let (server, client) = common::setup_dify_mock().await;
    let client = client.with_page_limit(2);

    mount_page(
        &server,
        "/v1/datasets/ds-1/documents",
        1,
        2,
        serde_json::json!({
            "data": entries(&[("doc-1", "a.md"), ("doc-2", "b.md")]),
            "has_more": true
        }),
    )
    .await;
    mount_page(
        &server,
        "/v1/datasets/ds-1/documents",
        2,
        2,
        serde_json::json!({
            "data": entries(&[("doc-3", "c.md")]),
            "has_more": false
        }),
    )
    .await;

    let documents = client
        .list_documents("ds-1")
        .await
        .expect("list_documents failed");
    let names: Vec<&str> = documents.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["a.md", "b.md", "c.md"]);
}

#[tokio::test]
async fn test_list_documents_stops_on_empty_page() {
    let (server, client) = common::setup_dify_mock().await;

    mount_page(
        &server,
        "/v1/datasets/ds-1/documents",
        1,
        20,
        serde_json::json!({"data": [], "has_more": true}),
    )
    .await;

    let documents = client
        .list_documents("ds-1")
        .await
        .expect("list_documents failed");
    assert!(documents.is_empty());
}

#[tokio::test]
async fn test_create_document_by_text_sends_body() {
    let (server, client) = common::setup_dify_mock().await;

    Mock::given(method("POST"))
        .and(path("/v1/datasets/ds-1/document/create-by-text"))
        .and(header("authorization", "Bearer test-api-key"))
        .and(body_json(serde_json::json!({
            "name": "guide.md",
            "text": "# Guide",
            "indexing_technique": "economy",
            "process_rule": {"mode": "automatic"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "document": {"id": "doc-9", "name": "guide.md"},
            "batch": "20240101"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let id = client
        .create_document_by_text("ds-1", "guide.md", "# Guide", "economy")
        .await
        .expect("create_document_by_text failed");
    assert_eq!(id, "doc-9");
}

#[tokio::test]
async fn test_create_document_accepts_top_level_id() {
    let (server, client) = common::setup_dify_mock().await;

    Mock::given(method("POST"))
        .and(path("/v1/datasets/ds-1/document/create-by-text"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "doc-top"})),
        )
        .mount(&server)
        .await;

    let id = client
        .create_document_by_text("ds-1", "a.txt", "a", "high_quality")
        .await
        .expect("create_document_by_text failed");
    assert_eq!(id, "doc-top");
}

#[tokio::test]
async fn test_create_document_without_id_is_decode_error() {
    let (server, client) = common::setup_dify_mock().await;

    Mock::given(method("POST"))
        .and(path("/v1/datasets/ds-1/document/create-by-text"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"batch": "b1"})),
        )
        .mount(&server)
        .await;

    let err = client
        .create_document_by_text("ds-1", "a.txt", "a", "high_quality")
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::Decode(_)), "got {err:?}");
}

#[tokio::test]
async fn test_update_document_by_text() {
    let (server, client) = common::setup_dify_mock().await;

    Mock::given(method("POST"))
        .and(path("/v1/datasets/ds-1/documents/doc-1/update-by-text"))
        .and(body_json(serde_json::json!({
            "name": "a.txt",
            "text": "changed",
            "process_rule": {"mode": "automatic"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "document": {"id": "doc-1"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    client
        .update_document_by_text("ds-1", "doc-1", "a.txt", "changed")
        .await
        .expect("update_document_by_text failed");
}

#[tokio::test]
async fn test_delete_document_failure_is_status_error() {
    let (server, client) = common::setup_dify_mock().await;

    Mock::given(method("DELETE"))
        .and(path("/v1/datasets/ds-1/documents/doc-1"))
        .respond_with(ResponseTemplate::new(404).set_body_string("document not found"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client.delete_document("ds-1", "doc-1").await.unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn test_remote_directory_round_trip_through_adapter() {
    let (server, client) = common::setup_dify_mock().await;
    let remote: Arc<dyn RemoteDirectory> = Arc::new(
        DifyRemoteDirectory::new(client).with_dataset_permission("all_team_members"),
    );

    mount_page(
        &server,
        "/v1/datasets",
        1,
        20,
        serde_json::json!({"data": entries(&[("ds-1", "docs")])}),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/v1/datasets"))
        .and(body_json(serde_json::json!({
            "name": "docs/guides",
            "permission": "all_team_members"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "ds-2"
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/v1/datasets/ds-2/documents",
        1,
        20,
        serde_json::json!({"data": entries(&[("doc-1", "intro.md")]), "has_more": false}),
    )
    .await;
    Mock::given(method("DELETE"))
        .and(path("/v1/datasets/ds-2/documents/doc-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let collections = remote.list_collections().await.expect("list failed");
    assert_eq!(collections.len(), 1);
    assert_eq!(collections[0].name, "docs");
    assert_eq!(collections[0].id, CollectionId::new("ds-1").unwrap());

    let created = remote
        .create_collection("docs/guides")
        .await
        .expect("create failed");
    assert_eq!(created.as_str(), "ds-2");

    let documents = remote.list_documents(&created).await.expect("list failed");
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].id, DocumentId::new("doc-1").unwrap());

    remote
        .delete_document(&created, &documents[0].id)
        .await
        .expect("delete failed");
}
