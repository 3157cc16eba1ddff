//! Dataset listing and creation against a mocked Dify API

use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use difysync_core::ports::RemoteError;
use difysync_dify::DifyClient;

use crate::common::{self, entries, mount_page};

#[tokio::test]
async fn test_list_datasets_stops_at_short_page() {
    let (server, client) = common::setup_dify_mock().await;
    let client = client.with_page_limit(2);

    mount_page(
        &server,
        "/v1/datasets",
        1,
        2,
        serde_json::json!({"data": entries(&[("ds-1", "docs"), ("ds-2", "notes")])}),
    )
    .await;
    mount_page(
        &server,
        "/v1/datasets",
        2,
        2,
        serde_json::json!({"data": entries(&[("ds-3", "docs/guides")])}),
    )
    .await;

    let datasets = client.list_datasets().await.expect("list_datasets failed");
    let names: Vec<&str> = datasets.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["docs", "notes", "docs/guides"]);
    assert_eq!(datasets[2].id, "ds-3");
}

#[tokio::test]
async fn test_list_datasets_honours_has_more_false() {
    let (server, client) = common::setup_dify_mock().await;
    let client = client.with_page_limit(1);

    mount_page(
        &server,
        "/v1/datasets",
        1,
        1,
        serde_json::json!({"data": entries(&[("ds-1", "docs")]), "has_more": false}),
    )
    .await;

    let datasets = client.list_datasets().await.expect("list_datasets failed");
    assert_eq!(datasets.len(), 1);
}

#[tokio::test]
async fn test_list_datasets_stops_at_total() {
    let (server, client) = common::setup_dify_mock().await;
    let client = client.with_page_limit(2);

    mount_page(
        &server,
        "/v1/datasets",
        1,
        2,
        serde_json::json!({"data": entries(&[("ds-1", "a"), ("ds-2", "b")]), "total": 4}),
    )
    .await;
    mount_page(
        &server,
        "/v1/datasets",
        2,
        2,
        serde_json::json!({"data": entries(&[("ds-3", "c"), ("ds-4", "d")]), "total": 4}),
    )
    .await;

    let datasets = client.list_datasets().await.expect("list_datasets failed");
    assert_eq!(datasets.len(), 4);
}

#[tokio::test]
async fn test_create_dataset_sends_name_and_permission() {
    let (server, client) = common::setup_dify_mock().await;

    Mock::given(method("POST"))
        .and(path("/v1/datasets"))
        .and(header("authorization", "Bearer test-api-key"))
        .and(body_json(serde_json::json!({
            "name": "docs/guides",
            "permission": "only_me"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "ds-new",
            "name": "docs/guides"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let id = client
        .create_dataset("docs/guides", "only_me")
        .await
        .expect("create_dataset failed");
    assert_eq!(id, "ds-new");
}

#[tokio::test]
async fn test_create_dataset_without_id_is_decode_error() {
    let (server, client) = common::setup_dify_mock().await;

    Mock::given(method("POST"))
        .and(path("/v1/datasets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "docs"
        })))
        .mount(&server)
        .await;

    let err = client.create_dataset("docs", "only_me").await.unwrap_err();
    assert!(matches!(err, RemoteError::Decode(_)), "got {err:?}");
}

#[tokio::test]
async fn test_rejected_request_reports_status_url_and_body() {
    let (server, client) = common::setup_dify_mock().await;

    Mock::given(method("GET"))
        .and(path("/v1/datasets"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let err = client.list_datasets().await.unwrap_err();
    match err {
        RemoteError::Status { status, url, body } => {
            assert_eq!(status, 401);
            assert!(url.contains("/v1/datasets"), "url was {url}");
            assert_eq!(body, "invalid api key");
        }
        other => panic!("expected Status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_json_is_decode_error() {
    let (server, client) = common::setup_dify_mock().await;

    Mock::given(method("GET"))
        .and(path("/v1/datasets"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let err = client.list_datasets().await.unwrap_err();
    assert!(matches!(err, RemoteError::Decode(_)), "got {err:?}");
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    // Reserve a free port, then release it so nothing is listening there
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let client = DifyClient::new(format!("http://{addr}"), common::API_KEY);

    let err = client.list_datasets().await.unwrap_err();
    assert!(matches!(err, RemoteError::Transport(_)), "got {err:?}");
}
