//! Shared helpers for Dify API integration tests

use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use difysync_dify::client::DifyClient;

pub const API_KEY: &str = "test-api-key";

/// Starts a mock server and returns a client pointing at it
pub async fn setup_dify_mock() -> (MockServer, DifyClient) {
    let server = MockServer::start().await;
    let client = DifyClient::new(server.uri(), API_KEY);
    (server, client)
}

/// Mounts one page of a list endpoint, matched on `page` and `limit`
pub async fn mount_page(
    server: &MockServer,
    endpoint: &str,
    page: u32,
    limit: u32,
    body: serde_json::Value,
) {
    Mock::given(method("GET"))
        .and(path(endpoint))
        .and(query_param("page", page.to_string()))
        .and(query_param("limit", limit.to_string()))
        .and(header("authorization", format!("Bearer {API_KEY}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

/// Builds `{"id": .., "name": ..}` entries
pub fn entries(items: &[(&str, &str)]) -> serde_json::Value {
    serde_json::Value::Array(
        items
            .iter()
            .map(|(id, name)| serde_json::json!({"id": id, "name": name}))
            .collect(),
    )
}
