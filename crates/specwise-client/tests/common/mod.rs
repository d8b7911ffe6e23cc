/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for specwise-client tests

use specwise_client::{ClientConfig, SpecwiseClient};
use std::time::Duration;
use wiremock::MockServer;

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Base URL of a local port nothing listens on
pub fn unbound_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

/// Client pointed at the mock server with short timeouts
pub fn client_for(server: &MockServer) -> SpecwiseClient {
    let config = ClientConfig {
        timeout: Duration::from_secs(2),
        connect_timeout: Duration::from_secs(1),
    };
    SpecwiseClient::with_config_and_base_url(config, &server.uri()).expect("client init")
}

/// A file record as the API serializes it
pub fn file_json(id: &str, filename: &str, task_id: Option<&str>) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "filename": filename,
        "filepath": format!("/uploads/{filename}"),
        "customer_number": "C-42",
        "task_id": task_id,
        "items": [],
        "is_xml_generated": false,
        "created_at": 1717171717000_i64
    })
}
