/*
[INPUT]:  Mock API server
[OUTPUT]: Shared fixtures for specwise-sync integration tests
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use specwise_sync::{ChannelNotifier, Notification, SyncConfig, SyncContext};
use tokio::sync::mpsc::UnboundedReceiver;
use wiremock::MockServer;

/// Context against the mock server, polling every `poll_ms`
pub fn context_for(server: &MockServer, poll_ms: u64) -> (SyncContext, UnboundedReceiver<Notification>) {
    let mut config = SyncConfig::default();
    config.api.base_url = server.uri();
    config.api.timeout_secs = 5;
    config.api.connect_timeout_secs = 1;
    config.poll.interval_ms = poll_ms;

    let (notifier, rx) = ChannelNotifier::new();
    let ctx = SyncContext::new(config, Arc::new(notifier)).expect("context init");
    (ctx, rx)
}

pub fn task_json(id: &str, file_name: &str, status: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "collection_id": id,
        "file_name": file_name,
        "status": status,
        "created_at": 1717171717000_i64
    })
}

pub fn status_json(id: &str, file_name: &str, status: &str) -> serde_json::Value {
    serde_json::json!({ "task": task_json(id, file_name, status), "message": "ok" })
}

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

/// Wait for the next notification, failing the test after `secs`
pub async fn next_notification(rx: &mut UnboundedReceiver<Notification>, secs: u64) -> Notification {
    tokio::time::timeout(Duration::from_secs(secs), rx.recv())
        .await
        .expect("notification timed out")
        .expect("notification channel closed")
}
