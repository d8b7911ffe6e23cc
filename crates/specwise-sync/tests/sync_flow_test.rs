/*
[INPUT]:  Mock Specwise API
[OUTPUT]: End-to-end verification of initialization, polling and uploads
[POS]:    Integration test layer - full synchronizer against HTTP
[UPDATE]: When changing initialization or polling behavior
*/

mod common;

use std::time::Duration;

use common::{context_for, file_json, next_notification, status_json, task_json};
use specwise_client::{TaskStatus, UploadFile, UploadRequest};
use specwise_sync::{InitOutcome, NotificationLevel};
use tokio_test::assert_ok;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_listing_seeds_store_and_poller_reports_completion() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            task_json("t-1", "offer.pdf", "IN_PROGRESS"),
            task_json("t-2", "old.pdf", "COMPLETED")
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"files": [], "count": 0})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tasks/task/t-1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_json("t-1", "offer.pdf", "COMPLETED")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tasks/task/t-2/status"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (ctx, mut rx) = context_for(&server, 50);
    assert_eq!(ctx.initializer().run().await, InitOutcome::FromTasks(2));

    let poller = ctx.poller().start();
    let note = next_notification(&mut rx, 3).await;
    poller.stop().await;

    assert_eq!(note.title, "Task completed");
    assert_eq!(note.description, "Task for offer.pdf has been completed.");
    assert_eq!(note.level, NotificationLevel::Success);
    assert_eq!(ctx.store().get("t-1").unwrap().status, TaskStatus::Completed);
    assert_eq!(ctx.store().pending_count(), 0);
}

#[tokio::test]
async fn test_file_fallback_when_listing_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "files": [
                file_json("f-1", "a.pdf", Some("t-1")),
                file_json("f-2", "a-page2.pdf", Some("t-1")),
                file_json("f-3", "loose.pdf", None)
            ],
            "count": 3
        })))
        .mount(&server)
        .await;

    let (ctx, mut rx) = context_for(&server, 50);

    assert_eq!(ctx.initializer().run().await, InitOutcome::FromFiles(1));
    let task = ctx.store().get("t-1").unwrap();
    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(task.file_name.as_deref(), Some("a.pdf"));
    assert!(rx.try_recv().is_err());

    // synthesized tasks are terminal, so a pass has nothing to fetch
    let report = ctx.poller().poll_once().await;
    assert_eq!(report.polled, 0);
}

#[tokio::test]
async fn test_both_sources_failing_notifies_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (ctx, mut rx) = context_for(&server, 50);

    assert_eq!(ctx.initializer().run().await, InitOutcome::Failed);
    assert!(ctx.store().is_empty());
    let note = next_notification(&mut rx, 1).await;
    assert_eq!(note.title, "Error loading tasks");
    assert!(note.is_destructive());
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_uploaded_tasks_are_followed_to_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/data/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([task_json("t-9", "scan.pdf", "PENDING")])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tasks/task/t-9/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_json("t-9", "scan.pdf", "FAILED")))
        .mount(&server)
        .await;

    let (ctx, mut rx) = context_for(&server, 50);
    let request = UploadRequest::new("C-42").with_file(UploadFile::new("scan.pdf", b"%PDF".to_vec()));

    let tasks = assert_ok!(ctx.actions().upload(&request).await);
    assert_eq!(tasks.len(), 1);
    assert_eq!(next_notification(&mut rx, 1).await.title, "Upload successful");

    let poller = ctx.poller().start();
    let note = next_notification(&mut rx, 3).await;
    poller.stop().await;

    assert_eq!(note.title, "Task failed");
    assert_eq!(note.description, "Task for scan.pdf has failed.");
    assert!(ctx.store().get("t-9").unwrap().is_terminal());
}

#[tokio::test]
async fn test_status_errors_keep_polling() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            task_json("t-1", "a.pdf", "PENDING")
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"files": []})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tasks/task/t-1/status"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let (ctx, mut rx) = context_for(&server, 40);
    ctx.initializer().run().await;

    let poller = ctx.poller().start();
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(poller.is_running());
    poller.stop().await;

    let status_requests = server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|request| request.url.path() == "/tasks/task/t-1/status")
        .count();
    assert!(status_requests >= 2, "expected repeated polling, saw {status_requests}");
    assert_eq!(ctx.store().get("t-1").unwrap().status, TaskStatus::Pending);
    assert!(rx.try_recv().is_err());
}
