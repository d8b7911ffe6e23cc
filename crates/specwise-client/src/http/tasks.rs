/*
[INPUT]:  Task ids and status transitions
[OUTPUT]: Task listings and per-task status snapshots
[POS]:    HTTP layer - /tasks endpoints
[UPDATE]: When adding task endpoints or changing response format
*/

use crate::http::files::parse_message;
use crate::http::{Result, SpecwiseClient};
use crate::types::{MessageResponse, Task, TaskResponse, TaskStatus};
use reqwest::Method;

impl SpecwiseClient {
    /// List every task the server tracks
    ///
    /// GET /tasks/
    pub async fn list_tasks(&self) -> Result<Vec<Task>> {
        let url = self.endpoint(&["tasks", ""])?;
        self.send_json(self.request(Method::GET, url)).await
    }

    /// Current status of a single task
    ///
    /// GET /tasks/task/{task_id}/status
    pub async fn get_task_status(&self, task_id: &str) -> Result<TaskResponse> {
        let url = self.endpoint(&["tasks", "task", task_id, "status"])?;
        self.send_json(self.request(Method::GET, url)).await
    }

    /// PUT /tasks/task/{task_id}/status?status={status}&additional_info={info}
    pub async fn update_task_status(
        &self,
        task_id: &str,
        status: TaskStatus,
        additional_info: Option<&str>,
    ) -> Result<TaskResponse> {
        let mut url = self.endpoint(&["tasks", "task", task_id, "status"])?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("status", status.as_str());
            if let Some(info) = additional_info.filter(|info| !info.is_empty()) {
                query.append_pair("additional_info", info);
            }
        }
        self.send_json(self.request(Method::PUT, url)).await
    }

    /// DELETE /tasks/{task_id}
    pub async fn delete_task(&self, task_id: &str) -> Result<MessageResponse> {
        let url = self.endpoint(&["tasks", task_id])?;
        let body = self.send_checked(self.request(Method::DELETE, url)).await?;
        Ok(parse_message(&body))
    }
}

#[cfg(test)]
mod tests {
    use crate::http::{ClientConfig, SpecwiseClient, SpecwiseError};
    use crate::types::TaskStatus;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> SpecwiseClient {
        SpecwiseClient::with_config_and_base_url(ClientConfig::default(), &server.uri())
            .expect("client init")
    }

    #[tokio::test]
    async fn test_list_tasks() {
        let server = MockServer::start().await;
        let mock_response = r#"[
            {"id": "t-1", "collection_id": "c-1", "file_name": "a.pdf", "status": "PENDING"},
            {"id": "t-2", "collection_id": "c-1", "file_name": "b.pdf", "status": "COMPLETED",
             "created_at": 1717171717000, "updated_at": 1717171718000}
        ]"#;

        Mock::given(method("GET"))
            .and(path("/tasks/"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(mock_response, "application/json"))
            .expect(1)
            .mount(&server)
            .await;

        let tasks = client_for(&server).list_tasks().await.expect("list_tasks failed");

        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].id, "t-1");
        assert_eq!(tasks[0].status, TaskStatus::Pending);
        assert_eq!(tasks[1].updated_at, Some(1_717_171_718_000));
    }

    #[tokio::test]
    async fn test_get_task_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/tasks/task/t-1/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "task": {
                    "id": "t-1",
                    "collection_id": "c-1",
                    "description": "Extracting page 2/5",
                    "file_name": "a.pdf",
                    "status": "IN_PROGRESS"
                },
                "message": "Task status: IN_PROGRESS"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = client_for(&server)
            .get_task_status("t-1")
            .await
            .expect("get_task_status failed");

        assert_eq!(response.task.status, TaskStatus::InProgress);
        assert_eq!(response.task.description.as_deref(), Some("Extracting page 2/5"));
    }

    #[tokio::test]
    async fn test_get_task_status_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/tasks/task/missing/status"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "detail": "Task not found: missing"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .get_task_status("missing")
            .await
            .expect_err("404 must fail");
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_update_task_status_query() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/tasks/task/t-1/status"))
            .and(query_param("status", "CANCELED"))
            .and(query_param("additional_info", "stopped by user"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "task": {"id": "t-1", "collection_id": "c-1", "status": "CANCELED"},
                "message": "updated"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = client_for(&server)
            .update_task_status("t-1", TaskStatus::Canceled, Some("stopped by user"))
            .await
            .expect("update_task_status failed");
        assert_eq!(response.task.status, TaskStatus::Canceled);
    }

    #[tokio::test]
    async fn test_list_tasks_malformed_body() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/tasks/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "unexpected": true
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).list_tasks().await.expect_err("object is not a list");
        assert!(matches!(err, SpecwiseError::Serialization(_)));
    }
}
