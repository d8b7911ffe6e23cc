/*
[INPUT]:  File ids, customer numbers, item keys and selections
[OUTPUT]: File records, extraction results and generated XML
[POS]:    HTTP layer - /files endpoints
[UPDATE]: When adding file endpoints or changing response format
*/

use crate::http::{Result, SpecwiseClient};
use crate::types::{
    ClassificationUpdate, FileResponse, FilesListResponse, MessageResponse, XmlSelection,
};
use reqwest::Method;

impl SpecwiseClient {
    /// List every file known to the API
    ///
    /// GET /files/
    pub async fn list_files(&self) -> Result<FilesListResponse> {
        let url = self.endpoint(&["files", ""])?;
        self.send_json(self.request(Method::GET, url)).await
    }

    /// Fetch a single file with its line items
    ///
    /// GET /files/{file_id}
    pub async fn get_file(&self, file_id: &str) -> Result<FileResponse> {
        let url = self.endpoint(&["files", file_id])?;
        self.send_json(self.request(Method::GET, url)).await
    }

    /// GET /files/customer/{customer_number}
    pub async fn list_files_by_customer(&self, customer_number: &str) -> Result<FilesListResponse> {
        let url = self.endpoint(&["files", "customer", customer_number])?;
        self.send_json(self.request(Method::GET, url)).await
    }

    /// GET /files/task/{task_id}
    pub async fn list_files_by_task(&self, task_id: &str) -> Result<FilesListResponse> {
        let url = self.endpoint(&["files", "task", task_id])?;
        self.send_json(self.request(Method::GET, url)).await
    }

    /// Update match/relevance flags on one extracted item
    ///
    /// PUT /files/{file_id}/items/{item_key}/classification
    pub async fn update_item_classification(
        &self,
        file_id: &str,
        item_key: &str,
        update: &ClassificationUpdate,
    ) -> Result<serde_json::Value> {
        let url = self.endpoint(&["files", file_id, "items", item_key, "classification"])?;
        let builder = self.request(Method::PUT, url).json(update);
        self.send_json(builder).await
    }

    /// Generate XML for the selected items; the server stores it on the file
    ///
    /// PUT /files/{file_id}/xml
    pub async fn generate_xml(&self, file_id: &str, item_keys: &[String]) -> Result<FileResponse> {
        let url = self.endpoint(&["files", file_id, "xml"])?;
        let body = XmlSelection {
            ids: item_keys.to_vec(),
        };
        let builder = self.request(Method::PUT, url).json(&body);
        self.send_json(builder).await
    }

    /// DELETE /files/{file_id}
    pub async fn delete_file(&self, file_id: &str) -> Result<MessageResponse> {
        let url = self.endpoint(&["files", file_id])?;
        let body = self.send_checked(self.request(Method::DELETE, url)).await?;
        Ok(parse_message(&body))
    }
}

/// Delete endpoints answer with a JSON message, a bare string, or nothing
pub(crate) fn parse_message(body: &str) -> MessageResponse {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return MessageResponse::default();
    }

    match serde_json::from_str::<MessageResponse>(trimmed) {
        Ok(message) => message,
        Err(_) => MessageResponse {
            message: serde_json::from_str::<String>(trimmed)
                .unwrap_or_else(|_| trimmed.to_string()),
        },
    }
}
