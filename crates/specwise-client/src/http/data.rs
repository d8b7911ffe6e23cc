/*
[INPUT]:  Customer id and document bytes
[OUTPUT]: Server-issued tasks, one per uploaded document
[POS]:    HTTP layer - /data upload endpoint (multipart)
[UPDATE]: When changing upload form fields or response format
*/

use crate::http::{Result, SpecwiseClient, SpecwiseError};
use crate::types::{Task, UploadRequest};
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use tracing::info;

impl SpecwiseClient {
    /// Upload documents for extraction
    ///
    /// POST /data/ (multipart: `customer_id`, repeated `files`)
    pub async fn upload(&self, request: &UploadRequest) -> Result<Vec<Task>> {
        let url = self.endpoint(&["data", ""])?;

        let mut form = Form::new().text("customer_id", request.customer_id.clone());
        for file in &request.files {
            let part = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
            form = form.part("files", part);
        }

        info!(
            customer_id = %request.customer_id,
            file_count = request.files.len(),
            "uploading documents"
        );

        let body = self
            .send_checked(self.request(Method::POST, url).multipart(form))
            .await?;
        let value: serde_json::Value = serde_json::from_str(&body)?;
        if !value.is_array() {
            return Err(SpecwiseError::InvalidResponse(
                "upload response is not a task list".to_string(),
            ));
        }

        Ok(serde_json::from_value(value)?)
    }
}
