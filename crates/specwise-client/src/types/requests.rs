/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust request structs with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Body of PUT /files/{file_id}/items/{key}/classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationUpdate {
    #[serde(rename = "match")]
    pub is_match: bool,
    pub relevant: bool,
}

/// Body of PUT /files/{file_id}/xml
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XmlSelection {
    pub ids: Vec<String>,
}

/// One document attached to an upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Read a document from disk, keeping only its final path component as the name
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { file_name, bytes })
    }
}

/// Multipart upload for POST /data/
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadRequest {
    pub customer_id: String,
    pub files: Vec<UploadFile>,
}

impl UploadRequest {
    pub fn new(customer_id: impl Into<String>) -> Self {
        Self {
            customer_id: customer_id.into(),
            files: Vec::new(),
        }
    }

    pub fn with_file(mut self, file: UploadFile) -> Self {
        self.files.push(file);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
