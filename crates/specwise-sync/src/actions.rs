/*
[INPUT]:  User intents (upload, delete, dismiss, generate/download XML, status override)
[OUTPUT]: Remote calls, store mutations and one notification per outcome
[POS]:    Consumer layer - the operations a front end triggers
[UPDATE]: When adding user actions or changing their notifications
*/

use std::path::{Path, PathBuf};
use std::sync::Arc;

use specwise_client::{FileRecord, SpecwiseClient, SpecwiseError, Task, TaskStatus, UploadRequest};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::notify::{Notification, Notifier};
use crate::selection::ItemSelection;
use crate::store::{TaskPatch, TaskStore};

/// MIME type of downloaded XML exports
pub const XML_MIME_TYPE: &str = "application/xml";

#[derive(Debug, Error)]
pub enum ActionError {
    /// Precondition failed locally; no request was sent
    #[error("rejected: {0}")]
    Rejected(&'static str),

    #[error(transparent)]
    Api(#[from] SpecwiseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ActionResult<T> = std::result::Result<T, ActionError>;

/// Remote operations paired with their store effects and notifications
#[derive(Clone)]
pub struct TaskActions {
    client: SpecwiseClient,
    store: TaskStore,
    notifier: Arc<dyn Notifier>,
}

impl TaskActions {
    pub fn new(client: SpecwiseClient, store: TaskStore, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            client,
            store,
            notifier,
        }
    }

    /// Upload documents; every returned task is added to the store
    pub async fn upload(&self, request: &UploadRequest) -> ActionResult<Vec<Task>> {
        if request.is_empty() {
            self.notifier.notify(Notification::destructive(
                "No files selected",
                "Please select at least one file to upload.",
            ));
            return Err(ActionError::Rejected("no files selected"));
        }

        match self.client.upload(request).await {
            Ok(tasks) => {
                let added = self.store.add_tasks(tasks.iter().cloned());
                info!(returned = tasks.len(), added, "upload accepted");
                self.notifier.notify(Notification::success(
                    "Upload successful",
                    format!("{} file(s) uploaded successfully.", request.files.len()),
                ));
                Ok(tasks)
            }
            Err(err) => {
                warn!(error = %err, "upload failed");
                self.notifier.notify(Notification::destructive(
                    "Upload failed",
                    "There was an error uploading your files. Please try again.",
                ));
                Err(err.into())
            }
        }
    }

    /// Delete on the server, then drop locally. The store is untouched on failure.
    pub async fn delete_task(&self, task_id: &str) -> ActionResult<()> {
        match self.client.delete_task(task_id).await {
            Ok(_) => {
                self.store.remove_task(task_id);
                self.notifier.notify(Notification::success(
                    "Task deleted",
                    "The task has been deleted successfully.",
                ));
                Ok(())
            }
            Err(err) => {
                warn!(task_id, error = %err, "delete task failed");
                self.notifier.notify(Notification::destructive(
                    "Error",
                    "Failed to delete the task. Please try again.",
                ));
                Err(err.into())
            }
        }
    }

    /// Local-only removal; active tasks stay tracked
    pub fn dismiss_task(&self, task_id: &str) -> bool {
        match self.store.get(task_id) {
            Some(task) if task.is_terminal() => self.store.remove_task(task_id),
            Some(task) => {
                debug!(task_id, status = %task.status, "refusing to dismiss active task");
                false
            }
            None => false,
        }
    }

    pub async fn delete_file(&self, file: &FileRecord) -> ActionResult<()> {
        match self.client.delete_file(&file.id).await {
            Ok(_) => {
                self.notifier.notify(Notification::success(
                    "File deleted",
                    format!("{} has been deleted successfully.", file.filename),
                ));
                Ok(())
            }
            Err(err) => {
                warn!(file_id = %file.id, error = %err, "delete file failed");
                self.notifier.notify(Notification::destructive(
                    "Error",
                    "Failed to delete the file. Please try again.",
                ));
                Err(err.into())
            }
        }
    }

    /// Manual status override; the store follows the server's answer
    pub async fn set_task_status(
        &self,
        task_id: &str,
        status: TaskStatus,
        additional_info: Option<&str>,
    ) -> ActionResult<Task> {
        let task = match self
            .client
            .update_task_status(task_id, status, additional_info)
            .await
        {
            Ok(response) => response.task,
            Err(err) => {
                warn!(task_id, error = %err, "status override failed");
                self.notifier.notify(Notification::destructive(
                    "Error",
                    "Failed to update the task status. Please try again.",
                ));
                return Err(err.into());
            }
        };

        let patch = TaskPatch {
            status: Some(task.status),
            description: task.description.clone(),
            file_name: None,
            updated_at: task.updated_at,
        };
        self.store.update_task(task_id, &patch);
        info!(task_id, status = %task.status, "task status overridden");
        Ok(task)
    }

    /// Generate XML from the checked items and return the updated file
    pub async fn generate_xml(
        &self,
        file: &FileRecord,
        selection: &ItemSelection,
    ) -> ActionResult<FileRecord> {
        let keys = selection.selected_keys();
        if keys.is_empty() {
            self.notifier.notify(Notification::destructive(
                "No items selected",
                "Please select at least one item to generate XML.",
            ));
            return Err(ActionError::Rejected("no items selected"));
        }

        match self.client.generate_xml(&file.id, &keys).await {
            Ok(response) => {
                info!(file_id = %file.id, items = keys.len(), "xml generated");
                self.notifier.notify(Notification::success(
                    "XML Generated",
                    "XML has been generated successfully with selected items.",
                ));
                Ok(response.file)
            }
            Err(err) => {
                warn!(file_id = %file.id, error = %err, "xml generation failed");
                self.notifier.notify(Notification::destructive(
                    "Error",
                    "Failed to generate XML. Please try again.",
                ));
                Err(err.into())
            }
        }
    }

    /// Write the file's XML into `dir` and return the written path
    pub async fn download_xml(&self, file: &FileRecord, dir: &Path) -> ActionResult<PathBuf> {
        let Some(content) = file.xml_content.as_deref() else {
            self.notifier.notify(Notification::destructive(
                "No XML content",
                "XML content is not available for this file.",
            ));
            return Err(ActionError::Rejected("no xml content"));
        };

        let path = dir.join(file.xml_file_name());
        if let Err(err) = write_xml(dir, &path, content).await {
            warn!(file_id = %file.id, path = %path.display(), error = %err, "xml save failed");
            self.notifier.notify(Notification::destructive(
                "Error",
                "Failed to save the XML file. Please try again.",
            ));
            return Err(err.into());
        }
        info!(file_id = %file.id, path = %path.display(), mime = XML_MIME_TYPE, "xml saved");
        Ok(path)
    }
}

async fn write_xml(dir: &Path, path: &Path, content: &str) -> std::io::Result<()> {
    tokio::fs::create_dir_all(dir).await?;
    tokio::fs::write(path, content).await
}
