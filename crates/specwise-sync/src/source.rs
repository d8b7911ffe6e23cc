/*
[INPUT]:  Remote API (or a scripted stand-in)
[OUTPUT]: Task listings, file listings and single-task status snapshots
[POS]:    Data access seam - what the initializer and poller read from
[UPDATE]: When the synchronizer needs another read endpoint
*/

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use specwise_client::{FileRecord, Result, SpecwiseClient, SpecwiseError, Task};

/// Read side of the API used for task synchronization
#[async_trait]
pub trait TaskSource: Send + Sync {
    /// Live task listing (authoritative when it succeeds)
    async fn list_tasks(&self) -> Result<Vec<Task>>;

    /// Full file listing, used to derive tasks when the listing is unavailable
    async fn list_files(&self) -> Result<Vec<FileRecord>>;

    /// Latest server view of one task
    async fn task_status(&self, task_id: &str) -> Result<Task>;
}

#[async_trait]
impl TaskSource for SpecwiseClient {
    async fn list_tasks(&self) -> Result<Vec<Task>> {
        SpecwiseClient::list_tasks(self).await
    }

    async fn list_files(&self) -> Result<Vec<FileRecord>> {
        Ok(SpecwiseClient::list_files(self).await?.files)
    }

    async fn task_status(&self, task_id: &str) -> Result<Task> {
        Ok(self.get_task_status(task_id).await?.task)
    }
}

/// Scripted task source for testing
///
/// Listings fail until they are set. Status lookups for unknown ids answer 404.
#[derive(Debug, Default)]
pub struct MockTaskSource {
    tasks: Mutex<Option<Vec<Task>>>,
    files: Mutex<Option<Vec<FileRecord>>>,
    statuses: Mutex<HashMap<String, Task>>,
    failing: Mutex<HashSet<String>>,
    hanging: Mutex<HashSet<String>>,
    status_calls: Mutex<Vec<String>>,
    list_calls: AtomicUsize,
}

impl MockTaskSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(self, tasks: Vec<Task>) -> Self {
        *lock(&self.tasks) = Some(tasks);
        self
    }

    pub fn with_files(self, files: Vec<FileRecord>) -> Self {
        *lock(&self.files) = Some(files);
        self
    }

    /// Answer status lookups for `task.id` with `task`
    pub fn set_status(&self, task: Task) {
        lock(&self.failing).remove(&task.id);
        lock(&self.statuses).insert(task.id.clone(), task);
    }

    /// Make status lookups for `task_id` fail with a server error
    pub fn fail_status(&self, task_id: &str) {
        lock(&self.failing).insert(task_id.to_string());
    }

    /// Make status lookups for `task_id` never resolve
    pub fn hang_status(&self, task_id: &str) {
        lock(&self.hanging).insert(task_id.to_string());
    }

    /// Task ids passed to `task_status`, in call order
    pub fn status_calls(&self) -> Vec<String> {
        lock(&self.status_calls).clone()
    }

    /// Number of `list_tasks` + `list_files` calls
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn unavailable(what: &str) -> SpecwiseError {
    SpecwiseError::Api {
        code: 503,
        message: format!("{what} unavailable"),
    }
}

#[async_trait]
impl TaskSource for MockTaskSource {
    async fn list_tasks(&self) -> Result<Vec<Task>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.tasks).clone().ok_or_else(|| unavailable("task listing"))
    }

    async fn list_files(&self) -> Result<Vec<FileRecord>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.files).clone().ok_or_else(|| unavailable("file listing"))
    }

    async fn task_status(&self, task_id: &str) -> Result<Task> {
        lock(&self.status_calls).push(task_id.to_string());

        let hang = lock(&self.hanging).contains(task_id);
        if hang {
            std::future::pending::<()>().await;
        }
        let fail = lock(&self.failing).contains(task_id);
        if fail {
            return Err(unavailable("task status"));
        }

        lock(&self.statuses)
            .get(task_id)
            .cloned()
            .ok_or_else(|| SpecwiseError::Api {
                code: 404,
                message: format!("Task not found: {task_id}"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use specwise_client::TaskStatus;

    #[tokio::test]
    async fn test_mock_listings_fail_until_set() {
        let source = MockTaskSource::new();
        assert!(source.list_tasks().await.is_err());
        assert!(source.list_files().await.is_err());

        let source = source.with_tasks(vec![]);
        assert_eq!(source.list_tasks().await.unwrap(), vec![]);
        assert_eq!(source.list_calls(), 3);
    }

    #[tokio::test]
    async fn test_mock_status_lookup() {
        let source = MockTaskSource::new();
        source.set_status(Task::new("t-1", TaskStatus::InProgress));

        let task = source.task_status("t-1").await.unwrap();
        assert_eq!(task.status, TaskStatus::InProgress);

        let err = source.task_status("t-2").await.unwrap_err();
        assert!(err.is_not_found());

        source.fail_status("t-1");
        assert!(source.task_status("t-1").await.is_err());
        assert_eq!(source.status_calls(), vec!["t-1", "t-2", "t-1"]);
    }
}
