/*
[INPUT]:  TaskSource (task listing + file listing), TaskStore, Notifier
[OUTPUT]: Store seeded once per application load
[POS]:    Sync layer - start-up reconciliation
[UPDATE]: When changing source preference or task synthesis from files
*/

use std::collections::HashSet;
use std::sync::Arc;

use specwise_client::{FileRecord, Task, TaskStatus};
use tracing::{info, warn};

use crate::notify::{Notification, Notifier};
use crate::source::TaskSource;
use crate::store::TaskStore;

/// Which data source seeded the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// Live task listing succeeded; store holds exactly these tasks
    FromTasks(usize),
    /// Listing failed; store holds tasks derived from file records
    FromFiles(usize),
    /// Listing failed and no file carried a task id; store untouched
    NothingToSeed,
    /// Both sources failed; one notification raised
    Failed,
}

/// One-shot reconciliation run at start-up. Consumed by [`TaskInitializer::run`].
pub struct TaskInitializer {
    source: Arc<dyn TaskSource>,
    store: TaskStore,
    notifier: Arc<dyn Notifier>,
}

impl TaskInitializer {
    pub fn new(source: Arc<dyn TaskSource>, store: TaskStore, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            source,
            store,
            notifier,
        }
    }

    pub async fn run(self) -> InitOutcome {
        let (tasks, files) = tokio::join!(self.source.list_tasks(), self.source.list_files());

        let tasks_err = match tasks {
            Ok(tasks) => {
                let seeded = self.store.reset_with(tasks);
                info!(seeded, "tasks initialized from task listing");
                return InitOutcome::FromTasks(seeded);
            }
            Err(err) => {
                warn!(error = %err, "task listing unavailable, falling back to files");
                err
            }
        };

        match files {
            Ok(files) => {
                let synthesized = synthesize_tasks(&files);
                if synthesized.is_empty() {
                    info!(files = files.len(), "no file carries a task id; nothing to seed");
                    return InitOutcome::NothingToSeed;
                }
                let seeded = self.store.reset_with(synthesized);
                info!(seeded, "tasks initialized from file listing");
                InitOutcome::FromFiles(seeded)
            }
            Err(files_err) => {
                warn!(
                    tasks_error = %tasks_err,
                    files_error = %files_err,
                    "could not load tasks from any source"
                );
                self.notifier.notify(Notification::destructive(
                    "Error loading tasks",
                    "Failed to load existing tasks. Please refresh the page.",
                ));
                InitOutcome::Failed
            }
        }
    }
}

/// Derive one COMPLETED task per distinct non-empty `task_id`, first file wins
pub fn synthesize_tasks(files: &[FileRecord]) -> Vec<Task> {
    let mut seen = HashSet::new();

    files
        .iter()
        .filter_map(|file| {
            let task_id = file.task_id()?;
            if !seen.insert(task_id) {
                return None;
            }
            Some(Task {
                id: task_id.to_string(),
                collection_id: task_id.to_string(),
                description: None,
                file_name: Some(file.filename.clone()),
                status: TaskStatus::Completed,
                created_at: Some(file.created_at),
                updated_at: None,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{ChannelNotifier, NotificationLevel};
    use crate::source::MockTaskSource;

    fn file(id: &str, filename: &str, task_id: Option<&str>, created_at: i64) -> FileRecord {
        FileRecord {
            id: id.to_string(),
            filename: filename.to_string(),
            filepath: format!("/uploads/{filename}"),
            customer_number: "C-1".to_string(),
            task_id: task_id.map(str::to_string),
            items: Vec::new(),
            is_xml_generated: false,
            xml_content: None,
            created_at,
            updated_at: None,
        }
    }

    fn run_with(source: MockTaskSource, store: &TaskStore) -> (TaskInitializer, ChannelNotifier) {
        let (notifier, _rx) = ChannelNotifier::new();
        let init = TaskInitializer::new(Arc::new(source), store.clone(), Arc::new(notifier.clone()));
        (init, notifier)
    }

    #[test]
    fn test_synthesize_first_file_per_task_wins() {
        let files = vec![
            file("f1", "first.pdf", Some("t-1"), 100),
            file("f2", "second.pdf", Some("t-1"), 200),
            file("f3", "third.pdf", Some("t-1"), 300),
            file("f4", "loose.pdf", None, 400),
            file("f5", "blank.pdf", Some(""), 500),
        ];

        let tasks = synthesize_tasks(&files);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, "t-1");
        assert_eq!(tasks[0].collection_id, "t-1");
        assert_eq!(tasks[0].status, TaskStatus::Completed);
        assert_eq!(tasks[0].file_name.as_deref(), Some("first.pdf"));
        assert_eq!(tasks[0].created_at, Some(100));
    }

    #[tokio::test]
    async fn test_empty_task_listing_is_authoritative() {
        let store = TaskStore::new();
        store.add_task(Task::new("stale", TaskStatus::Pending));

        let source = MockTaskSource::new()
            .with_tasks(vec![])
            .with_files(vec![file("f1", "a.pdf", Some("t-1"), 1)]);
        let (init, _) = run_with(source, &store);

        assert_eq!(init.run().await, InitOutcome::FromTasks(0));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_task_listing_replaces_store() {
        let store = TaskStore::new();
        store.add_task(Task::new("stale", TaskStatus::Pending));

        let source = MockTaskSource::new().with_tasks(vec![
            Task::new("t-1", TaskStatus::Pending),
            Task::new("t-2", TaskStatus::Completed),
        ]);
        let (init, _) = run_with(source, &store);

        assert_eq!(init.run().await, InitOutcome::FromTasks(2));
        let ids: Vec<String> = store.snapshot().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["t-1", "t-2"]);
    }

    #[tokio::test]
    async fn test_falls_back_to_files() {
        let store = TaskStore::new();
        let source = MockTaskSource::new().with_files(vec![
            file("f1", "a.pdf", Some("t-1"), 10),
            file("f2", "b.pdf", Some("t-1"), 20),
            file("f3", "c.pdf", Some("t-1"), 30),
            file("f4", "d.pdf", None, 40),
            file("f5", "e.pdf", None, 50),
        ]);
        let (init, _) = run_with(source, &store);

        assert_eq!(init.run().await, InitOutcome::FromFiles(1));
        let only = store.get("t-1").expect("synthesized task");
        assert_eq!(only.status, TaskStatus::Completed);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_fallback_without_task_ids_leaves_store_alone() {
        let store = TaskStore::new();
        store.add_task(Task::new("kept", TaskStatus::Pending));

        let source = MockTaskSource::new().with_files(vec![file("f1", "a.pdf", None, 1)]);
        let (init, _) = run_with(source, &store);

        assert_eq!(init.run().await, InitOutcome::NothingToSeed);
        assert!(store.contains("kept"));
    }

    #[tokio::test]
    async fn test_both_sources_failing_notifies_once() {
        let store = TaskStore::new();
        let (notifier, mut rx) = ChannelNotifier::new();
        let init = TaskInitializer::new(
            Arc::new(MockTaskSource::new()),
            store.clone(),
            Arc::new(notifier),
        );

        assert_eq!(init.run().await, InitOutcome::Failed);

        let notification = rx.try_recv().expect("one notification");
        assert_eq!(notification.title, "Error loading tasks");
        assert_eq!(notification.level, NotificationLevel::Destructive);
        assert!(rx.try_recv().is_err());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_files_failure_is_silent_when_tasks_succeed() {
        let store = TaskStore::new();
        let (notifier, mut rx) = ChannelNotifier::new();
        let source = MockTaskSource::new().with_tasks(vec![Task::new("t-1", TaskStatus::Pending)]);
        let init = TaskInitializer::new(Arc::new(source), store.clone(), Arc::new(notifier));

        assert_eq!(init.run().await, InitOutcome::FromTasks(1));
        assert!(rx.try_recv().is_err());
    }
}
