/*
[INPUT]:  Tasks from upload responses, initial reconciliation and status polls
[OUTPUT]: Ordered task snapshot shared with every observer via `watch`
[POS]:    State layer - single source of truth for client-side tasks
[UPDATE]: When changing merge semantics or observer notification
*/

use std::collections::HashSet;
use std::sync::Arc;

use specwise_client::{Task, TaskStatus};
use tokio::sync::watch;
use tracing::debug;

/// Partial update merged into an existing task; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub status: Option<TaskStatus>,
    pub description: Option<String>,
    pub file_name: Option<String>,
    pub updated_at: Option<i64>,
}

impl TaskPatch {
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.description.is_none()
            && self.file_name.is_none()
            && self.updated_at.is_none()
    }

    /// Returns true when at least one field actually changed
    fn apply(&self, task: &mut Task) -> bool {
        let mut changed = false;

        if let Some(status) = self.status {
            changed |= task.status != status;
            task.status = status;
        }
        if let Some(description) = &self.description {
            changed |= task.description.as_ref() != Some(description);
            task.description = Some(description.clone());
        }
        if let Some(file_name) = &self.file_name {
            changed |= task.file_name.as_ref() != Some(file_name);
            task.file_name = Some(file_name.clone());
        }
        if let Some(updated_at) = self.updated_at {
            changed |= task.updated_at != Some(updated_at);
            task.updated_at = Some(updated_at);
        }

        changed
    }
}

/// In-memory registry of tracked tasks, keyed by task id, in insertion order.
///
/// Cloning yields another handle to the same registry. Every mutation that
/// changes the contents wakes all receivers returned by [`TaskStore::subscribe`].
#[derive(Debug, Clone)]
pub struct TaskStore {
    tasks: Arc<watch::Sender<Vec<Task>>>,
}

impl TaskStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Vec::new());
        Self { tasks: Arc::new(tx) }
    }

    /// Observe the task list; the receiver always holds the latest snapshot
    pub fn subscribe(&self) -> watch::Receiver<Vec<Task>> {
        self.tasks.subscribe()
    }

    /// Insert unless a task with the same id is already tracked
    pub fn add_task(&self, task: Task) -> bool {
        self.add_tasks([task]) == 1
    }

    /// Non-overwriting merge: tasks whose id is already tracked (or repeated
    /// within `tasks`) are skipped. Returns the number inserted.
    pub fn add_tasks(&self, tasks: impl IntoIterator<Item = Task>) -> usize {
        let incoming: Vec<Task> = tasks.into_iter().collect();
        let mut inserted = 0;

        self.tasks.send_if_modified(|current| {
            let mut seen: HashSet<String> = current.iter().map(|task| task.id.clone()).collect();
            for task in incoming {
                if seen.insert(task.id.clone()) {
                    current.push(task);
                    inserted += 1;
                }
            }
            inserted > 0
        });

        if inserted > 0 {
            debug!(inserted, total = self.len(), "tasks added");
        }
        inserted
    }

    pub fn remove_task(&self, task_id: &str) -> bool {
        let removed = self.tasks.send_if_modified(|current| {
            let before = current.len();
            current.retain(|task| task.id != task_id);
            current.len() != before
        });

        if removed {
            debug!(task_id, "task removed");
        }
        removed
    }

    /// Merge `patch` into the task with `task_id`; unknown ids are ignored
    pub fn update_task(&self, task_id: &str, patch: &TaskPatch) -> bool {
        self.patch_task(task_id, patch).is_some()
    }

    /// Apply `patch` and hand back the entry as it was before, or `None` when
    /// the id is unknown or nothing changed. Check and write happen under one lock.
    pub fn patch_task(&self, task_id: &str, patch: &TaskPatch) -> Option<Task> {
        let mut previous = None;
        self.tasks.send_if_modified(|current| {
            let Some(task) = current.iter_mut().find(|task| task.id == task_id) else {
                return false;
            };
            let before = task.clone();
            let changed = patch.apply(task);
            if changed {
                previous = Some(before);
            }
            changed
        });
        previous
    }

    /// Returns the number of tasks dropped
    pub fn clear_tasks(&self) -> usize {
        let mut cleared = 0;
        self.tasks.send_if_modified(|current| {
            cleared = current.len();
            current.clear();
            cleared > 0
        });
        cleared
    }

    /// Clear followed by a bulk add, published to observers as one change
    pub fn reset_with(&self, tasks: impl IntoIterator<Item = Task>) -> usize {
        let incoming: Vec<Task> = tasks.into_iter().collect();
        let mut inserted = 0;

        self.tasks.send_if_modified(|current| {
            let mut next: Vec<Task> = Vec::with_capacity(incoming.len());
            let mut seen = HashSet::new();
            for task in incoming {
                if seen.insert(task.id.clone()) {
                    next.push(task);
                }
            }
            inserted = next.len();

            if *current == next {
                return false;
            }
            *current = next;
            true
        });

        inserted
    }

    pub fn snapshot(&self) -> Vec<Task> {
        self.tasks.borrow().clone()
    }

    pub fn get(&self, task_id: &str) -> Option<Task> {
        self.tasks
            .borrow()
            .iter()
            .find(|task| task.id == task_id)
            .cloned()
    }

    pub fn contains(&self, task_id: &str) -> bool {
        self.tasks.borrow().iter().any(|task| task.id == task_id)
    }

    pub fn len(&self) -> usize {
        self.tasks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.borrow().is_empty()
    }

    /// Tasks that still need polling
    pub fn active_tasks(&self) -> Vec<Task> {
        self.tasks
            .borrow()
            .iter()
            .filter(|task| !task.is_terminal())
            .cloned()
            .collect()
    }

    pub fn pending_count(&self) -> usize {
        self.tasks
            .borrow()
            .iter()
            .filter(|task| !task.is_terminal())
            .count()
    }
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}
