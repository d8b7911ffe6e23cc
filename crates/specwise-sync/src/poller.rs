/*
[INPUT]:  TaskStore snapshot (non-terminal tasks), TaskSource, CancellationToken
[OUTPUT]: Store updates for changed tasks + completion/failure notifications
[POS]:    Sync layer - recurring status refresh without server push
[UPDATE]: When changing tick scheduling, transition rules or teardown semantics
*/

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use specwise_client::{Task, TaskStatus};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::notify::{Notification, Notifier};
use crate::source::TaskSource;
use crate::store::{TaskPatch, TaskStore};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5000);

/// A detected change between the tracked task and the server's view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub task_id: String,
    pub from: TaskStatus,
    pub to: TaskStatus,
    pub patch: TaskPatch,
    pub notification: Option<Notification>,
}

/// Compare a tracked task with a freshly fetched one.
///
/// A change is reported when the status differs, or when the server sent a
/// description that differs from the tracked one. Only a status change into
/// COMPLETED or FAILED carries a notification.
pub fn reconcile(local: &Task, remote: &Task) -> Option<Transition> {
    let status_changed = local.status != remote.status;
    let description_changed =
        remote.description.is_some() && remote.description != local.description;

    if !status_changed && !description_changed {
        return None;
    }

    let subject = local
        .file_name
        .as_deref()
        .filter(|name| !name.is_empty())
        .unwrap_or("file");

    let notification = match (status_changed, remote.status) {
        (true, TaskStatus::Completed) => Some(Notification::success(
            "Task completed",
            format!("Task for {subject} has been completed."),
        )),
        (true, TaskStatus::Failed) => Some(Notification::destructive(
            "Task failed",
            format!("Task for {subject} has failed."),
        )),
        _ => None,
    };

    Some(Transition {
        task_id: local.id.clone(),
        from: local.status,
        to: remote.status,
        patch: TaskPatch {
            status: Some(remote.status),
            description: remote.description.clone(),
            file_name: None,
            updated_at: remote.updated_at,
        },
        notification,
    })
}

/// Outcome of a single polling pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollReport {
    pub polled: usize,
    pub updated: usize,
    pub failed: usize,
    pub notified: usize,
}

enum FetchResult {
    Unchanged,
    Updated { notified: bool },
    Failed,
}

/// Periodically refreshes every non-terminal task in the store
pub struct StatusPoller {
    source: Arc<dyn TaskSource>,
    store: TaskStore,
    notifier: Arc<dyn Notifier>,
    interval: Duration,
    shutdown: CancellationToken,
}

impl StatusPoller {
    pub fn new(source: Arc<dyn TaskSource>, store: TaskStore, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            source,
            store,
            notifier,
            interval: DEFAULT_POLL_INTERVAL,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start the recurring timer. The first pass runs one interval after start.
    pub fn start(self) -> PollerHandle {
        let shutdown = self.shutdown.clone();
        let poller = Arc::new(self);
        let handle = tokio::spawn(poller.run());
        PollerHandle {
            shutdown,
            handle: Some(handle),
        }
    }

    async fn run(self: Arc<Self>) {
        info!(interval_ms = self.interval.as_millis() as u64, "status poller started");

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // interval() completes its first tick immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    // each pass is detached so a hung fetch never delays the next tick
                    let poller = Arc::clone(&self);
                    tokio::spawn(async move {
                        let report = poller.poll_once().await;
                        if report.polled > 0 {
                            debug!(?report, "poll pass finished");
                        }
                    });
                }
            }
        }

        info!("status poller stopped");
    }

    /// Fetch every non-terminal task concurrently and apply what changed
    pub async fn poll_once(&self) -> PollReport {
        let active = self.store.active_tasks();
        let mut report = PollReport {
            polled: active.len(),
            ..PollReport::default()
        };

        let fetches = active.iter().map(|task| self.refresh(&task.id));
        for result in join_all(fetches).await {
            match result {
                FetchResult::Unchanged => {}
                FetchResult::Updated { notified } => {
                    report.updated += 1;
                    report.notified += usize::from(notified);
                }
                FetchResult::Failed => report.failed += 1,
            }
        }

        report
    }

    async fn refresh(&self, task_id: &str) -> FetchResult {
        let remote = match self.source.task_status(task_id).await {
            Ok(remote) => remote,
            Err(err) => {
                warn!(task_id, error = %err, "error polling task status");
                return FetchResult::Failed;
            }
        };

        if self.shutdown.is_cancelled() {
            debug!(task_id, "poller stopped; discarding late status");
            return FetchResult::Unchanged;
        }

        // compare against the entry as it is now, not as it was when the pass began
        let Some(local) = self.store.get(task_id) else {
            return FetchResult::Unchanged;
        };
        self.apply_remote(&local, &remote)
    }

    /// Store the delta between `local` and `remote`. Only the write that
    /// actually moves the stored status raises the notification.
    fn apply_remote(&self, local: &Task, remote: &Task) -> FetchResult {
        let Some(transition) = reconcile(local, remote) else {
            return FetchResult::Unchanged;
        };
        let Some(previous) = self.store.patch_task(&local.id, &transition.patch) else {
            return FetchResult::Unchanged;
        };

        let status_moved = previous.status != transition.to;
        if status_moved {
            info!(task_id = %local.id, from = %previous.status, to = %transition.to, "task status changed");
        }

        let notified = match transition.notification.filter(|_| status_moved) {
            Some(notification) => {
                self.notifier.notify(notification);
                true
            }
            None => false,
        };
        FetchResult::Updated { notified }
    }
}

/// Owner of a running poller; stopping (or dropping) it cancels the timer
#[derive(Debug)]
pub struct PollerHandle {
    shutdown: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl PollerHandle {
    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Cancel the timer and wait for the loop to exit. In-flight fetches are
    /// left to finish; their results are discarded.
    pub async fn stop(mut self) {
        self.shutdown.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.await {
                warn!(error = %err, "status poller task ended abnormally");
            }
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
