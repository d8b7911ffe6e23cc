/*
[INPUT]:  Public API exports for specwise-sync crate
[OUTPUT]: Module declarations and public re-exports
[POS]:    Crate root - library entry point
[UPDATE]: When adding new modules or public exports
*/

pub mod actions;
pub mod config;
pub mod context;
pub mod initializer;
pub mod notify;
pub mod poller;
pub mod selection;
pub mod source;
pub mod store;

// Re-export main types for convenience
pub use actions::{ActionError, TaskActions, XML_MIME_TYPE};
pub use config::SyncConfig;
pub use context::SyncContext;
pub use initializer::{InitOutcome, TaskInitializer, synthesize_tasks};
pub use notify::{ChannelNotifier, Notification, NotificationLevel, Notifier, TracingNotifier};
pub use poller::{DEFAULT_POLL_INTERVAL, PollReport, PollerHandle, StatusPoller, Transition, reconcile};
pub use selection::ItemSelection;
pub use source::{MockTaskSource, TaskSource};
pub use store::{TaskPatch, TaskStore};
