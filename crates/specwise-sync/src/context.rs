/*
[INPUT]:  SyncConfig and a notification sink
[OUTPUT]: Shared application context handing out the store and its workers
[POS]:    Composition root - one store per application load
[UPDATE]: When adding components that need the shared store or client
*/

use std::sync::Arc;

use specwise_client::{Result, SpecwiseClient};

use crate::actions::TaskActions;
use crate::config::SyncConfig;
use crate::initializer::TaskInitializer;
use crate::notify::Notifier;
use crate::poller::StatusPoller;
use crate::source::TaskSource;
use crate::store::TaskStore;

/// Everything a front end needs; cloning shares the same store
#[derive(Clone)]
pub struct SyncContext {
    config: SyncConfig,
    client: SpecwiseClient,
    store: TaskStore,
    notifier: Arc<dyn Notifier>,
}

impl SyncContext {
    pub fn new(config: SyncConfig, notifier: Arc<dyn Notifier>) -> Result<Self> {
        let client =
            SpecwiseClient::with_config_and_base_url(config.client_config(), &config.api.base_url)?;
        Ok(Self::from_parts(config, client, TaskStore::new(), notifier))
    }

    pub fn from_parts(
        config: SyncConfig,
        client: SpecwiseClient,
        store: TaskStore,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            client,
            store,
            notifier,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn client(&self) -> &SpecwiseClient {
        &self.client
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn notifier(&self) -> Arc<dyn Notifier> {
        self.notifier.clone()
    }

    fn source(&self) -> Arc<dyn TaskSource> {
        Arc::new(self.client.clone())
    }

    pub fn initializer(&self) -> TaskInitializer {
        TaskInitializer::new(self.source(), self.store.clone(), self.notifier.clone())
    }

    /// Poller over the shared store at the configured interval; not started
    pub fn poller(&self) -> StatusPoller {
        StatusPoller::new(self.source(), self.store.clone(), self.notifier.clone())
            .with_interval(self.config.poll_interval())
    }

    pub fn actions(&self) -> TaskActions {
        TaskActions::new(self.client.clone(), self.store.clone(), self.notifier.clone())
    }
}
