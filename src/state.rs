use std::sync::Arc;

use crate::collaborators::{BroadcastNotifier, TracingAuditSink};
use crate::config::Config;
use crate::engine::service::ConfirmationService;
use crate::error::AppError;
use crate::observability::metrics::Metrics;
use crate::store::{InMemoryOrderStore, OrderStore};

pub struct AppState {
    pub store: Arc<dyn OrderStore>,
    pub confirmations: ConfirmationService,
    pub notifier: BroadcastNotifier,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        Self::with_store(Arc::new(InMemoryOrderStore::new()), config)
    }

    pub fn with_store(store: Arc<dyn OrderStore>, config: &Config) -> Result<Self, AppError> {
        let policy = config.proximity_policy()?;
        let metrics = Metrics::new();
        let notifier = BroadcastNotifier::new(config.event_buffer_size);

        let confirmations = ConfirmationService::new(
            store.clone(),
            Arc::new(notifier.clone()),
            Arc::new(TracingAuditSink),
            policy,
            metrics.clone(),
        )
        .with_store_timeout(config.store_timeout)
        .with_rejection_audit(config.audit_rejections);

        Ok(Self {
            store,
            confirmations,
            notifier,
            metrics,
        })
    }
}
