//! Fire-and-forget side channels invoked after a confirmation is decided.
//! A failing collaborator is logged by the caller and never fails the
//! confirmation itself.

pub mod audit;
pub mod notifier;

use thiserror::Error;

pub use audit::{AuditRecord, AuditSink, TracingAuditSink};
pub use notifier::{BroadcastNotifier, Notifier, StatusChanged};

#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("delivery failed: {0}")]
    Delivery(String),
}
