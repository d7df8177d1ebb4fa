use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::collaborators::CollaboratorError;
use crate::geo::Coordinate;
use crate::models::attempt::{Checkpoint, RejectionReason};

/// Who confirmed what, where and when.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AuditRecord {
    pub order_id: Uuid,
    pub courier_id: Uuid,
    pub checkpoint: Checkpoint,
    pub position: Coordinate,
    pub accuracy_meters: Option<f64>,
    pub distance_meters: Option<f64>,
    pub accepted: bool,
    pub reason: Option<RejectionReason>,
    pub captured_at: DateTime<Utc>,
    pub recorded_at: DateTime<Utc>,
}

pub trait AuditSink: Send + Sync {
    fn record_confirmation(&self, record: &AuditRecord) -> Result<(), CollaboratorError>;
}

/// Emits audit records as structured events on the `audit` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record_confirmation(&self, record: &AuditRecord) -> Result<(), CollaboratorError> {
        info!(
            target: "audit",
            order_id = %record.order_id,
            courier_id = %record.courier_id,
            checkpoint = %record.checkpoint,
            lat = record.position.lat,
            lng = record.position.lng,
            accuracy_meters = ?record.accuracy_meters,
            distance_meters = ?record.distance_meters,
            accepted = record.accepted,
            reason = ?record.reason,
            captured_at = %record.captured_at,
            "checkpoint confirmation"
        );
        Ok(())
    }
}
