use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::future::BoxFuture;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::collaborators::{AuditRecord, AuditSink, Notifier, StatusChanged};
use crate::engine::policy::ProximityPolicy;
use crate::engine::state_machine::{evaluate, Transition};
use crate::error::AppError;
use crate::models::attempt::{Checkpoint, ConfirmationAttempt, RejectionReason};
use crate::models::claim::LocationClaim;
use crate::observability::metrics::Metrics;
use crate::store::{OrderStore, StoreError};

const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(2);

pub struct ConfirmationService {
    store: Arc<dyn OrderStore>,
    notifier: Arc<dyn Notifier>,
    audit: Arc<dyn AuditSink>,
    policy: ProximityPolicy,
    metrics: Metrics,
    store_timeout: Duration,
    audit_rejections: bool,
}

impl ConfirmationService {
    pub fn new(
        store: Arc<dyn OrderStore>,
        notifier: Arc<dyn Notifier>,
        audit: Arc<dyn AuditSink>,
        policy: ProximityPolicy,
        metrics: Metrics,
    ) -> Self {
        Self {
            store,
            notifier,
            audit,
            policy,
            metrics,
            store_timeout: DEFAULT_STORE_TIMEOUT,
            audit_rejections: false,
        }
    }

    pub fn with_store_timeout(mut self, store_timeout: Duration) -> Self {
        self.store_timeout = store_timeout;
        self
    }

    /// Also send rejected attempts (other than unknown orders) to the audit
    /// sink.
    pub fn with_rejection_audit(mut self, enabled: bool) -> Self {
        self.audit_rejections = enabled;
        self
    }

    pub fn policy(&self) -> &ProximityPolicy {
        &self.policy
    }

    /// Evaluates and, on acceptance, persists one checkpoint confirmation.
    ///
    /// Business rejections come back as `Ok` with `accepted == false`. `Err`
    /// is reserved for store failures, which the caller may retry with the
    /// identical claim.
    pub async fn submit_confirmation(
        &self,
        order_id: Uuid,
        courier_id: Uuid,
        checkpoint: Checkpoint,
        claim: LocationClaim,
    ) -> Result<ConfirmationAttempt, AppError> {
        let start = Instant::now();
        let result = self.confirm(order_id, courier_id, checkpoint, &claim).await;
        let elapsed = start.elapsed().as_secs_f64();

        let outcome = match &result {
            Ok(attempt) => attempt.outcome_label(),
            Err(_) => "transient_error",
        };
        self.metrics
            .confirmations_total
            .with_label_values(&[checkpoint.as_str(), outcome])
            .inc();
        self.metrics
            .confirmation_latency_seconds
            .with_label_values(&[outcome])
            .observe(elapsed);
        if let Ok(ConfirmationAttempt {
            distance_meters: Some(distance),
            ..
        }) = &result
        {
            self.metrics
                .claim_distance_meters
                .with_label_values(&[checkpoint.as_str()])
                .observe(*distance);
        }

        result
    }

    async fn confirm(
        &self,
        order_id: Uuid,
        courier_id: Uuid,
        checkpoint: Checkpoint,
        claim: &LocationClaim,
    ) -> Result<ConfirmationAttempt, AppError> {
        let Some(order) = self.call("get_order", self.store.get_order(order_id)).await? else {
            debug!(
                order_id = %order_id,
                courier_id = %courier_id,
                "confirmation for unknown order"
            );
            return Ok(ConfirmationAttempt::rejected(
                order_id,
                checkpoint,
                None,
                RejectionReason::NotFound,
            ));
        };

        let evaluation = evaluate(&order, courier_id, checkpoint, claim, &self.policy, Utc::now());

        let Some(transition) = evaluation.transition else {
            let attempt = evaluation.attempt;
            info!(
                order_id = %order_id,
                courier_id = %courier_id,
                checkpoint = %checkpoint,
                distance_meters = ?attempt.distance_meters,
                effective_radius_meters = ?attempt.effective_radius_meters,
                reason = ?attempt.reason,
                "confirmation rejected"
            );
            if self.audit_rejections {
                self.record_audit(courier_id, claim, &attempt);
            }
            return Ok(attempt);
        };

        match self.persist(order_id, transition).await {
            Ok(true) => {}
            Ok(false) => {
                return self
                    .resolve_lost_race(order_id, courier_id, checkpoint, transition)
                    .await;
            }
            Err(AppError::NotFound(_)) => {
                return Ok(ConfirmationAttempt::rejected(
                    order_id,
                    checkpoint,
                    None,
                    RejectionReason::NotFound,
                ));
            }
            Err(err) => return Err(err),
        }

        let attempt = evaluation.attempt;
        info!(
            order_id = %order_id,
            courier_id = %courier_id,
            checkpoint = %checkpoint,
            distance_meters = ?attempt.distance_meters,
            new_state = %transition.to,
            "checkpoint confirmed"
        );

        if let Err(err) = self.notifier.notify_status_changed(StatusChanged {
            order_id,
            state: transition.to,
            at: transition.at,
        }) {
            warn!(order_id = %order_id, error = %err, "status change notification failed");
        }
        self.record_audit(courier_id, claim, &attempt);

        Ok(attempt)
    }

    async fn persist(&self, order_id: Uuid, transition: Transition) -> Result<bool, AppError> {
        self.call(
            "compare_and_set_state",
            self.store
                .compare_and_set_state(order_id, transition.from, transition.to, transition.at),
        )
        .await
    }

    /// A failed compare-and-set means the order changed under us. If it has
    /// moved past the state we evaluated against, another attempt won and
    /// this one is out of sequence; otherwise the caller should retry.
    async fn resolve_lost_race(
        &self,
        order_id: Uuid,
        courier_id: Uuid,
        checkpoint: Checkpoint,
        transition: Transition,
    ) -> Result<ConfirmationAttempt, AppError> {
        self.metrics.store_conflicts_total.inc();

        let current = self.call("get_order", self.store.get_order(order_id)).await?;
        match current {
            Some(order) if order.state.rank() > transition.from.rank() => {
                info!(
                    order_id = %order_id,
                    courier_id = %courier_id,
                    checkpoint = %checkpoint,
                    state = %order.state,
                    "lost confirmation race"
                );
                Ok(ConfirmationAttempt::rejected(
                    order_id,
                    checkpoint,
                    Some(order.state),
                    RejectionReason::InvalidState,
                ))
            }
            Some(_) => Err(AppError::TransientStore(format!(
                "compare-and-set on order {order_id} failed without a state change"
            ))),
            None => Ok(ConfirmationAttempt::rejected(
                order_id,
                checkpoint,
                None,
                RejectionReason::NotFound,
            )),
        }
    }

    async fn call<T>(
        &self,
        op: &'static str,
        fut: BoxFuture<'_, Result<T, StoreError>>,
    ) -> Result<T, AppError> {
        match timeout(self.store_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => {
                warn!(op, error = %err, "store call failed");
                Err(err.into())
            }
            Err(_) => {
                warn!(
                    op,
                    timeout_ms = self.store_timeout.as_millis() as u64,
                    "store call timed out"
                );
                Err(AppError::TransientStore(format!(
                    "{op} timed out after {:?}",
                    self.store_timeout
                )))
            }
        }
    }

    fn record_audit(
        &self,
        courier_id: Uuid,
        claim: &LocationClaim,
        attempt: &ConfirmationAttempt,
    ) {
        let record = AuditRecord {
            order_id: attempt.order_id,
            courier_id,
            checkpoint: attempt.checkpoint,
            position: claim.position,
            accuracy_meters: claim.accuracy_meters,
            distance_meters: attempt.distance_meters,
            accepted: attempt.accepted,
            reason: attempt.reason,
            captured_at: claim.captured_at,
            recorded_at: Utc::now(),
        };

        if let Err(err) = self.audit.record_confirmation(&record) {
            warn!(order_id = %attempt.order_id, error = %err, "audit write failed");
        }
    }
}
