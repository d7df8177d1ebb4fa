//! Pure transition logic for checkpoint confirmations.
//!
//! Checks run in a fixed order: actor authorization, then state ordering,
//! then geometry. Distance is only computed once the first two pass.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::engine::policy::ProximityPolicy;
use crate::geo::{distance_meters, Coordinate};
use crate::models::attempt::{Checkpoint, ConfirmationAttempt, RejectionReason};
use crate::models::claim::LocationClaim;
use crate::models::order::{ConfirmationState, Order};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: ConfirmationState,
    pub to: ConfirmationState,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub attempt: ConfirmationAttempt,
    /// Set only when the attempt was accepted.
    pub transition: Option<Transition>,
}

/// State reached by confirming `checkpoint` from `state`, or `None` when the
/// checkpoint is out of sequence.
pub fn next_state(checkpoint: Checkpoint, state: ConfirmationState) -> Option<ConfirmationState> {
    match (checkpoint, state) {
        (Checkpoint::Pickup, ConfirmationState::AwaitingPickup) => {
            Some(ConfirmationState::AwaitingDelivery)
        }
        (Checkpoint::Delivery, ConfirmationState::AwaitingDelivery) => {
            Some(ConfirmationState::Completed)
        }
        (Checkpoint::Pickup, ConfirmationState::AwaitingDelivery | ConfirmationState::Completed)
        | (Checkpoint::Delivery, ConfirmationState::AwaitingPickup | ConfirmationState::Completed) => {
            None
        }
    }
}

fn target(order: &Order, checkpoint: Checkpoint) -> &Coordinate {
    match checkpoint {
        Checkpoint::Pickup => &order.pickup,
        Checkpoint::Delivery => &order.delivery,
    }
}

/// Evaluates one confirmation attempt against a snapshot of the order.
///
/// `actor` is the authenticated courier making the request. The order is not
/// modified; an accepted attempt carries the transition to persist.
pub fn evaluate(
    order: &Order,
    actor: Uuid,
    checkpoint: Checkpoint,
    claim: &LocationClaim,
    policy: &ProximityPolicy,
    now: DateTime<Utc>,
) -> Evaluation {
    let authorized = order.assigned_courier == Some(actor) && claim.courier_id == actor;
    if !authorized {
        return Evaluation {
            attempt: ConfirmationAttempt::rejected(
                order.id,
                checkpoint,
                Some(order.state),
                RejectionReason::Forbidden,
            ),
            transition: None,
        };
    }

    let Some(to) = next_state(checkpoint, order.state) else {
        return Evaluation {
            attempt: ConfirmationAttempt::rejected(
                order.id,
                checkpoint,
                Some(order.state),
                RejectionReason::InvalidState,
            ),
            transition: None,
        };
    };

    let distance = distance_meters(&claim.position, target(order, checkpoint));
    let verdict = policy.is_within_radius(distance, claim.accuracy_meters);

    let transition = verdict.accepted.then_some(Transition {
        from: order.state,
        to,
        at: now,
    });

    Evaluation {
        attempt: ConfirmationAttempt {
            order_id: order.id,
            checkpoint,
            accepted: verdict.accepted,
            state: Some(if verdict.accepted { to } else { order.state }),
            distance_meters: Some(distance),
            effective_radius_meters: Some(verdict.effective_radius),
            reason: (!verdict.accepted).then_some(RejectionReason::OutOfRange),
        },
        transition,
    }
}

pub fn confirm_pickup(
    order: &Order,
    actor: Uuid,
    claim: &LocationClaim,
    policy: &ProximityPolicy,
    now: DateTime<Utc>,
) -> Evaluation {
    evaluate(order, actor, Checkpoint::Pickup, claim, policy, now)
}

pub fn confirm_delivery(
    order: &Order,
    actor: Uuid,
    claim: &LocationClaim,
    policy: &ProximityPolicy,
    now: DateTime<Utc>,
) -> Evaluation {
    evaluate(order, actor, Checkpoint::Delivery, claim, policy, now)
}
