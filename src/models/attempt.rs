use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::order::ConfirmationState;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Checkpoint {
    Pickup,
    Delivery,
}

impl Checkpoint {
    pub fn as_str(self) -> &'static str {
        match self {
            Checkpoint::Pickup => "pickup",
            Checkpoint::Delivery => "delivery",
        }
    }
}

impl fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionReason {
    NotFound,
    Forbidden,
    InvalidState,
    OutOfRange,
}

impl RejectionReason {
    pub fn as_str(self) -> &'static str {
        match self {
            RejectionReason::NotFound => "not_found",
            RejectionReason::Forbidden => "forbidden",
            RejectionReason::InvalidState => "invalid_state",
            RejectionReason::OutOfRange => "out_of_range",
        }
    }
}

/// Outcome of one confirmation call.
///
/// `distance_meters` and `effective_radius_meters` are only present when
/// geometry was evaluated, i.e. the authorization and state checks passed.
/// `state` is the order's state after the attempt and is absent only for
/// unknown orders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConfirmationAttempt {
    pub order_id: Uuid,
    pub checkpoint: Checkpoint,
    pub accepted: bool,
    pub state: Option<ConfirmationState>,
    pub distance_meters: Option<f64>,
    pub effective_radius_meters: Option<f64>,
    pub reason: Option<RejectionReason>,
}

impl ConfirmationAttempt {
    pub fn rejected(
        order_id: Uuid,
        checkpoint: Checkpoint,
        state: Option<ConfirmationState>,
        reason: RejectionReason,
    ) -> Self {
        Self {
            order_id,
            checkpoint,
            accepted: false,
            state,
            distance_meters: None,
            effective_radius_meters: None,
            reason: Some(reason),
        }
    }

    pub fn outcome_label(&self) -> &'static str {
        match self.reason {
            None => "accepted",
            Some(reason) => reason.as_str(),
        }
    }
}
