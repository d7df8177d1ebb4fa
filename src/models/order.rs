use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::Coordinate;

/// Confirmation progress of an order. Advances strictly forward:
/// `AwaitingPickup -> AwaitingDelivery -> Completed`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfirmationState {
    AwaitingPickup,
    AwaitingDelivery,
    Completed,
}

impl ConfirmationState {
    /// Position in the confirmation sequence.
    pub fn rank(self) -> u8 {
        match self {
            ConfirmationState::AwaitingPickup => 0,
            ConfirmationState::AwaitingDelivery => 1,
            ConfirmationState::Completed => 2,
        }
    }
}

impl fmt::Display for ConfirmationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfirmationState::AwaitingPickup => write!(f, "AWAITING_PICKUP"),
            ConfirmationState::AwaitingDelivery => write!(f, "AWAITING_DELIVERY"),
            ConfirmationState::Completed => write!(f, "COMPLETED"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub pickup: Coordinate,
    pub delivery: Coordinate,
    pub state: ConfirmationState,
    pub assigned_courier: Option<Uuid>,
    pub picked_up_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn new(pickup: Coordinate, delivery: Coordinate, assigned_courier: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            pickup,
            delivery,
            state: ConfirmationState::AwaitingPickup,
            assigned_courier,
            picked_up_at: None,
            delivered_at: None,
            created_at: Utc::now(),
        }
    }

    /// Writes the new state together with the timestamp field it owns.
    pub fn apply_transition(&mut self, new_state: ConfirmationState, at: DateTime<Utc>) {
        match new_state {
            ConfirmationState::AwaitingPickup => {}
            ConfirmationState::AwaitingDelivery => self.picked_up_at = Some(at),
            ConfirmationState::Completed => self.delivered_at = Some(at),
        }
        self.state = new_state;
    }
}
