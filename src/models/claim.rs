use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::Coordinate;

/// A courier's reported position at capture time. Lives only for the
/// attempt it supports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationClaim {
    pub courier_id: Uuid,
    pub position: Coordinate,
    pub accuracy_meters: Option<f64>,
    pub captured_at: DateTime<Utc>,
}
