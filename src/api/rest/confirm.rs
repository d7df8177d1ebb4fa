use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::Json;
use axum::Router;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::rest::identity::CourierIdentity;
use crate::error::AppError;
use crate::geo::Coordinate;
use crate::models::attempt::{Checkpoint, ConfirmationAttempt, RejectionReason};
use crate::models::claim::LocationClaim;
use crate::models::order::ConfirmationState;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/confirm-checkpoint", post(confirm_checkpoint))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmCheckpointRequest {
    pub order_id: Uuid,
    pub checkpoint: Checkpoint,
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_meters: Option<f64>,
    pub captured_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmCheckpointResponse {
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<ConfirmationState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_meters: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_radius_meters: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<RejectionReason>,
}

impl From<ConfirmationAttempt> for ConfirmCheckpointResponse {
    fn from(attempt: ConfirmationAttempt) -> Self {
        Self {
            accepted: attempt.accepted,
            state: attempt.state,
            distance_meters: attempt.distance_meters,
            effective_radius_meters: attempt.effective_radius_meters,
            reason: attempt.reason,
        }
    }
}

fn status_for(reason: Option<RejectionReason>) -> StatusCode {
    match reason {
        None => StatusCode::OK,
        Some(RejectionReason::NotFound) => StatusCode::NOT_FOUND,
        Some(RejectionReason::Forbidden) => StatusCode::FORBIDDEN,
        Some(RejectionReason::InvalidState) => StatusCode::CONFLICT,
        Some(RejectionReason::OutOfRange) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

impl ConfirmCheckpointRequest {
    fn into_claim(self, courier_id: Uuid) -> Result<(Uuid, Checkpoint, LocationClaim), AppError> {
        let position = Coordinate::new(self.latitude, self.longitude)
            .map_err(|err| AppError::BadRequest(err.to_string()))?;

        if let Some(accuracy) = self.accuracy_meters {
            if !accuracy.is_finite() || accuracy < 0.0 {
                return Err(AppError::BadRequest(format!(
                    "accuracyMeters must be a non-negative number, got {accuracy}"
                )));
            }
        }

        let claim = LocationClaim {
            courier_id,
            position,
            accuracy_meters: self.accuracy_meters,
            captured_at: self.captured_at.unwrap_or_else(Utc::now),
        };

        Ok((self.order_id, self.checkpoint, claim))
    }
}

async fn confirm_checkpoint(
    State(state): State<Arc<AppState>>,
    CourierIdentity(courier_id): CourierIdentity,
    Json(payload): Json<ConfirmCheckpointRequest>,
) -> Result<(StatusCode, Json<ConfirmCheckpointResponse>), AppError> {
    let (order_id, checkpoint, claim) = payload.into_claim(courier_id)?;

    let attempt = state
        .confirmations
        .submit_confirmation(order_id, courier_id, checkpoint, claim)
        .await?;

    Ok((status_for(attempt.reason), Json(attempt.into())))
}
