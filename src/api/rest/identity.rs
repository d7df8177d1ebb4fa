use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::error::AppError;

pub const COURIER_ID_HEADER: &str = "x-courier-id";

/// Courier identity established by the upstream session layer and forwarded
/// in the `x-courier-id` header. Trusted as already verified.
#[derive(Debug, Clone, Copy)]
pub struct CourierIdentity(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CourierIdentity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(COURIER_ID_HEADER)
            .ok_or_else(|| AppError::Unauthorized(format!("missing {COURIER_ID_HEADER} header")))?
            .to_str()
            .map_err(|_| AppError::Unauthorized(format!("{COURIER_ID_HEADER} is not ascii")))?;

        let id = Uuid::parse_str(raw.trim())
            .map_err(|err| AppError::Unauthorized(format!("invalid courier id: {err}")))?;

        Ok(CourierIdentity(id))
    }
}
