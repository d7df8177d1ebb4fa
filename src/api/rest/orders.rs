use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post, put};
use axum::Json;
use axum::Router;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::geo::Coordinate;
use crate::models::order::Order;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders", post(create_order))
        .route("/orders/:id", get(get_order))
        .route("/orders/:id/courier", put(assign_courier))
}

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub pickup: Coordinate,
    pub delivery: Coordinate,
    pub courier_id: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct AssignCourierRequest {
    pub courier_id: Uuid,
}

async fn create_order(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<Json<Order>, AppError> {
    payload
        .pickup
        .validate()
        .map_err(|err| AppError::BadRequest(format!("pickup: {err}")))?;
    payload
        .delivery
        .validate()
        .map_err(|err| AppError::BadRequest(format!("delivery: {err}")))?;

    let order = Order::new(payload.pickup, payload.delivery, payload.courier_id);
    state.store.insert_order(order.clone()).await?;

    tracing::info!(order_id = %order.id, courier_id = ?order.assigned_courier, "order created");
    Ok(Json(order))
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    let order = state
        .store
        .get_order(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {} not found", id)))?;

    Ok(Json(order))
}

async fn assign_courier(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignCourierRequest>,
) -> Result<Json<Order>, AppError> {
    let order = state.store.assign_courier(id, payload.courier_id).await?;

    tracing::info!(order_id = %id, courier_id = %payload.courier_id, "courier assigned");
    Ok(Json(order))
}
