//! Order persistence boundary.
//!
//! The engine depends only on [`OrderStore`]; per-order serialization of
//! confirmations is the store's compare-and-set, not an in-process lock.

pub mod memory;

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use thiserror::Error;
use uuid::Uuid;

use crate::models::order::{ConfirmationState, Order};

pub use memory::InMemoryOrderStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("order {0} not found")]
    NotFound(Uuid),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

pub trait OrderStore: Send + Sync {
    fn get_order(&self, id: Uuid) -> BoxFuture<'_, Result<Option<Order>, StoreError>>;

    /// Moves the order from `expected` to `new_state` and stamps `at`, all or
    /// nothing. Returns `Ok(false)` when the current state is not `expected`.
    fn compare_and_set_state(
        &self,
        id: Uuid,
        expected: ConfirmationState,
        new_state: ConfirmationState,
        at: DateTime<Utc>,
    ) -> BoxFuture<'_, Result<bool, StoreError>>;

    fn insert_order(&self, order: Order) -> BoxFuture<'_, Result<(), StoreError>>;

    /// Assigns a courier. Only allowed before pickup is confirmed.
    fn assign_courier(&self, id: Uuid, courier_id: Uuid)
    -> BoxFuture<'_, Result<Order, StoreError>>;

    fn order_count(&self) -> BoxFuture<'_, Result<usize, StoreError>>;
}
