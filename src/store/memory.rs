use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{self, BoxFuture, FutureExt};
use uuid::Uuid;

use crate::models::order::{ConfirmationState, Order};
use crate::store::{OrderStore, StoreError};

/// Process-local store. The compare-and-set runs under the DashMap shard
/// write lock for the entry, so concurrent attempts on one order serialize.
#[derive(Default)]
pub struct InMemoryOrderStore {
    orders: DashMap<Uuid, Order>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OrderStore for InMemoryOrderStore {
    fn get_order(&self, id: Uuid) -> BoxFuture<'_, Result<Option<Order>, StoreError>> {
        let order = self.orders.get(&id).map(|entry| entry.value().clone());
        future::ready(Ok(order)).boxed()
    }

    fn compare_and_set_state(
        &self,
        id: Uuid,
        expected: ConfirmationState,
        new_state: ConfirmationState,
        at: DateTime<Utc>,
    ) -> BoxFuture<'_, Result<bool, StoreError>> {
        let result = match self.orders.get_mut(&id) {
            Some(mut order) if order.state == expected => {
                order.apply_transition(new_state, at);
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Err(StoreError::NotFound(id)),
        };
        future::ready(result).boxed()
    }

    fn insert_order(&self, order: Order) -> BoxFuture<'_, Result<(), StoreError>> {
        let result = match self.orders.entry(order.id) {
            Entry::Occupied(_) => {
                Err(StoreError::Conflict(format!("order {} already exists", order.id)))
            }
            Entry::Vacant(slot) => {
                slot.insert(order);
                Ok(())
            }
        };
        future::ready(result).boxed()
    }

    fn assign_courier(
        &self,
        id: Uuid,
        courier_id: Uuid,
    ) -> BoxFuture<'_, Result<Order, StoreError>> {
        let result = match self.orders.get_mut(&id) {
            Some(mut order) if order.state == ConfirmationState::AwaitingPickup => {
                order.assigned_courier = Some(courier_id);
                Ok(order.clone())
            }
            Some(order) => Err(StoreError::Conflict(format!(
                "order {id} is {} and can no longer be reassigned",
                order.state
            ))),
            None => Err(StoreError::NotFound(id)),
        };
        future::ready(result).boxed()
    }

    fn order_count(&self) -> BoxFuture<'_, Result<usize, StoreError>> {
        future::ready(Ok(self.orders.len())).boxed()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use uuid::Uuid;

    use super::InMemoryOrderStore;
    use crate::geo::Coordinate;
    use crate::models::order::{ConfirmationState, Order};
    use crate::store::{OrderStore, StoreError};

    fn order() -> Order {
        Order::new(
            Coordinate { lat: 1.0, lng: 1.0 },
            Coordinate { lat: 2.0, lng: 2.0 },
            Some(Uuid::from_u128(1)),
        )
    }

    #[tokio::test]
    async fn compare_and_set_requires_expected_state() {
        let store = InMemoryOrderStore::new();
        let order = order();
        store.insert_order(order.clone()).await.unwrap();

        let moved = store
            .compare_and_set_state(
                order.id,
                ConfirmationState::AwaitingPickup,
                ConfirmationState::AwaitingDelivery,
                Utc::now(),
            )
            .await
            .unwrap();
        assert!(moved);

        let again = store
            .compare_and_set_state(
                order.id,
                ConfirmationState::AwaitingPickup,
                ConfirmationState::AwaitingDelivery,
                Utc::now(),
            )
            .await
            .unwrap();
        assert!(!again);

        let stored = store.get_order(order.id).await.unwrap().unwrap();
        assert_eq!(stored.state, ConfirmationState::AwaitingDelivery);
        assert!(stored.picked_up_at.is_some());
        assert!(stored.delivered_at.is_none());
    }

    #[tokio::test]
    async fn compare_and_set_on_missing_order_fails() {
        let store = InMemoryOrderStore::new();
        let result = store
            .compare_and_set_state(
                Uuid::from_u128(42),
                ConfirmationState::AwaitingPickup,
                ConfirmationState::AwaitingDelivery,
                Utc::now(),
            )
            .await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn concurrent_compare_and_set_has_single_winner() {
        let store = Arc::new(InMemoryOrderStore::new());
        let order = order();
        store.insert_order(order.clone()).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .compare_and_set_state(
                        order.id,
                        ConfirmationState::AwaitingPickup,
                        ConfirmationState::AwaitingDelivery,
                        Utc::now(),
                    )
                    .await
                    .unwrap()
            }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn reassignment_blocked_after_pickup() {
        let store = InMemoryOrderStore::new();
        let order = order();
        store.insert_order(order.clone()).await.unwrap();

        let reassigned = store
            .assign_courier(order.id, Uuid::from_u128(2))
            .await
            .unwrap();
        assert_eq!(reassigned.assigned_courier, Some(Uuid::from_u128(2)));

        store
            .compare_and_set_state(
                order.id,
                ConfirmationState::AwaitingPickup,
                ConfirmationState::AwaitingDelivery,
                Utc::now(),
            )
            .await
            .unwrap();

        let result = store.assign_courier(order.id, Uuid::from_u128(3)).await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn duplicate_insert_is_conflict() {
        let store = InMemoryOrderStore::new();
        let order = order();
        store.insert_order(order.clone()).await.unwrap();
        assert!(matches!(
            store.insert_order(order).await,
            Err(StoreError::Conflict(_))
        ));
    }
}
