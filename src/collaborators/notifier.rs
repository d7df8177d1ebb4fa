use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::collaborators::CollaboratorError;
use crate::models::order::ConfirmationState;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusChanged {
    pub order_id: Uuid,
    pub state: ConfirmationState,
    pub at: DateTime<Utc>,
}

pub trait Notifier: Send + Sync {
    fn notify_status_changed(&self, event: StatusChanged) -> Result<(), CollaboratorError>;
}

/// Publishes status changes on a broadcast channel consumed by websocket
/// clients.
#[derive(Clone)]
pub struct BroadcastNotifier {
    tx: broadcast::Sender<StatusChanged>,
}

impl BroadcastNotifier {
    pub fn new(buffer_size: usize) -> Self {
        let (tx, _unused_rx) = broadcast::channel(buffer_size);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StatusChanged> {
        self.tx.subscribe()
    }
}

impl Notifier for BroadcastNotifier {
    fn notify_status_changed(&self, event: StatusChanged) -> Result<(), CollaboratorError> {
        // No subscribers is not a failure.
        let _ = self.tx.send(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::{BroadcastNotifier, Notifier, StatusChanged};
    use crate::models::order::ConfirmationState;

    #[tokio::test]
    async fn subscribers_receive_events() {
        let notifier = BroadcastNotifier::new(8);
        let mut rx = notifier.subscribe();

        let event = StatusChanged {
            order_id: Uuid::from_u128(5),
            state: ConfirmationState::Completed,
            at: Utc::now(),
        };
        notifier.notify_status_changed(event.clone()).unwrap();

        assert_eq!(rx.recv().await.unwrap(), event);
    }

    #[test]
    fn publishing_without_subscribers_succeeds() {
        let notifier = BroadcastNotifier::new(8);
        let result = notifier.notify_status_changed(StatusChanged {
            order_id: Uuid::from_u128(5),
            state: ConfirmationState::AwaitingDelivery,
            at: Utc::now(),
        });
        assert!(result.is_ok());
    }
}
