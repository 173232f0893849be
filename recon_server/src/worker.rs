//! Background reconciliation.
//!
//! Webhook handlers push validated notifications onto a bounded queue and return immediately. A single worker
//! drains the queue and spawns one task per notification, so deliveries for different orders reconcile
//! concurrently and nothing here can back-pressure a webhook response. Loss on overflow is acceptable; the
//! gateway redelivers.

use std::sync::Arc;

use log::*;
use recon_engine::{types::IncomingNotification, ReconcileApi};
use tokio::{
    sync::mpsc::{self, Receiver, Sender},
    task::JoinHandle,
};

use crate::integrations::{CmsBackend, SnapGateway};

/// Cloneable sending half of the notification queue.
#[derive(Clone)]
pub struct NotificationQueue {
    sender: Sender<IncomingNotification>,
}

impl NotificationQueue {
    pub fn new(depth: usize) -> (Self, Receiver<IncomingNotification>) {
        let (sender, receiver) = mpsc::channel(depth);
        (Self { sender }, receiver)
    }

    /// Queues a notification without waiting. A full or closed queue is reported to the caller, which logs it
    /// and acknowledges the webhook anyway.
    pub fn enqueue(&self, notification: IncomingNotification) -> Result<(), String> {
        self.sender.try_send(notification).map_err(|e| e.to_string())
    }
}

/// Drains the queue until every sender is dropped. Runs for the life of the server.
pub fn start_reconciliation_worker(
    api: ReconcileApi<CmsBackend, SnapGateway>,
    mut receiver: Receiver<IncomingNotification>,
) -> JoinHandle<()> {
    let api = Arc::new(api);
    tokio::spawn(async move {
        info!("🔁️ Reconciliation worker started");
        while let Some(notification) = receiver.recv().await {
            let api = Arc::clone(&api);
            tokio::spawn(async move {
                let order_id = notification.order_id.clone();
                match api.process_notification(notification).await {
                    Ok(outcome) if outcome.settled_now => {
                        info!(
                            "🔁️ Order {order_id} settled. {} stock updates, {} cart lines cleared.",
                            outcome.stock_updates, outcome.cart_lines_cleared
                        );
                    },
                    Ok(outcome) => {
                        debug!(
                            "🔁️ Order {order_id} reconciled without side effects ('{}' -> '{}')",
                            outcome.previous_status, outcome.new_status
                        );
                    },
                    Err(e) => {
                        error!("🔁️ Reconciliation for order {order_id} failed. Awaiting redelivery. {e}");
                    },
                }
            });
        }
        info!("🔁️ Notification queue closed. Reconciliation worker shutting down.");
    })
}

#[cfg(test)]
mod test {
    use recon_engine::types::OrderId;
    use serde_json::json;

    use super::*;

    #[test]
    fn a_full_queue_reports_the_overflow() {
        let (queue, _receiver) = NotificationQueue::new(1);
        let notification = IncomingNotification {
            order_id: OrderId("ORDER-1".to_string()),
            transaction_id: None,
            raw: json!({}),
        };
        assert!(queue.enqueue(notification.clone()).is_ok());
        assert!(queue.enqueue(notification).is_err());
    }

    #[test]
    fn a_closed_queue_reports_the_error() {
        let (queue, receiver) = NotificationQueue::new(1);
        drop(receiver);
        let notification = IncomingNotification {
            order_id: OrderId("ORDER-1".to_string()),
            transaction_id: None,
            raw: json!({}),
        };
        assert!(queue.enqueue(notification).is_err());
    }
}
