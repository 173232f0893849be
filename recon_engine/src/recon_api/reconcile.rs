use std::fmt::Debug;

use chrono::Utc;
use log::*;
use serde_json::json;

use crate::{
    events::{OrderSettledEvent, SettledHook},
    recon_api::errors::ReconcileError,
    status::{map_status, OrderStatus},
    traits::{PaymentGateway, StorefrontDatabase},
    types::{IncomingNotification, Order, OrderUpdate, VerifiedTransaction},
};

/// `ReconcileApi` is the only code path that mutates order status. It turns a queued payment notification into a
/// verified order update and, on the transition into settlement, runs the stock and cart side effects.
pub struct ReconcileApi<B, G> {
    db: B,
    gateway: G,
    on_settled: Option<SettledHook>,
}

impl<B, G> Debug for ReconcileApi<B, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReconcileApi")
    }
}

/// What a reconciliation run did, for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub previous_status: OrderStatus,
    pub new_status: OrderStatus,
    /// True iff this run crossed the edge into settlement and therefore ran the side effects.
    pub settled_now: bool,
    pub stock_updates: usize,
    pub cart_lines_cleared: usize,
}

impl<B, G> ReconcileApi<B, G> {
    pub fn new(db: B, gateway: G) -> Self {
        Self { db, gateway, on_settled: None }
    }

    pub fn with_settled_hook(mut self, hook: SettledHook) -> Self {
        self.on_settled = Some(hook);
        self
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B, G> ReconcileApi<B, G>
where
    B: StorefrontDatabase,
    G: PaymentGateway,
{
    /// Reconciles one payment notification against order and inventory state.
    ///
    /// The run is safe to repeat from scratch: the order update is idempotent, and the settlement side effects
    /// are gated on the transition edge (previous status was not `settlement`, new status is). Any error aborts
    /// this run only; the gateway's webhook redelivery is the retry mechanism.
    pub async fn process_notification(
        &self,
        notification: IncomingNotification,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let order_id = notification.order_id.clone();
        // The webhook body is never trusted for financial decisions. Ask the gateway what actually happened.
        let verified = self.gateway.fetch_transaction_status(&order_id).await?;
        let new_status = map_status(&verified.transaction_status, verified.fraud_status.as_deref());
        debug!(
            "🔁️ Gateway reports {order_id} as '{}' (fraud: {:?}), mapping to '{new_status}'",
            verified.transaction_status, verified.fraud_status
        );

        let order = self
            .db
            .fetch_order_by_order_id(&order_id)
            .await?
            .ok_or_else(|| ReconcileError::OrderNotFound(order_id.clone()))?;
        let previous_status = order.status;
        let was_settled = previous_status == OrderStatus::Settlement;

        let transaction_id = verified.transaction_id.clone().or_else(|| notification.transaction_id.clone());
        let update = OrderUpdate {
            status: new_status,
            gateway_transaction_id: transaction_id.clone(),
            payment_metadata: payment_metadata(&verified, &notification),
        };
        self.db.update_order(&order.internal_id, update).await?;
        info!("🔁️ Order {order_id} reconciled: '{previous_status}' -> '{new_status}'");

        let settled_now = new_status == OrderStatus::Settlement && !was_settled;
        let (stock_updates, cart_lines_cleared) = if settled_now {
            info!("🔁️ Order {order_id} has settled. Running settlement side effects.");
            let counts = self.run_settlement_side_effects(&order).await;
            self.call_order_settled_hook(&order, transaction_id).await;
            counts
        } else {
            if new_status == OrderStatus::Settlement {
                debug!("🔁️ Order {order_id} was already settled. Skipping side effects for this delivery.");
            }
            (0, 0)
        };

        Ok(ReconcileOutcome { previous_status, new_status, settled_now, stock_updates, cart_lines_cleared })
    }

    /// Decrements stock for every product line and clears the customer's cart. Everything here is best-effort:
    /// a failure is logged and skipped, and never fails the reconciliation. Order status correctness is the
    /// primary guarantee; side effects ride along.
    async fn run_settlement_side_effects(&self, order: &Order) -> (usize, usize) {
        let mut stock_updates = 0;
        for item in order.items.iter().filter(|i| !i.is_shipping()) {
            match self.decrement_stock_for_item(&item.product_ref, item.quantity).await {
                Ok(()) => stock_updates += 1,
                Err(e) => {
                    error!(
                        "📦️ Could not update stock for product {} on order {}. Continuing with remaining items. {e}",
                        item.product_ref, order.order_id
                    );
                },
            }
        }
        let cart_lines_cleared = self.clear_customer_cart(order).await;
        (stock_updates, cart_lines_cleared)
    }

    async fn decrement_stock_for_item(&self, product_ref: &str, quantity: i64) -> Result<(), ReconcileError> {
        let product = self
            .db
            .fetch_product(product_ref)
            .await?
            .ok_or_else(|| ReconcileError::Store(crate::traits::StoreError::Malformed(format!(
                "Product {product_ref} not found"
            ))))?;
        let new_stock = (product.stock - quantity).max(0);
        debug!("📦️ Stock for {} ({product_ref}): {} -> {new_stock}", product.name, product.stock);
        self.db.set_product_stock(&product.internal_id, new_stock).await?;
        Ok(())
    }

    /// Clears all cart lines for the purchasing customer. The customer id is resolved from the order's direct
    /// relation first, then by email lookup. An unresolvable customer is an error in the logs, nothing more.
    async fn clear_customer_cart(&self, order: &Order) -> usize {
        let customer_id = match self.resolve_customer_id(order).await {
            Some(id) => id,
            None => {
                error!(
                    "🛒️ Could not resolve a customer for order {}. The cart will not be cleared.",
                    order.order_id
                );
                return 0;
            },
        };
        let lines = match self.db.fetch_cart_lines(customer_id).await {
            Ok(lines) => lines,
            Err(e) => {
                error!("🛒️ Could not fetch cart lines for customer #{customer_id}. {e}");
                return 0;
            },
        };
        debug!("🛒️ Clearing {} cart lines for customer #{customer_id}", lines.len());
        let mut cleared = 0;
        for line in &lines {
            match self.db.delete_cart_line(&line.internal_id).await {
                Ok(()) => cleared += 1,
                Err(e) => error!("🛒️ Could not delete cart line {}. {e}", line.internal_id),
            }
        }
        cleared
    }

    async fn resolve_customer_id(&self, order: &Order) -> Option<i64> {
        if let Some(id) = order.customer.id {
            return Some(id);
        }
        let email = order.customer.email.as_deref()?;
        match self.db.fetch_customer_id_by_email(email).await {
            Ok(Some(id)) => {
                debug!("🛒️ Resolved customer #{id} for order {} by email lookup", order.order_id);
                Some(id)
            },
            Ok(None) => None,
            Err(e) => {
                error!("🛒️ Customer lookup by email failed for order {}. {e}", order.order_id);
                None
            },
        }
    }

    async fn call_order_settled_hook(&self, order: &Order, transaction_id: Option<String>) {
        if let Some(hook) = &self.on_settled {
            debug!("🔁️ Notifying order-settled hook for {}", order.order_id);
            let event = OrderSettledEvent { order: order.clone(), transaction_id };
            (hook)(event).await;
        }
    }
}

/// Assembles the audit record stored on the order. The verified response is authoritative; the raw notification
/// is retained for debugging only.
fn payment_metadata(verified: &VerifiedTransaction, notification: &IncomingNotification) -> serde_json::Value {
    json!({
        "transaction_status": verified.transaction_status,
        "fraud_status": verified.fraud_status,
        "payment_type": verified.payment_type,
        "gross_amount": verified.gross_amount,
        "transaction_id": verified.transaction_id,
        "status_code": verified.status_code,
        "verified_response": verified.raw,
        "raw_notification": notification.raw,
        "reconciled_at": Utc::now().to_rfc3339(),
    })
}
