use std::fmt::Debug;

use log::*;

use crate::{
    recon_api::errors::CheckoutError,
    traits::{PaymentGateway, StorefrontDatabase},
    types::{NewOrder, NewTransaction, PaymentSession},
};

/// `CheckoutApi` records a pending order and opens a hosted-payment session for it. The order is written before
/// the gateway call so that a later notification always has something to reconcile against.
pub struct CheckoutApi<B, G> {
    db: B,
    gateway: G,
}

impl<B, G> Debug for CheckoutApi<B, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CheckoutApi")
    }
}

impl<B, G> CheckoutApi<B, G> {
    pub fn new(db: B, gateway: G) -> Self {
        Self { db, gateway }
    }
}

impl<B, G> CheckoutApi<B, G>
where
    B: StorefrontDatabase,
    G: PaymentGateway,
{
    /// Validates stock for every product line, creates the pending order, and requests a payment session.
    ///
    /// Stock is only checked here, not reserved; the authoritative decrement happens at settlement. If the
    /// gateway call fails after the order was created, the pending order is left in place: it is visible to
    /// operators and reconcilable by a later notification.
    pub async fn process_checkout(&self, order: NewOrder) -> Result<PaymentSession, CheckoutError> {
        for item in order.items.iter().filter(|i| !i.is_shipping()) {
            let product = self
                .db
                .fetch_product(&item.product_ref)
                .await?
                .ok_or_else(|| CheckoutError::ProductNotFound(item.product_ref.clone()))?;
            trace!(
                "🧾️ Stock check for {}: available {}, requested {}",
                product.name,
                product.stock,
                item.quantity
            );
            if product.stock < item.quantity {
                return Err(CheckoutError::InsufficientStock {
                    name: product.name,
                    available: product.stock,
                    requested: item.quantity,
                });
            }
        }
        let created = self.db.create_order(order.clone()).await?;
        debug!("🧾️ Order {} recorded as pending ({})", created.order_id, created.internal_id);

        let request = NewTransaction {
            order_id: order.order_id.clone(),
            gross_amount: order.total_amount,
            items: order.items,
            customer: order.customer,
        };
        let session = self.gateway.create_transaction(&request).await?;
        info!("🧾️ Payment session opened for order {}", created.order_id);
        Ok(session)
    }
}
