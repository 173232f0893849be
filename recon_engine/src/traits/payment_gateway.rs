use thiserror::Error;

use crate::types::{NewTransaction, OrderId, PaymentSession, VerifiedTransaction};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Network error contacting the payment gateway. {0}")]
    Network(String),
    #[error("The payment gateway rejected the request. Status {status}. {message}")]
    Api { status: u16, message: String },
    #[error("No transaction exists at the gateway for order {0}")]
    TransactionNotFound(String),
    #[error("Could not interpret the gateway response. {0}")]
    Malformed(String),
}

/// The payment gateway's server-to-server API.
#[allow(async_fn_in_trait)]
pub trait PaymentGateway {
    /// Queries the authoritative status of the transaction for the given order. Webhook bodies are never trusted
    /// for financial decisions; this call is.
    async fn fetch_transaction_status(&self, order_id: &OrderId) -> Result<VerifiedTransaction, GatewayError>;

    /// Creates a hosted-payment session for a new order.
    async fn create_transaction(&self, request: &NewTransaction) -> Result<PaymentSession, GatewayError>;
}
