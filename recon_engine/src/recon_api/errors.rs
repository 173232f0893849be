use thiserror::Error;

use crate::{
    traits::{GatewayError, StoreError},
    types::OrderId,
};

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("Could not verify the transaction with the payment gateway. {0}")]
    Gateway(#[from] GatewayError),
    /// Orders must exist before any gateway notification is expected. This is a data inconsistency for operators
    /// to investigate, not something the engine tries to recover from.
    #[error("No order found for {0}. A notification arrived for an order that was never recorded.")]
    OrderNotFound(OrderId),
    #[error("Storefront backend error. {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Unknown product in order: {0}")]
    ProductNotFound(String),
    #[error("Insufficient stock for {name}. Available: {available}, requested: {requested}.")]
    InsufficientStock { name: String, available: i64, requested: i64 },
    #[error("Storefront backend error. {0}")]
    Store(#[from] StoreError),
    #[error("Could not create a payment session. {0}")]
    Gateway(#[from] GatewayError),
}
