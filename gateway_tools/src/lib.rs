//! HTTP client for the payment gateway.
//!
//! Two surfaces are covered: the server-to-server status API, which is the only trusted source of a
//! transaction's state, and the hosted-payment ("Snap") API used at checkout to open a payment session.
//! Webhook signature verification lives in [`helpers`] so the server can check signatures without
//! constructing a client.
mod api;
mod config;
mod data_objects;
mod error;
pub mod helpers;

pub use api::GatewayApi;
pub use config::GatewayConfig;
pub use data_objects::{
    SnapCallbacks,
    SnapCustomerDetails,
    SnapExpiry,
    SnapItem,
    SnapTransactionDetails,
    SnapTransactionRequest,
    SnapTransactionResponse,
    TransactionStatusRecord,
};
pub use error::GatewayApiError;
