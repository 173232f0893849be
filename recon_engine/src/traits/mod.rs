//! Collaborator traits for the reconciliation engine.
//!
//! The engine never talks to the CMS or the payment gateway directly. Backends implement these traits (the
//! server crate adapts its HTTP clients to them), and the test suites exercise the flows against mocks.
mod payment_gateway;
mod storefront;

pub use payment_gateway::{GatewayError, PaymentGateway};
pub use storefront::{CartStore, CustomerDirectory, OrderStore, ProductStore, StoreError, StorefrontDatabase};
