//! HTTP server for the storefront's payment plumbing.
//!
//! The server exposes the payment-gateway webhook, the browser callback redirect, the checkout endpoint and a
//! health check. Webhook notifications are acknowledged synchronously and reconciled by a background worker;
//! nothing the worker does ever changes a webhook response.
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod integrations;
pub mod routes;
pub mod server;
pub mod worker;
