//! Storefront payment reconciliation engine
//!
//! This library contains the provider-agnostic core of the payment reconciler. It is responsible for translating
//! gateway transaction statuses into the canonical order lifecycle, and for applying order updates and their
//! settlement side effects (stock decrements, cart clearing) exactly once per settled transaction.
//!
//! The library is divided into three main sections:
//! 1. The canonical data model and status machinery ([`mod@types`], [`mod@status`]). These are the only shapes that
//!    circulate beyond the client boundary; external API responses are normalised into them immediately.
//! 2. Collaborator traits ([`mod@traits`]). The storefront backend (order, product, cart and user resources) and the
//!    payment gateway are abstracted behind traits so that the reconciliation flow can be exercised against mocks.
//! 3. The engine API ([`ReconcileApi`], [`CheckoutApi`]). These implement the reconciliation and checkout flows on
//!    top of the traits.
//!
//! An optional order-settled hook can be attached to the reconciler to notify downstream listeners when an order
//! transitions into the settled state.
pub mod events;
mod recon_api;
pub mod status;
pub mod traits;
pub mod types;

pub use recon_api::{
    checkout::CheckoutApi,
    errors::{CheckoutError, ReconcileError},
    reconcile::{ReconcileApi, ReconcileOutcome},
};
