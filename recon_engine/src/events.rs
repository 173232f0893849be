//! Order-settled notifications.
//!
//! The reconciler can notify a downstream listener whenever an order transitions into the settled state. The
//! hook receives the event only; it has no access to engine internals, and its outcome never affects the
//! reconciliation result.
use std::{future::Future, pin::Pin, sync::Arc};

use crate::types::Order;

/// Emitted once per order, on the transition edge into settlement. Duplicate gateway deliveries do not re-emit.
#[derive(Debug, Clone)]
pub struct OrderSettledEvent {
    pub order: Order,
    pub transaction_id: Option<String>,
}

pub type SettledHook = Arc<dyn Fn(OrderSettledEvent) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;
