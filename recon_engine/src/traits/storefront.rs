use thiserror::Error;

use crate::types::{CartLine, DocumentId, NewOrder, Order, OrderId, OrderUpdate, Product};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Network error communicating with the storefront backend. {0}")]
    Network(String),
    #[error("The storefront backend rejected the request. Status {status}. {message}")]
    Backend { status: u16, message: String },
    #[error("Could not normalise a storefront backend response. {0}")]
    Malformed(String),
}

/// Order resource access. Orders are looked up by their external order id but mutated by their CMS document id;
/// the two are never interchangeable.
#[allow(async_fn_in_trait)]
pub trait OrderStore {
    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, StoreError>;

    async fn create_order(&self, order: NewOrder) -> Result<Order, StoreError>;

    /// Applies a partial update to the order. The write is idempotent; re-applying the same update must yield the
    /// same stored state.
    async fn update_order(&self, id: &DocumentId, update: OrderUpdate) -> Result<(), StoreError>;
}

/// Product catalog access. Stock is only ever written by the reconciler's settlement side effects.
#[allow(async_fn_in_trait)]
pub trait ProductStore {
    async fn fetch_product(&self, product_ref: &str) -> Result<Option<Product>, StoreError>;

    async fn set_product_stock(&self, id: &DocumentId, stock: i64) -> Result<(), StoreError>;
}

/// Cart line access. There is no bulk-delete primitive; lines are deleted one call at a time.
#[allow(async_fn_in_trait)]
pub trait CartStore {
    async fn fetch_cart_lines(&self, customer_id: i64) -> Result<Vec<CartLine>, StoreError>;

    async fn delete_cart_line(&self, id: &DocumentId) -> Result<(), StoreError>;
}

/// Fallback customer resolution, used when an order carries no direct account relation.
#[allow(async_fn_in_trait)]
pub trait CustomerDirectory {
    /// Resolves an account id from an email address. When the backend holds multiple matches, the first is used.
    async fn fetch_customer_id_by_email(&self, email: &str) -> Result<Option<i64>, StoreError>;
}

/// The full set of storefront resources the engine needs. Implemented automatically for any type providing the
/// four resource traits.
pub trait StorefrontDatabase: OrderStore + ProductStore + CartStore + CustomerDirectory {}

impl<T> StorefrontDatabase for T where T: OrderStore + ProductStore + CartStore + CustomerDirectory {}
