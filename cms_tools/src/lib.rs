//! HTTP client for the headless CMS resource API.
//!
//! The CMS is the system of record for orders, products, cart lines and users. Its REST API wraps most
//! resources in a `data` envelope and addresses records by an opaque `documentId` (with a numeric `id` as a
//! legacy fallback). Everything in this crate normalises those shapes at the boundary; callers only ever see
//! [`Document`]-wrapped records with a resolved internal id.
mod api;
mod config;
mod data_objects;
mod error;

pub use api::CmsApi;
pub use config::CmsConfig;
pub use data_objects::{
    CartRecord,
    Document,
    ItemRecord,
    NewOrderRecord,
    OrderRecord,
    OrderUpdateRecord,
    ProductRecord,
    Relation,
    UserRecord,
};
pub use error::CmsApiError;
