pub mod checkout;
pub mod errors;
pub mod reconcile;
