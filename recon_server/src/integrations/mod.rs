//! Adapters binding the engine's storage and gateway traits to the live HTTP clients.
pub mod cms;
pub mod gateway;

pub use cms::CmsBackend;
pub use gateway::SnapGateway;
