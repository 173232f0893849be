use log::*;
use spr_common::Secret;

#[derive(Debug, Clone, Default)]
pub struct GatewayConfig {
    /// Base URL of the core (status) API, e.g. "https://api.sandbox.midtrans.com".
    pub api_url: String,
    /// Base URL of the hosted-payment API, e.g. "https://app.sandbox.midtrans.com".
    pub snap_url: String,
    /// The merchant server key. Used both for API authentication and for webhook signature checks.
    pub server_key: Secret<String>,
}

impl GatewayConfig {
    pub fn new_from_env_or_default() -> Self {
        let api_url = std::env::var("SPR_GATEWAY_API_URL").unwrap_or_else(|_| {
            warn!("SPR_GATEWAY_API_URL not set, using the sandbox API");
            "https://api.sandbox.midtrans.com".to_string()
        });
        let snap_url = std::env::var("SPR_GATEWAY_SNAP_URL").unwrap_or_else(|_| {
            warn!("SPR_GATEWAY_SNAP_URL not set, using the sandbox API");
            "https://app.sandbox.midtrans.com".to_string()
        });
        let server_key = Secret::new(std::env::var("SPR_GATEWAY_SERVER_KEY").unwrap_or_default());
        if server_key.is_unset() {
            warn!("SPR_GATEWAY_SERVER_KEY not set. Gateway calls and signature checks will fail until it is configured.");
        }
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            snap_url: snap_url.trim_end_matches('/').to_string(),
            server_key,
        }
    }
}
