use std::env;

use cms_tools::CmsConfig;
use gateway_tools::GatewayConfig;
use log::*;
use spr_common::Secret;

const DEFAULT_SPR_HOST: &str = "127.0.0.1";
const DEFAULT_SPR_PORT: u16 = 8360;
const DEFAULT_QUEUE_DEPTH: usize = 128;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Public URL of the storefront, used for callback redirects and the gateway's "finish" hop.
    pub storefront_url: String,
    /// When true, webhook notifications must carry a valid signature. Only disable this against a sandbox
    /// gateway.
    pub signature_checks: bool,
    /// Capacity of the in-process notification queue.
    pub queue_depth: usize,
    pub cms: CmsConfig,
    pub gateway: GatewayConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SPR_HOST.to_string(),
            port: DEFAULT_SPR_PORT,
            storefront_url: "http://localhost:3000".to_string(),
            signature_checks: true,
            queue_depth: DEFAULT_QUEUE_DEPTH,
            cms: CmsConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("SPR_HOST").ok().unwrap_or_else(|| DEFAULT_SPR_HOST.into());
        let port = env::var("SPR_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for SPR_PORT. {e} Using the default, {DEFAULT_SPR_PORT}, instead."
                    );
                    DEFAULT_SPR_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_SPR_PORT);
        let storefront_url = env::var("SPR_STOREFRONT_URL").unwrap_or_else(|_| {
            warn!("🪛️ SPR_STOREFRONT_URL not set. Callback redirects will point at http://localhost:3000.");
            "http://localhost:3000".to_string()
        });
        let signature_checks = env_flag(env::var("SPR_SIGNATURE_CHECKS").ok(), true);
        if !signature_checks {
            warn!(
                "🚨️ Webhook signature checks are DISABLED. Anyone can post payment notifications. Do not run \
                 production like this."
            );
        }
        let queue_depth = env::var("SPR_QUEUE_DEPTH")
            .ok()
            .and_then(|s| {
                s.parse::<usize>()
                    .map_err(|e| warn!("🪛️ Invalid configuration value for SPR_QUEUE_DEPTH. {e}"))
                    .ok()
            })
            .unwrap_or(DEFAULT_QUEUE_DEPTH);
        let cms = CmsConfig::new_from_env_or_default();
        let gateway = GatewayConfig::new_from_env_or_default();
        Self { host, port, storefront_url: storefront_url.trim_end_matches('/').to_string(), signature_checks, queue_depth, cms, gateway }
    }
}

/// Interprets an `SPR_*` on/off environment flag. An unset variable takes the default, as does anything that is
/// not a recognisable on/off token (with a logged warning, so a typo in production cannot silently disable
/// signature checks).
fn env_flag(value: Option<String>, default: bool) -> bool {
    let Some(value) = value else { return default };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => true,
        "0" | "false" | "no" => false,
        other => {
            warn!("🪛️ '{other}' is not a recognisable on/off value. Using the default ({default}).");
            default
        },
    }
}

//-------------------------------------------------  WebhookOptions  ---------------------------------------------------
/// The subset of the configuration the webhook handlers need. Kept small so that secrets other than the server
/// key never travel through request state.
#[derive(Clone, Debug)]
pub struct WebhookOptions {
    pub signature_checks: bool,
    pub server_key: Secret<String>,
    pub storefront_url: String,
}

impl WebhookOptions {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            signature_checks: config.signature_checks,
            server_key: config.gateway.server_key.clone(),
            storefront_url: config.storefront_url.clone(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn env_flags_accept_the_usual_spellings() {
        for on in ["1", "true", "yes", " TRUE ", "Yes"] {
            assert!(env_flag(Some(on.to_string()), false), "{on} should read as on");
        }
        for off in ["0", "false", "no", " False "] {
            assert!(!env_flag(Some(off.to_string()), true), "{off} should read as off");
        }
    }

    #[test]
    fn unset_or_garbage_flags_keep_the_default() {
        assert!(env_flag(None, true));
        assert!(!env_flag(None, false));
        assert!(env_flag(Some("enabledish".to_string()), true));
        assert!(!env_flag(Some("enabledish".to_string()), false));
    }
}
