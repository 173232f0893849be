use log::*;
use spr_common::Secret;

#[derive(Debug, Clone, Default)]
pub struct CmsConfig {
    /// Base URL of the CMS, e.g. "https://cms.example.com". Paths are appended under `/api`.
    pub base_url: String,
    /// Server-scoped bearer token. Distinct from any end-user session credential.
    pub api_token: Secret<String>,
}

impl CmsConfig {
    pub fn new_from_env_or_default() -> Self {
        let base_url = std::env::var("SPR_CMS_URL").unwrap_or_else(|_| {
            warn!("SPR_CMS_URL not set, using (probably useless) default");
            "http://localhost:1337".to_string()
        });
        let api_token = Secret::new(std::env::var("SPR_CMS_API_TOKEN").unwrap_or_default());
        if api_token.is_unset() {
            warn!("SPR_CMS_API_TOKEN not set. CMS calls will be rejected until it is configured.");
        }
        Self { base_url: base_url.trim_end_matches('/').to_string(), api_token }
    }
}
