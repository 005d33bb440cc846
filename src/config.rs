//! Environment-sourced settings, validated at startup.
//!
//! A `validator`-derived struct for operator-supplied settings plus a
//! plain-default struct for runtime tuning knobs, loaded after a
//! `dotenv::dotenv().ok()` call so a local `.env` can supply overrides.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

fn validate_mnemonic(value: &str) -> Result<(), ValidationError> {
    let word_count = value.split_whitespace().count();
    if ![12, 15, 18, 21, 24].contains(&word_count) {
        return Err(ValidationError::new("mnemonic must be a valid BIP39 word count"));
    }
    Ok(())
}

fn validate_origins(value: &str) -> Result<(), ValidationError> {
    if value.split(',').any(|o| o.trim().is_empty()) {
        return Err(ValidationError::new("ALLOWED_ORIGINS must not contain empty entries"));
    }
    Ok(())
}

/// Operator-supplied settings, sourced from environment variables. Defaults
/// below match the documented public provider endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AppConfig {
    #[validate(custom = "validate_mnemonic")]
    pub mnemonic: String,
    pub wallet_passphrase: String,

    pub thorchain_node_url: String,
    pub mayachain_node_url: String,
    pub chainflip_api_url: String,
    pub chainflip_api_key: Option<String>,
    pub cowswap_base_url: String,
    pub zrx_base_url: String,
    pub relay_api_url: String,
    pub portals_base_url: String,
    pub jupiter_api_url: String,
    pub thorchain_midgard_url: String,
    pub mayachain_midgard_url: String,

    #[validate(custom = "validate_origins")]
    pub allowed_origins: String,
    #[validate(range(min = 1, max = 65535))]
    pub port: u16,
}

impl AppConfig {
    /// Reads settings from the process environment, applying the public
    /// default endpoint for every provider. Call `dotenv::dotenv().ok()`
    /// before this in `main` so a local `.env` can supply overrides.
    pub fn from_env() -> anyhow::Result<Self> {
        let config = Self {
            mnemonic: require_env("MNEMONIC")?,
            wallet_passphrase: std::env::var("WALLET_PASSPHRASE").unwrap_or_default(),

            thorchain_node_url: env_or("VITE_THORCHAIN_NODE_URL", "https://thornode.ninerealms.com"),
            mayachain_node_url: env_or("VITE_MAYACHAIN_NODE_URL", "https://mayanode.mayachain.info"),
            chainflip_api_url: env_or("VITE_CHAINFLIP_API_URL", "https://chainflip-broker.io"),
            chainflip_api_key: std::env::var("VITE_CHAINFLIP_API_KEY").ok(),
            cowswap_base_url: env_or("VITE_COWSWAP_BASE_URL", "https://api.cow.fi"),
            zrx_base_url: env_or("VITE_ZRX_BASE_URL", "https://api.0x.org"),
            relay_api_url: env_or("VITE_RELAY_API_URL", "https://api.relay.link"),
            portals_base_url: env_or("VITE_PORTALS_BASE_URL", "https://api.portals.fi"),
            jupiter_api_url: env_or("VITE_JUPITER_API_URL", "https://quote-api.jup.ag"),
            thorchain_midgard_url: env_or("VITE_THORCHAIN_MIDGARD_URL", "https://midgard.ninerealms.com"),
            mayachain_midgard_url: env_or("VITE_MAYACHAIN_MIDGARD_URL", "https://midgard.mayachain.info"),

            allowed_origins: env_or("ALLOWED_ORIGINS", "*"),
            port: env_or("PORT", "3001").parse().unwrap_or(3001),
        };

        config.validate_all()?;
        Ok(config)
    }

    pub fn validate_all(&self) -> anyhow::Result<()> {
        self.validate().map_err(|e| anyhow::anyhow!("configuration validation failed: {e}"))
    }

    pub fn allowed_origin_list(&self) -> Vec<String> {
        self.allowed_origins.split(',').map(|s| s.trim().to_string()).collect()
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn require_env(key: &str) -> anyhow::Result<String> {
    std::env::var(key).map_err(|_| anyhow::anyhow!("missing required environment variable {key}"))
}

/// Runtime tuning knobs that don't need operator validation.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeConfig {
    pub default_cache_ttl: Duration,
    pub default_max_hops: usize,
    pub default_max_cross_chain_hops: usize,
    pub graph_rebuild_interval: Duration,
    pub cache_eviction_interval: Duration,
    pub quote_account_index: u32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            default_cache_ttl: Duration::from_secs(30),
            default_max_hops: 4,
            default_max_cross_chain_hops: 2,
            graph_rebuild_interval: Duration::from_secs(60),
            cache_eviction_interval: Duration::from_secs(60),
            quote_account_index: 0,
        }
    }
}
