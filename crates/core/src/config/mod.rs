//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (MOTORMARKET_*)
//! 2. TOML config file (if MOTORMARKET_CONFIG_FILE set)
//! 3. Built-in defaults

use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Upstream credentials resolved from configuration.
///
/// The HMAC pair takes precedence when both schemes are configured.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// Static bearer-style token.
    Token(String),
    /// Consumer key/secret pair for per-request HMAC signatures.
    Consumer { key: String, secret: String },
}

/// Per-tier cache TTLs in seconds.
///
/// The tiering reflects data volatility: recent listings churn by the
/// minute, category trees barely move. The cache itself never decides TTLs;
/// callers pass these in per operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheTtls {
    #[serde(default = "default_search_ttl")]
    pub search_secs: u64,
    #[serde(default = "default_listing_ttl")]
    pub listing_secs: u64,
    #[serde(default = "default_recent_ttl")]
    pub recent_secs: u64,
    #[serde(default = "default_categories_ttl")]
    pub categories_secs: u64,
    #[serde(default = "default_stats_ttl")]
    pub stats_secs: u64,
}

fn default_search_ttl() -> u64 {
    180
}

fn default_listing_ttl() -> u64 {
    600
}

fn default_recent_ttl() -> u64 {
    60
}

fn default_categories_ttl() -> u64 {
    3600
}

fn default_stats_ttl() -> u64 {
    300
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            search_secs: default_search_ttl(),
            listing_secs: default_listing_ttl(),
            recent_secs: default_recent_ttl(),
            categories_secs: default_categories_ttl(),
            stats_secs: default_stats_ttl(),
        }
    }
}

impl CacheTtls {
    pub fn search(&self) -> Duration {
        Duration::from_secs(self.search_secs)
    }

    pub fn listing(&self) -> Duration {
        Duration::from_secs(self.listing_secs)
    }

    pub fn recent(&self) -> Duration {
        Duration::from_secs(self.recent_secs)
    }

    pub fn categories(&self) -> Duration {
        Duration::from_secs(self.categories_secs)
    }

    pub fn stats(&self) -> Duration {
        Duration::from_secs(self.stats_secs)
    }
}

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (MOTORMARKET_*)
/// 2. TOML config file (if MOTORMARKET_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Bind host for the HTTP boundary.
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port for the HTTP boundary.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Base URL of the upstream marketplace API.
    #[serde(default = "default_upstream_base_url")]
    pub upstream_base_url: String,

    /// Static bearer token for upstream authentication.
    ///
    /// Set via MOTORMARKET_UPSTREAM_TOKEN.
    #[serde(default)]
    pub upstream_token: Option<String>,

    /// Consumer key for HMAC request signing.
    ///
    /// Set via MOTORMARKET_CONSUMER_KEY. Used together with
    /// `consumer_secret`; takes precedence over the static token.
    #[serde(default)]
    pub consumer_key: Option<String>,

    /// Consumer secret for HMAC request signing.
    #[serde(default)]
    pub consumer_secret: Option<String>,

    /// Upstream request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Default cache TTL in seconds for keys without a tier override.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Interval between cache sweeps in seconds.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// Per-tier cache TTLs.
    #[serde(default)]
    pub ttls: CacheTtls,

    /// Sample size for per-model statistics (single page).
    #[serde(default = "default_model_sample_rows")]
    pub model_sample_rows: u32,

    /// Sample size for market insights (single page).
    #[serde(default = "default_insights_sample_rows")]
    pub insights_sample_rows: u32,
}

fn default_host() -> String {
    "127.0.0.1".into()
}

fn default_port() -> u16 {
    3000
}

fn default_upstream_base_url() -> String {
    "https://api.trademe.co.nz/v1".into()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_sweep_interval_secs() -> u64 {
    60
}

fn default_model_sample_rows() -> u32 {
    100
}

fn default_insights_sample_rows() -> u32 {
    500
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            upstream_base_url: default_upstream_base_url(),
            upstream_token: None,
            consumer_key: None,
            consumer_secret: None,
            timeout_ms: default_timeout_ms(),
            cache_ttl_secs: default_cache_ttl_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
            ttls: CacheTtls::default(),
            model_sample_rows: default_model_sample_rows(),
            insights_sample_rows: default_insights_sample_rows(),
        }
    }
}

impl AppConfig {
    /// Upstream timeout as a Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Default cache TTL as a Duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Cache sweep interval as a Duration.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read, an environment
    /// variable cannot be parsed, or validation fails after loading.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("MOTORMARKET_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("MOTORMARKET_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Resolve upstream credentials (for deferred validation).
    ///
    /// The consumer key/secret pair wins over a static token when both are
    /// present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` when no credential scheme is
    /// configured.
    pub fn require_credentials(&self) -> Result<Credentials, ConfigError> {
        if let (Some(key), Some(secret)) = (&self.consumer_key, &self.consumer_secret) {
            return Ok(Credentials::Consumer { key: key.clone(), secret: secret.clone() });
        }

        if let Some(token) = &self.upstream_token {
            return Ok(Credentials::Token(token.clone()));
        }

        Err(ConfigError::Missing {
            field: "upstream credentials".into(),
            hint: "set MOTORMARKET_CONSUMER_KEY/MOTORMARKET_CONSUMER_SECRET or MOTORMARKET_UPSTREAM_TOKEN".into(),
        })
    }
}
