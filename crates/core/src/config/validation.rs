//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values after they
//! have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `upstream_base_url` is empty or not http(s)
    /// - `timeout_ms` is less than 100ms or exceeds 1 minute
    /// - any cache TTL or the sweep interval is 0
    /// - a sample size is 0 or exceeds 500 (the upstream page cap)
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.upstream_base_url.is_empty() {
            return Err(ConfigError::Invalid { field: "upstream_base_url".into(), reason: "must not be empty".into() });
        }
        if !self.upstream_base_url.starts_with("http://") && !self.upstream_base_url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                field: "upstream_base_url".into(),
                reason: "must start with http:// or https://".into(),
            });
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 60_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 1 minute (60000ms)".into(),
            });
        }

        if self.cache_ttl_secs == 0 {
            return Err(ConfigError::Invalid { field: "cache_ttl_secs".into(), reason: "must be greater than 0".into() });
        }
        if self.sweep_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "sweep_interval_secs".into(),
                reason: "must be greater than 0".into(),
            });
        }

        for (field, secs) in [
            ("ttls.search_secs", self.ttls.search_secs),
            ("ttls.listing_secs", self.ttls.listing_secs),
            ("ttls.recent_secs", self.ttls.recent_secs),
            ("ttls.categories_secs", self.ttls.categories_secs),
            ("ttls.stats_secs", self.ttls.stats_secs),
        ] {
            if secs == 0 {
                return Err(ConfigError::Invalid { field: field.into(), reason: "must be greater than 0".into() });
            }
        }

        for (field, rows) in [
            ("model_sample_rows", self.model_sample_rows),
            ("insights_sample_rows", self.insights_sample_rows),
        ] {
            if rows == 0 || rows > 500 {
                return Err(ConfigError::Invalid { field: field.into(), reason: "must be between 1 and 500".into() });
            }
        }

        if self.consumer_key.is_some() != self.consumer_secret.is_some() {
            tracing::warn!("only one of consumer_key/consumer_secret is set; HMAC signing will be unavailable");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_base_url() {
        let config = AppConfig { upstream_base_url: String::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "upstream_base_url"));
    }

    #[test]
    fn test_validate_non_http_base_url() {
        let config = AppConfig { upstream_base_url: "ftp://example.com".into(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "upstream_base_url"));
    }

    #[test]
    fn test_validate_timeout_too_small() {
        let config = AppConfig { timeout_ms: 50, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));
    }

    #[test]
    fn test_validate_timeout_exceeds_limit() {
        let config = AppConfig { timeout_ms: 61_000, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));
    }

    #[test]
    fn test_validate_zero_ttl() {
        let mut config = AppConfig::default();
        config.ttls.recent_secs = 0;
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "ttls.recent_secs"));
    }

    #[test]
    fn test_validate_sample_rows_out_of_range() {
        let config = AppConfig { insights_sample_rows: 501, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "insights_sample_rows"));
    }

    #[test]
    fn test_validate_edge_case_values() {
        let config = AppConfig { timeout_ms: 100, model_sample_rows: 1, insights_sample_rows: 500, ..Default::default() };
        assert!(config.validate().is_ok());
    }
}
