//! API configuration

use std::time::Duration;

use domain_pricing::QuoteConfig;
use serde::Deserialize;

/// Where pricing reference data comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PricingSource {
    /// Seeded in-memory catalogue
    Memory,
    /// PostgreSQL tables, migrated on startup
    Postgres,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

/// API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Log filter directive, e.g. `info` or `domain_pricing=debug`
    pub log_level: String,
    /// Log output format
    pub log_format: LogFormat,
    /// Pricing provider backend
    pub pricing_source: PricingSource,
    /// Database URL, used when `pricing_source` is `postgres`
    pub database_url: String,
    /// Timeout for a single provider lookup
    pub lookup_timeout_ms: u64,
    /// Deadline for a whole quote
    pub quote_timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            pricing_source: PricingSource::Memory,
            database_url: "postgres://localhost/fares".to_string(),
            lookup_timeout_ms: 2_000,
            quote_timeout_ms: 5_000,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from `API_*` environment variables over defaults
    ///
    /// `DATABASE_URL` is honoured when `API_DATABASE_URL` is not set.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let defaults = Self::default();
        config::Config::builder()
            .set_default("host", defaults.host)?
            .set_default("port", defaults.port.to_string())?
            .set_default("log_level", defaults.log_level)?
            .set_default("log_format", "pretty")?
            .set_default("pricing_source", "memory")?
            .set_default(
                "database_url",
                std::env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            )?
            .set_default("lookup_timeout_ms", defaults.lookup_timeout_ms.to_string())?
            .set_default("quote_timeout_ms", defaults.quote_timeout_ms.to_string())?
            .add_source(config::Environment::with_prefix("API"))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Deadline applied to each quote request
    pub fn quote_timeout(&self) -> Duration {
        Duration::from_millis(self.quote_timeout_ms)
    }

    /// Engine settings derived from this configuration
    pub fn quote_config(&self) -> QuoteConfig {
        QuoteConfig::default().with_lookup_timeout(Duration::from_millis(self.lookup_timeout_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.server_addr(), "0.0.0.0:8080");
        assert_eq!(config.pricing_source, PricingSource::Memory);
        assert_eq!(config.quote_timeout(), Duration::from_secs(5));
        assert_eq!(config.quote_config().lookup_timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_source_names() {
        let source: PricingSource = serde_json::from_str("\"postgres\"").unwrap();
        assert_eq!(source, PricingSource::Postgres);
        let format: LogFormat = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(format, LogFormat::Json);
    }
}
