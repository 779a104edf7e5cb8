//! Back-office API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

use chrono::FixedOffset;
use maguva_core::analytics::{regional_offset, DEFAULT_UTC_OFFSET_MINUTES};
use serde::{Deserialize, Serialize};

/// Back-office API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Interface to bind
    pub http_host: String,

    /// HTTP server port
    pub http_port: u16,

    /// SQLite database file
    pub database_path: String,

    /// Pool size
    pub db_max_connections: u32,

    /// JWT secret key for signing tokens
    #[serde(skip_serializing)]
    pub jwt_secret: String,

    /// JWT access token lifetime in seconds (default: one day)
    pub jwt_access_lifetime_secs: i64,

    /// Offset of the shop's calendar day from UTC, in minutes
    pub report_utc_offset_minutes: i32,

    /// Allow any origin (the front-end is served separately)
    pub cors_allow_any: bool,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = ApiConfig {
            http_host: env::var("HTTP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),

            http_port: parse_var("HTTP_PORT", "8000")?,

            database_path: env::var("DATABASE_PATH").unwrap_or_else(|_| "./maguva.db".to_string()),

            db_max_connections: parse_var("DB_MAX_CONNECTIONS", "5")?,

            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| "maguva-dev-secret-change-in-production".to_string()),

            jwt_access_lifetime_secs: parse_var("JWT_ACCESS_LIFETIME_SECS", "86400")?,

            report_utc_offset_minutes: parse_var(
                "REPORT_UTC_OFFSET_MINUTES",
                &DEFAULT_UTC_OFFSET_MINUTES.to_string(),
            )?,

            cors_allow_any: parse_var("CORS_ALLOW_ANY", "true")?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingRequired("JWT_SECRET".to_string()));
        }
        if self.jwt_access_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue("JWT_ACCESS_LIFETIME_SECS".to_string()));
        }
        if self.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()));
        }
        // ±14h covers every real zone
        if self.report_utc_offset_minutes.abs() > 14 * 60 {
            return Err(ConfigError::InvalidValue("REPORT_UTC_OFFSET_MINUTES".to_string()));
        }
        Ok(())
    }

    /// Socket address to bind.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.http_host, self.http_port)
            .parse()
            .map_err(|_| ConfigError::InvalidValue("HTTP_HOST".to_string()))
    }

    /// Fixed offset used for report days and month buckets.
    pub fn report_offset(&self) -> FixedOffset {
        regional_offset(self.report_utc_offset_minutes)
    }
}

fn parse_var<T: FromStr>(name: &str, default: &str) -> Result<T, ConfigError> {
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(name.to_string()))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
impl ApiConfig {
    /// Defaults without touching the process environment.
    pub fn for_tests() -> Self {
        ApiConfig {
            http_host: "127.0.0.1".to_string(),
            http_port: 0,
            database_path: ":memory:".to_string(),
            db_max_connections: 1,
            jwt_secret: "test-secret".to_string(),
            jwt_access_lifetime_secs: 3600,
            report_utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
            cors_allow_any: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ApiConfig::for_tests();
        assert!(config.validate().is_ok());

        config.jwt_secret = "  ".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::MissingRequired(_))));

        let mut config = ApiConfig::for_tests();
        config.report_utc_offset_minutes = 15 * 60;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_bind_addr_and_offset() {
        let mut config = ApiConfig::for_tests();
        config.http_port = 8000;
        assert_eq!(config.bind_addr().unwrap().port(), 8000);
        assert_eq!(config.report_offset().local_minus_utc(), 330 * 60);
    }
}
