//! Storefront API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use serde::Serialize;
use std::env;
use std::net::SocketAddr;
use storefront_core::order::OrderStatusPolicy;
use storefront_core::DEFAULT_MIN_ADDRESS_LENGTH;

/// Storefront API configuration.
#[derive(Debug, Clone, Serialize)]
pub struct AppConfig {
    /// HTTP listen address
    pub bind_addr: SocketAddr,

    /// SQLite database file
    pub database_path: String,

    /// Pool size
    pub database_max_connections: u32,

    /// HS256 secret shared with the auth service
    #[serde(skip_serializing)]
    pub jwt_secret: String,

    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: String,

    /// Whether order status writes must follow the transition table.
    /// `ORDER_STATUS_POLICY=permissive` restores unconditional writes.
    pub order_status_policy: OrderStatusPolicy,

    /// Minimum checkout address length (characters)
    pub min_address_length: usize,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = AppConfig {
            bind_addr: env::var("STOREFRONT_BIND_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("STOREFRONT_BIND_ADDR".to_string()))?,

            database_path: env::var("DATABASE_PATH").unwrap_or_else(|_| "./storefront.db".to_string()),

            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS".to_string()))?,

            jwt_secret: env::var("JWT_SECRET")
                // In production, this MUST be set via environment variable
                .unwrap_or_else(|_| "storefront-dev-secret-change-in-production".to_string()),

            log_level: env::var("STOREFRONT_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),

            order_status_policy: env::var("ORDER_STATUS_POLICY")
                .unwrap_or_else(|_| "strict".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("ORDER_STATUS_POLICY".to_string()))?,

            min_address_length: env::var("MIN_ADDRESS_LENGTH")
                .unwrap_or_else(|_| DEFAULT_MIN_ADDRESS_LENGTH.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("MIN_ADDRESS_LENGTH".to_string()))?,
        };

        if config.database_max_connections == 0 {
            return Err(ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS".to_string()));
        }

        Ok(config)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            database_path: "./storefront.db".to_string(),
            database_max_connections: 5,
            jwt_secret: "storefront-dev-secret-change-in-production".to_string(),
            log_level: "info".to_string(),
            order_status_policy: OrderStatusPolicy::Strict,
            min_address_length: DEFAULT_MIN_ADDRESS_LENGTH,
        }
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
