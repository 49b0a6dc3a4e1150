//! # Storefront API
//!
//! HTTP server for public storefronts, store owners and platform admins.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Storefront API Services                         │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐ │
//! │  │  OrderLedger   │  │  Catalog       │  │  AnalyticsService          │ │
//! │  │                │  │                │  │                            │ │
//! │  │ • place_order  │  │ • products     │  │ • report(period)           │ │
//! │  │ • update_status│  │ • variants     │  │                            │ │
//! │  │ • bulk_update  │  │ • storefront   │  │                            │ │
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘ │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐ │
//! │  │ShippingService │  │ StoreSettings  │  │  AdminService              │ │
//! │  │                │  │                │  │                            │ │
//! │  │ • classes      │  │ • settings     │  │ • register_tenant          │ │
//! │  │ • default      │  │ • domains      │  │ • plans, tenant lifecycle  │ │
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘ │
//! │                                                                         │
//! │  ┌───────────────────────────────────────────────────────────────────┐  │
//! │  │                      Infrastructure                               │  │
//! │  │  SQLite (storefront-db)   JWT auth (auth.rs)   Notifier (notify)  │  │
//! │  └───────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables:
//! - `STOREFRONT_BIND_ADDR` - listen address (default: 0.0.0.0:8080)
//! - `DATABASE_PATH` - SQLite file (default: ./storefront.db)
//! - `DATABASE_MAX_CONNECTIONS` - pool size (default: 5)
//! - `JWT_SECRET` - HS256 secret shared with the auth service
//! - `STOREFRONT_LOG_LEVEL` - default log filter (default: info)
//! - `ORDER_STATUS_POLICY` - `strict` or `permissive` (default: strict)
//! - `MIN_ADDRESS_LENGTH` - checkout address minimum (default: 10)

pub mod auth;
pub mod config;
pub mod error;
pub mod notify;
pub mod routes;
pub mod services;

use std::sync::Arc;

use storefront_db::Database;

// Re-exports
pub use config::AppConfig;
pub use error::{ServiceError, ServiceResult};

use crate::auth::JwtManager;
use crate::notify::Notifier;

/// Lifetime of tokens minted by [`JwtManager::generate_token`].
const TOKEN_LIFETIME_SECS: i64 = 3600;

/// Shared application state.
pub struct AppState {
    pub db: Database,
    pub config: AppConfig,
    pub jwt: JwtManager,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    pub fn new(db: Database, config: AppConfig, notifier: Arc<dyn Notifier>) -> Self {
        let jwt = JwtManager::new(config.jwt_secret.clone(), TOKEN_LIFETIME_SECS);
        AppState {
            db,
            config,
            jwt,
            notifier,
        }
    }
}
