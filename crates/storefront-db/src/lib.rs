//! # storefront-db: Database Layer for the Storefront
//!
//! This crate provides database access for the multi-tenant storefront.
//! It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Storefront Data Flow                             │
//! │                                                                         │
//! │  HTTP handler (POST /store/{slug}/orders)                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Service (checkout) ── storefront-core rules (pricing, tenancy)         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                  storefront-db (THIS CRATE)                     │    │
//! │  │                                                                 │    │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐    │    │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │    │    │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │    │    │
//! │  │   │               │    │ TenantRepo    │    │              │    │    │
//! │  │   │ SqlitePool    │◄───│ ProductRepo   │    │ 001_initial  │    │    │
//! │  │   │ WAL, FKs on   │    │ OrderRepo ... │    │ _schema.sql  │    │    │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘    │    │
//! │  │                                                                 │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (DATABASE_PATH)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Tenant-scoped repositories
//!
//! ## Usage
//!
//! ```rust,ignore
//! use storefront_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("storefront.db")).await?;
//!
//! let tenant = db.tenants().get_by_slug("rina-fashion").await?;
//! let orders = db.orders().list_for_tenant(&tenant_id, None).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::domain::DomainRepository;
pub use repository::order::OrderRepository;
pub use repository::plan::PlanRepository;
pub use repository::product::{NewProduct, NewVariant, ProductRepository};
pub use repository::settings::SettingsRepository;
pub use repository::shipping::{NewShippingClass, ShippingRepository};
pub use repository::tenant::{NewTenant, TenantRepository};
