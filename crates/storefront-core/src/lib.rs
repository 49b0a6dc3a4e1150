//! # storefront-core: Pure Business Logic for the Storefront
//!
//! This crate holds the order ledger's arithmetic and rules, the plan
//! governor, tenant isolation checks and the analytics aggregation engine,
//! all as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Storefront Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 storefront-api (axum)                           │   │
//! │  │   /store/{slug} checkout ─ /api owner ─ /admin platform         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ storefront-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │  ┌────────┐ ┌─────────┐ ┌────────┐ ┌────────┐ ┌─────────────┐  │   │
//! │  │  │ money  │ │ tenancy │ │  plan  │ │ order  │ │  analytics  │  │   │
//! │  │  │ Money  │ │ owner   │ │ limits │ │ pricing│ │  trends     │  │   │
//! │  │  │Percent │ │ checks  │ │ flags  │ │ status │ │  breakdown  │  │   │
//! │  │  └────────┘ └─────────┘ └────────┘ └────────┘ └─────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              storefront-db (Database Layer)                     │   │
//! │  │         SQLite queries, migrations, tenant-scoped repos         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Tenant, Plan, Product, Order, etc.)
//! - [`money`] - Exact decimal money in minor units, percentages, ids
//! - [`error`] - Domain error types and their kinds
//! - [`validation`] - Field-level input rules
//! - [`tenancy`] - Ownership and storefront visibility checks
//! - [`plan`] - Plan resource governor
//! - [`order`] - Checkout validation, pricing, status machine
//! - [`analytics`] - Time-bucketed sales analytics
//!
//! ## Example Usage
//!
//! ```rust
//! use storefront_core::Money;
//!
//! let price = Money::parse("500.00").unwrap();
//! let fee = Money::parse("60").unwrap();
//!
//! let total = price * 2 + fee;
//! assert_eq!(total.to_fixed2(), "1060.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod analytics;
pub mod error;
pub mod money;
pub mod order;
pub mod plan;
pub mod tenancy;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ErrorKind, PlanFeature, ValidationError};
pub use money::{new_id, Money, Percent};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Code of the plan created when registration finds no active plan.
pub const DEFAULT_PLAN_CODE: &str = "free";

/// Product ceiling of the bootstrap free plan.
pub const DEFAULT_PLAN_PRODUCT_LIMIT: i64 = 5;

/// Maximum quantity of a single order line.
///
/// ## Business Reason
/// Catches typos like 10000 for 10 on a cash-on-delivery form.
pub const MAX_ORDER_QUANTITY: i64 = 9_999;

/// Default minimum length of a delivery address.
pub const DEFAULT_MIN_ADDRESS_LENGTH: usize = 10;

/// Number of entries in the top products ranking.
pub const TOP_PRODUCTS_LIMIT: usize = 10;

/// Label used when a top product's name can no longer be resolved.
pub const UNKNOWN_PRODUCT_LABEL: &str = "Unknown product";
