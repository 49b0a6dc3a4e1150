//! # Repository Module
//!
//! Database repository implementations for the storefront.
//!
//! ## Tenant Scoping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    How Repositories Scope Data                          │
//! │                                                                         │
//! │  Reads by id       find_by_id(id) → Option<T>                           │
//! │                    caller applies tenancy::require_owned(tenant)        │
//! │                                                                         │
//! │  Lists / writes    every statement carries `tenant_id = ?`              │
//! │                    list_for_tenant, update, bulk_update_status, ...     │
//! │                                                                         │
//! │  Public reads      resolve the tenant by slug first, then filter        │
//! │                    products to `status = 'active'`                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`tenant::TenantRepository`] - Registration, lifecycle, cascade delete
//! - [`plan::PlanRepository`] - Plans and default plan bootstrap
//! - [`product::ProductRepository`] - Products and variants
//! - [`shipping::ShippingRepository`] - Shipping classes
//! - [`order::OrderRepository`] - The order ledger
//! - [`settings::SettingsRepository`] - Store settings
//! - [`domain::DomainRepository`] - Custom domains

pub mod domain;
pub mod order;
pub mod plan;
pub mod product;
pub mod settings;
pub mod shipping;
pub mod tenant;
