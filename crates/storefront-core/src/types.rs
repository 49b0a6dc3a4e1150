//! # Domain Types
//!
//! Core domain types used throughout the storefront.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐        ┌─────────────────┐                         │
//! │  │      Plan       │◄───────│     Tenant      │  status: active |       │
//! │  │  product_limit  │        │  slug (unique)  │  suspended | pending    │
//! │  │  feature flags  │        └────────┬────────┘                         │
//! │  └─────────────────┘                 │ owns                             │
//! │          ┌──────────────┬────────────┼──────────────┬────────────┐      │
//! │          ▼              ▼            ▼              ▼            ▼      │
//! │   ┌────────────┐ ┌────────────┐ ┌──────────┐ ┌──────────┐ ┌─────────┐  │
//! │   │  Product   │ │ Shipping   │ │  Order   │ │ Settings │ │ Custom  │  │
//! │   │  Variants  │ │ Class      │ │ (ledger) │ │          │ │ Domain  │  │
//! │   └────────────┘ └────────────┘ └──────────┘ └──────────┘ └─────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for relations
//! - Business ID where one exists: tenant `slug`, product `slug`, variant `sku`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

/// Generates `Display`, `FromStr` and `ALL` for a lowercase label enum.
macro_rules! label_enum {
    ($ty:ident, $field:literal, { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl $ty {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            /// The lowercase label used on the wire and in the database.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($label => Ok($ty::$variant),)+
                    _ => Err(ValidationError::NotAllowed {
                        field: $field.to_string(),
                        allowed: vec![$($label.to_string()),+],
                    }),
                }
            }
        }
    };
}

// =============================================================================
// Tenant
// =============================================================================

/// Lifecycle status of a seller account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum TenantStatus {
    /// Storefront is live.
    #[default]
    Active,
    /// Disabled by a platform administrator.
    Suspended,
    /// Awaiting administrator approval.
    Pending,
}

label_enum!(TenantStatus, "status", {
    Active => "active",
    Suspended => "suspended",
    Pending => "pending",
});

/// A seller account and its owned data partition.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: String,
    pub name: String,
    /// URL slug of the public storefront (unique across the platform).
    pub slug: String,
    pub plan_id: String,
    pub status: TenantStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Tenant {
    /// Public storefront reads only see active tenants.
    #[inline]
    pub fn is_storefront_visible(&self) -> bool {
        self.status == TenantStatus::Active
    }
}

// =============================================================================
// Plan
// =============================================================================

/// A named tier of limits and feature flags.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: String,
    /// Stable machine name (`free`, `pro`, ...). Unique.
    pub code: String,
    pub name: String,
    /// Maximum number of products the tenant may own.
    pub product_limit: i64,
    pub custom_domain_allowed: bool,
    pub tracking_allowed: bool,
    #[serde(rename = "monthlyPrice", with = "crate::money::cents_fixed2")]
    #[ts(type = "string")]
    pub monthly_price_cents: i64,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Plan {
    /// Returns the monthly price as Money.
    #[inline]
    pub fn monthly_price(&self) -> Money {
        Money::from_cents(self.monthly_price_cents)
    }
}

// =============================================================================
// Product
// =============================================================================

/// Catalog visibility of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    /// Visible on the storefront and orderable.
    Active,
    /// Work in progress, owner-only.
    #[default]
    Draft,
    /// Retired, kept for order history.
    Archived,
}

label_enum!(ProductStatus, "status", {
    Active => "active",
    Draft => "draft",
    Archived => "archived",
});

/// A product in a tenant's catalog.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    /// Unique within the tenant.
    pub slug: String,
    pub description: Option<String>,
    #[serde(rename = "price", with = "crate::money::cents_fixed2")]
    #[ts(type = "string")]
    pub price_cents: i64,
    pub status: ProductStatus,
    /// Ordered image references (keys in the external object store).
    #[cfg_attr(feature = "sqlx", sqlx(json))]
    pub images: Vec<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    /// Loaded separately; empty unless the caller asked for variants.
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    #[serde(default)]
    pub variants: Vec<Variant>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Only active products can be shown publicly or ordered.
    #[inline]
    pub fn is_orderable(&self) -> bool {
        self.status == ProductStatus::Active
    }
}

/// Free-form variant attributes (`{"size": "XL", "color": "red"}`).
///
/// No schema is assumed; the only requirement is a JSON object.
pub type VariantAttributes = serde_json::Map<String, serde_json::Value>;

/// A purchasable variation of a product.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub id: String,
    pub product_id: String,
    pub name: String,
    pub sku: Option<String>,
    /// Overrides the product price when set.
    #[serde(rename = "price", with = "crate::money::cents_fixed2::option")]
    #[ts(type = "string | null")]
    pub price_cents: Option<i64>,
    /// Plain counter; checkout does not reserve stock.
    pub stock: i64,
    #[cfg_attr(feature = "sqlx", sqlx(json))]
    #[ts(type = "Record<string, unknown>")]
    pub attributes: VariantAttributes,
    pub is_default: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Variant {
    /// Unit price for this variant, falling back to the product's price.
    #[inline]
    pub fn unit_price(&self, product: &Product) -> Money {
        self.price_cents
            .map(Money::from_cents)
            .unwrap_or_else(|| product.price())
    }
}

// =============================================================================
// Shipping Class
// =============================================================================

/// A named delivery option with a flat fee (e.g. "Inside Dhaka", 60.00).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ShippingClass {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    #[serde(rename = "fee", with = "crate::money::cents_fixed2")]
    #[ts(type = "string")]
    pub fee_cents: i64,
    /// Not unique per tenant; checkout prefers the first one marked.
    pub is_default: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl ShippingClass {
    /// Returns the fee as Money.
    #[inline]
    pub fn fee(&self) -> Money {
        Money::from_cents(self.fee_cents)
    }
}

// =============================================================================
// Settings & Domains
// =============================================================================

/// Per-tenant store settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub tenant_id: String,
    pub store_name: Option<String>,
    /// Receives new-order notifications when set.
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    /// Tracking ids are only honored when the plan allows tracking.
    pub facebook_pixel_id: Option<String>,
    pub google_analytics_id: Option<String>,
}

impl Settings {
    /// Returns true if any tracking id is set.
    pub fn has_tracking(&self) -> bool {
        self.facebook_pixel_id.is_some() || self.google_analytics_id.is_some()
    }
}

/// A custom hostname pointing at a tenant's storefront.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CustomDomain {
    pub id: String,
    pub tenant_id: String,
    pub hostname: String,
    pub verified: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Order
// =============================================================================

/// The status of an order.
///
/// ```text
/// new ──► confirmed ──► shipped ──► delivered
///  │          │            │            │
///  └──────────┴────────────┴────────────┴──► cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    New,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

label_enum!(OrderStatus, "status", {
    New => "new",
    Confirmed => "confirmed",
    Shipped => "shipped",
    Delivered => "delivered",
    Cancelled => "cancelled",
});

impl OrderStatus {
    /// Revenue is recognised only for delivered orders.
    #[inline]
    pub const fn recognizes_revenue(&self) -> bool {
        matches!(self, OrderStatus::Delivered)
    }
}

/// A ledger entry: one cash-on-delivery order.
///
/// Uses the snapshot pattern: prices and the shipping fee are copied at
/// checkout and never recomputed, so later catalog edits do not reprice
/// history. Only `status` (and `updated_at`) change after creation.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub tenant_id: String,
    pub product_id: String,
    pub variant_id: Option<String>,
    pub shipping_class_id: String,
    pub customer_name: String,
    /// Normalised local mobile number.
    pub phone: String,
    pub address: String,
    pub quantity: i64,
    /// Unit price at time of order (frozen).
    #[serde(rename = "unitPrice", with = "crate::money::cents_fixed2")]
    #[ts(type = "string")]
    pub unit_price_cents: i64,
    /// unit_price × quantity.
    #[serde(rename = "subtotal", with = "crate::money::cents_fixed2")]
    #[ts(type = "string")]
    pub subtotal_cents: i64,
    /// Copied from the shipping class at time of order (frozen).
    #[serde(rename = "shippingFee", with = "crate::money::cents_fixed2")]
    #[ts(type = "string")]
    pub shipping_fee_cents: i64,
    /// subtotal + shipping_fee.
    #[serde(rename = "total", with = "crate::money::cents_fixed2")]
    #[ts(type = "string")]
    pub total_cents: i64,
    pub status: OrderStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Returns the subtotal as Money.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    /// Returns the shipping fee as Money.
    #[inline]
    pub fn shipping_fee(&self) -> Money {
        Money::from_cents(self.shipping_fee_cents)
    }

    /// Returns the total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
