//! # Tenant Isolation Boundary
//!
//! Every entity looked up by id must be checked against the caller's tenant
//! before it is used or returned.
//!
//! ```text
//! lookup by id ──► Option<T> ──► require_owned(tenant) ──► T
//!                       │                 │
//!                    None │        tenant_id differs
//!                         ▼                 ▼
//!                    NotFound ◄─────── NotFound  (same error, same message)
//! ```
//!
//! Public storefront reads go through [`require_visible_tenant`] and
//! [`require_orderable_product`] instead: a suspended or pending tenant, or
//! a draft/archived product, looks exactly like a missing one.

use crate::error::{CoreError, CoreResult};
use crate::types::{CustomDomain, Order, Product, ShippingClass, Tenant};

/// An entity that belongs to exactly one tenant.
pub trait TenantOwned {
    /// Name used in NotFound messages.
    const ENTITY: &'static str;

    fn id(&self) -> &str;

    fn tenant_id(&self) -> &str;

    /// Returns true if `tenant_id` owns this entity.
    #[inline]
    fn is_owned_by(&self, tenant_id: &str) -> bool {
        self.tenant_id() == tenant_id
    }
}

macro_rules! tenant_owned {
    ($ty:ty, $entity:literal) => {
        impl TenantOwned for $ty {
            const ENTITY: &'static str = $entity;

            fn id(&self) -> &str {
                &self.id
            }

            fn tenant_id(&self) -> &str {
                &self.tenant_id
            }
        }
    };
}

tenant_owned!(Product, "Product");
tenant_owned!(Order, "Order");
tenant_owned!(ShippingClass, "ShippingClass");
tenant_owned!(CustomDomain, "CustomDomain");

/// Returns the entity if it exists and belongs to `tenant_id`.
///
/// Absence and foreign ownership produce the identical NotFound error.
///
/// ```rust
/// use storefront_core::tenancy::require_owned;
/// use storefront_core::Order;
///
/// let missing: Option<Order> = None;
/// let err = require_owned(missing, "tenant-a", "o-1").unwrap_err();
/// assert_eq!(err.to_string(), "Order not found: o-1");
/// ```
pub fn require_owned<T: TenantOwned>(entity: Option<T>, tenant_id: &str, id: &str) -> CoreResult<T> {
    match entity {
        Some(e) if e.is_owned_by(tenant_id) => Ok(e),
        _ => Err(CoreError::not_found(T::ENTITY, id)),
    }
}

/// Resolves a shipping selection for checkout.
///
/// Unlike [`require_owned`] this reports `InvalidShippingOption`: the
/// product was valid, only the shipping choice was not.
pub fn require_shipping_option(
    class: Option<ShippingClass>,
    tenant_id: &str,
) -> CoreResult<ShippingClass> {
    match class {
        Some(c) if c.is_owned_by(tenant_id) => Ok(c),
        _ => Err(CoreError::InvalidShippingOption),
    }
}

/// Resolves a tenant for a public storefront read by slug.
pub fn require_visible_tenant(tenant: Option<Tenant>, slug: &str) -> CoreResult<Tenant> {
    match tenant {
        Some(t) if t.is_storefront_visible() => Ok(t),
        _ => Err(CoreError::not_found("Store", slug)),
    }
}

/// Resolves a product for a public read or checkout: owned and active.
pub fn require_orderable_product(
    product: Option<Product>,
    tenant_id: &str,
    id: &str,
) -> CoreResult<Product> {
    let product = require_owned(product, tenant_id, id)?;
    if !product.is_orderable() {
        return Err(CoreError::not_found(Product::ENTITY, id));
    }
    Ok(product)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ProductStatus, TenantStatus};
    use chrono::Utc;

    fn product(tenant_id: &str, status: ProductStatus) -> Product {
        let now = Utc::now();
        Product {
            id: "p1".into(),
            tenant_id: tenant_id.into(),
            name: "Saree".into(),
            slug: "saree".into(),
            description: None,
            price_cents: 150_000,
            status,
            images: vec![],
            created_at: now,
            updated_at: now,
            variants: vec![],
        }
    }

    fn shipping(tenant_id: &str) -> ShippingClass {
        ShippingClass {
            id: "s1".into(),
            tenant_id: tenant_id.into(),
            name: "Inside Dhaka".into(),
            fee_cents: 6_000,
            is_default: true,
            created_at: Utc::now(),
        }
    }

    fn tenant(status: TenantStatus) -> Tenant {
        let now = Utc::now();
        Tenant {
            id: "t1".into(),
            name: "Rina".into(),
            slug: "rina".into(),
            plan_id: "plan".into(),
            status,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_foreign_entity_is_indistinguishable_from_missing() {
        let foreign = require_owned(Some(product("tenant-b", ProductStatus::Active)), "tenant-a", "p1")
            .unwrap_err();
        let missing = require_owned(None::<Product>, "tenant-a", "p1").unwrap_err();

        assert_eq!(foreign.to_string(), missing.to_string());
        assert_eq!(foreign.kind(), missing.kind());
    }

    #[test]
    fn test_owned_entity_passes() {
        let p = require_owned(Some(product("tenant-a", ProductStatus::Draft)), "tenant-a", "p1").unwrap();
        assert_eq!(p.id, "p1");
    }

    #[test]
    fn test_shipping_from_other_tenant_is_invalid_option() {
        let err = require_shipping_option(Some(shipping("tenant-b")), "tenant-a").unwrap_err();
        assert!(matches!(err, CoreError::InvalidShippingOption));

        let err = require_shipping_option(None, "tenant-a").unwrap_err();
        assert!(matches!(err, CoreError::InvalidShippingOption));

        assert!(require_shipping_option(Some(shipping("tenant-a")), "tenant-a").is_ok());
    }

    #[test]
    fn test_suspended_and_pending_stores_are_not_found() {
        assert!(require_visible_tenant(Some(tenant(TenantStatus::Active)), "rina").is_ok());
        for status in [TenantStatus::Suspended, TenantStatus::Pending] {
            let err = require_visible_tenant(Some(tenant(status)), "rina").unwrap_err();
            assert_eq!(err.to_string(), "Store not found: rina");
        }
    }

    #[test]
    fn test_only_active_products_are_orderable() {
        assert!(require_orderable_product(Some(product("t1", ProductStatus::Active)), "t1", "p1").is_ok());
        for status in [ProductStatus::Draft, ProductStatus::Archived] {
            let err = require_orderable_product(Some(product("t1", status)), "t1", "p1").unwrap_err();
            assert!(matches!(err, CoreError::NotFound { entity: "Product", .. }));
        }
    }
}
