//! # Order Ledger Service
//!
//! Public checkout and the owner's order operations.
//!
//! ## Checkout
//! ```text
//! place_order(slug, request)
//!   1. tenant by slug, must be active              ✗ NotFound
//!   2. name / phone / address / quantity           ✗ InvalidInput (which field)
//!   3. product: exists, same tenant, active        ✗ NotFound
//!   4. shipping class: exists, same tenant         ✗ InvalidInput "invalid shipping option"
//!   5. price: unit × qty + fee (variant price if it belongs to the product)
//!   6. INSERT order (status new)
//!   7. contact email set? → notify::dispatch (fire-and-forget; a failed
//!      settings read is logged and skipped, never returned)
//! ```
//! Pricing reads the catalog at submission time; there is no quote token.

use chrono::Utc;
use std::sync::Arc;
use storefront_core::order::{price_order, resolve_unit_price, CheckoutRequest};
use storefront_core::tenancy::{require_orderable_product, require_owned, require_shipping_option, require_visible_tenant};
use storefront_core::{Order, OrderStatus, Tenant};
use tracing::{debug, info, warn};

use crate::error::ServiceResult;
use crate::notify::{self, OrderNotification};
use crate::services::TenantContext;
use crate::AppState;

/// Order ledger service.
pub struct OrderLedger {
    state: Arc<AppState>,
}

impl OrderLedger {
    pub fn new(state: Arc<AppState>) -> Self {
        OrderLedger { state }
    }

    /// Places a cash-on-delivery order on a public storefront.
    pub async fn place_order(&self, slug: &str, request: CheckoutRequest) -> ServiceResult<Order> {
        let db = &self.state.db;

        let tenant = require_visible_tenant(db.tenants().get_by_slug(slug).await?, slug)?;

        let customer = request.validate(self.state.config.min_address_length)?;

        let product = require_orderable_product(
            db.products().find_by_id(&request.product_id).await?,
            &tenant.id,
            &request.product_id,
        )?;

        let shipping = require_shipping_option(
            db.shipping().find_by_id(&request.shipping_class_id).await?,
            &tenant.id,
        )?;

        let variant = match request.variant_id.as_deref() {
            Some(id) => db.products().find_variant(id).await?,
            None => None,
        };
        let (unit_price, variant_id) = resolve_unit_price(&product, variant.as_ref());
        if request.variant_id.is_some() && variant_id.is_none() {
            debug!(product_id = %product.id, "Variant not on product, using product price");
        }

        let pricing = price_order(unit_price, customer.quantity, shipping.fee())?;
        let order = Order::place(&product, variant_id, &shipping, customer, pricing, Utc::now());
        db.orders().insert(&order).await?;

        info!(
            tenant_id = %tenant.id,
            order_id = %order.id,
            total = %order.total(),
            "Order placed"
        );

        self.notify_owner(&tenant, &order).await;

        Ok(order)
    }

    /// Best-effort owner notification. The order is already committed, so
    /// nothing here may surface as a checkout error.
    async fn notify_owner(&self, tenant: &Tenant, order: &Order) {
        let settings = match self.state.db.settings().get(&tenant.id).await {
            Ok(settings) => settings,
            Err(e) => {
                warn!(
                    tenant_id = %tenant.id,
                    order_id = %order.id,
                    error = %e,
                    "Settings lookup failed, skipping order notification"
                );
                return;
            }
        };

        if let Some(recipient) = settings.contact_email {
            let store_name = settings.store_name.unwrap_or_else(|| tenant.name.clone());
            notify::dispatch(
                self.state.notifier.clone(),
                OrderNotification::for_order(order, store_name, recipient),
            );
        }
    }

    /// Reads one of the tenant's orders.
    pub async fn get_order(&self, ctx: &TenantContext, id: &str) -> ServiceResult<Order> {
        let order = self.state.db.orders().find_by_id(id).await?;
        Ok(require_owned(order, ctx.tenant_id(), id)?)
    }

    /// Lists the tenant's orders, newest first.
    pub async fn list_orders(&self, ctx: &TenantContext, status: Option<OrderStatus>) -> ServiceResult<Vec<Order>> {
        Ok(self.state.db.orders().list_for_tenant(ctx.tenant_id(), status).await?)
    }

    /// Changes one order's status under the configured policy.
    pub async fn update_status(&self, ctx: &TenantContext, id: &str, status: OrderStatus) -> ServiceResult<Order> {
        let policy = self.state.config.order_status_policy;
        Ok(self
            .state
            .db
            .orders()
            .update_status(ctx.tenant_id(), id, status, policy)
            .await?)
    }

    /// Changes the status of every listed order, or of none.
    pub async fn bulk_update_status(
        &self,
        ctx: &TenantContext,
        ids: &[String],
        status: OrderStatus,
    ) -> ServiceResult<u64> {
        let policy = self.state.config.order_status_policy;
        Ok(self
            .state
            .db
            .orders()
            .bulk_update_status(ctx.tenant_id(), ids, status, policy)
            .await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::notify::{Notifier, NotifyError};
    use crate::testing;
    use async_trait::async_trait;
    use storefront_core::{CoreError, Product, ProductStatus, Settings, TenantStatus};
    use storefront_db::{NewProduct, NewVariant};
    use tokio::sync::mpsc;

    async fn product(state: &AppState, ctx: &TenantContext, slug: &str, price_cents: i64) -> Product {
        state
            .db
            .products()
            .create_within_limit(
                ctx.tenant_id(),
                &ctx.plan,
                &NewProduct {
                    name: "Saree".into(),
                    slug: slug.into(),
                    description: None,
                    price_cents,
                    status: ProductStatus::Active,
                    images: vec![],
                },
            )
            .await
            .unwrap()
    }

    fn checkout(product_id: &str, shipping_class_id: &str, quantity: i64) -> CheckoutRequest {
        CheckoutRequest {
            product_id: product_id.into(),
            variant_id: None,
            shipping_class_id: shipping_class_id.into(),
            customer_name: "Karim Uddin".into(),
            phone: "+880 1712-345678".into(),
            address: "House 12, Road 5, Dhanmondi".into(),
            quantity,
        }
    }

    #[tokio::test]
    async fn test_checkout_happy_path() {
        let state = testing::state().await;
        let ctx = testing::tenant(&state, "rina").await;
        let p = product(&state, &ctx, "saree", 50_000).await;
        let s = testing::shipping(&state, &ctx, 6_000).await;

        let order = OrderLedger::new(state.clone())
            .place_order("rina", checkout(&p.id, &s.id, 2))
            .await
            .unwrap();

        assert_eq!(order.subtotal().to_fixed2(), "1000.00");
        assert_eq!(order.total().to_fixed2(), "1060.00");
        assert_eq!(order.status, OrderStatus::New);
        assert_eq!(order.phone, "01712345678");

        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["total"], "1060.00");
        assert_eq!(json["shippingFee"], "60.00");
    }

    #[tokio::test]
    async fn test_repeating_decimal_price_is_exact() {
        let state = testing::state().await;
        let ctx = testing::tenant(&state, "rina").await;
        let p = product(&state, &ctx, "saree", 3_333).await;
        let s = testing::shipping(&state, &ctx, 0).await;

        let order = OrderLedger::new(state.clone())
            .place_order("rina", checkout(&p.id, &s.id, 3))
            .await
            .unwrap();

        assert_eq!(order.subtotal_cents, 9_999);
        assert_eq!(order.total_cents, order.subtotal_cents + order.shipping_fee_cents);
    }

    #[tokio::test]
    async fn test_variant_price_applies_only_to_its_product() {
        let state = testing::state().await;
        let ctx = testing::tenant(&state, "rina").await;
        let saree = product(&state, &ctx, "saree", 50_000).await;
        let kurti = product(&state, &ctx, "kurti", 20_000).await;
        let s = testing::shipping(&state, &ctx, 6_000).await;

        let xl = state
            .db
            .products()
            .insert_variant(
                &saree.id,
                &NewVariant {
                    name: "XL".into(),
                    sku: None,
                    price_cents: Some(55_000),
                    stock: 3,
                    attributes: Default::default(),
                    is_default: false,
                },
            )
            .await
            .unwrap();
        let ledger = OrderLedger::new(state.clone());

        let mut request = checkout(&saree.id, &s.id, 1);
        request.variant_id = Some(xl.id.clone());
        let order = ledger.place_order("rina", request).await.unwrap();
        assert_eq!(order.unit_price_cents, 55_000);
        assert_eq!(order.variant_id.as_deref(), Some(xl.id.as_str()));

        let mut request = checkout(&kurti.id, &s.id, 1);
        request.variant_id = Some(xl.id.clone());
        let order = ledger.place_order("rina", request).await.unwrap();
        assert_eq!(order.unit_price_cents, 20_000);
        assert!(order.variant_id.is_none());
    }

    #[tokio::test]
    async fn test_foreign_shipping_class_is_invalid_input() {
        let state = testing::state().await;
        let a = testing::tenant(&state, "alpha").await;
        let b = testing::tenant(&state, "bravo").await;
        let p = product(&state, &a, "saree", 50_000).await;
        let foreign = testing::shipping(&state, &b, 6_000).await;

        let err = OrderLedger::new(state.clone())
            .place_order("alpha", checkout(&p.id, &foreign.id, 1))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Core(CoreError::InvalidShippingOption)));
        assert_eq!(err.classify().0, axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_checkout_rejects_foreign_and_hidden_products() {
        let state = testing::state().await;
        let a = testing::tenant(&state, "alpha").await;
        let b = testing::tenant(&state, "bravo").await;
        let foreign = product(&state, &b, "saree", 50_000).await;
        let s = testing::shipping(&state, &a, 6_000).await;
        let ledger = OrderLedger::new(state.clone());

        let err = ledger
            .place_order("alpha", checkout(&foreign.id, &s.id, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Core(CoreError::NotFound { .. })));

        let mut draft = product(&state, &a, "draft", 10_000).await;
        draft.status = ProductStatus::Draft;
        state.db.products().update(&draft).await.unwrap();
        let err = ledger
            .place_order("alpha", checkout(&draft.id, &s.id, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Core(CoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_suspended_store_is_not_found() {
        let state = testing::state().await;
        let ctx = testing::tenant(&state, "rina").await;
        let p = product(&state, &ctx, "saree", 50_000).await;
        let s = testing::shipping(&state, &ctx, 6_000).await;
        state
            .db
            .tenants()
            .set_status(ctx.tenant_id(), TenantStatus::Suspended)
            .await
            .unwrap();

        let err = OrderLedger::new(state.clone())
            .place_order("rina", checkout(&p.id, &s.id, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Core(CoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_invalid_fields_name_the_constraint() {
        let state = testing::state().await;
        let ctx = testing::tenant(&state, "rina").await;
        let p = product(&state, &ctx, "saree", 50_000).await;
        let s = testing::shipping(&state, &ctx, 6_000).await;
        let ledger = OrderLedger::new(state.clone());

        let mut bad_phone = checkout(&p.id, &s.id, 1);
        bad_phone.phone = "12345".into();
        let err = ledger.place_order("rina", bad_phone).await.unwrap_err();
        assert!(err.to_string().contains("phone"), "{err}");

        let mut short_address = checkout(&p.id, &s.id, 1);
        short_address.address = "Dhaka".into();
        let err = ledger.place_order("rina", short_address).await.unwrap_err();
        assert!(err.to_string().contains("address"), "{err}");

        let err = ledger.place_order("rina", checkout(&p.id, &s.id, 0)).await.unwrap_err();
        assert!(err.to_string().contains("quantity"), "{err}");
    }

    struct FailingNotifier(mpsc::UnboundedSender<String>);

    #[async_trait]
    impl Notifier for FailingNotifier {
        async fn notify_new_order(&self, notification: OrderNotification) -> Result<(), NotifyError> {
            let _ = self.0.send(notification.order_id);
            Err(NotifyError::Delivery("smtp unreachable".into()))
        }
    }

    #[tokio::test]
    async fn test_failing_notifier_does_not_fail_order() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let state = testing::state_with(Arc::new(FailingNotifier(tx))).await;
        let ctx = testing::tenant(&state, "rina").await;
        let p = product(&state, &ctx, "saree", 50_000).await;
        let s = testing::shipping(&state, &ctx, 6_000).await;
        state
            .db
            .settings()
            .upsert(&Settings {
                contact_email: Some("owner@rina.test".into()),
                ..ctx.settings.clone()
            })
            .await
            .unwrap();

        let order = OrderLedger::new(state.clone())
            .place_order("rina", checkout(&p.id, &s.id, 1))
            .await
            .unwrap();

        assert_eq!(rx.recv().await.unwrap(), order.id);
        assert!(state.db.orders().find_by_id(&order.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_settings_failure_after_commit_still_returns_order() {
        let state = testing::state().await;
        let ctx = testing::tenant(&state, "rina").await;
        let p = product(&state, &ctx, "saree", 50_000).await;
        let s = testing::shipping(&state, &ctx, 6_000).await;
        sqlx::query("DROP TABLE settings")
            .execute(state.db.pool())
            .await
            .unwrap();

        let order = OrderLedger::new(state.clone())
            .place_order("rina", checkout(&p.id, &s.id, 1))
            .await
            .unwrap();

        let stored = state.db.orders().list_for_tenant(ctx.tenant_id(), None).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, order.id);
    }

    #[tokio::test]
    async fn test_owner_reads_are_isolated() {
        let state = testing::state().await;
        let a = testing::tenant(&state, "alpha").await;
        let b = testing::tenant(&state, "bravo").await;
        let p = product(&state, &a, "saree", 50_000).await;
        let s = testing::shipping(&state, &a, 6_000).await;
        let ledger = OrderLedger::new(state.clone());
        let order = ledger.place_order("alpha", checkout(&p.id, &s.id, 1)).await.unwrap();

        let foreign = ledger.get_order(&b, &order.id).await.unwrap_err();
        let missing = ledger.get_order(&b, "no-such-order").await.unwrap_err();
        assert_eq!(foreign.classify(), missing.classify());

        let err = ledger
            .update_status(&b, &order.id, OrderStatus::Confirmed)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Core(CoreError::NotFound { .. })));

        assert_eq!(ledger.list_orders(&a, None).await.unwrap().len(), 1);
        assert!(ledger.list_orders(&b, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_strict_policy_rejects_regression() {
        let state = testing::state().await;
        let ctx = testing::tenant(&state, "rina").await;
        let p = product(&state, &ctx, "saree", 50_000).await;
        let s = testing::shipping(&state, &ctx, 6_000).await;
        let ledger = OrderLedger::new(state.clone());
        let order = ledger.place_order("rina", checkout(&p.id, &s.id, 1)).await.unwrap();

        for next in [OrderStatus::Confirmed, OrderStatus::Shipped, OrderStatus::Delivered] {
            ledger.update_status(&ctx, &order.id, next).await.unwrap();
        }

        let err = ledger
            .update_status(&ctx, &order.id, OrderStatus::New)
            .await
            .unwrap_err();
        assert_eq!(err.classify().0, axum::http::StatusCode::CONFLICT);
    }
}
