//! Analytics runner: loads the window's orders and hands them to the
//! aggregation engine in storefront-core.
//!
//! ```text
//! report(ctx, period)
//!   orders  = SELECT ... WHERE tenant_id = ? AND created_at >= cutoff
//!   report  = build_report(orders, period, now)   (pure, one pass)
//!   names   = current names for the top product ids; placeholder on failure
//! ```
//! Read-only and recomputed on every call.

use chrono::Utc;
use std::sync::Arc;
use storefront_core::analytics::{build_report, AnalyticsReport, Period};
use tracing::{debug, warn};

use crate::error::ServiceResult;
use crate::services::TenantContext;
use crate::AppState;

/// Analytics service.
pub struct AnalyticsService {
    state: Arc<AppState>,
}

impl AnalyticsService {
    pub fn new(state: Arc<AppState>) -> Self {
        AnalyticsService { state }
    }

    pub async fn report(&self, ctx: &TenantContext, period: Period) -> ServiceResult<AnalyticsReport> {
        let db = &self.state.db;
        let now = Utc::now();

        let orders = db.orders().list_since(ctx.tenant_id(), period.cutoff(now)).await?;
        let mut report = build_report(&orders, period, now, |_| None);

        // Names are looked up for the ranked top products only. A failed
        // lookup keeps the placeholder labels instead of failing the report.
        let top_ids: Vec<String> = report.top_products.iter().map(|p| p.product_id.clone()).collect();
        if !top_ids.is_empty() {
            match db.products().names_for(ctx.tenant_id(), &top_ids).await {
                Ok(names) => {
                    for top in &mut report.top_products {
                        if let Some(name) = names.get(&top.product_id) {
                            top.name = name.clone();
                        }
                    }
                }
                Err(e) => {
                    warn!(
                        tenant_id = %ctx.tenant_id(),
                        error = %e,
                        "Product name lookup failed, using placeholder labels"
                    );
                }
            }
        }

        debug!(
            tenant_id = %ctx.tenant_id(),
            period = %period,
            orders = orders.len(),
            top_products = top_ids.len(),
            "Built analytics report"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use chrono::Duration;
    use storefront_core::order::{price_order, CustomerDetails};
    use storefront_core::{Money, Order, OrderStatus, Product, ProductStatus, ShippingClass};
    use storefront_db::NewProduct;

    async fn product(state: &AppState, ctx: &TenantContext) -> Product {
        state
            .db
            .products()
            .create_within_limit(
                ctx.tenant_id(),
                &ctx.plan,
                &NewProduct {
                    name: "Cotton Saree".into(),
                    slug: "saree".into(),
                    description: None,
                    price_cents: 10_000,
                    status: ProductStatus::Active,
                    images: vec![],
                },
            )
            .await
            .unwrap()
    }

    async fn order(
        state: &AppState,
        product: &Product,
        shipping: &ShippingClass,
        unit_cents: i64,
        status: OrderStatus,
        days_ago: i64,
    ) {
        let pricing = price_order(Money::from_cents(unit_cents), 1, shipping.fee()).unwrap();
        let customer = CustomerDetails {
            customer_name: "Karim".into(),
            phone: "01712345678".into(),
            address: "House 1, Road 2, Dhaka".into(),
            quantity: 1,
        };
        let mut order = Order::place(
            product,
            None,
            shipping,
            customer,
            pricing,
            Utc::now() - Duration::days(days_ago),
        );
        order.status = status;
        state.db.orders().insert(&order).await.unwrap();
    }

    #[tokio::test]
    async fn test_revenue_recognised_only_for_delivered() {
        let state = testing::state().await;
        let ctx = testing::tenant(&state, "rina").await;
        let p = product(&state, &ctx).await;
        let s = testing::shipping(&state, &ctx, 0).await;

        order(&state, &p, &s, 10_000, OrderStatus::New, 1).await;
        order(&state, &p, &s, 20_000, OrderStatus::Confirmed, 1).await;
        order(&state, &p, &s, 30_000, OrderStatus::Delivered, 1).await;

        let report = AnalyticsService::new(state.clone())
            .report(&ctx, Period::Last30Days)
            .await
            .unwrap();

        assert_eq!(report.total_orders, 3);
        let revenue: Vec<(OrderStatus, i64)> = report
            .status_breakdown
            .iter()
            .map(|b| (b.status, b.revenue.cents()))
            .collect();
        assert_eq!(
            revenue,
            vec![
                (OrderStatus::New, 0),
                (OrderStatus::Confirmed, 0),
                (OrderStatus::Delivered, 30_000),
            ]
        );

        // Top products count every status.
        assert_eq!(report.top_products[0].revenue.cents(), 60_000);
        assert_eq!(report.top_products[0].name, "Cotton Saree");
        assert_eq!(report.conversion_rate.bps(), 3333);
    }

    #[tokio::test]
    async fn test_empty_window_has_zero_conversion() {
        let state = testing::state().await;
        let ctx = testing::tenant(&state, "rina").await;
        let p = product(&state, &ctx).await;
        let s = testing::shipping(&state, &ctx, 0).await;
        order(&state, &p, &s, 10_000, OrderStatus::Delivered, 40).await;

        let service = AnalyticsService::new(state.clone());

        let week = service.report(&ctx, Period::Last7Days).await.unwrap();
        assert_eq!(week.total_orders, 0);
        assert_eq!(week.conversion_rate.bps(), 0);
        assert!(week.sales_trend.is_empty());

        let all = service.report(&ctx, Period::AllTime).await.unwrap();
        assert_eq!(all.total_orders, 1);
    }

    #[tokio::test]
    async fn test_report_is_tenant_scoped() {
        let state = testing::state().await;
        let a = testing::tenant(&state, "alpha").await;
        let b = testing::tenant(&state, "bravo").await;
        let p = product(&state, &a).await;
        let s = testing::shipping(&state, &a, 0).await;
        order(&state, &p, &s, 10_000, OrderStatus::New, 0).await;

        let report = AnalyticsService::new(state.clone())
            .report(&b, Period::AllTime)
            .await
            .unwrap();
        assert_eq!(report.total_orders, 0);
        assert!(report.top_products.is_empty());
    }

    #[tokio::test]
    async fn test_name_lookup_failure_keeps_placeholder() {
        let state = testing::state().await;
        let ctx = testing::tenant(&state, "rina").await;
        let p = product(&state, &ctx).await;
        let s = testing::shipping(&state, &ctx, 0).await;
        order(&state, &p, &s, 10_000, OrderStatus::Delivered, 1).await;
        sqlx::query("ALTER TABLE products RENAME TO products_archived")
            .execute(state.db.pool())
            .await
            .unwrap();

        let report = AnalyticsService::new(state.clone())
            .report(&ctx, Period::Last30Days)
            .await
            .unwrap();

        assert_eq!(report.total_orders, 1);
        assert_eq!(report.top_products.len(), 1);
        assert_eq!(report.top_products[0].product_id, p.id);
        assert_eq!(report.top_products[0].name, storefront_core::UNKNOWN_PRODUCT_LABEL);
        assert_eq!(report.top_products[0].revenue.cents(), 10_000);
    }
}
