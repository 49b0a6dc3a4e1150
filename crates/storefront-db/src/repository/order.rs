//! # Order Repository
//!
//! The order ledger: inserts, owner reads, status writes and the window
//! scan used by analytics.
//!
//! ## Bulk Status Update
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              bulk_update_status(tenant, ids, status) - one tx           │
//! │                                                                         │
//! │  1. SELECT id, status FROM orders                                       │
//! │       WHERE tenant_id = ? AND id IN (...)                               │
//! │  2. rows found != distinct ids        ✗ NotFound  (nothing written)     │
//! │  3. policy.check_all(current, status) ✗ InvalidTransition (nothing)     │
//! │  4. UPDATE orders SET status = ?                                        │
//! │       WHERE tenant_id = ? AND id IN (...)     ← single statement        │
//! │  5. COMMIT, return rows affected                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! A batch is applied whole or not at all: one foreign or missing id
//! rejects every id.

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::collections::BTreeSet;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use storefront_core::order::OrderStatusPolicy;
use storefront_core::{CoreError, Order, OrderStatus};

const ORDER_COLUMNS: &str = "id, tenant_id, product_id, variant_id, shipping_class_id, \
                             customer_name, phone, address, quantity, \
                             unit_price_cents, subtotal_cents, shipping_fee_cents, total_cents, \
                             status, created_at, updated_at";

/// Repository for the order ledger.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Inserts a priced order.
    ///
    /// ## Snapshot Pattern
    /// Unit price, subtotal, shipping fee and total are written as computed
    /// at checkout and never recomputed.
    pub async fn insert(&self, order: &Order) -> DbResult<()> {
        debug!(id = %order.id, tenant_id = %order.tenant_id, total = order.total_cents, "Inserting order");

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, tenant_id, product_id, variant_id, shipping_class_id,
                customer_name, phone, address, quantity,
                unit_price_cents, subtotal_cents, shipping_fee_cents, total_cents,
                status, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, ?8, ?9,
                ?10, ?11, ?12, ?13,
                ?14, ?15, ?16
            )
            "#,
        )
        .bind(&order.id)
        .bind(&order.tenant_id)
        .bind(&order.product_id)
        .bind(&order.variant_id)
        .bind(&order.shipping_class_id)
        .bind(&order.customer_name)
        .bind(&order.phone)
        .bind(&order.address)
        .bind(order.quantity)
        .bind(order.unit_price_cents)
        .bind(order.subtotal_cents)
        .bind(order.shipping_fee_cents)
        .bind(order.total_cents)
        .bind(order.status)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets an order by ID, whoever owns it.
    ///
    /// Callers must check ownership before using the result.
    pub async fn find_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1");
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(order)
    }

    /// Lists a tenant's orders, newest first, optionally filtered by status.
    pub async fn list_for_tenant(&self, tenant_id: &str, status: Option<OrderStatus>) -> DbResult<Vec<Order>> {
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {ORDER_COLUMNS} FROM orders WHERE tenant_id = "));
        qb.push_bind(tenant_id.to_string());
        if let Some(status) = status {
            qb.push(" AND status = ");
            qb.push_bind(status);
        }
        qb.push(" ORDER BY created_at DESC, rowid DESC");

        let orders: Vec<Order> = qb.build_query_as().fetch_all(&self.pool).await?;
        Ok(orders)
    }

    /// Scans a tenant's orders created at or after `since` (all when `None`).
    ///
    /// Read-only; runs concurrently with order writes and may miss an order
    /// committed a moment earlier.
    pub async fn list_since(&self, tenant_id: &str, since: Option<DateTime<Utc>>) -> DbResult<Vec<Order>> {
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {ORDER_COLUMNS} FROM orders WHERE tenant_id = "));
        qb.push_bind(tenant_id.to_string());
        if let Some(since) = since {
            qb.push(" AND created_at >= ");
            qb.push_bind(since);
        }
        qb.push(" ORDER BY created_at");

        let orders: Vec<Order> = qb.build_query_as().fetch_all(&self.pool).await?;
        Ok(orders)
    }

    /// Changes one order's status, scoped to the owning tenant.
    ///
    /// A missing or foreign order is NotFound; an illegal transition under
    /// `policy` is rejected without writing.
    pub async fn update_status(
        &self,
        tenant_id: &str,
        id: &str,
        status: OrderStatus,
        policy: OrderStatusPolicy,
    ) -> DbResult<Order> {
        let mut tx = self.pool.begin().await?;

        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1 AND tenant_id = ?2");
        let mut order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| CoreError::not_found("Order", id))?;

        policy.check(order.status, status)?;

        let now = Utc::now();
        sqlx::query("UPDATE orders SET status = ?3, updated_at = ?4 WHERE id = ?1 AND tenant_id = ?2")
            .bind(id)
            .bind(tenant_id)
            .bind(status)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(order_id = %id, from = %order.status, to = %status, "Order status changed");
        order.status = status;
        order.updated_at = now;
        Ok(order)
    }

    /// Applies `status` to every order in `ids`, or to none of them.
    ///
    /// Returns the number of rows updated.
    pub async fn bulk_update_status(
        &self,
        tenant_id: &str,
        ids: &[String],
        status: OrderStatus,
        policy: OrderStatusPolicy,
    ) -> DbResult<u64> {
        let distinct: BTreeSet<&str> = ids.iter().map(String::as_str).collect();
        if distinct.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;

        let mut select: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT id, status FROM orders WHERE tenant_id = ");
        select.push_bind(tenant_id.to_string());
        push_id_list(&mut select, &distinct);

        let owned: Vec<(String, OrderStatus)> = select.build_query_as().fetch_all(&mut *tx).await?;

        if owned.len() != distinct.len() {
            let missing = distinct
                .iter()
                .find(|id| !owned.iter().any(|(owned_id, _)| owned_id == *id))
                .map(|id| id.to_string())
                .unwrap_or_default();
            debug!(
                tenant_id = %tenant_id,
                requested = distinct.len(),
                owned = owned.len(),
                "Bulk status update rejected"
            );
            return Err(DbError::Domain(CoreError::not_found("Order", missing)));
        }

        policy.check_all(owned.iter().map(|(_, current)| *current), status)?;

        let mut update: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE orders SET status = ");
        update.push_bind(status);
        update.push(", updated_at = ");
        update.push_bind(Utc::now());
        update.push(" WHERE tenant_id = ");
        update.push_bind(tenant_id.to_string());
        push_id_list(&mut update, &distinct);

        let result = update.build().execute(&mut *tx).await?;
        tx.commit().await?;

        info!(tenant_id = %tenant_id, status = %status, rows = result.rows_affected(), "Bulk order status update");
        Ok(result.rows_affected())
    }
}

/// Appends ` AND id IN (?, ?, ...)`.
fn push_id_list(qb: &mut QueryBuilder<Sqlite>, ids: &BTreeSet<&str>) {
    qb.push(" AND id IN (");
    let mut separated = qb.separated(", ");
    for id in ids {
        separated.push_bind(id.to_string());
    }
    separated.push_unseparated(")");
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::product::NewProduct;
    use crate::repository::shipping::NewShippingClass;
    use crate::repository::testing;
    use crate::Database;
    use chrono::Duration;
    use storefront_core::order::{price_order, CustomerDetails};
    use storefront_core::{Product, ProductStatus, ShippingClass};

    async fn catalog(db: &Database, slug: &str) -> (String, Product, ShippingClass) {
        let (tenant, plan) = testing::tenant(db, slug).await;
        let product = db
            .products()
            .create_within_limit(
                &tenant.id,
                &plan,
                &NewProduct {
                    name: "Saree".into(),
                    slug: "saree".into(),
                    description: None,
                    price_cents: 50_000,
                    status: ProductStatus::Active,
                    images: vec![],
                },
            )
            .await
            .unwrap();
        let shipping = db
            .shipping()
            .insert(
                &tenant.id,
                &NewShippingClass {
                    name: "Inside Dhaka".into(),
                    fee_cents: 6_000,
                    is_default: true,
                },
            )
            .await
            .unwrap();
        (tenant.id, product, shipping)
    }

    async fn place(db: &Database, product: &Product, shipping: &ShippingClass, at: DateTime<Utc>) -> Order {
        let pricing = price_order(product.price(), 2, shipping.fee()).unwrap();
        let customer = CustomerDetails {
            customer_name: "Karim".into(),
            phone: "01712345678".into(),
            address: "House 1, Road 2, Dhaka".into(),
            quantity: 2,
        };
        let order = Order::place(product, None, shipping, customer, pricing, at);
        db.orders().insert(&order).await.unwrap();
        order
    }

    #[tokio::test]
    async fn test_insert_and_read_back_amounts() {
        let db = testing::db().await;
        let (tenant_id, product, shipping) = catalog(&db, "alpha").await;
        let order = place(&db, &product, &shipping, Utc::now()).await;

        let stored = db.orders().find_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(stored.tenant_id, tenant_id);
        assert_eq!(stored.subtotal_cents, 100_000);
        assert_eq!(stored.total_cents, 106_000);
        assert_eq!(stored.status, OrderStatus::New);
    }

    #[tokio::test]
    async fn test_update_status_checks_owner_and_policy() {
        let db = testing::db().await;
        let (a, product, shipping) = catalog(&db, "alpha").await;
        let (b, _, _) = catalog(&db, "bravo").await;
        let order = place(&db, &product, &shipping, Utc::now()).await;
        let repo = db.orders();

        let err = repo
            .update_status(&b, &order.id, OrderStatus::Confirmed, OrderStatusPolicy::Strict)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::NotFound { .. })));

        let err = repo
            .update_status(&a, &order.id, OrderStatus::Delivered, OrderStatusPolicy::Strict)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::InvalidStatusTransition { .. })));

        let updated = repo
            .update_status(&a, &order.id, OrderStatus::Confirmed, OrderStatusPolicy::Strict)
            .await
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Confirmed);

        let regressed = repo
            .update_status(&a, &order.id, OrderStatus::New, OrderStatusPolicy::Permissive)
            .await
            .unwrap();
        assert_eq!(regressed.status, OrderStatus::New);
    }

    #[tokio::test]
    async fn test_bulk_update_partial_ownership_mutates_nothing() {
        let db = testing::db().await;
        let (a, product_a, shipping_a) = catalog(&db, "alpha").await;
        let (_, product_b, shipping_b) = catalog(&db, "bravo").await;

        let first = place(&db, &product_a, &shipping_a, Utc::now()).await;
        let second = place(&db, &product_a, &shipping_a, Utc::now()).await;
        let foreign = place(&db, &product_b, &shipping_b, Utc::now()).await;

        let ids = vec![first.id.clone(), second.id.clone(), foreign.id.clone()];
        let err = db
            .orders()
            .bulk_update_status(&a, &ids, OrderStatus::Confirmed, OrderStatusPolicy::Strict)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::NotFound { .. })));

        for id in [&first.id, &second.id, &foreign.id] {
            let order = db.orders().find_by_id(id).await.unwrap().unwrap();
            assert_eq!(order.status, OrderStatus::New);
        }
    }

    #[tokio::test]
    async fn test_bulk_update_applies_to_whole_batch() {
        let db = testing::db().await;
        let (a, product, shipping) = catalog(&db, "alpha").await;
        let first = place(&db, &product, &shipping, Utc::now()).await;
        let second = place(&db, &product, &shipping, Utc::now()).await;

        // Duplicates count once.
        let ids = vec![first.id.clone(), second.id.clone(), first.id.clone()];
        let updated = db
            .orders()
            .bulk_update_status(&a, &ids, OrderStatus::Confirmed, OrderStatusPolicy::Strict)
            .await
            .unwrap();
        assert_eq!(updated, 2);

        let confirmed = db.orders().list_for_tenant(&a, Some(OrderStatus::Confirmed)).await.unwrap();
        assert_eq!(confirmed.len(), 2);
    }

    #[tokio::test]
    async fn test_bulk_update_one_illegal_transition_rejects_batch() {
        let db = testing::db().await;
        let (a, product, shipping) = catalog(&db, "alpha").await;
        let first = place(&db, &product, &shipping, Utc::now()).await;
        let second = place(&db, &product, &shipping, Utc::now()).await;
        db.orders()
            .update_status(&a, &second.id, OrderStatus::Cancelled, OrderStatusPolicy::Strict)
            .await
            .unwrap();

        let ids = vec![first.id.clone(), second.id.clone()];
        let err = db
            .orders()
            .bulk_update_status(&a, &ids, OrderStatus::Confirmed, OrderStatusPolicy::Strict)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::InvalidStatusTransition { .. })));

        let first = db.orders().find_by_id(&first.id).await.unwrap().unwrap();
        assert_eq!(first.status, OrderStatus::New);
    }

    #[tokio::test]
    async fn test_list_since_filters_by_window_and_tenant() {
        let db = testing::db().await;
        let (a, product, shipping) = catalog(&db, "alpha").await;
        let (_, product_b, shipping_b) = catalog(&db, "bravo").await;
        let now = Utc::now();

        place(&db, &product, &shipping, now - Duration::days(40)).await;
        place(&db, &product, &shipping, now - Duration::days(2)).await;
        place(&db, &product_b, &shipping_b, now).await;

        let recent = db.orders().list_since(&a, Some(now - Duration::days(7))).await.unwrap();
        assert_eq!(recent.len(), 1);

        let all = db.orders().list_since(&a, None).await.unwrap();
        assert_eq!(all.len(), 2);
    }
}
