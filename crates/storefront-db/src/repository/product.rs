//! # Product Repository
//!
//! Products, their variants, and the plan-gated product insert.
//!
//! ## Plan-Gated Insert
//! ```text
//! create_within_limit(tenant, plan, new)
//!      │
//!      ▼  BEGIN
//! SELECT COUNT(*) FROM products WHERE tenant_id = ?
//!      │
//!      ▼
//! PlanGovernor::check_product_creation(count)   ✗ ProductLimitReached
//!      │
//!      ▼
//! slug free within tenant?                      ✗ Duplicate
//!      │
//!      ▼
//! INSERT products ... COMMIT
//! ```
//! Count and insert share a transaction. Two concurrent creations can
//! still both pass the count, so the limit may be overshot by at most the
//! number of concurrent requests.

use chrono::Utc;
use serde::Deserialize;
use sqlx::types::Json;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::collections::HashMap;
use tracing::debug;

use crate::error::{DbError, DbResult};
use storefront_core::plan::PlanGovernor;
use storefront_core::{new_id, Plan, Product, ProductStatus, ValidationError, Variant, VariantAttributes};

const PRODUCT_COLUMNS: &str =
    "id, tenant_id, name, slug, description, price_cents, status, images, created_at, updated_at";

const VARIANT_COLUMNS: &str =
    "id, product_id, name, sku, price_cents, stock, attributes, is_default, created_at";

/// Input for a new product (price already parsed to minor units).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price_cents: i64,
    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Input for a new variant of an existing product.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVariant {
    pub name: String,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub price_cents: Option<i64>,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub attributes: VariantAttributes,
    #[serde(default)]
    pub is_default: bool,
}

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by ID, whoever owns it (variants not loaded).
    ///
    /// Callers must check ownership before using the result.
    pub async fn find_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    /// Lists every product of a tenant (owner view, all statuses), newest first.
    pub async fn list_for_tenant(&self, tenant_id: &str) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE tenant_id = ?1 ORDER BY created_at DESC, rowid DESC"
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(tenant_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    /// Lists a tenant's active products with their variants (storefront view).
    pub async fn list_active_with_variants(&self, tenant_id: &str) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE tenant_id = ?1 AND status = 'active' ORDER BY name, rowid"
        );
        let mut products = sqlx::query_as::<_, Product>(&sql)
            .bind(tenant_id)
            .fetch_all(&self.pool)
            .await?;
        self.attach_variants(&mut products).await?;
        Ok(products)
    }

    /// Counts a tenant's products (all statuses count toward the plan limit).
    pub async fn count_for_tenant(&self, tenant_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE tenant_id = ?1")
            .bind(tenant_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Inserts a product if the tenant's plan allows one more.
    pub async fn create_within_limit(&self, tenant_id: &str, plan: &Plan, new: &NewProduct) -> DbResult<Product> {
        let mut tx = self.pool.begin().await?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE tenant_id = ?1")
            .bind(tenant_id)
            .fetch_one(&mut *tx)
            .await?;

        PlanGovernor::new(plan).check_product_creation(count)?;

        let slug_taken: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM products WHERE tenant_id = ?1 AND slug = ?2")
                .bind(tenant_id)
                .bind(&new.slug)
                .fetch_optional(&mut *tx)
                .await?;
        if slug_taken.is_some() {
            return Err(ValidationError::Duplicate {
                field: "slug".to_string(),
                value: new.slug.clone(),
            }
            .into());
        }

        let now = Utc::now();
        let product = Product {
            id: new_id(),
            tenant_id: tenant_id.to_string(),
            name: new.name.clone(),
            slug: new.slug.clone(),
            description: new.description.clone(),
            price_cents: new.price_cents,
            status: new.status,
            images: new.images.clone(),
            created_at: now,
            updated_at: now,
            variants: Vec::new(),
        };

        debug!(id = %product.id, tenant_id = %tenant_id, count, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, tenant_id, name, slug, description,
                price_cents, status, images, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&product.id)
        .bind(&product.tenant_id)
        .bind(&product.name)
        .bind(&product.slug)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.status)
        .bind(Json(&product.images))
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(product)
    }

    /// Writes a product's editable fields, scoped to its owning tenant.
    pub async fn update(&self, product: &Product) -> DbResult<Product> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?3,
                description = ?4,
                price_cents = ?5,
                status = ?6,
                images = ?7,
                updated_at = ?8
            WHERE id = ?1 AND tenant_id = ?2
            "#,
        )
        .bind(&product.id)
        .bind(&product.tenant_id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.status)
        .bind(Json(&product.images))
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(Product {
            updated_at: now,
            ..product.clone()
        })
    }

    /// Resolves current display names for a tenant's product ids.
    ///
    /// Ids that no longer exist (or belong elsewhere) are simply absent.
    pub async fn names_for(&self, tenant_id: &str, ids: &[String]) -> DbResult<HashMap<String, String>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT id, name FROM products WHERE tenant_id = ");
        qb.push_bind(tenant_id.to_string());
        qb.push(" AND id IN (");
        let mut separated = qb.separated(", ");
        for id in ids {
            separated.push_bind(id.clone());
        }
        separated.push_unseparated(")");

        let rows: Vec<(String, String)> = qb.build_query_as().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().collect())
    }

    // =========================================================================
    // Variants
    // =========================================================================

    /// Gets a variant by ID.
    pub async fn find_variant(&self, id: &str) -> DbResult<Option<Variant>> {
        let sql = format!("SELECT {VARIANT_COLUMNS} FROM variants WHERE id = ?1");
        let variant = sqlx::query_as::<_, Variant>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(variant)
    }

    /// Lists the variants of one product.
    pub async fn variants_for(&self, product_id: &str) -> DbResult<Vec<Variant>> {
        let sql = format!(
            "SELECT {VARIANT_COLUMNS} FROM variants WHERE product_id = ?1 ORDER BY is_default DESC, name, rowid"
        );
        let variants = sqlx::query_as::<_, Variant>(&sql)
            .bind(product_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(variants)
    }

    /// Loads the product's variants into `product.variants`.
    pub async fn with_variants(&self, mut product: Product) -> DbResult<Product> {
        product.variants = self.variants_for(&product.id).await?;
        Ok(product)
    }

    /// Adds a variant to a product the caller has already checked ownership of.
    pub async fn insert_variant(&self, product_id: &str, new: &NewVariant) -> DbResult<Variant> {
        let variant = Variant {
            id: new_id(),
            product_id: product_id.to_string(),
            name: new.name.clone(),
            sku: new.sku.clone(),
            price_cents: new.price_cents,
            stock: new.stock,
            attributes: new.attributes.clone(),
            is_default: new.is_default,
            created_at: Utc::now(),
        };

        debug!(id = %variant.id, product_id = %product_id, "Inserting variant");

        sqlx::query(
            r#"
            INSERT INTO variants (
                id, product_id, name, sku, price_cents,
                stock, attributes, is_default, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&variant.id)
        .bind(&variant.product_id)
        .bind(&variant.name)
        .bind(&variant.sku)
        .bind(variant.price_cents)
        .bind(variant.stock)
        .bind(Json(&variant.attributes))
        .bind(variant.is_default)
        .bind(variant.created_at)
        .execute(&self.pool)
        .await?;

        Ok(variant)
    }

    /// Loads variants for many products with one query.
    async fn attach_variants(&self, products: &mut [Product]) -> DbResult<()> {
        if products.is_empty() {
            return Ok(());
        }

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {VARIANT_COLUMNS} FROM variants WHERE product_id IN ("
        ));
        let mut separated = qb.separated(", ");
        for product in products.iter() {
            separated.push_bind(product.id.clone());
        }
        separated.push_unseparated(") ORDER BY is_default DESC, name, rowid");

        let variants: Vec<Variant> = qb.build_query_as().fetch_all(&self.pool).await?;

        let mut by_product: HashMap<String, Vec<Variant>> = HashMap::new();
        for variant in variants {
            by_product.entry(variant.product_id.clone()).or_default().push(variant);
        }
        for product in products.iter_mut() {
            product.variants = by_product.remove(&product.id).unwrap_or_default();
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
