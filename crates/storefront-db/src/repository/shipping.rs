//! # Shipping Class Repository
//!
//! Named delivery options with a flat fee. The `is_default` marker is not
//! unique; [`ShippingRepository::default_for_tenant`] prefers the first
//! class marked default and falls back to the first by name.

use chrono::Utc;
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use storefront_core::{new_id, ShippingClass};

const SHIPPING_COLUMNS: &str = "id, tenant_id, name, fee_cents, is_default, created_at";

/// Input for a new shipping class (fee already parsed to minor units).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewShippingClass {
    pub name: String,
    pub fee_cents: i64,
    #[serde(default)]
    pub is_default: bool,
}

/// Repository for shipping classes.
#[derive(Debug, Clone)]
pub struct ShippingRepository {
    pool: SqlitePool,
}

impl ShippingRepository {
    /// Creates a new ShippingRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ShippingRepository { pool }
    }

    /// Gets a shipping class by ID, whoever owns it.
    ///
    /// Callers must check ownership before using the result.
    pub async fn find_by_id(&self, id: &str) -> DbResult<Option<ShippingClass>> {
        let sql = format!("SELECT {SHIPPING_COLUMNS} FROM shipping_classes WHERE id = ?1");
        let class = sqlx::query_as::<_, ShippingClass>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(class)
    }

    /// Lists a tenant's shipping classes by name.
    pub async fn list_for_tenant(&self, tenant_id: &str) -> DbResult<Vec<ShippingClass>> {
        let sql = format!(
            "SELECT {SHIPPING_COLUMNS} FROM shipping_classes WHERE tenant_id = ?1 ORDER BY name, rowid"
        );
        let classes = sqlx::query_as::<_, ShippingClass>(&sql)
            .bind(tenant_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(classes)
    }

    /// Returns the class checkout should preselect, if the tenant has any.
    pub async fn default_for_tenant(&self, tenant_id: &str) -> DbResult<Option<ShippingClass>> {
        let sql = format!(
            r#"
            SELECT {SHIPPING_COLUMNS} FROM shipping_classes
            WHERE tenant_id = ?1
            ORDER BY is_default DESC,
                     CASE WHEN is_default = 1 THEN rowid END,
                     name
            LIMIT 1
            "#
        );
        let class = sqlx::query_as::<_, ShippingClass>(&sql)
            .bind(tenant_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(class)
    }

    /// Inserts a shipping class for a tenant.
    pub async fn insert(&self, tenant_id: &str, new: &NewShippingClass) -> DbResult<ShippingClass> {
        let class = ShippingClass {
            id: new_id(),
            tenant_id: tenant_id.to_string(),
            name: new.name.clone(),
            fee_cents: new.fee_cents,
            is_default: new.is_default,
            created_at: Utc::now(),
        };

        debug!(tenant_id = %tenant_id, name = %class.name, "Inserting shipping class");

        sqlx::query(
            r#"
            INSERT INTO shipping_classes (id, tenant_id, name, fee_cents, is_default, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&class.id)
        .bind(&class.tenant_id)
        .bind(&class.name)
        .bind(class.fee_cents)
        .bind(class.is_default)
        .bind(class.created_at)
        .execute(&self.pool)
        .await?;

        Ok(class)
    }
}
