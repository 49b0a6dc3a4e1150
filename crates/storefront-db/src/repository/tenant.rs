//! # Tenant Repository
//!
//! Registration, lifecycle changes and cascade deletion of tenants.
//!
//! ## Registration
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      register() - one transaction                       │
//! │                                                                         │
//! │  1. slug / owner email free?          ✗ Duplicate (InvalidInput)        │
//! │  2. ensure_default_plan               (may create the free plan)        │
//! │  3. INSERT tenants   (status active)                                    │
//! │  4. INSERT users     (owner, hash from the auth service)                │
//! │  5. INSERT settings  (store_name = tenant name)                         │
//! │  6. COMMIT                                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Cascade Delete
//! Children are removed before parents so foreign keys hold at every step:
//! orders → variants → products → shipping classes → settings → domains →
//! users → tenant.

use chrono::Utc;
use serde::Deserialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::plan::{ensure_default_plan, find_by_id as find_plan};
use storefront_core::{new_id, Plan, Tenant, TenantStatus, ValidationError};

const TENANT_COLUMNS: &str = "id, name, slug, plan_id, status, created_at, updated_at";

/// Input for registering a seller account.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTenant {
    pub name: String,
    pub slug: String,
    pub owner_email: String,
    /// Produced by the external auth service; stored verbatim.
    pub password_hash: String,
}

/// Repository for tenant database operations.
#[derive(Debug, Clone)]
pub struct TenantRepository {
    pool: SqlitePool,
}

impl TenantRepository {
    /// Creates a new TenantRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TenantRepository { pool }
    }

    /// Gets a tenant by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Tenant>> {
        let mut conn = self.pool.acquire().await?;
        find_by_id(&mut *conn, id).await
    }

    /// Gets a tenant by its storefront slug (any status).
    pub async fn get_by_slug(&self, slug: &str) -> DbResult<Option<Tenant>> {
        let sql = format!("SELECT {TENANT_COLUMNS} FROM tenants WHERE slug = ?1");
        let tenant = sqlx::query_as::<_, Tenant>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tenant)
    }

    /// Lists all tenants, newest first.
    pub async fn list(&self) -> DbResult<Vec<Tenant>> {
        let sql = format!("SELECT {TENANT_COLUMNS} FROM tenants ORDER BY created_at DESC, rowid DESC");
        let tenants = sqlx::query_as::<_, Tenant>(&sql).fetch_all(&self.pool).await?;
        Ok(tenants)
    }

    /// Registers a tenant with its owner user and empty settings.
    ///
    /// Returns the tenant and the plan it was assigned.
    pub async fn register(&self, new: &NewTenant) -> DbResult<(Tenant, Plan)> {
        let mut tx = self.pool.begin().await?;

        let slug_taken: Option<i64> = sqlx::query_scalar("SELECT 1 FROM tenants WHERE slug = ?1")
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

        let email_taken: Option<i64> = sqlx::query_scalar("SELECT 1 FROM users WHERE email = ?1")
            .bind(&new.owner_email)
            .fetch_optional(&mut *tx)
            .await?;
        if email_taken.is_some() {
            return Err(ValidationError::Duplicate {
                field: "email".to_string(),
                value: new.owner_email.clone(),
            }
            .into());
        }

        let plan = ensure_default_plan(&mut *tx).await?;

        let now = Utc::now();
        let tenant = Tenant {
            id: new_id(),
            name: new.name.clone(),
            slug: new.slug.clone(),
            plan_id: plan.id.clone(),
            status: TenantStatus::Active,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %tenant.id, slug = %tenant.slug, "Registering tenant");

        sqlx::query(
            r#"
            INSERT INTO tenants (id, name, slug, plan_id, status, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&tenant.id)
        .bind(&tenant.name)
        .bind(&tenant.slug)
        .bind(&tenant.plan_id)
        .bind(tenant.status)
        .bind(tenant.created_at)
        .bind(tenant.updated_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO users (id, tenant_id, email, password_hash, role, created_at)
            VALUES (?1, ?2, ?3, ?4, 'owner', ?5)
            "#,
        )
        .bind(new_id())
        .bind(&tenant.id)
        .bind(&new.owner_email)
        .bind(&new.password_hash)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO settings (tenant_id, store_name) VALUES (?1, ?2)")
            .bind(&tenant.id)
            .bind(&tenant.name)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(tenant_id = %tenant.id, plan = %plan.code, "Tenant registered");
        Ok((tenant, plan))
    }

    /// Changes a tenant's lifecycle status.
    pub async fn set_status(&self, id: &str, status: TenantStatus) -> DbResult<Tenant> {
        let result = sqlx::query("UPDATE tenants SET status = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(status)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Tenant", id));
        }

        info!(tenant_id = %id, status = %status, "Tenant status changed");
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Tenant", id))
    }

    /// Moves a tenant to another plan.
    ///
    /// Existing data over the new plan's limits is kept; the limits apply
    /// from the next check on.
    pub async fn assign_plan(&self, id: &str, plan_id: &str) -> DbResult<Tenant> {
        let mut tx = self.pool.begin().await?;

        if find_plan(&mut *tx, plan_id).await?.is_none() {
            return Err(DbError::not_found("Plan", plan_id));
        }

        let result = sqlx::query("UPDATE tenants SET plan_id = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(plan_id)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Tenant", id));
        }

        let tenant = find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Tenant", id))?;
        tx.commit().await?;

        info!(tenant_id = %id, plan_id = %plan_id, "Tenant plan assigned");
        Ok(tenant)
    }

    /// Deletes a tenant and everything it owns in one transaction.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        if find_by_id(&mut *tx, id).await?.is_none() {
            return Err(DbError::not_found("Tenant", id));
        }

        const CASCADE: &[(&str, &str)] = &[
            ("orders", "DELETE FROM orders WHERE tenant_id = ?1"),
            (
                "variants",
                "DELETE FROM variants WHERE product_id IN (SELECT id FROM products WHERE tenant_id = ?1)",
            ),
            ("products", "DELETE FROM products WHERE tenant_id = ?1"),
            ("shipping_classes", "DELETE FROM shipping_classes WHERE tenant_id = ?1"),
            ("settings", "DELETE FROM settings WHERE tenant_id = ?1"),
            ("custom_domains", "DELETE FROM custom_domains WHERE tenant_id = ?1"),
            ("users", "DELETE FROM users WHERE tenant_id = ?1"),
            ("tenants", "DELETE FROM tenants WHERE id = ?1"),
        ];

        for (table, sql) in CASCADE {
            let result = sqlx::query(sql).bind(id).execute(&mut *tx).await?;
            debug!(tenant_id = %id, table, rows = result.rows_affected(), "Cascade delete");
        }

        tx.commit().await?;

        info!(tenant_id = %id, "Tenant deleted");
        Ok(())
    }
}

pub(crate) async fn find_by_id(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Tenant>> {
    let sql = format!("SELECT {TENANT_COLUMNS} FROM tenants WHERE id = ?1");
    let tenant = sqlx::query_as::<_, Tenant>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(tenant)
}

// =============================================================================
// Unit Tests
// =============================================================================
