//! # Plan Repository
//!
//! Plans and the default plan bootstrap.
//!
//! ## Default Plan Bootstrap
//! ```text
//! register_tenant (one transaction)
//!      │
//!      ▼
//! ensure_default_plan
//!      │
//!      ├── oldest active plan exists? ──► use it
//!      │
//!      └── none ──► INSERT free plan ON CONFLICT(code) DO NOTHING
//!                        │
//!                        ▼
//!                   SELECT plan WHERE code = 'free'
//! ```
//! The UNIQUE constraint on `plans.code` makes the bootstrap idempotent:
//! a second (or concurrent) registration reuses the same row.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use storefront_core::plan::PlanDraft;
use storefront_core::{new_id, Plan, DEFAULT_PLAN_CODE};

const PLAN_COLUMNS: &str = "id, code, name, product_limit, custom_domain_allowed, tracking_allowed, \
                            monthly_price_cents, is_active, created_at";

/// Repository for plan database operations.
#[derive(Debug, Clone)]
pub struct PlanRepository {
    pool: SqlitePool,
}

impl PlanRepository {
    /// Creates a new PlanRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PlanRepository { pool }
    }

    /// Gets a plan by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Plan>> {
        let mut conn = self.pool.acquire().await?;
        find_by_id(&mut *conn, id).await
    }

    /// Lists all plans, oldest first.
    pub async fn list(&self) -> DbResult<Vec<Plan>> {
        let sql = format!("SELECT {PLAN_COLUMNS} FROM plans ORDER BY created_at, rowid");
        let plans = sqlx::query_as::<_, Plan>(&sql).fetch_all(&self.pool).await?;
        Ok(plans)
    }

    /// Inserts a new plan.
    pub async fn insert(&self, draft: &PlanDraft) -> DbResult<Plan> {
        let plan = Plan {
            id: new_id(),
            code: draft.code.clone(),
            name: draft.name.clone(),
            product_limit: draft.product_limit,
            custom_domain_allowed: draft.custom_domain_allowed,
            tracking_allowed: draft.tracking_allowed,
            monthly_price_cents: draft.monthly_price_cents,
            is_active: draft.is_active,
            created_at: Utc::now(),
        };

        debug!(id = %plan.id, code = %plan.code, "Inserting plan");

        let mut conn = self.pool.acquire().await?;
        insert_plan(&mut *conn, &plan).await?;

        Ok(plan)
    }

    /// Replaces a plan's editable fields.
    ///
    /// Tenants on this plan see the new limits at their next check.
    pub async fn update(&self, id: &str, draft: &PlanDraft) -> DbResult<Plan> {
        let result = sqlx::query(
            r#"
            UPDATE plans SET
                code = ?2,
                name = ?3,
                product_limit = ?4,
                custom_domain_allowed = ?5,
                tracking_allowed = ?6,
                monthly_price_cents = ?7,
                is_active = ?8
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&draft.code)
        .bind(&draft.name)
        .bind(draft.product_limit)
        .bind(draft.custom_domain_allowed)
        .bind(draft.tracking_allowed)
        .bind(draft.monthly_price_cents)
        .bind(draft.is_active)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Plan", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Plan", id))
    }

    /// Runs the default plan bootstrap in its own transaction.
    pub async fn ensure_default(&self) -> DbResult<Plan> {
        let mut tx = self.pool.begin().await?;
        let plan = ensure_default_plan(&mut *tx).await?;
        tx.commit().await?;
        Ok(plan)
    }

    /// Counts plans (diagnostics and tests).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM plans")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

pub(crate) async fn find_by_id(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Plan>> {
    let sql = format!("SELECT {PLAN_COLUMNS} FROM plans WHERE id = ?1");
    let plan = sqlx::query_as::<_, Plan>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(plan)
}

async fn insert_plan(conn: &mut SqliteConnection, plan: &Plan) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO plans (
            id, code, name, product_limit,
            custom_domain_allowed, tracking_allowed,
            monthly_price_cents, is_active, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&plan.id)
    .bind(&plan.code)
    .bind(&plan.name)
    .bind(plan.product_limit)
    .bind(plan.custom_domain_allowed)
    .bind(plan.tracking_allowed)
    .bind(plan.monthly_price_cents)
    .bind(plan.is_active)
    .bind(plan.created_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Returns the plan new tenants are assigned, creating the free tier if
/// no active plan exists.
///
/// Runs on the caller's connection so registration can keep it in the
/// same transaction as the tenant insert.
pub(crate) async fn ensure_default_plan(conn: &mut SqliteConnection) -> DbResult<Plan> {
    let sql = format!(
        "SELECT {PLAN_COLUMNS} FROM plans WHERE is_active = 1 ORDER BY created_at, rowid LIMIT 1"
    );
    if let Some(plan) = sqlx::query_as::<_, Plan>(&sql)
        .fetch_optional(&mut *conn)
        .await?
    {
        return Ok(plan);
    }

    let free = PlanDraft::free_tier();
    let id = new_id();

    let inserted = sqlx::query(
        r#"
        INSERT INTO plans (
            id, code, name, product_limit,
            custom_domain_allowed, tracking_allowed,
            monthly_price_cents, is_active, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        ON CONFLICT(code) DO NOTHING
        "#,
    )
    .bind(&id)
    .bind(&free.code)
    .bind(&free.name)
    .bind(free.product_limit)
    .bind(free.custom_domain_allowed)
    .bind(free.tracking_allowed)
    .bind(free.monthly_price_cents)
    .bind(free.is_active)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    if inserted.rows_affected() > 0 {
        info!(plan_id = %id, "Created default free plan");
    }

    let sql = format!("SELECT {PLAN_COLUMNS} FROM plans WHERE code = ?1");
    sqlx::query_as::<_, Plan>(&sql)
        .bind(DEFAULT_PLAN_CODE)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DbError::not_found("Plan", DEFAULT_PLAN_CODE))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::testing;

    fn pro() -> PlanDraft {
        PlanDraft {
            code: "pro".into(),
            name: "Pro".into(),
            product_limit: 500,
            custom_domain_allowed: true,
            tracking_allowed: true,
            monthly_price_cents: 99_900,
            is_active: true,
        }
    }

    #[tokio::test]
    async fn test_bootstrap_is_idempotent() {
        let db = testing::db().await;

        let first = db.plans().ensure_default().await.unwrap();
        let second = db.plans().ensure_default().await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.code, "free");
        assert_eq!(first.product_limit, 5);
        assert!(first.tracking_allowed);
        assert!(!first.custom_domain_allowed);
        assert_eq!(db.plans().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_bootstrap_prefers_existing_active_plan() {
        let db = testing::db().await;
        let pro = db.plans().insert(&pro()).await.unwrap();

        let default = db.plans().ensure_default().await.unwrap();

        assert_eq!(default.id, pro.id);
        assert_eq!(db.plans().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_plan() {
        let db = testing::db().await;
        let plan = db.plans().insert(&pro()).await.unwrap();

        let mut draft = pro();
        draft.product_limit = 50;
        let updated = db.plans().update(&plan.id, &draft).await.unwrap();
        assert_eq!(updated.product_limit, 50);

        let err = db.plans().update("missing", &draft).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_duplicate_code_is_unique_violation() {
        let db = testing::db().await;
        db.plans().insert(&pro()).await.unwrap();
        let err = db.plans().insert(&pro()).await.unwrap_err();
        match err {
            DbError::UniqueViolation { field } => assert_eq!(field, "code"),
            other => panic!("expected unique violation, got {other:?}"),
        }
    }
}
