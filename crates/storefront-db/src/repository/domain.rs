//! # Custom Domain Repository
//!
//! Hostnames pointing at a tenant's storefront. Hostnames are unique across
//! the platform; plan gating happens in the service before insert.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use storefront_core::{new_id, CustomDomain, ValidationError};

/// Repository for custom domains.
#[derive(Debug, Clone)]
pub struct DomainRepository {
    pool: SqlitePool,
}

impl DomainRepository {
    /// Creates a new DomainRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DomainRepository { pool }
    }

    /// Records a new (unverified) hostname for a tenant.
    pub async fn insert(&self, tenant_id: &str, hostname: &str) -> DbResult<CustomDomain> {
        let domain = CustomDomain {
            id: new_id(),
            tenant_id: tenant_id.to_string(),
            hostname: hostname.to_string(),
            verified: false,
            created_at: Utc::now(),
        };

        debug!(tenant_id = %tenant_id, hostname = %hostname, "Adding custom domain");

        let result = sqlx::query(
            r#"
            INSERT INTO custom_domains (id, tenant_id, hostname, verified, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&domain.id)
        .bind(&domain.tenant_id)
        .bind(&domain.hostname)
        .bind(domain.verified)
        .bind(domain.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(domain),
            Err(e) => match DbError::from(e) {
                DbError::UniqueViolation { .. } => Err(ValidationError::Duplicate {
                    field: "hostname".to_string(),
                    value: hostname.to_string(),
                }
                .into()),
                other => Err(other),
            },
        }
    }

    /// Lists a tenant's domains.
    pub async fn list_for_tenant(&self, tenant_id: &str) -> DbResult<Vec<CustomDomain>> {
        let domains = sqlx::query_as::<_, CustomDomain>(
            r#"
            SELECT id, tenant_id, hostname, verified, created_at
            FROM custom_domains
            WHERE tenant_id = ?1
            ORDER BY hostname
            "#,
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(domains)
    }
}
