//! # Settings Repository
//!
//! One settings row per tenant, created empty at registration.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use storefront_core::Settings;

/// Repository for store settings.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    /// Creates a new SettingsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    /// Gets a tenant's settings; a missing row reads as empty settings.
    pub async fn get(&self, tenant_id: &str) -> DbResult<Settings> {
        let settings = sqlx::query_as::<_, Settings>(
            r#"
            SELECT tenant_id, store_name, contact_email, contact_phone,
                   facebook_pixel_id, google_analytics_id
            FROM settings
            WHERE tenant_id = ?1
            "#,
        )
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(settings.unwrap_or_else(|| Settings {
            tenant_id: tenant_id.to_string(),
            ..Settings::default()
        }))
    }

    /// Writes all settings fields (insert or replace).
    pub async fn upsert(&self, settings: &Settings) -> DbResult<()> {
        debug!(tenant_id = %settings.tenant_id, "Saving settings");

        sqlx::query(
            r#"
            INSERT INTO settings (
                tenant_id, store_name, contact_email, contact_phone,
                facebook_pixel_id, google_analytics_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(tenant_id) DO UPDATE SET
                store_name = excluded.store_name,
                contact_email = excluded.contact_email,
                contact_phone = excluded.contact_phone,
                facebook_pixel_id = excluded.facebook_pixel_id,
                google_analytics_id = excluded.google_analytics_id
            "#,
        )
        .bind(&settings.tenant_id)
        .bind(&settings.store_name)
        .bind(&settings.contact_email)
        .bind(&settings.contact_phone)
        .bind(&settings.facebook_pixel_id)
        .bind(&settings.google_analytics_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::testing;

    #[tokio::test]
    async fn test_upsert_round_trip() {
        let db = testing::db().await;
        let (tenant, _) = testing::tenant(&db, "alpha").await;

        let mut settings = db.settings().get(&tenant.id).await.unwrap();
        settings.contact_email = Some("orders@alpha.test".into());
        settings.facebook_pixel_id = Some("px-1".into());
        db.settings().upsert(&settings).await.unwrap();

        let stored = db.settings().get(&tenant.id).await.unwrap();
        assert_eq!(stored.contact_email.as_deref(), Some("orders@alpha.test"));
        assert!(stored.has_tracking());
    }

    #[tokio::test]
    async fn test_missing_row_reads_as_empty() {
        let db = testing::db().await;
        let settings = db.settings().get("nobody").await.unwrap();
        assert_eq!(settings.tenant_id, "nobody");
        assert!(settings.contact_email.is_none());
    }
}
