//! Store settings and custom domains.
//!
//! Both carry plan-gated fields: tracking ids need `tracking_allowed`,
//! custom domains need `custom_domain_allowed`. A plan that disallows the
//! feature gets Forbidden, not a silent drop.

use serde::Deserialize;
use std::sync::Arc;
use storefront_core::validation::{normalize_phone, validate_email, validate_hostname, validate_name};
use storefront_core::{CustomDomain, Settings};
use tracing::info;

use crate::error::ServiceResult;
use crate::services::TenantContext;
use crate::AppState;

/// Body of `PUT /api/settings`. Replaces every field; absent means cleared.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    pub store_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub facebook_pixel_id: Option<String>,
    pub google_analytics_id: Option<String>,
}

/// Body of `POST /api/domains`.
#[derive(Debug, Clone, Deserialize)]
pub struct AddDomainRequest {
    pub hostname: String,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Settings and domain service.
pub struct StoreSettings {
    state: Arc<AppState>,
}

impl StoreSettings {
    pub fn new(state: Arc<AppState>) -> Self {
        StoreSettings { state }
    }

    pub async fn get_settings(&self, ctx: &TenantContext) -> ServiceResult<Settings> {
        Ok(self.state.db.settings().get(ctx.tenant_id()).await?)
    }

    pub async fn update_settings(&self, ctx: &TenantContext, request: UpdateSettingsRequest) -> ServiceResult<Settings> {
        let settings = Settings {
            tenant_id: ctx.tenant_id().to_string(),
            store_name: non_blank(request.store_name)
                .map(|n| validate_name("store name", &n))
                .transpose()?,
            contact_email: non_blank(request.contact_email)
                .map(|e| validate_email(&e))
                .transpose()?,
            contact_phone: non_blank(request.contact_phone)
                .map(|p| normalize_phone(&p))
                .transpose()?,
            facebook_pixel_id: non_blank(request.facebook_pixel_id),
            google_analytics_id: non_blank(request.google_analytics_id),
        };

        if settings.has_tracking() {
            ctx.governor().require_tracking()?;
        }

        self.state.db.settings().upsert(&settings).await?;
        info!(tenant_id = %ctx.tenant_id(), "Settings updated");
        Ok(settings)
    }

    pub async fn add_custom_domain(&self, ctx: &TenantContext, request: AddDomainRequest) -> ServiceResult<CustomDomain> {
        ctx.governor().require_custom_domain()?;
        let hostname = validate_hostname(&request.hostname)?;

        let domain = self.state.db.domains().insert(ctx.tenant_id(), &hostname).await?;
        info!(tenant_id = %ctx.tenant_id(), hostname = %domain.hostname, "Custom domain added");
        Ok(domain)
    }

    pub async fn list_custom_domains(&self, ctx: &TenantContext) -> ServiceResult<Vec<CustomDomain>> {
        Ok(self.state.db.domains().list_for_tenant(ctx.tenant_id()).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::testing;
    use axum::http::StatusCode;
    use storefront_core::plan::PlanDraft;
    use storefront_core::{CoreError, PlanFeature};

    async fn upgrade(state: &AppState, ctx: &TenantContext) -> TenantContext {
        let pro = state
            .db
            .plans()
            .insert(&PlanDraft {
                code: "pro".into(),
                name: "Pro".into(),
                product_limit: 100,
                custom_domain_allowed: true,
                tracking_allowed: true,
                monthly_price_cents: 99_900,
                is_active: true,
            })
            .await
            .unwrap();
        state.db.tenants().assign_plan(ctx.tenant_id(), &pro.id).await.unwrap();
        TenantContext::load(&state.db, ctx.tenant_id()).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_free_plan_cannot_add_domain() {
        let state = testing::state().await;
        let ctx = testing::tenant(&state, "rina").await;
        let service = StoreSettings::new(state.clone());

        let err = service
            .add_custom_domain(&ctx, AddDomainRequest { hostname: "shop.rina.com".into() })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Core(CoreError::FeatureNotAllowed { feature: PlanFeature::CustomDomain, .. })
        ));
        assert_eq!(err.classify().0, StatusCode::FORBIDDEN);

        let ctx = upgrade(&state, &ctx).await;
        let domain = service
            .add_custom_domain(&ctx, AddDomainRequest { hostname: "Shop.Rina.com.".into() })
            .await
            .unwrap();
        assert_eq!(domain.hostname, "shop.rina.com");
        assert_eq!(service.list_custom_domains(&ctx).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_tracking_ids_follow_plan_flag() {
        let state = testing::state().await;
        let ctx = testing::tenant(&state, "rina").await;
        let service = StoreSettings::new(state.clone());

        // The default free tier allows tracking.
        let saved = service
            .update_settings(
                &ctx,
                UpdateSettingsRequest {
                    store_name: Some("Rina Fashion".into()),
                    contact_email: Some(" Owner@Rina.test ".into()),
                    contact_phone: Some("+8801712345678".into()),
                    facebook_pixel_id: Some("px-1".into()),
                    google_analytics_id: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(saved.contact_email.as_deref(), Some("owner@rina.test"));
        assert_eq!(saved.contact_phone.as_deref(), Some("01712345678"));

        let basic = state
            .db
            .plans()
            .insert(&PlanDraft {
                code: "basic".into(),
                name: "Basic".into(),
                product_limit: 10,
                custom_domain_allowed: false,
                tracking_allowed: false,
                monthly_price_cents: 0,
                is_active: true,
            })
            .await
            .unwrap();
        state.db.tenants().assign_plan(ctx.tenant_id(), &basic.id).await.unwrap();
        let ctx = TenantContext::load(&state.db, ctx.tenant_id()).await.unwrap().unwrap();

        let err = service
            .update_settings(
                &ctx,
                UpdateSettingsRequest {
                    google_analytics_id: Some("G-123".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "tracking is not available on the Basic plan");

        let stored = service.get_settings(&ctx).await.unwrap();
        assert_eq!(stored.facebook_pixel_id.as_deref(), Some("px-1"));
    }
}
