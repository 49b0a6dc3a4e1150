//! Shipping class management, plus the public list checkout offers.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use storefront_core::tenancy::require_visible_tenant;
use storefront_core::validation::{validate_name, validate_non_negative_cents};
use storefront_core::{Money, ShippingClass};
use storefront_db::NewShippingClass;
use tracing::info;

use crate::error::ServiceResult;
use crate::services::TenantContext;
use crate::AppState;

/// Body of `POST /api/shipping-classes`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateShippingClassRequest {
    pub name: String,
    pub fee: String,
    #[serde(default)]
    pub is_default: bool,
}

/// Shipping options shown at checkout.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingOptions {
    pub classes: Vec<ShippingClass>,
    pub default_class_id: Option<String>,
}

/// Shipping service.
pub struct ShippingService {
    state: Arc<AppState>,
}

impl ShippingService {
    pub fn new(state: Arc<AppState>) -> Self {
        ShippingService { state }
    }

    pub async fn create_shipping_class(
        &self,
        ctx: &TenantContext,
        request: CreateShippingClassRequest,
    ) -> ServiceResult<ShippingClass> {
        let name = validate_name("name", &request.name)?;
        let fee_cents = Money::parse_field(&request.fee, "fee")?.cents();
        validate_non_negative_cents("fee", fee_cents)?;

        let class = self
            .state
            .db
            .shipping()
            .insert(
                ctx.tenant_id(),
                &NewShippingClass {
                    name,
                    fee_cents,
                    is_default: request.is_default,
                },
            )
            .await?;

        info!(tenant_id = %ctx.tenant_id(), class_id = %class.id, fee = %class.fee(), "Shipping class created");
        Ok(class)
    }

    pub async fn list_shipping_classes(&self, ctx: &TenantContext) -> ServiceResult<Vec<ShippingClass>> {
        Ok(self.state.db.shipping().list_for_tenant(ctx.tenant_id()).await?)
    }

    /// The class checkout preselects: first marked default, else first by name.
    pub async fn default_shipping_class(&self, ctx: &TenantContext) -> ServiceResult<Option<ShippingClass>> {
        Ok(self.state.db.shipping().default_for_tenant(ctx.tenant_id()).await?)
    }

    /// Public checkout options for an active store.
    pub async fn storefront_options(&self, slug: &str) -> ServiceResult<ShippingOptions> {
        let db = &self.state.db;
        let tenant = require_visible_tenant(db.tenants().get_by_slug(slug).await?, slug)?;

        let classes = db.shipping().list_for_tenant(&tenant.id).await?;
        let default_class_id = db.shipping().default_for_tenant(&tenant.id).await?.map(|c| c.id);

        Ok(ShippingOptions {
            classes,
            default_class_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    fn request(name: &str, fee: &str, is_default: bool) -> CreateShippingClassRequest {
        CreateShippingClassRequest {
            name: name.into(),
            fee: fee.into(),
            is_default,
        }
    }

    #[tokio::test]
    async fn test_create_and_default_selection() {
        let state = testing::state().await;
        let ctx = testing::tenant(&state, "rina").await;
        let service = ShippingService::new(state.clone());

        assert!(service.default_shipping_class(&ctx).await.unwrap().is_none());

        service.create_shipping_class(&ctx, request("Outside Dhaka", "120", false)).await.unwrap();
        let inside = service
            .create_shipping_class(&ctx, request("Inside Dhaka", "60.00", true))
            .await
            .unwrap();
        assert_eq!(inside.fee_cents, 6_000);

        let default = service.default_shipping_class(&ctx).await.unwrap().unwrap();
        assert_eq!(default.id, inside.id);

        let options = service.storefront_options("rina").await.unwrap();
        assert_eq!(options.classes.len(), 2);
        assert_eq!(options.default_class_id.as_deref(), Some(inside.id.as_str()));
    }

    #[tokio::test]
    async fn test_negative_fee_is_rejected() {
        let state = testing::state().await;
        let ctx = testing::tenant(&state, "rina").await;
        let service = ShippingService::new(state.clone());

        let err = service
            .create_shipping_class(&ctx, request("Refund", "-10", false))
            .await
            .unwrap_err();
        assert_eq!(err.classify().0, axum::http::StatusCode::BAD_REQUEST);
        assert!(service.list_shipping_classes(&ctx).await.unwrap().is_empty());
    }
}
