//! Service layer.
//!
//! Each service holds the shared [`AppState`](crate::AppState) and combines
//! storefront-core rules with storefront-db repositories. Owner operations
//! take a [`TenantContext`]; every id they receive is checked against
//! `context.tenant.id` before use.

pub mod admin;
pub mod analytics;
pub mod catalog;
pub mod checkout;
pub mod shipping;
pub mod store_settings;

use storefront_core::plan::PlanGovernor;
use storefront_core::{Plan, Settings, Tenant};
use storefront_db::Database;

use crate::error::{ServiceError, ServiceResult};

/// The authenticated tenant with its current plan and settings.
///
/// Loaded per request, so a plan change applies to the next request.
#[derive(Debug, Clone)]
pub struct TenantContext {
    pub tenant: Tenant,
    pub plan: Plan,
    pub settings: Settings,
}

impl TenantContext {
    /// Loads the context, or `None` if the tenant does not exist.
    pub async fn load(db: &Database, tenant_id: &str) -> ServiceResult<Option<TenantContext>> {
        let Some(tenant) = db.tenants().get_by_id(tenant_id).await? else {
            return Ok(None);
        };

        let plan = db
            .plans()
            .get_by_id(&tenant.plan_id)
            .await?
            .ok_or_else(|| ServiceError::Internal(format!("tenant {} has no plan", tenant.id)))?;
        let settings = db.settings().get(&tenant.id).await?;

        Ok(Some(TenantContext { tenant, plan, settings }))
    }

    pub fn governor(&self) -> PlanGovernor<'_> {
        PlanGovernor::new(&self.plan)
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant.id
    }
}
