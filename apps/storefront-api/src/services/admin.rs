//! # Registration & Platform Administration
//!
//! ```text
//! register_tenant ── validate ── one tx:
//!                                 ensure default plan (create "free" if no active plan)
//!                                 INSERT tenant (active), owner user, settings
//!
//! admin: plans (create / update / list)
//!        tenants (list / set status / assign plan / delete with cascade)
//! ```

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use storefront_core::plan::PlanDraft;
use storefront_core::validation::{validate_email, validate_name, validate_slug};
use storefront_core::{Plan, Tenant, TenantStatus, ValidationError};
use storefront_db::NewTenant;
use tracing::info;

use crate::error::ServiceResult;
use crate::AppState;

/// Body of `POST /api/register`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub slug: String,
    pub owner_email: String,
    /// Produced by the external auth service.
    pub password_hash: String,
}

/// A newly registered tenant and the plan it landed on.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub tenant: Tenant,
    pub plan: Plan,
}

/// Body of `PATCH /admin/tenants/{id}/status`.
#[derive(Debug, Clone, Deserialize)]
pub struct SetStatusRequest {
    pub status: TenantStatus,
}

/// Body of `PATCH /admin/tenants/{id}/plan`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignPlanRequest {
    pub plan_id: String,
}

/// Registration and admin service.
pub struct AdminService {
    state: Arc<AppState>,
}

impl AdminService {
    pub fn new(state: Arc<AppState>) -> Self {
        AdminService { state }
    }

    /// Creates a seller account on the default plan.
    pub async fn register_tenant(&self, request: RegisterRequest) -> ServiceResult<Registration> {
        let name = validate_name("name", &request.name)?;
        let slug = request.slug.trim().to_string();
        validate_slug(&slug)?;
        let owner_email = validate_email(&request.owner_email)?;
        if request.password_hash.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "password hash".to_string(),
            }
            .into());
        }

        let (tenant, plan) = self
            .state
            .db
            .tenants()
            .register(&NewTenant {
                name,
                slug,
                owner_email,
                password_hash: request.password_hash,
            })
            .await?;

        Ok(Registration { tenant, plan })
    }

    pub async fn list_plans(&self) -> ServiceResult<Vec<Plan>> {
        Ok(self.state.db.plans().list().await?)
    }

    pub async fn create_plan(&self, draft: PlanDraft) -> ServiceResult<Plan> {
        let draft = draft.validate()?;
        let plan = self.state.db.plans().insert(&draft).await?;
        info!(plan_id = %plan.id, code = %plan.code, price = %plan.monthly_price(), "Plan created");
        Ok(plan)
    }

    pub async fn update_plan(&self, id: &str, draft: PlanDraft) -> ServiceResult<Plan> {
        let draft = draft.validate()?;
        Ok(self.state.db.plans().update(id, &draft).await?)
    }

    pub async fn list_tenants(&self) -> ServiceResult<Vec<Tenant>> {
        Ok(self.state.db.tenants().list().await?)
    }

    pub async fn set_tenant_status(&self, id: &str, status: TenantStatus) -> ServiceResult<Tenant> {
        let tenant = self.state.db.tenants().set_status(id, status).await?;
        info!(tenant_id = %id, status = %status, "Tenant status changed");
        Ok(tenant)
    }

    /// Moves a tenant to another plan; limits apply from the next check.
    pub async fn assign_plan(&self, id: &str, plan_id: &str) -> ServiceResult<Tenant> {
        Ok(self.state.db.tenants().assign_plan(id, plan_id).await?)
    }

    pub async fn delete_tenant(&self, id: &str) -> ServiceResult<()> {
        self.state.db.tenants().delete(id).await?;
        info!(tenant_id = %id, "Tenant deleted");
        Ok(())
    }
}
