//! Platform admin routes. Every handler takes [`AdminAuth`].

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, put};
use axum::{Json, Router};
use std::sync::Arc;
use storefront_core::plan::PlanDraft;
use storefront_core::{Plan, Tenant};
use tracing::info;

use crate::auth::AdminAuth;
use crate::error::ServiceResult;
use crate::services::admin::{AdminService, AssignPlanRequest, SetStatusRequest};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/plans", get(list_plans).post(create_plan))
        .route("/plans/{id}", put(update_plan))
        .route("/tenants", get(list_tenants))
        .route("/tenants/{id}", axum::routing::delete(delete_tenant))
        .route("/tenants/{id}/status", patch(set_status))
        .route("/tenants/{id}/plan", patch(assign_plan))
}

async fn list_plans(State(state): State<Arc<AppState>>, _admin: AdminAuth) -> ServiceResult<Json<Vec<Plan>>> {
    Ok(Json(AdminService::new(state).list_plans().await?))
}

async fn create_plan(
    State(state): State<Arc<AppState>>,
    _admin: AdminAuth,
    Json(draft): Json<PlanDraft>,
) -> ServiceResult<(StatusCode, Json<Plan>)> {
    let plan = AdminService::new(state).create_plan(draft).await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

async fn update_plan(
    State(state): State<Arc<AppState>>,
    _admin: AdminAuth,
    Path(id): Path<String>,
    Json(draft): Json<PlanDraft>,
) -> ServiceResult<Json<Plan>> {
    Ok(Json(AdminService::new(state).update_plan(&id, draft).await?))
}

async fn list_tenants(State(state): State<Arc<AppState>>, _admin: AdminAuth) -> ServiceResult<Json<Vec<Tenant>>> {
    Ok(Json(AdminService::new(state).list_tenants().await?))
}

async fn set_status(
    State(state): State<Arc<AppState>>,
    _admin: AdminAuth,
    Path(id): Path<String>,
    Json(body): Json<SetStatusRequest>,
) -> ServiceResult<Json<Tenant>> {
    Ok(Json(AdminService::new(state).set_tenant_status(&id, body.status).await?))
}

async fn assign_plan(
    State(state): State<Arc<AppState>>,
    _admin: AdminAuth,
    Path(id): Path<String>,
    Json(body): Json<AssignPlanRequest>,
) -> ServiceResult<Json<Tenant>> {
    Ok(Json(AdminService::new(state).assign_plan(&id, &body.plan_id).await?))
}

async fn delete_tenant(
    State(state): State<Arc<AppState>>,
    AdminAuth(claims): AdminAuth,
    Path(id): Path<String>,
) -> ServiceResult<StatusCode> {
    info!(admin = %claims.sub, tenant_id = %id, "Admin deleting tenant");
    AdminService::new(state).delete_tenant(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
