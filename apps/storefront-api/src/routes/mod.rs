//! HTTP routes.
//!
//! ```text
//! /health                               liveness + database check
//! /store/{slug}/...                     public storefront + checkout (no auth)
//! /api/register                         seller registration (no auth)
//! /api/...                              store owner (Bearer, tenant claim)
//! /admin/...                            platform admin (Bearer, role = admin)
//! ```

pub mod admin;
pub mod owner;
pub mod storefront;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;

/// Builds the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .nest("/store", storefront::routes())
        .nest("/api", owner::routes())
        .nest("/admin", admin::routes())
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    database: bool,
}

async fn health_handler(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Health>) {
    let database = state.db.health_check().await;
    let (code, status) = if database {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };
    (code, Json(Health { status, database }))
}
