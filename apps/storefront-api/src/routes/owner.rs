//! Store owner routes. Every handler except `register` takes [`AuthTenant`].

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use storefront_core::analytics::{AnalyticsReport, Period};
use storefront_core::{CustomDomain, Order, OrderStatus, Product, Settings, ShippingClass, Variant};

use crate::auth::AuthTenant;
use crate::error::ServiceResult;
use crate::services::admin::{AdminService, RegisterRequest, Registration};
use crate::services::analytics::AnalyticsService;
use crate::services::catalog::{AddVariantRequest, Catalog, CreateProductRequest, UpdateProductRequest};
use crate::services::checkout::OrderLedger;
use crate::services::shipping::{CreateShippingClassRequest, ShippingService};
use crate::services::store_settings::{AddDomainRequest, StoreSettings, UpdateSettingsRequest};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/products", get(list_products).post(create_product))
        .route("/products/{id}", put(update_product))
        .route("/products/{id}/variants", post(add_variant))
        .route("/shipping-classes", get(list_shipping_classes).post(create_shipping_class))
        .route("/shipping-classes/default", get(default_shipping_class))
        .route("/orders", get(list_orders))
        .route("/orders/bulk-status", post(bulk_update_status))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/status", patch(update_status))
        .route("/analytics", get(analytics))
        .route("/settings", get(get_settings).put(update_settings))
        .route("/domains", get(list_domains).post(add_domain))
}

// =============================================================================
// Registration
// =============================================================================

async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> ServiceResult<(StatusCode, Json<Registration>)> {
    let registration = AdminService::new(state).register_tenant(request).await?;
    Ok((StatusCode::CREATED, Json(registration)))
}

// =============================================================================
// Catalog
// =============================================================================

async fn list_products(
    State(state): State<Arc<AppState>>,
    AuthTenant(ctx): AuthTenant,
) -> ServiceResult<Json<Vec<Product>>> {
    Ok(Json(Catalog::new(state).list_products(&ctx).await?))
}

async fn create_product(
    State(state): State<Arc<AppState>>,
    AuthTenant(ctx): AuthTenant,
    Json(request): Json<CreateProductRequest>,
) -> ServiceResult<(StatusCode, Json<Product>)> {
    let product = Catalog::new(state).create_product(&ctx, request).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

async fn update_product(
    State(state): State<Arc<AppState>>,
    AuthTenant(ctx): AuthTenant,
    Path(id): Path<String>,
    Json(request): Json<UpdateProductRequest>,
) -> ServiceResult<Json<Product>> {
    Ok(Json(Catalog::new(state).update_product(&ctx, &id, request).await?))
}

async fn add_variant(
    State(state): State<Arc<AppState>>,
    AuthTenant(ctx): AuthTenant,
    Path(id): Path<String>,
    Json(request): Json<AddVariantRequest>,
) -> ServiceResult<(StatusCode, Json<Variant>)> {
    let variant = Catalog::new(state).add_variant(&ctx, &id, request).await?;
    Ok((StatusCode::CREATED, Json(variant)))
}

// =============================================================================
// Shipping
// =============================================================================

async fn list_shipping_classes(
    State(state): State<Arc<AppState>>,
    AuthTenant(ctx): AuthTenant,
) -> ServiceResult<Json<Vec<ShippingClass>>> {
    Ok(Json(ShippingService::new(state).list_shipping_classes(&ctx).await?))
}

async fn create_shipping_class(
    State(state): State<Arc<AppState>>,
    AuthTenant(ctx): AuthTenant,
    Json(request): Json<CreateShippingClassRequest>,
) -> ServiceResult<(StatusCode, Json<ShippingClass>)> {
    let class = ShippingService::new(state).create_shipping_class(&ctx, request).await?;
    Ok((StatusCode::CREATED, Json(class)))
}

async fn default_shipping_class(
    State(state): State<Arc<AppState>>,
    AuthTenant(ctx): AuthTenant,
) -> ServiceResult<Json<Option<ShippingClass>>> {
    Ok(Json(ShippingService::new(state).default_shipping_class(&ctx).await?))
}

// =============================================================================
// Orders
// =============================================================================

#[derive(Debug, Deserialize)]
struct OrderListQuery {
    status: Option<OrderStatus>,
}

#[derive(Debug, Deserialize)]
struct StatusUpdate {
    status: OrderStatus,
}

#[derive(Debug, Deserialize)]
struct BulkStatusUpdate {
    ids: Vec<String>,
    status: OrderStatus,
}

#[derive(Debug, Serialize)]
struct BulkStatusResult {
    updated: u64,
}

async fn list_orders(
    State(state): State<Arc<AppState>>,
    AuthTenant(ctx): AuthTenant,
    Query(query): Query<OrderListQuery>,
) -> ServiceResult<Json<Vec<Order>>> {
    Ok(Json(OrderLedger::new(state).list_orders(&ctx, query.status).await?))
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    AuthTenant(ctx): AuthTenant,
    Path(id): Path<String>,
) -> ServiceResult<Json<Order>> {
    Ok(Json(OrderLedger::new(state).get_order(&ctx, &id).await?))
}

async fn update_status(
    State(state): State<Arc<AppState>>,
    AuthTenant(ctx): AuthTenant,
    Path(id): Path<String>,
    Json(body): Json<StatusUpdate>,
) -> ServiceResult<Json<Order>> {
    Ok(Json(OrderLedger::new(state).update_status(&ctx, &id, body.status).await?))
}

async fn bulk_update_status(
    State(state): State<Arc<AppState>>,
    AuthTenant(ctx): AuthTenant,
    Json(body): Json<BulkStatusUpdate>,
) -> ServiceResult<Json<BulkStatusResult>> {
    let updated = OrderLedger::new(state)
        .bulk_update_status(&ctx, &body.ids, body.status)
        .await?;
    Ok(Json(BulkStatusResult { updated }))
}

// =============================================================================
// Analytics
// =============================================================================

#[derive(Debug, Deserialize)]
struct AnalyticsQuery {
    period: Option<String>,
}

async fn analytics(
    State(state): State<Arc<AppState>>,
    AuthTenant(ctx): AuthTenant,
    Query(query): Query<AnalyticsQuery>,
) -> ServiceResult<Json<AnalyticsReport>> {
    let period = Period::from_query(query.period.as_deref())?;
    Ok(Json(AnalyticsService::new(state).report(&ctx, period).await?))
}

// =============================================================================
// Settings & Domains
// =============================================================================

async fn get_settings(
    State(state): State<Arc<AppState>>,
    AuthTenant(ctx): AuthTenant,
) -> ServiceResult<Json<Settings>> {
    Ok(Json(StoreSettings::new(state).get_settings(&ctx).await?))
}

async fn update_settings(
    State(state): State<Arc<AppState>>,
    AuthTenant(ctx): AuthTenant,
    Json(request): Json<UpdateSettingsRequest>,
) -> ServiceResult<Json<Settings>> {
    Ok(Json(StoreSettings::new(state).update_settings(&ctx, request).await?))
}

async fn list_domains(
    State(state): State<Arc<AppState>>,
    AuthTenant(ctx): AuthTenant,
) -> ServiceResult<Json<Vec<CustomDomain>>> {
    Ok(Json(StoreSettings::new(state).list_custom_domains(&ctx).await?))
}

async fn add_domain(
    State(state): State<Arc<AppState>>,
    AuthTenant(ctx): AuthTenant,
    Json(request): Json<AddDomainRequest>,
) -> ServiceResult<(StatusCode, Json<CustomDomain>)> {
    let domain = StoreSettings::new(state).add_custom_domain(&ctx, request).await?;
    Ok((StatusCode::CREATED, Json(domain)))
}
