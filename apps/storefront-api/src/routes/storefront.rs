//! Public storefront routes, scoped by store slug.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use storefront_core::order::CheckoutRequest;
use storefront_core::{Order, Product};

use crate::error::ServiceResult;
use crate::services::catalog::Catalog;
use crate::services::checkout::OrderLedger;
use crate::services::shipping::{ShippingOptions, ShippingService};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/{slug}/products", get(list_products))
        .route("/{slug}/products/{product_id}", get(get_product))
        .route("/{slug}/shipping", get(shipping_options))
        .route("/{slug}/orders", post(place_order))
}

async fn list_products(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> ServiceResult<Json<Vec<Product>>> {
    Ok(Json(Catalog::new(state).storefront_products(&slug).await?))
}

async fn get_product(
    State(state): State<Arc<AppState>>,
    Path((slug, product_id)): Path<(String, String)>,
) -> ServiceResult<Json<Product>> {
    Ok(Json(Catalog::new(state).storefront_product(&slug, &product_id).await?))
}

async fn shipping_options(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> ServiceResult<Json<ShippingOptions>> {
    Ok(Json(ShippingService::new(state).storefront_options(&slug).await?))
}

async fn place_order(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Json(request): Json<CheckoutRequest>,
) -> ServiceResult<(StatusCode, Json<Order>)> {
    let order = OrderLedger::new(state).place_order(&slug, request).await?;
    Ok((StatusCode::CREATED, Json(order)))
}
