//! # Catalog Service
//!
//! Owner product management and the public storefront reads.
//!
//! | Operation             | Who        | Visibility                         |
//! |-----------------------|------------|------------------------------------|
//! | `create_product`      | owner      | plan-gated, slug unique per tenant |
//! | `update_product`      | owner      | own products only                  |
//! | `add_variant`         | owner      | own products only                  |
//! | `list_products`       | owner      | all statuses                       |
//! | `storefront_products` | public     | active tenant, active products     |
//! | `storefront_product`  | public     | active tenant, active product      |

use serde::Deserialize;
use std::sync::Arc;
use storefront_core::tenancy::{require_orderable_product, require_owned, require_visible_tenant};
use storefront_core::validation::{validate_attributes, validate_name, validate_non_negative_cents, validate_slug};
use storefront_core::{Money, Product, ProductStatus, ValidationError, Variant};
use storefront_db::{NewProduct, NewVariant};
use tracing::info;

use crate::error::ServiceResult;
use crate::services::TenantContext;
use crate::AppState;

/// Body of `POST /api/products`. Prices are decimal strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: String,
    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Body of `PUT /api/products/{id}`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub status: Option<ProductStatus>,
    pub images: Option<Vec<String>>,
}

/// Body of `POST /api/products/{id}/variants`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddVariantRequest {
    pub name: String,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub attributes: serde_json::Value,
    #[serde(default)]
    pub is_default: bool,
}

fn parse_price(field: &str, raw: &str) -> Result<i64, ValidationError> {
    let cents = Money::parse_field(raw, field)?.cents();
    validate_non_negative_cents(field, cents)?;
    Ok(cents)
}

fn clean_images(images: Vec<String>) -> Vec<String> {
    images
        .into_iter()
        .map(|i| i.trim().to_string())
        .filter(|i| !i.is_empty())
        .collect()
}

/// Catalog service.
pub struct Catalog {
    state: Arc<AppState>,
}

impl Catalog {
    pub fn new(state: Arc<AppState>) -> Self {
        Catalog { state }
    }

    /// Creates a product if the tenant's plan allows another one.
    pub async fn create_product(&self, ctx: &TenantContext, request: CreateProductRequest) -> ServiceResult<Product> {
        let name = validate_name("name", &request.name)?;
        let slug = request.slug.trim().to_string();
        validate_slug(&slug)?;
        let price_cents = parse_price("price", &request.price)?;

        let new = NewProduct {
            name,
            slug,
            description: request.description.map(|d| d.trim().to_string()).filter(|d| !d.is_empty()),
            price_cents,
            status: request.status,
            images: clean_images(request.images),
        };

        let product = self
            .state
            .db
            .products()
            .create_within_limit(ctx.tenant_id(), &ctx.plan, &new)
            .await?;

        info!(tenant_id = %ctx.tenant_id(), product_id = %product.id, "Product created");
        Ok(product)
    }

    /// Edits one of the tenant's products.
    pub async fn update_product(
        &self,
        ctx: &TenantContext,
        id: &str,
        request: UpdateProductRequest,
    ) -> ServiceResult<Product> {
        let products = self.state.db.products();
        let mut product = require_owned(products.find_by_id(id).await?, ctx.tenant_id(), id)?;

        if let Some(name) = request.name {
            product.name = validate_name("name", &name)?;
        }
        if let Some(description) = request.description {
            let description = description.trim().to_string();
            product.description = (!description.is_empty()).then_some(description);
        }
        if let Some(price) = request.price {
            product.price_cents = parse_price("price", &price)?;
        }
        if let Some(status) = request.status {
            product.status = status;
        }
        if let Some(images) = request.images {
            product.images = clean_images(images);
        }

        let product = products.update(&product).await?;
        Ok(products.with_variants(product).await?)
    }

    /// Adds a variant to one of the tenant's products.
    pub async fn add_variant(
        &self,
        ctx: &TenantContext,
        product_id: &str,
        request: AddVariantRequest,
    ) -> ServiceResult<Variant> {
        let products = self.state.db.products();
        let product = require_owned(products.find_by_id(product_id).await?, ctx.tenant_id(), product_id)?;

        let name = validate_name("name", &request.name)?;
        let price_cents = request
            .price
            .as_deref()
            .map(|p| parse_price("price", p))
            .transpose()?;
        if request.stock < 0 {
            return Err(ValidationError::OutOfRange {
                field: "stock".to_string(),
                min: 0,
                max: i64::MAX,
            }
            .into());
        }
        let attributes = validate_attributes(request.attributes)?;

        let new = NewVariant {
            name,
            sku: request.sku.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
            price_cents,
            stock: request.stock,
            attributes,
            is_default: request.is_default,
        };

        Ok(products.insert_variant(&product.id, &new).await?)
    }

    /// Owner view: every product, any status.
    pub async fn list_products(&self, ctx: &TenantContext) -> ServiceResult<Vec<Product>> {
        Ok(self.state.db.products().list_for_tenant(ctx.tenant_id()).await?)
    }

    /// Public view: the store's active products with variants.
    pub async fn storefront_products(&self, slug: &str) -> ServiceResult<Vec<Product>> {
        let db = &self.state.db;
        let tenant = require_visible_tenant(db.tenants().get_by_slug(slug).await?, slug)?;
        Ok(db.products().list_active_with_variants(&tenant.id).await?)
    }

    /// Public view of one active product.
    pub async fn storefront_product(&self, slug: &str, product_id: &str) -> ServiceResult<Product> {
        let db = &self.state.db;
        let tenant = require_visible_tenant(db.tenants().get_by_slug(slug).await?, slug)?;
        let product = require_orderable_product(db.products().find_by_id(product_id).await?, &tenant.id, product_id)?;
        Ok(db.products().with_variants(product).await?)
    }
}
