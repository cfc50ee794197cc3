//! Handlers for purchasable products.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use lms_core::billing::{price_label, validate_interval, validate_price, INTERVAL_MONTH};
use lms_core::catalog::validate_title;
use lms_core::error::CoreError;
use lms_core::types::DbId;
use lms_db::models::product::{CreateProduct, Product, UpdateProduct};
use lms_db::repositories::ProductRepo;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::middleware::tenant::CurrentTenant;
use crate::response::DataResponse;
use crate::state::AppState;

/// Product as shown on the pricing page.
#[derive(Debug, Serialize)]
pub struct ProductView {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub currency: String,
    pub billing_interval: String,
    pub price_label: String,
}

impl From<Product> for ProductView {
    fn from(p: Product) -> Self {
        Self {
            price_label: price_label(p.price_cents, &p.currency, &p.billing_interval),
            id: p.id,
            name: p.name,
            description: p.description,
            price_cents: p.price_cents,
            currency: p.currency,
            billing_interval: p.billing_interval,
        }
    }
}

pub(crate) fn product_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Product",
        id,
    })
}

fn require_price_id(price_id: &str) -> AppResult<()> {
    if price_id.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "stripe_price_id must not be empty".into(),
        )));
    }
    Ok(())
}

/// GET /api/lms/products
///
/// Active products ordered by `sort_order`.
pub async fn list(
    State(state): State<AppState>,
    CurrentTenant(tenant): CurrentTenant,
) -> AppResult<Json<DataResponse<Vec<ProductView>>>> {
    let products = ProductRepo::list_active(&state.pool, tenant.id).await?;
    Ok(Json(DataResponse {
        data: products.into_iter().map(ProductView::from).collect(),
    }))
}

/// GET /api/lms/admin/products
pub async fn admin_list(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<Product>>>> {
    let products = ProductRepo::list_all(&state.pool, admin.tenant_id()).await?;
    Ok(Json(DataResponse { data: products }))
}

/// POST /api/lms/admin/products
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateProduct>,
) -> AppResult<(StatusCode, Json<DataResponse<Product>>)> {
    validate_title(&input.name)?;
    require_price_id(&input.stripe_price_id)?;
    validate_price(input.price_cents, input.currency.as_deref().unwrap_or("usd"))?;
    validate_interval(input.billing_interval.as_deref().unwrap_or(INTERVAL_MONTH))?;

    let product = ProductRepo::create(&state.pool, admin.tenant_id(), &input).await?;
    tracing::info!(product_id = product.id, tenant_id = product.tenant_id, "Product created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: product })))
}

/// PUT /api/lms/admin/products/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProduct>,
) -> AppResult<Json<DataResponse<Product>>> {
    if let Some(name) = &input.name {
        validate_title(name)?;
    }
    if let Some(price_id) = &input.stripe_price_id {
        require_price_id(price_id)?;
    }
    if input.price_cents.is_some() || input.currency.is_some() {
        validate_price(
            input.price_cents.unwrap_or(0),
            input.currency.as_deref().unwrap_or("usd"),
        )?;
    }
    if let Some(interval) = &input.billing_interval {
        validate_interval(interval)?;
    }

    let product = ProductRepo::update(&state.pool, admin.tenant_id(), id, &input)
        .await?
        .ok_or_else(|| product_not_found(id))?;
    Ok(Json(DataResponse { data: product }))
}

/// DELETE /api/lms/admin/products/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if ProductRepo::delete(&state.pool, admin.tenant_id(), id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(product_not_found(id))
    }
}
