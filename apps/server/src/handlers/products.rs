//! # Product Handlers

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use kasa_core::validation::{
    validate_barcode, validate_name, validate_price_kurus, validate_quantity,
    validate_search_query, validate_vat_rate_bps,
};
use kasa_core::{Product, Role};
use kasa_db::repository::product::generate_product_id;

use crate::auth::Claims;
use crate::error::ApiError;
use crate::handlers::clamp_limit;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub barcode: Option<String>,
    pub name: String,
    pub price_kurus: i64,
    pub cost_kurus: Option<i64>,
    pub vat_rate_bps: u32,
    #[serde(default)]
    pub vat_included: bool,
    #[serde(default)]
    pub stock_quantity: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub barcode: Option<String>,
    pub name: Option<String>,
    pub price_kurus: Option<i64>,
    pub cost_kurus: Option<i64>,
    pub vat_rate_bps: Option<u32>,
    pub vat_included: Option<bool>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiveStockRequest {
    pub quantity: i64,
}

/// `GET /api/v1/products?q=&limit=`
pub async fn search(
    State(state): State<AppState>,
    _claims: Claims,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let query = validate_search_query(&params.q).map_err(|e| ApiError::validation(e.to_string()))?;
    let products = state
        .db
        .products()
        .search(&query, clamp_limit(params.limit))
        .await?;
    Ok(Json(products))
}

/// `POST /api/v1/products` (manager)
pub async fn create(
    State(state): State<AppState>,
    claims: Claims,
    Json(req): Json<CreateProductRequest>,
) -> Result<Json<Product>, ApiError> {
    claims.require_role(Role::Manager)?;

    validate_name(&req.name).map_err(|e| ApiError::validation(e.to_string()))?;
    validate_price_kurus(req.price_kurus).map_err(|e| ApiError::validation(e.to_string()))?;
    validate_vat_rate_bps(req.vat_rate_bps).map_err(|e| ApiError::validation(e.to_string()))?;
    if let Some(barcode) = &req.barcode {
        validate_barcode(barcode).map_err(|e| ApiError::validation(e.to_string()))?;
    }
    if req.stock_quantity < 0 {
        return Err(ApiError::validation("stock quantity cannot be negative"));
    }

    let now = Utc::now();
    let product = Product {
        id: generate_product_id(),
        barcode: req.barcode.map(|b| b.trim().to_string()),
        name: req.name.trim().to_string(),
        price_kurus: req.price_kurus,
        cost_kurus: req.cost_kurus,
        vat_rate_bps: req.vat_rate_bps,
        vat_included: req.vat_included,
        stock_quantity: req.stock_quantity,
        is_active: true,
        created_at: now,
        updated_at: now,
    };

    let created = state.db.products().insert(&product).await?;

    info!(product_id = %created.id, name = %created.name, "Product created");

    Ok(Json(created))
}

/// `PATCH /api/v1/products/:id` (manager)
pub async fn update(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<String>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<Product>, ApiError> {
    claims.require_role(Role::Manager)?;

    let mut product = state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", &id))?;

    if let Some(barcode) = req.barcode {
        validate_barcode(&barcode).map_err(|e| ApiError::validation(e.to_string()))?;
        product.barcode = Some(barcode.trim().to_string());
    }
    if let Some(name) = req.name {
        validate_name(&name).map_err(|e| ApiError::validation(e.to_string()))?;
        product.name = name.trim().to_string();
    }
    if let Some(price) = req.price_kurus {
        validate_price_kurus(price).map_err(|e| ApiError::validation(e.to_string()))?;
        product.price_kurus = price;
    }
    if let Some(cost) = req.cost_kurus {
        product.cost_kurus = Some(cost);
    }
    if let Some(bps) = req.vat_rate_bps {
        validate_vat_rate_bps(bps).map_err(|e| ApiError::validation(e.to_string()))?;
        product.vat_rate_bps = bps;
    }
    if let Some(included) = req.vat_included {
        product.vat_included = included;
    }
    if let Some(active) = req.is_active {
        product.is_active = active;
    }

    state.db.products().update(&product).await?;

    Ok(Json(product))
}

/// `POST /api/v1/products/:id/stock` (manager)
///
/// Goods intake: atomic stock increment.
pub async fn receive_stock(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<String>,
    Json(req): Json<ReceiveStockRequest>,
) -> Result<Json<Product>, ApiError> {
    claims.require_role(Role::Manager)?;

    validate_quantity(req.quantity).map_err(|e| ApiError::validation(e.to_string()))?;

    state.db.products().receive_stock(&id, req.quantity).await?;

    let product = state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", &id))?;

    info!(product_id = %id, quantity = %req.quantity, "Stock received");

    Ok(Json(product))
}

/// `DELETE /api/v1/products/:id` (manager)
pub async fn remove(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<String>,
) -> Result<Json<super::auth::OkResponse>, ApiError> {
    claims.require_role(Role::Manager)?;

    state.db.products().soft_delete(&id).await?;

    info!(product_id = %id, "Product soft-deleted");

    Ok(Json(super::auth::OkResponse { ok: true }))
}
