//! # Cart Handlers
//!
//! All routes operate on the authenticated session's cart (keyed by
//! the token's `jti`). Totals in every response are re-derived by
//! kasa-core from the lines.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use kasa_core::validation::validate_quantity;
use kasa_core::{CartItem, CartTotals};

use crate::auth::Claims;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub totals: CartTotals,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub product_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    pub quantity: Option<i64>,
    pub discount_kurus: Option<i64>,
}

/// `GET /api/v1/cart`
pub async fn view(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<Json<CartView>, ApiError> {
    let view = state.sessions.with_cart(&claims.jti, |cart| CartView {
        items: cart.items.clone(),
        totals: CartTotals::from(&*cart),
    })?;
    Ok(Json(view))
}

/// `POST /api/v1/cart/items`
///
/// Looks the product up fresh (price/VAT are frozen into the line) and
/// adds it to the session cart.
pub async fn add_item(
    State(state): State<AppState>,
    claims: Claims,
    Json(req): Json<AddItemRequest>,
) -> Result<Json<CartView>, ApiError> {
    validate_quantity(req.quantity).map_err(|e| ApiError::validation(e.to_string()))?;

    let product = state
        .db
        .products()
        .get_by_id(&req.product_id)
        .await?
        .filter(|p| p.is_active)
        .ok_or_else(|| ApiError::not_found("Product", &req.product_id))?;

    let view = state.sessions.with_cart_mut(&claims.jti, |cart| {
        cart.add_item(&product, req.quantity)?;
        Ok::<_, kasa_core::CoreError>(CartView {
            items: cart.items.clone(),
            totals: CartTotals::from(&*cart),
        })
    })??;

    Ok(Json(view))
}

/// `PATCH /api/v1/cart/items/:product_id`
pub async fn update_item(
    State(state): State<AppState>,
    claims: Claims,
    Path(product_id): Path<String>,
    Json(req): Json<UpdateItemRequest>,
) -> Result<Json<CartView>, ApiError> {
    let view = state.sessions.with_cart_mut(&claims.jti, |cart| {
        if let Some(quantity) = req.quantity {
            cart.update_quantity(&product_id, quantity)?;
        }
        if let Some(discount) = req.discount_kurus {
            // Quantity 0 above may have removed the line; setting a
            // discount on a gone line reports not-found, which is right.
            cart.set_discount(&product_id, discount)?;
        }
        Ok::<_, kasa_core::CoreError>(CartView {
            items: cart.items.clone(),
            totals: CartTotals::from(&*cart),
        })
    })??;

    Ok(Json(view))
}

/// `DELETE /api/v1/cart/items/:product_id`
pub async fn remove_item(
    State(state): State<AppState>,
    claims: Claims,
    Path(product_id): Path<String>,
) -> Result<Json<CartView>, ApiError> {
    let view = state.sessions.with_cart_mut(&claims.jti, |cart| {
        cart.remove_item(&product_id)?;
        Ok::<_, kasa_core::CoreError>(CartView {
            items: cart.items.clone(),
            totals: CartTotals::from(&*cart),
        })
    })??;

    Ok(Json(view))
}

/// `DELETE /api/v1/cart`
pub async fn clear(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<Json<CartView>, ApiError> {
    let view = state.sessions.with_cart_mut(&claims.jti, |cart| {
        cart.clear();
        CartView {
            items: Vec::new(),
            totals: CartTotals::from(&*cart),
        }
    })?;

    Ok(Json(view))
}
