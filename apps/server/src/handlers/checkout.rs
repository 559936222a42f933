//! # Checkout Handler
//!
//! Turns the session cart plus the operator's payment entry into a
//! [`CheckoutCommand`] and hands it to the one-transaction commit.
//! The cart is cleared only after the commit succeeds.

use axum::extract::State;
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use kasa_core::{PaymentSplit, PaymentType, Sale, SaleItem, SplitInput};
use kasa_db::CheckoutCommand;

use crate::auth::Claims;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub payment_type: PaymentType,
    /// Operator-entered cash (partial mode).
    #[serde(default)]
    pub cash_kurus: i64,
    /// Operator-entered card amount (partial mode, optional).
    #[serde(default)]
    pub card_kurus: i64,
    /// Cash the customer handed over, for change calculation.
    pub tendered_kurus: Option<i64>,
    pub customer_id: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptResponse {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
    pub change_kurus: i64,
}

/// `POST /api/v1/checkout`
pub async fn commit(
    State(state): State<AppState>,
    claims: Claims,
    Json(req): Json<CheckoutRequest>,
) -> Result<Json<ReceiptResponse>, ApiError> {
    // Snapshot the cart; it stays intact until the commit succeeds, so
    // a rejected checkout never loses the cashier's lines.
    let cart = state.sessions.with_cart(&claims.jti, |cart| cart.clone())?;

    // An attached customer must actually exist before the split treats
    // the sale as credit-capable.
    let customer = match &req.customer_id {
        Some(id) => Some(
            state
                .db
                .customers()
                .get_by_id(id)
                .await?
                .filter(|c| c.is_active)
                .ok_or_else(|| ApiError::not_found("Customer", id))?,
        ),
        None => None,
    };

    let split = PaymentSplit::allocate(
        req.payment_type,
        cart.net(),
        SplitInput {
            cash_kurus: req.cash_kurus,
            card_kurus: req.card_kurus,
        },
        customer.is_some(),
    )?;

    let command = CheckoutCommand {
        branch_id: claims.branch_id.clone(),
        cashier_id: claims.sub.clone(),
        customer_id: customer.as_ref().map(|c| c.id.clone()),
        cart,
        payment_type: req.payment_type,
        split,
        tendered_kurus: req.tendered_kurus,
        due_date: req.due_date,
        notes: req.notes,
    };

    let sale = state.db.sales().commit(&command).await?;
    let items = state.db.sales().get_items(&sale.id).await?;

    state.sessions.with_cart_mut(&claims.jti, |cart| cart.clear())?;

    info!(
        sale_id = %sale.id,
        number = %sale.number,
        cashier = %claims.sub,
        "Checkout committed"
    );

    let change_kurus = sale.change_kurus;
    Ok(Json(ReceiptResponse {
        sale,
        items,
        change_kurus,
    }))
}
