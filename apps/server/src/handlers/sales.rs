//! # Sale History Handlers

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use kasa_core::{Sale, SaleItem};

use crate::auth::Claims;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Business day, defaults to today.
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleDetail {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTermsRequest {
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// `GET /api/v1/sales?date=YYYY-MM-DD`
pub async fn list(
    State(state): State<AppState>,
    claims: Claims,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Sale>>, ApiError> {
    let day = params.date.unwrap_or_else(|| Utc::now().date_naive());
    let sales = state.db.sales().list_by_day(&claims.branch_id, day).await?;
    Ok(Json(sales))
}

/// `GET /api/v1/sales/:id`
pub async fn detail(
    State(state): State<AppState>,
    _claims: Claims,
    Path(id): Path<String>,
) -> Result<Json<SaleDetail>, ApiError> {
    let sale = state
        .db
        .sales()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Sale", &id))?;
    let items = state.db.sales().get_items(&id).await?;

    Ok(Json(SaleDetail { sale, items }))
}

/// `PATCH /api/v1/sales/:id`
///
/// Sales are immutable after commit except due date and notes.
pub async fn update_terms(
    State(state): State<AppState>,
    _claims: Claims,
    Path(id): Path<String>,
    Json(req): Json<UpdateTermsRequest>,
) -> Result<Json<SaleDetail>, ApiError> {
    state
        .db
        .sales()
        .update_terms(&id, req.due_date, req.notes)
        .await?;

    let sale = state
        .db
        .sales()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Sale", &id))?;
    let items = state.db.sales().get_items(&id).await?;

    Ok(Json(SaleDetail { sale, items }))
}
