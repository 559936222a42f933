//! # Customer Handlers

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use kasa_core::validation::{validate_amount_kurus, validate_name, validate_search_query};
use kasa_core::{Customer, Money, Role, Sale};
use kasa_db::repository::customer::generate_customer_id;

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
pub struct CreateCustomerRequest {
    pub name: String,
    pub phone: Option<String>,
    #[serde(default)]
    pub credit_limit_kurus: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub amount_kurus: i64,
    /// Drawer day the income lands on; defaults to today.
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub customer_id: String,
    pub balance_kurus: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetail {
    pub customer: Customer,
    /// Credit-bearing sales that remain unsettled.
    pub pending_sales: Vec<Sale>,
}

/// `GET /api/v1/customers?q=`
pub async fn search(
    State(state): State<AppState>,
    claims: Claims,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Customer>>, ApiError> {
    let query = validate_search_query(&params.q).map_err(|e| ApiError::validation(e.to_string()))?;
    let customers = state
        .db
        .customers()
        .search(&claims.branch_id, &query, clamp_limit(params.limit))
        .await?;
    Ok(Json(customers))
}

/// `GET /api/v1/customers/:id`
pub async fn detail(
    State(state): State<AppState>,
    _claims: Claims,
    Path(id): Path<String>,
) -> Result<Json<CustomerDetail>, ApiError> {
    let customer = state
        .db
        .customers()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Customer", &id))?;

    let pending_sales = state.db.sales().list_pending_for_customer(&id).await?;

    Ok(Json(CustomerDetail {
        customer,
        pending_sales,
    }))
}

/// `POST /api/v1/customers` (manager)
pub async fn create(
    State(state): State<AppState>,
    claims: Claims,
    Json(req): Json<CreateCustomerRequest>,
) -> Result<Json<Customer>, ApiError> {
    claims.require_role(Role::Manager)?;

    validate_name(&req.name).map_err(|e| ApiError::validation(e.to_string()))?;
    if req.credit_limit_kurus < 0 {
        return Err(ApiError::validation("credit limit cannot be negative"));
    }

    let now = Utc::now();
    let customer = Customer {
        id: generate_customer_id(),
        branch_id: claims.branch_id.clone(),
        name: req.name.trim().to_string(),
        phone: req.phone.map(|p| p.trim().to_string()),
        current_balance_kurus: 0,
        credit_limit_kurus: req.credit_limit_kurus,
        is_active: true,
        created_at: now,
        updated_at: now,
    };

    let created = state.db.customers().insert(&customer).await?;

    info!(customer_id = %created.id, name = %created.name, "Customer created");

    Ok(Json(created))
}

/// `POST /api/v1/customers/:id/payments`
///
/// Records a balance payment: atomic balance decrement + the `income`
/// drawer movement, in one transaction.
pub async fn record_payment(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<String>,
    Json(req): Json<PaymentRequest>,
) -> Result<Json<PaymentResponse>, ApiError> {
    validate_amount_kurus(req.amount_kurus).map_err(|e| ApiError::validation(e.to_string()))?;

    let date = req.date.unwrap_or_else(|| Utc::now().date_naive());

    let balance_kurus = state
        .db
        .customers()
        .record_payment(&id, Money::from_kurus(req.amount_kurus), date, &claims.sub)
        .await?;

    Ok(Json(PaymentResponse {
        customer_id: id,
        balance_kurus,
    }))
}
