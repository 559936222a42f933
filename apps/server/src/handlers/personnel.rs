//! # Personnel Handlers
//!
//! Payroll is admin-only: salaries and advances are not till business.

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use kasa_core::validation::{validate_amount_kurus, validate_name};
use kasa_core::{LedgerSummary, Money, Personnel, PersonnelTransaction, Role, TransactionKind};
use kasa_db::repository::personnel::generate_personnel_id;

use crate::auth::Claims;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePersonnelRequest {
    pub name: String,
    pub title: Option<String>,
    #[serde(default)]
    pub salary_kurus: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub kind: TransactionKind,
    pub amount_kurus: i64,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerResponse {
    pub personnel: Personnel,
    pub entries: Vec<PersonnelTransaction>,
    pub summary: LedgerSummary,
}

/// `GET /api/v1/personnel` (admin)
pub async fn list(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<Json<Vec<Personnel>>, ApiError> {
    claims.require_role(Role::Admin)?;

    let personnel = state.db.personnel().list(&claims.branch_id).await?;
    Ok(Json(personnel))
}

/// `POST /api/v1/personnel` (admin)
pub async fn create(
    State(state): State<AppState>,
    claims: Claims,
    Json(req): Json<CreatePersonnelRequest>,
) -> Result<Json<Personnel>, ApiError> {
    claims.require_role(Role::Admin)?;

    validate_name(&req.name).map_err(|e| ApiError::validation(e.to_string()))?;
    if req.salary_kurus < 0 {
        return Err(ApiError::validation("salary cannot be negative"));
    }

    let now = Utc::now();
    let employee = Personnel {
        id: generate_personnel_id(),
        branch_id: claims.branch_id.clone(),
        name: req.name.trim().to_string(),
        title: req.title.map(|t| t.trim().to_string()),
        salary_kurus: req.salary_kurus,
        current_balance_kurus: 0,
        is_active: true,
        created_at: now,
        updated_at: now,
    };

    let created = state.db.personnel().insert(&employee).await?;

    info!(personnel_id = %created.id, name = %created.name, "Personnel created");

    Ok(Json(created))
}

/// `POST /api/v1/personnel/:id/transactions` (admin)
pub async fn record_transaction(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<String>,
    Json(req): Json<TransactionRequest>,
) -> Result<Json<PersonnelTransaction>, ApiError> {
    claims.require_role(Role::Admin)?;

    validate_amount_kurus(req.amount_kurus).map_err(|e| ApiError::validation(e.to_string()))?;

    let transaction = state
        .db
        .personnel()
        .record_transaction(
            &id,
            req.kind,
            Money::from_kurus(req.amount_kurus),
            req.description,
        )
        .await?;

    Ok(Json(transaction))
}

/// `GET /api/v1/personnel/:id/ledger` (admin)
pub async fn ledger(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<String>,
) -> Result<Json<LedgerResponse>, ApiError> {
    claims.require_role(Role::Admin)?;

    let personnel = state
        .db
        .personnel()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Personnel", &id))?;

    let entries = state.db.personnel().ledger(&id).await?;
    let summary = LedgerSummary::from_entries(&entries);

    Ok(Json(LedgerResponse {
        personnel,
        entries,
        summary,
    }))
}
