//! # Cash Drawer Handlers

use axum::extract::{Query, State};
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use kasa_core::validation::validate_amount_kurus;
use kasa_core::{CashMovement, DaySummary, Money, MovementType, Role};
use kasa_db::DayCloseReport;

use crate::auth::Claims;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SummaryParams {
    /// Business day, defaults to today.
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenDayRequest {
    pub float_kurus: i64,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseDayRequest {
    pub counted_kurus: i64,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementRequest {
    pub movement_type: MovementType,
    pub amount_kurus: i64,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub summary: DaySummary,
    pub expected_closing_kurus: i64,
    pub difference_kurus: Option<i64>,
    pub movements: Vec<CashMovement>,
}

fn day_or_today(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| Utc::now().date_naive())
}

/// `GET /api/v1/cash/summary?date=`
pub async fn summary(
    State(state): State<AppState>,
    claims: Claims,
    Query(params): Query<SummaryParams>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let date = day_or_today(params.date);

    let movements = state
        .db
        .cash()
        .movements_for_day(&claims.branch_id, date)
        .await?;
    let summary = DaySummary::from_movements(date, &movements);

    Ok(Json(SummaryResponse {
        expected_closing_kurus: summary.expected_closing().kurus(),
        difference_kurus: summary.difference().map(|d| d.kurus()),
        summary,
        movements,
    }))
}

/// `POST /api/v1/cash/open`
pub async fn open_day(
    State(state): State<AppState>,
    claims: Claims,
    Json(req): Json<OpenDayRequest>,
) -> Result<Json<CashMovement>, ApiError> {
    let movement = state
        .db
        .cash()
        .open_day(
            &claims.branch_id,
            day_or_today(req.date),
            Money::from_kurus(req.float_kurus),
            &claims.sub,
        )
        .await?;

    Ok(Json(movement))
}

/// `POST /api/v1/cash/close` (manager)
///
/// Counting the drawer and signing off the difference is a manager
/// action.
pub async fn close_day(
    State(state): State<AppState>,
    claims: Claims,
    Json(req): Json<CloseDayRequest>,
) -> Result<Json<DayCloseReport>, ApiError> {
    claims.require_role(Role::Manager)?;

    let report = state
        .db
        .cash()
        .close_day(
            &claims.branch_id,
            day_or_today(req.date),
            Money::from_kurus(req.counted_kurus),
            &claims.sub,
        )
        .await?;

    Ok(Json(report))
}

/// `POST /api/v1/cash/movements`
///
/// Manual income/expense rows. Openings, closings and sale rows have
/// their own guarded paths and are rejected here.
pub async fn record_movement(
    State(state): State<AppState>,
    claims: Claims,
    Json(req): Json<MovementRequest>,
) -> Result<Json<CashMovement>, ApiError> {
    validate_amount_kurus(req.amount_kurus).map_err(|e| ApiError::validation(e.to_string()))?;

    let movement = state
        .db
        .cash()
        .record_manual(
            &claims.branch_id,
            day_or_today(req.date),
            req.movement_type,
            Money::from_kurus(req.amount_kurus),
            req.description,
            &claims.sub,
        )
        .await?;

    Ok(Json(movement))
}
