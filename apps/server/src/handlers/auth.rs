//! # Auth Handlers

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use kasa_core::validation::{validate_email, validate_name};
use kasa_core::{Role, User};
use kasa_db::repository::user::generate_user_id;

use crate::auth::{hash_password, verify_password, Claims};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: i64,
    pub user: UserView,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: String,
    pub branch_id: String,
    pub email: String,
    pub display_name: String,
    pub role: Role,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        UserView {
            id: user.id,
            branch_id: user.branch_id,
            email: user.email,
            display_name: user.display_name,
            role: user.role,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub role: Role,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OkResponse {
    pub ok: bool,
}

/// `POST /api/v1/auth/login`
///
/// Verifies the password, opens a session (and its cart) and returns
/// the bearer token.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = state.db.users().get_by_email(req.email.trim()).await?;

    // Same rejection for unknown email and wrong password: no account
    // probing through error messages.
    let user = match user {
        Some(u) if verify_password(&req.password, &u.password_hash) => u,
        _ => {
            warn!(email = %req.email, "Failed login attempt");
            return Err(ApiError::unauthorized("Invalid email or password"));
        }
    };

    let (token, claims) =
        state
            .jwt
            .generate_token(&user.id, &user.branch_id, user.role, &user.display_name)?;

    state.sessions.open(&claims.jti);

    info!(user_id = %user.id, role = ?user.role, "User logged in");

    Ok(Json(LoginResponse {
        token,
        expires_in: state.jwt.lifetime_secs(),
        user: user.into(),
    }))
}

/// `POST /api/v1/auth/logout`
///
/// Drops the session and its cart.
pub async fn logout(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<Json<OkResponse>, ApiError> {
    state.sessions.close(&claims.jti);
    info!(user_id = %claims.sub, "User logged out");
    Ok(Json(OkResponse { ok: true }))
}

/// `GET /api/v1/auth/me`
pub async fn me(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<Json<UserView>, ApiError> {
    let user = state
        .db
        .users()
        .get_by_id(&claims.sub)
        .await?
        .ok_or_else(|| ApiError::not_found("User", &claims.sub))?;

    Ok(Json(user.into()))
}

/// `POST /api/v1/auth/register` (admin)
pub async fn register(
    State(state): State<AppState>,
    claims: Claims,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<UserView>, ApiError> {
    claims.require_role(Role::Admin)?;

    validate_email(&req.email).map_err(|e| ApiError::validation(e.to_string()))?;
    validate_name(&req.display_name).map_err(|e| ApiError::validation(e.to_string()))?;
    if req.password.len() < 8 {
        return Err(ApiError::validation("Password must be at least 8 characters"));
    }

    let now = Utc::now();
    let user = User {
        id: generate_user_id(),
        branch_id: claims.branch_id.clone(),
        email: req.email.trim().to_lowercase(),
        password_hash: hash_password(&req.password)?,
        display_name: req.display_name.trim().to_string(),
        role: req.role,
        is_active: true,
        created_at: now,
        updated_at: now,
    };

    let created = state.db.users().insert(&user).await?;

    info!(user_id = %created.id, role = ?created.role, by = %claims.sub, "User registered");

    Ok(Json(created.into()))
}
