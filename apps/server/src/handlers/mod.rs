//! # HTTP Handlers
//!
//! One module per resource, mirroring the till's screens:
//!
//! - [`auth`] - login/logout, user management
//! - [`products`] - product search, CRUD, goods intake
//! - [`cart`] - the session cart
//! - [`checkout`] - the commit
//! - [`sales`] - sale history and detail
//! - [`customers`] - customers and balance payments
//! - [`cash`] - drawer open/close/movements/summary
//! - [`personnel`] - employees and the payroll ledger
//!
//! Handlers stay thin: deserialize, check role, call kasa-core /
//! kasa-db, serialize. Business rules live below this layer.

pub mod auth;
pub mod cart;
pub mod cash;
pub mod checkout;
pub mod customers;
pub mod personnel;
pub mod products;
pub mod sales;

use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        // Auth
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/auth/register", post(auth::register))
        // Products
        .route("/products", get(products::search).post(products::create))
        .route("/products/:id", patch(products::update).delete(products::remove))
        .route("/products/:id/stock", post(products::receive_stock))
        // Cart
        .route("/cart", get(cart::view).delete(cart::clear))
        .route("/cart/items", post(cart::add_item))
        .route(
            "/cart/items/:product_id",
            patch(cart::update_item).delete(cart::remove_item),
        )
        // Checkout & sales
        .route("/checkout", post(checkout::commit))
        .route("/sales", get(sales::list))
        .route("/sales/:id", get(sales::detail).patch(sales::update_terms))
        // Customers
        .route("/customers", get(customers::search).post(customers::create))
        .route("/customers/:id", get(customers::detail))
        .route("/customers/:id/payments", post(customers::record_payment))
        // Cash drawer
        .route("/cash/open", post(cash::open_day))
        .route("/cash/close", post(cash::close_day))
        .route("/cash/movements", post(cash::record_movement))
        .route("/cash/summary", get(cash::summary))
        // Personnel
        .route("/personnel", get(personnel::list).post(personnel::create))
        .route(
            "/personnel/:id/transactions",
            post(personnel::record_transaction),
        )
        .route("/personnel/:id/ledger", get(personnel::ledger));

    Router::new()
        .nest("/api/v1", api)
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// =============================================================================
// Health
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    database: bool,
}

/// Liveness/readiness probe.
async fn health(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Json<HealthResponse> {
    let database = state.db.health_check().await;
    Json(HealthResponse {
        status: if database { "ok" } else { "degraded" },
        database,
    })
}

/// Clamps an optional `limit` query parameter to a sane page size.
pub(crate) fn clamp_limit(limit: Option<u32>) -> u32 {
    limit.unwrap_or(50).min(200)
}
