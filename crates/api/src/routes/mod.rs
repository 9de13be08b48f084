//! HTTP route handlers for the catalog API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                - Liveness check
//! GET    /health/ready          - Readiness check (storage round trip)
//!
//! # Products
//! GET    /products              - List all products
//! POST   /products              - Add a product (201, 400, 409)
//! PUT    /products              - Update a product (200, 400, 404)
//! POST   /products/query        - List products matching a predicate
//! POST   /products/query/first  - First product matching a predicate (200, 404)
//! GET    /products/search?q=    - Name or category contains text
//! GET    /products/{id}         - Product by identity (200, 404)
//! DELETE /products/{id}         - Delete a product (204, 404)
//! ```

pub mod products;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

use crate::db::ProductRepository;
use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create).put(products::update))
        .route("/query", post(products::query))
        .route("/query/first", post(products::query_first))
        .route("/search", get(products::search))
        .route("/{id}", get(products::show).delete(products::destroy))
}

/// Create the health check router.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if storage is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.products().repository().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
