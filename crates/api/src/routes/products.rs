//! Product route handlers.
//!
//! Handlers are thin: they decode the request, call
//! [`ProductService`](crate::services::ProductService) and map the outcome to
//! a status code. Malformed JSON bodies become `400 Bad Request`.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use product_catalog_core::{
    AddProductRequest, ProductId, ProductPredicate, ProductResponse, UpdateProductRequest,
};
use serde::Deserialize;
use tracing::instrument;

use crate::error::AppError;
use crate::state::AppState;

/// Query parameters for text search.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

/// Parse a path identity. Anything unparseable cannot name a product.
fn parse_id(raw: &str) -> Result<ProductId, AppError> {
    raw.parse()
        .map_err(|_| AppError::NotFound(format!("product '{raw}'")))
}

/// List every product.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<ProductResponse>>, AppError> {
    Ok(Json(state.products().list_all().await?))
}

/// Add a product.
#[instrument(skip(state, payload))]
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<AddProductRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ProductResponse>), AppError> {
    let Json(request) = payload?;
    let created = state
        .products()
        .add(request)
        .await?
        .ok_or_else(|| AppError::Conflict("product could not be stored".to_string()))?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// Replace the fields of an existing product.
#[instrument(skip(state, payload))]
pub async fn update(
    State(state): State<AppState>,
    payload: Result<Json<UpdateProductRequest>, JsonRejection>,
) -> Result<Json<ProductResponse>, AppError> {
    let Json(request) = payload?;
    Ok(Json(state.products().update(request).await?))
}

/// List products matching a predicate.
#[instrument(skip(state, payload))]
pub async fn query(
    State(state): State<AppState>,
    payload: Result<Json<ProductPredicate>, JsonRejection>,
) -> Result<Json<Vec<ProductResponse>>, AppError> {
    let Json(predicate) = payload?;
    Ok(Json(state.products().list_by_condition(&predicate).await?))
}

/// First product matching a predicate.
#[instrument(skip(state, payload))]
pub async fn query_first(
    State(state): State<AppState>,
    payload: Result<Json<ProductPredicate>, JsonRejection>,
) -> Result<Json<ProductResponse>, AppError> {
    let Json(predicate) = payload?;
    state
        .products()
        .get_one_by_condition(&predicate)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("no product matches".to_string()))
}

/// Products whose name or category contains `q`.
#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<ProductResponse>>, AppError> {
    Ok(Json(state.products().search(&params.q).await?))
}

/// Product by identity.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, AppError> {
    let product_id = parse_id(&id)?;
    state
        .products()
        .get_by_id(product_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("product '{id}'")))
}

/// Delete a product.
#[instrument(skip(state))]
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let product_id = parse_id(&id)?;
    if state.products().delete(product_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("product '{id}'")))
    }
}
