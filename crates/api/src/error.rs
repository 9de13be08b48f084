//! Unified error handling for the HTTP surface.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use product_catalog_core::ValidationErrors;
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::ProductServiceError;

/// Application-level error type for the catalog API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Request fields broke one or more rules.
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// Update targeted a product that does not exist.
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Storage refused the write.
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl From<ProductServiceError> for AppError {
    fn from(err: ProductServiceError) -> Self {
        match err {
            ProductServiceError::Validation(errors) => Self::Validation(errors),
            ProductServiceError::InvalidReference(id) => {
                Self::InvalidReference(format!("no product with id '{id}'"))
            }
            ProductServiceError::Storage(source) => Self::Database(source),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        if matches!(self, Self::Database(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Catalog request error"
            );
        }

        let status = match &self {
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::InvalidReference(_) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
        };

        let body = match &self {
            Self::Validation(errors) => json!({ "errors": errors.field_map() }),
            // Don't expose internal error details to clients
            Self::Database(_) => json!({ "error": "Internal server error" }),
            _ => json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
