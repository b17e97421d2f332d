// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Error types: the upload pipeline taxonomy and HTTP API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::services::catalog::CatalogError;
use crate::services::record_builder::RecordError;
use crate::services::token::TokenError;

/// Failures raised inside the upload pipeline.
///
/// The orchestrators never hand these to their callers; they are converted
/// into `VerificationResult` / `UploadResult` messages at the boundary.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// A required local field is missing. No network call was made.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Decode(#[from] TokenError),

    /// The service answered with a non-zero status code in its envelope.
    #[error("API Error ({code}): {message}")]
    Remote { code: i64, message: String },

    #[error("Network error: {0}")]
    Transport(String),

    /// The service answered successfully but refused the submission.
    #[error("{0}")]
    Rejected(String),

    #[error(transparent)]
    Record(#[from] RecordError),
}

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::UnknownRoute(name) => AppError::NotFound(format!("Route {}", name)),
            other => AppError::Internal(anyhow::Error::new(other)),
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
