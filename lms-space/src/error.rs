//! Error types for lms-space
//!
//! [`SpaceError`] is the domain taxonomy returned by every session operation.
//! [`ApiError`] turns it into a short user-facing notification at the HTTP
//! boundary; none of these errors end the session.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use lms_common::vault::VaultError;
use serde_json::json;
use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::services::CatalogError;

/// Domain errors for the music space session
#[derive(Debug, Error)]
pub enum SpaceError {
    /// Bad passphrase or corrupted ciphertext (no further detail)
    #[error("invalid credential")]
    InvalidCredential,

    /// Decrypted credentials rejected by the catalog service
    #[error("catalog service rejected the credentials")]
    ServiceAuthFailure,

    /// Track reference malformed or unknown to the catalog
    #[error("invalid track reference: {0}")]
    InvalidReference(String),

    /// Track id already present in the table
    #[error("track already present: {0}")]
    DuplicateReference(String),

    /// Neighbor count (or other embedding parameter) out of range
    #[error("invalid hyperparameter: {0}")]
    InvalidHyperparameter(String),

    /// Operation needs a loaded dataset
    #[error("session locked: no dataset loaded")]
    Locked,

    /// Dataset text could not be parsed
    #[error("dataset error: {0}")]
    Dataset(String),

    /// Catalog transport or protocol failure
    #[error("catalog error: {0}")]
    Catalog(CatalogError),

    /// Numeric failure inside the embedding engine
    #[error("embedding error: {0}")]
    Embedding(EmbeddingError),
}

impl From<VaultError> for SpaceError {
    fn from(_: VaultError) -> Self {
        SpaceError::InvalidCredential
    }
}

impl From<CatalogError> for SpaceError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Unauthorized(_) => SpaceError::ServiceAuthFailure,
            CatalogError::TrackNotFound(id) => SpaceError::InvalidReference(id),
            other => SpaceError::Catalog(other),
        }
    }
}

impl From<EmbeddingError> for SpaceError {
    fn from(err: EmbeddingError) -> Self {
        match err {
            EmbeddingError::InvalidHyperparameter(msg) => SpaceError::InvalidHyperparameter(msg),
            other => SpaceError::Embedding(other),
        }
    }
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Authentication failure (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Conflict (409) - e.g., session still locked
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Well-formed request with unusable content (422)
    #[error("Unprocessable: {0}")]
    Unprocessable(String),

    /// Upstream catalog failure (502)
    #[error("Bad gateway: {0}")]
    BadGateway(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<SpaceError> for ApiError {
    fn from(err: SpaceError) -> Self {
        match err {
            SpaceError::InvalidCredential => ApiError::Unauthorized("Invalid password".to_string()),
            SpaceError::ServiceAuthFailure => ApiError::Unauthorized(
                "Authentication failed, check your password".to_string(),
            ),
            SpaceError::InvalidReference(reference) => {
                ApiError::Unprocessable(format!("Invalid Spotify URI: {}", reference))
            }
            SpaceError::DuplicateReference(id) => {
                ApiError::Conflict(format!("Track already in the space: {}", id))
            }
            SpaceError::InvalidHyperparameter(msg) => ApiError::BadRequest(msg),
            SpaceError::Locked => {
                ApiError::Conflict("Session locked, enter the password first".to_string())
            }
            SpaceError::Dataset(msg) => ApiError::Unprocessable(format!("Data corrupted: {}", msg)),
            SpaceError::Catalog(err) => ApiError::BadGateway(err.to_string()),
            SpaceError::Embedding(err) => ApiError::Unprocessable(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            ApiError::Unprocessable(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "UNPROCESSABLE", msg)
            }
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, "CATALOG_ERROR", msg),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                msg,
            ),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
