//! # CRUD Errors
//!
//! Façade-level error wrapping the query, configuration and store errors,
//! with an HTTP rendering for axum handlers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::allowed::ConfigError;
use crate::query::QueryError;
use crate::store::StoreError;

/// Result type for façade operations
pub type CrudResult<T> = Result<T, CrudError>;

/// CRUD façade errors
#[derive(Debug, Clone, Error)]
pub enum CrudError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Syntax or validation error in the request
    #[error(transparent)]
    Query(#[from] QueryError),

    /// No record with that identifier (or it failed the request filters)
    #[error("{entity} '{id}' not found")]
    NotFound { entity: String, id: String },

    /// Record body is unusable
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    // ==================
    // Server Errors (5xx)
    // ==================
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// Blocking task panicked or was cancelled
    #[error("Background task failed: {0}")]
    Task(String),
}

impl CrudError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        CrudError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> &'static str {
        match self {
            CrudError::Query(err) => err.code(),
            CrudError::NotFound { .. } => "CRUD_NOT_FOUND",
            CrudError::InvalidRecord(_) => "CRUD_INVALID_RECORD",
            CrudError::Config(err) => err.code(),
            CrudError::Store(err) => err.code(),
            CrudError::Task(_) => "CRUD_TASK_FAILED",
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            CrudError::Query(_) => StatusCode::BAD_REQUEST,
            CrudError::InvalidRecord(_) => StatusCode::BAD_REQUEST,

            // 404 Not Found
            CrudError::NotFound { .. } => StatusCode::NOT_FOUND,

            // 409 Conflict
            CrudError::Store(StoreError::DuplicateKey { .. }) => StatusCode::CONFLICT,

            // 500 Internal Server Error
            CrudError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CrudError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CrudError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
    pub status: u16,
}

impl From<&CrudError> for ErrorResponse {
    fn from(err: &CrudError) -> Self {
        Self {
            error: err.to_string(),
            code: err.code(),
            status: err.status_code().as_u16(),
        }
    }
}

impl IntoResponse for CrudError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse::from(&self));
        (status, body).into_response()
    }
}
