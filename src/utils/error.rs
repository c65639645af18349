//! Error Handling Utilities
//!
//! Closed error taxonomies for the auth service and the storage seam.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Failure taxonomy for every auth-service operation.
///
/// Variants are compared structurally — never by message text — and each
/// maps to exactly one transport status code in [`IntoResponse`].
#[derive(Error, Debug)]
pub enum AuthError {
    /// Malformed or missing input
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Missing, invalid, expired or revoked credential
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// Authenticated but not authorized for the operation
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Too many attempts within the rate-limit window
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Entity absent or soft-deleted
    #[error("Not found: {0}")]
    NotFound(String),

    /// Uniqueness violation
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Password hashing failure
    #[error("Password hashing error: {0}")]
    Hashing(#[from] bcrypt::BcryptError),

    /// Unexpected storage or infrastructure failure
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for auth-service operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Failure taxonomy for the storage collaborators.
///
/// Kept separate from [`AuthError`] so store implementations stay ignorant
/// of transport semantics; the conversion below is the only mapping point.
#[derive(Error, Debug)]
pub enum StoreError {
    /// An active (non-deleted) user already holds this email
    #[error("email already registered")]
    DuplicateEmail,

    /// No matching record
    #[error("record not found")]
    NotFound,

    /// Backend failure (connection, timeout, constraint other than email)
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            other => StoreError::Backend(other.to_string()),
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => {
                AuthError::AlreadyExists("email already registered".to_string())
            }
            StoreError::NotFound => AuthError::NotFound("user not found".to_string()),
            StoreError::Backend(msg) => AuthError::Internal(msg),
        }
    }
}

/// Standard error response structure for API endpoints
#[derive(Serialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: &str, message: &str) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            AuthError::InvalidArgument(msg) => (StatusCode::BAD_REQUEST, "INVALID_ARGUMENT", msg),
            AuthError::Unauthenticated(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED", msg),
            AuthError::PermissionDenied(msg) => (StatusCode::FORBIDDEN, "PERMISSION_DENIED", msg),
            AuthError::RateLimited(msg) => (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED", msg),
            AuthError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            AuthError::AlreadyExists(msg) => (StatusCode::CONFLICT, "ALREADY_EXISTS", msg),
            AuthError::Hashing(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL",
                "password hashing error".to_string(),
            ),
            AuthError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL",
                "an internal error occurred".to_string(),
            ),
        };

        let error_response = ErrorResponse::new(error_code, &message);
        (status, Json(error_response)).into_response()
    }
}
