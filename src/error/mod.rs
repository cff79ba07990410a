//! Error types for the Chronicle server application.
//!
//! Domain-specific error enums (authentication, configuration, store access)
//! are aggregated into a single [`Error`] type. All errors implement
//! `IntoResponse` for Axum and use `thiserror` for their `Display` and
//! `Error` implementations. Retry eligibility is decided from the typed
//! classification in [`retry`], never from error-message text.

pub mod auth;
pub mod config;
pub mod retry;
pub mod store;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::{
    error::{auth::AuthError, config::ConfigError, store::StoreError},
    model::api::ErrorDto,
};

/// Main error type for the Chronicle server application.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error (missing or invalid environment variables).
    #[error(transparent)]
    ConfigError(#[from] ConfigError),
    /// Authentication error (missing, malformed, or rejected bearer token).
    #[error(transparent)]
    AuthError(#[from] AuthError),
    /// Classified store error (timeout, constraint violation, transient
    /// connection failure).
    #[error(transparent)]
    StoreError(#[from] StoreError),
    /// Rejected request input; never retried, never hits the store.
    #[error("Invalid request: {0}")]
    ValidationError(String),
    /// Internal error indicating a bug in Chronicle's code.
    #[error("Internal error, this indicates a bug in Chronicle: {0:?}")]
    InternalError(String),
    /// Database error that reached a caller without store classification.
    #[error(transparent)]
    DbErr(#[from] sea_orm::DbErr),
}

/// Converts application errors into HTTP responses.
///
/// - 400 Bad Request - validation failures and rejected store input
/// - 401 Unauthorized - authentication failures
/// - 503 Service Unavailable - store unreachable or timed out after retries
/// - 500 Internal Server Error - everything else (with error logging)
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Self::ConfigError(err) => err.into_response(),
            Self::AuthError(err) => err.into_response(),
            Self::StoreError(err) => err.into_response(),
            Self::ValidationError(reason) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorDto { error: reason }),
            )
                .into_response(),
            err => InternalServerError(err).into_response(),
        }
    }
}

/// Wrapper converting any displayable error into a 500 response.
///
/// Logs the full error for debugging and returns a generic message to the
/// client to avoid leaking implementation details.
pub struct InternalServerError<E>(pub E);

impl<E: std::fmt::Display> IntoResponse for InternalServerError<E> {
    fn into_response(self) -> Response {
        tracing::error!("{}", self.0);

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorDto {
                error: "Internal server error".to_string(),
            }),
        )
            .into_response()
    }
}
