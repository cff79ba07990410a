use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::{error::InternalServerError, model::api::ErrorDto};

/// Classified store errors.
///
/// Raw `DbErr` values are classified at the store-adapter boundary
/// ([`crate::service::favorites::store`]) so that retry and response logic
/// never inspect error text. Only [`StoreError::Timeout`] and
/// [`StoreError::Transient`] are eligible for retry.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Store unreachable or misconfigured. Fatal, never retried.
    #[error("Store is not configured or unreachable: {0}")]
    NotConfigured(String),
    /// Referenced owner does not exist. Surfaced as rejected input.
    #[error("Referenced user does not exist")]
    ForeignKeyViolation,
    /// Item identifier fails the store's identifier format.
    #[error("Malformed item ID: {0:?}")]
    MalformedId(String),
    /// Lost an insert race for an existing `(user, kind, item)` tuple.
    ///
    /// Normalized to "already favorited" by the favorites service; reaching
    /// a response unmapped indicates a missed normalization.
    #[error("Favorite already exists")]
    UniqueViolation,
    /// Operation exceeded its deadline. Retryable.
    #[error("Store operation timed out after {0:?}")]
    Timeout(Duration),
    /// Transient connection-level failure. Retryable.
    #[error("Transient store failure: {0}")]
    Transient(String),
    /// Any other database failure (query, schema, conversion). Fatal.
    #[error("Store operation failed: {0}")]
    Fatal(String),
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        match self {
            Self::ForeignKeyViolation | Self::MalformedId(_) => {
                tracing::debug!("{}", self);

                (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorDto {
                        error: self.to_string(),
                    }),
                )
                    .into_response()
            }
            Self::NotConfigured(_) | Self::Timeout(_) | Self::Transient(_) => {
                tracing::error!("{}", self);

                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(ErrorDto {
                        error: "Store unavailable, please try again later".to_string(),
                    }),
                )
                    .into_response()
            }
            err => InternalServerError(err).into_response(),
        }
    }
}
