use sea_orm::DbErr;

use super::{store::StoreError, Error};

/// Strategy for handling errors in a retry context
pub enum ErrorRetryStrategy {
    /// Retry with backoff (transient store failures)
    Retry,
    /// Failed permanently (bad request, constraint violation, bug)
    Fail,
}

impl Error {
    /// Determine error retry strategy based upon application Error type
    pub fn to_retry_strategy(&self) -> ErrorRetryStrategy {
        match self {
            Self::StoreError(store_err) => match store_err {
                // Deadline and connection-level failures - transient, should retry
                StoreError::Timeout(_) => ErrorRetryStrategy::Retry,
                StoreError::Transient(_) => ErrorRetryStrategy::Retry,

                // Misconfiguration is permanent, retrying would hammer a store
                // that cannot answer
                StoreError::NotConfigured(_) => ErrorRetryStrategy::Fail,

                // Constraint violations and malformed input are decided by the
                // data, they will not resolve with retry
                StoreError::ForeignKeyViolation => ErrorRetryStrategy::Fail,
                StoreError::MalformedId(_) => ErrorRetryStrategy::Fail,
                StoreError::UniqueViolation => ErrorRetryStrategy::Fail,
                StoreError::Fatal(_) => ErrorRetryStrategy::Fail,
            },

            Self::DbErr(db_err) => {
                match db_err {
                    // Connection acquisition errors - transient, should retry
                    DbErr::ConnectionAcquire(_) => ErrorRetryStrategy::Retry,
                    // Connection errors - transient, should retry
                    DbErr::Conn(_) => ErrorRetryStrategy::Retry,

                    // All other database errors are permanent failures:
                    // query errors, type conversion errors, schema errors,
                    // record not found/inserted/updated
                    _ => ErrorRetryStrategy::Fail,
                }
            }

            // Configuration errors - permanent failures, won't resolve with retry
            Self::ConfigError(_) => ErrorRetryStrategy::Fail,

            // Auth errors - permanent failures (bad requests, missing data)
            Self::AuthError(_) => ErrorRetryStrategy::Fail,

            // Validation errors - permanent failures (bad input)
            Self::ValidationError(_) => ErrorRetryStrategy::Fail,

            // InternalError - permanent failures (bug within Chronicle's code)
            Self::InternalError(_) => ErrorRetryStrategy::Fail,
        }
    }
}
