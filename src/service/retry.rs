//! Retry logic with linear backoff for store operations.
//!
//! `RetryContext` executes a fallible async operation, retrying only errors
//! classified `ErrorRetryStrategy::Retry` by the typed taxonomy in
//! [`crate::error::retry`]. The delay before retry `n` is `base_delay * n`,
//! uncapped, so callers should configure `max_retries` conservatively. A
//! context holds no shared mutable state; concurrent requests each run an
//! independent retry sequence.

use std::future::Future;
use std::time::Duration;

use crate::{
    config::RetrySettings,
    error::{retry::ErrorRetryStrategy, Error},
};

pub struct RetryContext {
    /// Retries after the first attempt
    max_retries: u32,
    /// Backoff unit; the delay before retry n is `base_delay * n`
    base_delay: Duration,
}

impl RetryContext {
    pub fn new(settings: &RetrySettings) -> Self {
        Self {
            max_retries: settings.max_retries,
            base_delay: settings.base_delay,
        }
    }

    /// Executes an operation, retrying transient failures with linear backoff.
    ///
    /// The operation closure is invoked once per attempt and must build a
    /// fresh future each time. Errors classified `ErrorRetryStrategy::Fail`
    /// propagate on first occurrence; transient errors are retried up to
    /// `max_retries` times, after which the last observed error is returned.
    ///
    /// # Arguments
    /// - `description` - Human-readable description for logging (e.g.
    ///   "favorites fetch for user 7")
    /// - `operation` - Closure producing the future to run for one attempt
    pub async fn execute_with_retry<R, F, Fut>(
        &self,
        description: &str,
        operation: F,
    ) -> Result<R, Error>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<R, Error>>,
    {
        let mut attempt_count: u32 = 0;

        loop {
            tracing::debug!(
                "Processing {} (attempt {}/{})",
                description,
                attempt_count + 1,
                self.max_retries + 1
            );

            match operation().await {
                Ok(result) => {
                    tracing::debug!("Successfully processed {}", description);
                    return Ok(result);
                }
                Err(e) => match e.to_retry_strategy() {
                    ErrorRetryStrategy::Fail => {
                        tracing::error!("Permanent error for {}: {:?}", description, e);
                        return Err(e);
                    }
                    ErrorRetryStrategy::Retry => {
                        attempt_count += 1;
                        if attempt_count > self.max_retries {
                            tracing::error!(
                                "Retries ({}) exhausted for {}: {:?}",
                                self.max_retries,
                                description,
                                e
                            );
                            return Err(e);
                        }

                        let backoff = self.base_delay * attempt_count;

                        tracing::warn!(
                            "Retrying {} (retry {}/{}) after {:?}: {:?}",
                            description,
                            attempt_count,
                            self.max_retries,
                            backoff,
                            e
                        );

                        tokio::time::sleep(backoff).await;
                    }
                },
            }
        }
    }
}
