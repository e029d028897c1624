//! Exponential backoff for transient HTTP failures.
//!
//! Only rate limiting (429) and network-level errors are retried. Anything
//! that would fail the same way again (404, bad JSON, bad URL) is returned on
//! the first attempt.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

/// Upper bound on a server-requested `Retry-After` wait.
pub(crate) const MAX_RETRY_AFTER_SECS: u64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first failure.
    pub max_retries: u32,
    /// Delay before retry `n` (0-based) is `backoff_base_secs * 2^n`, or the
    /// server's `Retry-After` when that is longer.
    pub backoff_base_secs: u64,
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_retries: u32, backoff_base_secs: u64) -> Self {
        Self {
            max_retries,
            backoff_base_secs,
        }
    }

    /// A policy that tries exactly once.
    #[must_use]
    pub fn none() -> Self {
        Self::new(0, 0)
    }

    fn delay_before_retry(&self, retry: u32) -> Duration {
        let factor = 1u64 << retry.min(62);
        Duration::from_secs(self.backoff_base_secs.saturating_mul(factor))
    }

    fn delay_for(&self, err: &ScraperError, retry: u32) -> Duration {
        let backoff = self.delay_before_retry(retry);
        match err {
            ScraperError::RateLimited {
                retry_after_secs, ..
            } => {
                let requested = (*retry_after_secs).min(MAX_RETRY_AFTER_SECS);
                backoff.max(Duration::from_secs(requested))
            }
            _ => backoff,
        }
    }

    /// Run `operation` until it succeeds, fails permanently, or the retry
    /// budget is spent. The last error is returned in the latter cases.
    pub(crate) async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T, ScraperError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ScraperError>>,
    {
        let mut retry = 0u32;

        loop {
            let err = match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !is_transient(&err) || retry >= self.max_retries {
                return Err(err);
            }

            let delay = self.delay_for(&err, retry);
            tracing::warn!(
                retry = retry + 1,
                max_retries = self.max_retries,
                delay_secs = delay.as_secs(),
                error = %err,
                "transient collector error; backing off"
            );
            tokio::time::sleep(delay).await;
            retry += 1;
        }
    }
}

fn is_transient(err: &ScraperError) -> bool {
    matches!(
        err,
        ScraperError::RateLimited { .. } | ScraperError::Http(_)
    )
}
