//! Retry Combinator
//!
//! Re-runs a failing operation with exponential backoff.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::RetryExhausted;

// == Retry Policy ==
/// How many times to try and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Wait after the first failure; doubles after each further failure
    pub base_delay: Duration,
    /// Upper bound for a single wait
    pub max_delay: Option<Duration>,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            max_delay: None,
        }
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = Some(max_delay);
        self
    }

    /// Wait after failed attempt `attempt` (0-based): `base_delay * 2^attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        let delay = self.base_delay.saturating_mul(factor);
        match self.max_delay {
            Some(max) => delay.min(max),
            None => delay,
        }
    }
}

// == With Retry ==
/// Runs `operation` until it succeeds or `policy.max_attempts` attempts fail.
///
/// The first success is returned immediately. Intermediate failures are only
/// logged; the caller sees the last one inside [`RetryExhausted`]. A policy
/// of zero attempts still runs the operation once.
pub async fn with_retry<F, Fut, T, E>(
    policy: RetryPolicy,
    mut operation: F,
) -> Result<T, RetryExhausted<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(last_error) => {
                attempt += 1;
                if attempt >= max_attempts {
                    return Err(RetryExhausted {
                        attempts: attempt,
                        last_error,
                    });
                }

                let delay = policy.delay_for(attempt - 1);
                warn!(
                    attempt,
                    max_attempts,
                    ?delay,
                    "operation failed, retrying after backoff"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
