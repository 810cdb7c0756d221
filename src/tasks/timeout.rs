//! Timeout Combinator
//!
//! Races an operation against a timer.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::error::Timeout;

/// Runs `operation`, giving up after `duration`.
///
/// Whichever of the operation and the timer finishes first decides the
/// outcome and the other is dropped on the spot. On timeout the operation
/// future is dropped before the error is returned, so it makes no further
/// progress past its last suspension point.
pub async fn with_timeout<F>(duration: Duration, operation: F) -> Result<F::Output, Timeout>
where
    F: Future,
{
    match tokio::time::timeout(duration, operation).await {
        Ok(value) => Ok(value),
        Err(_) => {
            debug!(?duration, "operation timed out");
            Err(Timeout { duration })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_fast_operation_returns_value() {
        let result = with_timeout(Duration::from_secs(1), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            42
        })
        .await;

        assert_eq!(result, Ok(42));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_stops_the_operation() {
        let counter = Arc::new(AtomicU32::new(0));
        let work = {
            let counter = Arc::clone(&counter);
            async move {
                for _ in 0..100 {
                    counter.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            }
        };

        let result = with_timeout(Duration::from_millis(35), work).await;
        assert_eq!(
            result,
            Err(Timeout {
                duration: Duration::from_millis(35)
            })
        );

        let at_timeout = counter.load(Ordering::SeqCst);
        assert!(at_timeout > 0 && at_timeout < 100);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(counter.load(Ordering::SeqCst), at_timeout);
    }

    #[tokio::test(start_paused = true)]
    async fn test_operation_errors_pass_through() {
        let result: Result<Result<(), &str>, Timeout> =
            with_timeout(Duration::from_secs(1), async { Err("boom") }).await;
        assert_eq!(result, Ok(Err("boom")));
    }
}
