//! Async Coordination Module
//!
//! Primitives for coordinating background fetches around the caches.
//!
//! # Primitives
//! - Suspending queue: FIFO handoff where consumers park until an item arrives
//! - `with_timeout`: race an operation against a timer, cancelling the loser
//! - `with_retry`: re-run a failing operation with exponential backoff
//! - `debounce`: collapse a burst of calls into one delayed run
//!
//! Everything here except the queue needs a tokio runtime.

mod debounce;
mod queue;
mod retry;
mod timeout;

pub use debounce::{debounce, Debouncer, Invocation};
pub use queue::SuspendingQueue;
pub use retry::{with_retry, RetryPolicy};
pub use timeout::with_timeout;
