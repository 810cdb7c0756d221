//! Tunecache - typed in-memory caches for a music client
//!
//! Provides concurrency-safe LRU caches with per-entry TTL, plus the async
//! primitives used to fill them: a suspending queue and timeout, retry, and
//! debounce combinators.

pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use cache::{CacheStore, NamedCaches, SharedCache};
pub use config::Config;
pub use error::{Cancelled, RetryExhausted, Timeout};
