//! Cache Module
//!
//! Provides in-memory caching with TTL expiration and LRU eviction.

mod clock;
mod entry;
mod lru;
mod named;
mod shared;
mod stats;
mod store;


// Re-export public types
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use entry::CacheEntry;
pub use named::{ArtworkCache, ConfigurationCache, NamedCaches, SearchCache};
pub use shared::SharedCache;
pub use stats::CacheStats;
pub use store::CacheStore;
