//! Models Module
//!
//! Value types stored in the named caches.

mod artwork;
mod search;

pub use artwork::Artwork;
pub use search::{ResultHandle, SearchResults};

/// Opaque configuration value held by the configuration cache.
pub type ConfigValue = serde_json::Value;
