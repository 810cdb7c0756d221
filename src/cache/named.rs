//! Named Caches Module
//!
//! The application's independent cache instances, wired from [`Config`].

use std::sync::{Arc, OnceLock};

use tracing::info;

use crate::cache::{CacheStats, CacheStore, SharedCache};
use crate::config::{CacheSettings, Config};
use crate::models::{Artwork, ConfigValue, SearchResults};

pub type SearchCache = SharedCache<String, SearchResults>;
pub type ConfigurationCache = SharedCache<String, ConfigValue>;
pub type ArtworkCache = SharedCache<String, Arc<Artwork>>;

/// The search-results, configuration, and artwork caches.
///
/// Each cache has its own store and lock; nothing is shared between them.
/// Build one with [`NamedCaches::from_config`] and pass it (or the individual
/// handles) to whatever needs it.
#[derive(Debug, Clone)]
pub struct NamedCaches {
    pub search: SearchCache,
    pub configuration: ConfigurationCache,
    pub artwork: ArtworkCache,
}

impl NamedCaches {
    pub fn from_config(config: &Config) -> Self {
        Self {
            search: build("search-results", config.search),
            configuration: build("configuration", config.configuration),
            artwork: build("artwork", config.artwork),
        }
    }

    /// Process-wide instance, built from the environment on first access.
    ///
    /// Meant for the binary's composition root; library code should take a
    /// `NamedCaches` (or a single cache handle) as a parameter instead.
    pub fn global() -> &'static NamedCaches {
        static CACHES: OnceLock<NamedCaches> = OnceLock::new();
        CACHES.get_or_init(|| Self::from_config(&Config::from_env()))
    }

    /// Statistics of every cache, keyed by cache name.
    pub async fn stats(&self) -> Vec<(&'static str, CacheStats)> {
        vec![
            (self.search.name(), self.search.stats().await),
            (self.configuration.name(), self.configuration.stats().await),
            (self.artwork.name(), self.artwork.stats().await),
        ]
    }
}

fn build<V: Clone>(name: &'static str, settings: CacheSettings) -> SharedCache<String, V> {
    info!(
        cache = name,
        capacity = settings.capacity,
        default_ttl_secs = settings.default_ttl.as_secs(),
        "cache initialized"
    );
    SharedCache::new(
        name,
        CacheStore::new(settings.capacity, settings.default_ttl),
    )
}
