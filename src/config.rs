//! Configuration Module
//!
//! Handles loading the named cache settings from environment variables.

use std::env;
use std::time::Duration;

/// Capacity and default TTL of one named cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    /// Maximum number of entries the cache can hold
    pub capacity: usize,
    /// TTL for entries stored without an explicit one
    pub default_ttl: Duration,
}

impl CacheSettings {
    pub const fn new(capacity: usize, default_ttl_secs: u64) -> Self {
        Self {
            capacity,
            default_ttl: Duration::from_secs(default_ttl_secs),
        }
    }

    // Reads `<prefix>_CAPACITY` and `<prefix>_TTL`, falling back to `defaults`.
    fn from_lookup<L>(lookup: &L, prefix: &str, defaults: Self) -> Self
    where
        L: Fn(&str) -> Option<String>,
    {
        let capacity = parse_var(lookup, &format!("{prefix}_CAPACITY")).unwrap_or(defaults.capacity);
        let default_ttl = parse_var(lookup, &format!("{prefix}_TTL"))
            .map(Duration::from_secs)
            .unwrap_or(defaults.default_ttl);
        Self {
            capacity,
            default_ttl,
        }
    }
}

/// Settings for every named cache.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Query string to search results
    pub search: CacheSettings,
    /// Setting name to configuration value
    pub configuration: CacheSettings,
    /// Source URL to processed artwork
    pub artwork: CacheSettings,
}

impl Config {
    pub const SEARCH_DEFAULTS: CacheSettings = CacheSettings::new(100, 300);
    pub const CONFIGURATION_DEFAULTS: CacheSettings = CacheSettings::new(64, 3600);
    pub const ARTWORK_DEFAULTS: CacheSettings = CacheSettings::new(200, 1800);

    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SEARCH_CACHE_CAPACITY` / `SEARCH_CACHE_TTL` (default: 100 entries, 300s)
    /// - `CONFIG_CACHE_CAPACITY` / `CONFIG_CACHE_TTL` (default: 64 entries, 3600s)
    /// - `ARTWORK_CACHE_CAPACITY` / `ARTWORK_CACHE_TTL` (default: 200 entries, 1800s)
    ///
    /// TTLs are in seconds. Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`Config::from_env`], reading variables through `lookup`.
    pub fn from_lookup<L>(lookup: L) -> Self
    where
        L: Fn(&str) -> Option<String>,
    {
        Self {
            search: CacheSettings::from_lookup(&lookup, "SEARCH_CACHE", Self::SEARCH_DEFAULTS),
            configuration: CacheSettings::from_lookup(
                &lookup,
                "CONFIG_CACHE",
                Self::CONFIGURATION_DEFAULTS,
            ),
            artwork: CacheSettings::from_lookup(&lookup, "ARTWORK_CACHE", Self::ARTWORK_DEFAULTS),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search: Self::SEARCH_DEFAULTS,
            configuration: Self::CONFIGURATION_DEFAULTS,
            artwork: Self::ARTWORK_DEFAULTS,
        }
    }
}

fn parse_var<L, T>(lookup: &L, name: &str) -> Option<T>
where
    L: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(name).and_then(|v| v.trim().parse().ok())
}
