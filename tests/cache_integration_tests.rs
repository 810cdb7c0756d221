//! Integration Tests for the cache API
//!
//! Exercises the engine and the shared handles through the public interface.

use std::sync::Arc;
use std::time::Duration;

use tunecache::cache::{CacheStore, ManualClock, SharedCache};
use tunecache::config::{CacheSettings, Config};
use tunecache::models::{Artwork, ResultHandle};
use tunecache::NamedCaches;

// == Helper Functions ==

fn store_with_clock(capacity: usize) -> (CacheStore<&'static str, i32>, ManualClock) {
    let clock = ManualClock::new();
    let store = CacheStore::with_clock(capacity, Duration::from_secs(60), Arc::new(clock.clone()));
    (store, clock)
}

// == Engine Behaviour ==

#[test]
fn test_capacity_never_exceeded() {
    let (mut store, _) = store_with_clock(3);
    let keys = ["a", "b", "c", "d", "e", "a", "f", "b"];

    for (i, key) in keys.into_iter().enumerate() {
        store.set(key, i as i32);
        assert!(store.count() <= 3);
    }
}

#[test]
fn test_round_trip_before_expiry() {
    let (mut store, clock) = store_with_clock(10);

    store.set("k", 1);
    clock.advance(Duration::from_secs(59));
    assert_eq!(store.get("k"), Some(1));
}

#[test]
fn test_expired_get_misses_and_shrinks_count() {
    let (mut store, clock) = store_with_clock(10);

    store.set_with_ttl("k", 1, Duration::from_secs(5));
    store.set("other", 2);
    clock.advance(Duration::from_secs(6));

    assert_eq!(store.count(), 2);
    assert_eq!(store.get("k"), None);
    assert_eq!(store.count(), 1);
}

#[test]
fn test_eviction_order() {
    let (mut store, _) = store_with_clock(2);

    store.set("A", 1);
    store.set("B", 2);
    store.set("C", 3);
    assert_eq!(store.get("A"), None);

    assert_eq!(store.get("B"), Some(2));
    store.set("D", 4);

    assert_eq!(store.get("C"), None);
    assert_eq!(store.get("B"), Some(2));
    assert_eq!(store.get("D"), Some(4));
    assert_eq!(store.count(), 2);
}

#[test]
fn test_removal() {
    let (mut store, _) = store_with_clock(10);

    store.set("k", 1);
    assert!(store.remove("k"));
    assert_eq!(store.get("k"), None);
    assert!(!store.remove("k"));
}

#[test]
fn test_clear() {
    let (mut store, _) = store_with_clock(10);

    for key in ["a", "b", "c"] {
        store.set(key, 0);
    }
    store.clear();

    assert_eq!(store.count(), 0);
    for key in ["a", "b", "c"] {
        assert_eq!(store.get(key), None);
    }
}

// == Shared Handles ==

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_shared_cache_under_contention() {
    let cache: SharedCache<u32, u32> = SharedCache::new("contended", CacheStore::new(32, Duration::from_secs(60)));

    let tasks: Vec<_> = (0..16u32)
        .map(|t| {
            let cache = cache.clone();
            tokio::spawn(async move {
                for i in 0..500u32 {
                    let key = (t * 31 + i) % 64;
                    cache.set(key, i).await;
                    if let Some(value) = cache.get(&key).await {
                        assert!(value < 500);
                    }
                }
            })
        })
        .collect();

    for task in tasks {
        task.await.unwrap();
    }

    let stats = cache.stats().await;
    assert!(cache.count().await <= 32);
    assert_eq!(stats.total_entries, cache.count().await);
    assert_eq!(stats.hits + stats.misses, 16 * 500);
}

#[tokio::test]
async fn test_named_caches_from_config() {
    let config = Config {
        search: CacheSettings::new(2, 300),
        ..Config::default()
    };
    let caches = NamedCaches::from_config(&config);

    for query in ["a", "b", "c"] {
        caches
            .search
            .set(query.to_string(), vec![ResultHandle::new(format!("track:{query}"))])
            .await;
    }
    assert_eq!(caches.search.count().await, 2);
    assert_eq!(caches.search.get("a").await, None);
    assert_eq!(
        caches.search.get("c").await,
        Some(vec![ResultHandle::new("track:c")])
    );

    let art = Arc::new(Artwork::new(vec![0xFF, 0xD8], "image/jpeg", 300, 300));
    caches.artwork.set("https://img/1".to_string(), Arc::clone(&art)).await;
    assert_eq!(caches.artwork.get("https://img/1").await, Some(art));
    assert_eq!(caches.search.count().await, 2);
}
