//! Shared Cache Module
//!
//! Concurrency-safe handle over a single [`CacheStore`].

use std::borrow::Borrow;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::debug;

use crate::cache::{CacheStats, CacheStore};

// == Shared Cache ==
/// Cloneable, thread-safe cache handle.
///
/// Every operation, `get` included, takes the same exclusive lock: a read
/// reorders the recency list, so it is a write as far as the store is
/// concerned. Clones share one store.
#[derive(Debug)]
pub struct SharedCache<K, V> {
    name: &'static str,
    store: Arc<Mutex<CacheStore<K, V>>>,
}

impl<K, V> Clone for SharedCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            store: Arc::clone(&self.store),
        }
    }
}

impl<K, V> SharedCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Wraps `store` under the given cache name.
    pub fn new(name: &'static str, store: CacheStore<K, V>) -> Self {
        Self {
            name,
            store: Arc::new(Mutex::new(store)),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub async fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.store.lock().await.get(key)
    }

    /// Stores a value with the cache's default TTL.
    pub async fn set(&self, key: K, value: V) {
        self.store.lock().await.set(key, value);
    }

    pub async fn set_with_ttl(&self, key: K, value: V, ttl: Duration) {
        self.store.lock().await.set_with_ttl(key, value, ttl);
    }

    pub async fn remove<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.store.lock().await.remove(key)
    }

    pub async fn clear(&self) {
        self.store.lock().await.clear();
        debug!(cache = self.name, "cache cleared");
    }

    pub async fn count(&self) -> usize {
        self.store.lock().await.count()
    }

    pub async fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.store.lock().await.contains(key)
    }

    pub async fn purge_expired(&self) -> usize {
        self.store.lock().await.purge_expired()
    }

    pub async fn stats(&self) -> CacheStats {
        self.store.lock().await.stats()
    }

    // == Get Or Insert ==
    /// Returns the cached value for `key`, fetching and storing it on a miss.
    ///
    /// The lock is released while `fetch` runs, so a slow fetch never blocks
    /// other callers. Two concurrent misses may both fetch; the later `set`
    /// wins. A failed fetch caches nothing.
    pub async fn get_or_insert_with<F, Fut, E>(&self, key: K, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key).await {
            return Ok(value);
        }

        debug!(cache = self.name, "cache miss, fetching");
        let value = fetch().await?;
        self.set(key, value.clone()).await;
        Ok(value)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;

    fn shared(capacity: usize) -> (SharedCache<String, u32>, ManualClock) {
        let clock = ManualClock::new();
        let store = CacheStore::with_clock(capacity, Duration::from_secs(60), Arc::new(clock.clone()));
        (SharedCache::new("test", store), clock)
    }

    #[tokio::test]
    async fn test_shared_forwards_operations() {
        let (cache, _) = shared(10);

        cache.set("a".to_string(), 1).await;
        assert_eq!(cache.get("a").await, Some(1));
        assert_eq!(cache.count().await, 1);
        assert!(cache.contains("a").await);

        assert!(cache.remove("a").await);
        assert!(!cache.remove("a").await);
        assert_eq!(cache.get("a").await, None);

        cache.set("b".to_string(), 2).await;
        cache.clear().await;
        assert_eq!(cache.count().await, 0);
        assert_eq!(cache.name(), "test");
    }

    #[tokio::test]
    async fn test_shared_expiry_through_handle() {
        let (cache, clock) = shared(10);

        cache
            .set_with_ttl("a".to_string(), 1, Duration::from_secs(5))
            .await;
        clock.advance(Duration::from_secs(5));

        assert_eq!(cache.count().await, 1);
        assert_eq!(cache.get("a").await, None);
        assert_eq!(cache.count().await, 0);
    }

    #[tokio::test]
    async fn test_shared_purge_expired() {
        let (cache, clock) = shared(10);

        cache
            .set_with_ttl("a".to_string(), 1, Duration::from_secs(1))
            .await;
        cache.set("b".to_string(), 2).await;
        clock.advance(Duration::from_secs(2));

        assert_eq!(cache.purge_expired().await, 1);
        assert_eq!(cache.stats().await.expirations, 1);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let (cache, _) = shared(10);
        let other = cache.clone();

        other.set("a".to_string(), 7).await;
        assert_eq!(cache.get("a").await, Some(7));
    }

    #[tokio::test]
    async fn test_get_or_insert_with_fetches_once() {
        let (cache, _) = shared(10);

        let first: Result<u32, String> = cache
            .get_or_insert_with("a".to_string(), || async { Ok(5) })
            .await;
        assert_eq!(first, Ok(5));

        let second: Result<u32, String> = cache
            .get_or_insert_with("a".to_string(), || async { Err("fetched twice".to_string()) })
            .await;
        assert_eq!(second, Ok(5));
    }

    #[tokio::test]
    async fn test_get_or_insert_with_does_not_cache_errors() {
        let (cache, _) = shared(10);

        let result: Result<u32, String> = cache
            .get_or_insert_with("a".to_string(), || async { Err("offline".to_string()) })
            .await;

        assert_eq!(result, Err("offline".to_string()));
        assert_eq!(cache.count().await, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_access_respects_capacity() {
        let (cache, _) = shared(16);

        let mut handles = Vec::new();
        for task in 0..8u32 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..200u32 {
                    let key = format!("k{}", (task * 7 + i) % 40);
                    cache.set(key.clone(), i).await;
                    let _ = cache.get(&key).await;
                    if i % 5 == 0 {
                        cache.remove(&key).await;
                    }
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert!(cache.count().await <= 16);
        cache.store.lock().await.assert_consistent();
    }
}
