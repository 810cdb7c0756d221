//! Cache Store Module
//!
//! Main cache engine combining a hash index with an arena recency list and
//! lazy TTL expiration.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::cache::lru::{RecencyList, SlotId};
use crate::cache::{CacheEntry, CacheStats, Clock, MonotonicClock};

#[derive(Debug)]
struct CacheNode<K, V> {
    key: K,
    entry: CacheEntry<V>,
}

// == Cache Store ==
/// Bounded key-value store with LRU eviction and per-entry TTL.
///
/// The index maps each key to the slot of its node in the recency list, so
/// lookups, reordering and eviction are all O(1). Expired entries are dropped
/// lazily: only when a `get` observes them, when they reach the LRU tail under
/// capacity pressure, or when [`CacheStore::purge_expired`] is called.
///
/// `get` reorders the recency list and therefore needs `&mut self`.
#[derive(Debug)]
pub struct CacheStore<K, V> {
    /// Key to recency-list slot
    index: HashMap<K, SlotId>,
    /// Nodes ordered from most to least recently used
    order: RecencyList<CacheNode<K, V>>,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    capacity: usize,
    /// TTL applied by `set`
    default_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<K, V> CacheStore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    // == Constructor ==
    /// Creates a new CacheStore with specified capacity and default TTL.
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of entries the cache can hold
    /// * `default_ttl` - TTL for entries stored through [`CacheStore::set`]
    pub fn new(capacity: usize, default_ttl: Duration) -> Self {
        Self::with_clock(capacity, default_ttl, Arc::new(MonotonicClock))
    }

    /// Creates a CacheStore that reads time from `clock`.
    pub fn with_clock(capacity: usize, default_ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            index: HashMap::new(),
            order: RecencyList::new(),
            stats: CacheStats::new(),
            capacity,
            default_ttl,
            clock,
        }
    }

    // == Get ==
    /// Retrieves a copy of the value stored under `key`.
    ///
    /// A live entry becomes the most recently used one. An expired entry is
    /// removed and reported as a miss.
    pub fn get<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now();
        let Some(&id) = self.index.get(key) else {
            self.stats.record_miss();
            return None;
        };

        let expired = self
            .order
            .get(id)
            .map_or(true, |node| node.entry.is_expired(now));
        if expired {
            self.detach(id);
            self.stats.record_expirations(1);
            self.stats.record_miss();
            self.stats.set_total_entries(self.index.len());
            debug!(occupancy = self.index.len(), "dropped expired entry on read");
            return None;
        }

        self.order.move_to_front(id);
        self.stats.record_hit();
        self.order.get(id).map(|node| node.entry.value.clone())
    }

    // == Set ==
    /// Stores a value with the default TTL.
    pub fn set(&mut self, key: K, value: V) {
        self.set_with_ttl(key, value, self.default_ttl);
    }

    /// Stores a value that expires `ttl` from now.
    ///
    /// An existing key has its value and expiry replaced and becomes the most
    /// recently used entry. A new key that pushes occupancy past capacity
    /// evicts exactly one entry, the least recently used.
    pub fn set_with_ttl(&mut self, key: K, value: V, ttl: Duration) {
        let entry = CacheEntry::new(value, self.clock.now(), ttl);

        if let Some(&id) = self.index.get(&key) {
            if let Some(node) = self.order.get_mut(id) {
                node.entry = entry;
            }
            self.order.move_to_front(id);
            return;
        }

        let id = self.order.push_front(CacheNode {
            key: key.clone(),
            entry,
        });
        self.index.insert(key, id);

        if self.index.len() > self.capacity {
            if let Some(evicted) = self.order.pop_back() {
                self.index.remove(&evicted.key);
                self.stats.record_eviction();
                debug!(
                    capacity = self.capacity,
                    "evicted least recently used entry"
                );
            }
        }

        self.stats.set_total_entries(self.index.len());
    }

    // == Remove ==
    /// Removes an entry by key, returning whether it was tracked.
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(id) = self.index.remove(key) else {
            return false;
        };
        self.order.remove(id);
        self.stats.set_total_entries(self.index.len());
        true
    }

    // == Clear ==
    /// Drops every entry. Statistics counters are kept.
    pub fn clear(&mut self) {
        self.index.clear();
        self.order.clear();
        self.stats.set_total_entries(0);
    }

    // == Count ==
    /// Returns the number of tracked entries, including expired ones not yet observed.
    pub fn count(&self) -> usize {
        self.index.len()
    }

    pub fn len(&self) -> usize {
        self.count()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Returns whether `key` holds a live entry, without touching recency.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.live_node(key).is_some()
    }

    /// Returns a copy of a live value, without touching recency or statistics.
    pub fn peek<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.live_node(key).map(|node| node.entry.value.clone())
    }

    /// Returns the remaining lifetime of a live entry.
    ///
    /// Entries that never expire report `Duration::MAX`.
    pub fn ttl_remaining<Q>(&self, key: &Q) -> Option<Duration>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now();
        self.live_node(key)
            .map(|node| node.entry.ttl_remaining(now).unwrap_or(Duration::MAX))
    }

    // == Purge Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&mut self) -> usize {
        let now = self.clock.now();
        let expired: Vec<SlotId> = self
            .order
            .iter()
            .filter(|(_, node)| node.entry.is_expired(now))
            .map(|(id, _)| id)
            .collect();

        let count = expired.len();
        for id in expired {
            self.detach(id);
        }

        if count > 0 {
            debug!(removed = count, "purged expired entries");
        }
        self.stats.record_expirations(count);
        self.stats.set_total_entries(self.index.len());
        count
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.index.len());
        stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = CacheStats::new();
        self.stats.set_total_entries(self.index.len());
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    fn live_node<Q>(&self, key: &Q) -> Option<&CacheNode<K, V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now();
        let id = *self.index.get(key)?;
        self.order
            .get(id)
            .filter(|node| !node.entry.is_expired(now))
    }

    fn detach(&mut self, id: SlotId) {
        if let Some(node) = self.order.remove(id) {
            self.index.remove(&node.key);
        }
    }

    /// Keys from most to least recently used.
    #[cfg(test)]
    pub(crate) fn keys_by_recency(&self) -> Vec<K> {
        self.order.iter().map(|(_, node)| node.key.clone()).collect()
    }

    /// Asserts that the index and the recency list describe the same nodes.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        assert_eq!(self.index.len(), self.order.len());
        assert_eq!(self.order.iter().count(), self.index.len());
        for (id, node) in self.order.iter() {
            assert_eq!(self.index.get(&node.key), Some(&id));
        }
        assert!(self.index.len() <= self.capacity);
    }
}
