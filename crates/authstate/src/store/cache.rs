//! Identity-scoped value cache.
//!
//! Holds decoded values keyed by `identity:key_name`. Entries never expire;
//! they live until deleted, cleared, or (when a capacity is configured)
//! evicted as least recently used.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};

use lru::LruCache;
use parking_lot::Mutex;

use crate::identity::Identity;

/// Cache of decoded auth state values.
///
/// Safe to share between concurrent operations; the lock is only held for
/// the duration of a single map operation and never across an `.await`.
#[derive(Debug)]
pub struct KeyCache<V> {
    /// Composite key → decoded value.
    entries: Mutex<LruCache<String, V>>,
    /// Configured capacity (`None` = unbounded).
    capacity: Option<NonZeroUsize>,
    /// Cache hit counter.
    hits: AtomicU64,
    /// Cache miss counter.
    misses: AtomicU64,
    /// Bumped by every delete and clear, with the entries lock held.
    generation: AtomicU64,
}

impl<V: Clone> KeyCache<V> {
    /// Create a cache, bounded when `capacity` is set.
    pub fn new(capacity: Option<NonZeroUsize>) -> Self {
        let entries = match capacity {
            Some(cap) => LruCache::new(cap),
            None => LruCache::unbounded(),
        };
        Self {
            entries: Mutex::new(entries),
            capacity,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            generation: AtomicU64::new(0),
        }
    }

    /// Create an unbounded cache.
    pub fn unbounded() -> Self {
        Self::new(None)
    }

    /// Get a cached value.
    pub fn get(&self, identity: &Identity, key_name: &str) -> Option<V> {
        let key = identity.cache_key(key_name);
        let found = self.entries.lock().get(&key).cloned();
        match found {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        found
    }

    /// Whether a value is cached, without touching statistics or recency.
    pub fn contains(&self, identity: &Identity, key_name: &str) -> bool {
        self.entries.lock().contains(&identity.cache_key(key_name))
    }

    /// Insert or overwrite a value.
    pub fn set(&self, identity: &Identity, key_name: &str, value: V) {
        self.entries.lock().put(identity.cache_key(key_name), value);
    }

    /// Current invalidation generation.
    ///
    /// Take it before reading the backend and pass it to [`fill`](Self::fill).
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Populate the cache from a backend read started at `generation`.
    ///
    /// A value already cached (a write that committed meanwhile) wins and is
    /// returned. If a delete or clear ran since `generation` was taken, the
    /// read may describe a removed row, so nothing is inserted and `value`
    /// is handed back uncached.
    pub fn fill(&self, identity: &Identity, key_name: &str, value: V, generation: u64) -> V {
        let mut entries = self.entries.lock();
        if self.generation.load(Ordering::Acquire) != generation {
            return value;
        }
        entries
            .get_or_insert(identity.cache_key(key_name), || value)
            .clone()
    }

    /// Remove a value if present.
    pub fn delete(&self, identity: &Identity, key_name: &str) {
        let mut entries = self.entries.lock();
        entries.pop(&identity.cache_key(key_name));
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    /// Remove every entry belonging to `identity`, returning how many were removed.
    ///
    /// Matching is on the full `identity:` prefix, so `123` never clears `1234`.
    pub fn clear(&self, identity: &Identity) -> usize {
        let prefix = identity.cache_prefix();
        let mut entries = self.entries.lock();
        let doomed: Vec<String> = entries
            .iter()
            .filter(|(key, _)| key.starts_with(&prefix))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &doomed {
            entries.pop(key);
        }
        self.generation.fetch_add(1, Ordering::AcqRel);
        doomed.len()
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.len(),
            capacity: self.capacity,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl<V: Clone> Default for KeyCache<V> {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// Cache statistics.
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Number of cached entries.
    pub size: usize,
    /// Configured capacity (`None` = unbounded).
    pub capacity: Option<NonZeroUsize>,
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
}

impl CacheStats {
    /// Calculate hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> Identity {
        Identity::parse(raw).unwrap()
    }

    #[test]
    fn test_cache_basic() {
        let cache = KeyCache::unbounded();
        let alice = id("5511900000001");

        cache.set(&alice, "creds", 1u32);
        assert_eq!(cache.get(&alice, "creds"), Some(1));
        assert!(cache.contains(&alice, "creds"));

        // Overwrite is unconditional
        cache.set(&alice, "creds", 2);
        assert_eq!(cache.get(&alice, "creds"), Some(2));

        assert_eq!(cache.get(&alice, "pre-key-1"), None);
    }

    #[test]
    fn test_cache_delete_is_idempotent() {
        let cache = KeyCache::unbounded();
        let alice = id("1");

        cache.set(&alice, "session-a", "x".to_string());
        cache.delete(&alice, "session-a");
        cache.delete(&alice, "session-a");
        assert!(cache.get(&alice, "session-a").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_clear_respects_identity_boundary() {
        let cache = KeyCache::unbounded();
        let short = id("123");
        let long = id("1234");

        cache.set(&short, "creds", 1u8);
        cache.set(&short, "pre-key-1", 2);
        cache.set(&long, "creds", 3);
        cache.set(&long, "pre-key-1", 4);

        assert_eq!(cache.clear(&short), 2);
        assert!(cache.get(&short, "creds").is_none());
        assert_eq!(cache.get(&long, "creds"), Some(3));
        assert_eq!(cache.get(&long, "pre-key-1"), Some(4));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_cache_capacity_evicts_least_recent() {
        let cache = KeyCache::new(NonZeroUsize::new(2));
        let alice = id("7");

        cache.set(&alice, "a", 1u8);
        cache.set(&alice, "b", 2);
        // Touch "a" so "b" becomes least recently used
        assert_eq!(cache.get(&alice, "a"), Some(1));
        cache.set(&alice, "c", 3);

        assert_eq!(cache.len(), 2);
        assert!(!cache.contains(&alice, "b"));
        assert!(cache.contains(&alice, "a"));
        assert!(cache.contains(&alice, "c"));
    }

    #[test]
    fn test_fill_keeps_newer_write() {
        let cache = KeyCache::unbounded();
        let alice = id("3");

        let generation = cache.generation();
        cache.set(&alice, "session-a", 2u8);
        assert_eq!(cache.fill(&alice, "session-a", 1, generation), 2);
        assert_eq!(cache.get(&alice, "session-a"), Some(2));
    }

    #[test]
    fn test_fill_skipped_after_invalidation() {
        let cache = KeyCache::unbounded();
        let alice = id("3");

        let generation = cache.generation();
        cache.delete(&alice, "session-a");
        assert_eq!(cache.fill(&alice, "session-a", 1u8, generation), 1);
        assert!(!cache.contains(&alice, "session-a"));

        let generation = cache.generation();
        cache.clear(&id("4"));
        cache.fill(&alice, "session-b", 1, generation);
        assert!(!cache.contains(&alice, "session-b"));

        let generation = cache.generation();
        cache.fill(&alice, "session-b", 1, generation);
        assert!(cache.contains(&alice, "session-b"));
    }

    #[test]
    fn test_cache_stats() {
        let cache = KeyCache::unbounded();
        let alice = id("42");

        cache.set(&alice, "creds", ());

        cache.get(&alice, "creds"); // hit
        cache.get(&alice, "creds"); // hit
        cache.get(&alice, "other"); // miss

        let stats = cache.stats();
        assert_eq!(stats.size, 1);
        assert_eq!(stats.capacity, None);
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_rate() - 0.666).abs() < 0.01);
    }
}
