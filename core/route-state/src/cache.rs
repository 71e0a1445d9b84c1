//! Two-tiered cache for transient per-route state.
//!
//! Values are keyed by a bucket first (usually a route's identity) and then by
//! a property name. Buckets are created on first write and live as long as the
//! cache does; there is no eviction, expiry or removal.
//!
//! ```text
//! bucket key ──► { property name ──► value }
//! ```
//!
//! Reads test for *presence*, never for truthiness, so a stored `false`, `0`
//! or empty string comes back as stored instead of falling through to the
//! caller's default.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard};

use tracing::trace;

type Bucket<V> = HashMap<String, V>;

/// Single-owner bucket cache. Wrap in [`SharedBucketCache`] to share across threads.
#[derive(Debug, Clone)]
pub struct BucketCache<K, V> {
    buckets: HashMap<K, Bucket<V>>,
}

impl<K, V> Default for BucketCache<K, V> {
    fn default() -> Self {
        BucketCache {
            buckets: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash, V> BucketCache<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if anything was ever stashed under `bucket_key`. Never creates a bucket.
    pub fn has<Q>(&self, bucket_key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.buckets.contains_key(bucket_key)
    }

    /// Stores `value` under `(bucket_key, property)`, replacing any previous value.
    pub fn stash(&mut self, bucket_key: K, property: impl Into<String>, value: V) {
        let property = property.into();
        trace!(property = %property, "Bucket stash");
        self.buckets
            .entry(bucket_key)
            .or_default()
            .insert(property, value);
    }

    /// Borrowing read. `None` means the bucket or the property is absent.
    pub fn get<Q>(&self, bucket_key: &Q, property: &str) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.buckets
            .get(bucket_key)
            .and_then(|bucket| bucket.get(property))
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}

impl<K: Eq + Hash, V: Clone> BucketCache<K, V> {
    /// Returns the stored value, or `default` unchanged on a miss.
    ///
    /// A miss never creates a bucket.
    pub fn lookup<Q>(&self, bucket_key: &Q, property: &str, default: V) -> V
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.get(bucket_key, property) {
            Some(value) => {
                trace!(property, hit = true, "Bucket lookup");
                value.clone()
            }
            None => {
                trace!(property, hit = false, "Bucket lookup");
                default
            }
        }
    }
}

/// [`BucketCache`] behind one coarse mutex.
///
/// Critical sections are a single hash lookup or insert, so there is no finer
/// locking. Concurrent stashes to the same pair are last-write-wins; a
/// stash followed by a lookup from another thread is only ordered if the
/// caller orders it.
#[derive(Debug)]
pub struct SharedBucketCache<K, V> {
    inner: Mutex<BucketCache<K, V>>,
}

impl<K, V> Default for SharedBucketCache<K, V> {
    fn default() -> Self {
        SharedBucketCache {
            inner: Mutex::new(BucketCache::default()),
        }
    }
}

impl<K: Eq + Hash, V> SharedBucketCache<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    // Every mutation is a single insert, so a panicking holder cannot leave a
    // half-written bucket behind.
    fn guard(&self) -> MutexGuard<'_, BucketCache<K, V>> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn has<Q>(&self, bucket_key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.guard().has(bucket_key)
    }

    pub fn stash(&self, bucket_key: K, property: impl Into<String>, value: V) {
        self.guard().stash(bucket_key, property, value);
    }

    pub fn bucket_count(&self) -> usize {
        self.guard().bucket_count()
    }
}

impl<K: Eq + Hash, V: Clone> SharedBucketCache<K, V> {
    pub fn lookup<Q>(&self, bucket_key: &Q, property: &str, default: V) -> V
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.guard().lookup(bucket_key, property, default)
    }
}

impl<K, V> From<BucketCache<K, V>> for SharedBucketCache<K, V> {
    fn from(cache: BucketCache<K, V>) -> Self {
        SharedBucketCache {
            inner: Mutex::new(cache),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_miss_on_unknown_bucket_returns_default() {
        let cache: BucketCache<String, Value> = BucketCache::new();
        assert_eq!(cache.lookup("never-written", "scroll", json!(42)), json!(42));
        assert_eq!(cache.lookup("never-written", "other", Value::Null), Value::Null);
    }

    #[test]
    fn test_miss_on_unknown_property_returns_default() {
        let mut cache = BucketCache::new();
        cache.stash("posts", "scroll", 10);
        assert_eq!(cache.lookup("posts", "expanded", -1), -1);
    }

    #[test]
    fn test_stash_then_lookup_round_trips() {
        let mut cache = BucketCache::new();
        cache.stash("posts.post", "draft", json!({"title": "hello"}));
        assert_eq!(
            cache.lookup("posts.post", "draft", Value::Null),
            json!({"title": "hello"})
        );
    }

    #[test]
    fn test_stored_false_is_not_replaced_by_default() {
        let mut cache = BucketCache::new();
        cache.stash("b", "flag", false);
        assert!(!cache.lookup("b", "flag", true));
    }

    #[test]
    fn test_stored_zero_and_empty_string_are_hits() {
        let mut cache = BucketCache::new();
        cache.stash("b", "count", json!(0));
        cache.stash("b", "label", json!(""));
        cache.stash("b", "missing", Value::Null);
        assert_eq!(cache.lookup("b", "count", json!(7)), json!(0));
        assert_eq!(cache.lookup("b", "label", json!("fallback")), json!(""));
        assert_eq!(cache.lookup("b", "missing", json!("fallback")), Value::Null);
    }

    #[test]
    fn test_buckets_are_isolated() {
        let mut cache = BucketCache::new();
        cache.stash("b1", "p", "v1");
        assert_eq!(cache.lookup("b2", "p", "default"), "default");
        assert_eq!(cache.lookup("b1", "p", "default"), "v1");
    }

    #[test]
    fn test_has_does_not_create_bucket() {
        let cache: BucketCache<&str, i32> = BucketCache::new();
        assert!(!cache.has("ghost"));
        assert_eq!(cache.lookup("ghost", "p", 5), 5);
        assert!(!cache.has("ghost"));
        assert_eq!(cache.bucket_count(), 0);
    }

    #[test]
    fn test_lookup_miss_does_not_create_bucket() {
        let cache: BucketCache<&str, i32> = BucketCache::new();
        let _ = cache.lookup("ghost", "p", 1);
        assert!(!cache.has("ghost"));
    }

    #[test]
    fn test_has_is_true_once_bucket_written() {
        let mut cache = BucketCache::new();
        cache.stash("posts", "p", 1);
        assert!(cache.has("posts"));
    }

    #[test]
    fn test_second_stash_overwrites_first() {
        let mut cache = BucketCache::new();
        cache.stash("b", "p", "first");
        cache.stash("b", "p", "second");
        assert_eq!(cache.lookup("b", "p", "default"), "second");
        assert_eq!(cache.bucket_count(), 1);
    }

    #[test]
    fn test_get_borrows_without_clone() {
        let mut cache = BucketCache::new();
        cache.stash(7u64, "names", vec!["a".to_string()]);
        assert_eq!(cache.get(&7u64, "names").map(Vec::len), Some(1));
        assert!(cache.get(&8u64, "names").is_none());
    }

    #[test]
    fn test_shared_cache_last_write_wins_across_threads() {
        let cache = Arc::new(SharedBucketCache::new());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    cache.stash(format!("route-{}", i % 2), "visits", i);
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.bucket_count(), 2);
        let even = cache.lookup("route-0", "visits", -1);
        let odd = cache.lookup("route-1", "visits", -1);
        assert!([0, 2, 4, 6].contains(&even));
        assert!([1, 3, 5, 7].contains(&odd));
    }

    #[test]
    fn test_shared_cache_from_owned_keeps_contents() {
        let mut cache = BucketCache::new();
        cache.stash("b", "p", 3);
        let shared = SharedBucketCache::from(cache);
        assert!(shared.has("b"));
        assert_eq!(shared.lookup("b", "p", 0), 3);
        assert!(!shared.has("c"));
    }

    #[test]
    fn test_poisoned_lock_still_serves_reads_and_writes() {
        let cache = Arc::new(SharedBucketCache::new());
        cache.stash("b", "p", 1);

        let holder = Arc::clone(&cache);
        let result = thread::spawn(move || {
            let _guard = holder.inner.lock().unwrap();
            panic!("holder panicked with the lock held");
        })
        .join();

        assert!(result.is_err());
        assert!(cache.inner.is_poisoned());
        assert_eq!(cache.lookup("b", "p", 0), 1);
        cache.stash("b", "p", 2);
        assert_eq!(cache.lookup("b", "p", 0), 2);
        assert!(cache.has("b"));
    }
}
