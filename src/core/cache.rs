// src/core/cache.rs — Process-local TTL cache fronting expensive computations
//
// Values are stored behind `Arc` and handed out shared: readers within the
// TTL see the same allocation, so they must not mutate through it (interior
// mutability in `V` would be visible to every reader).

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

struct CacheEntry<V> {
    data: Arc<V>,
    /// `None` when `now + ttl` overflows, i.e. effectively never expires.
    expiry: Option<Instant>,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        self.expiry.is_some_and(|expiry| now >= expiry)
    }
}

/// Key → (value, expiry) store. Created explicitly and injected where needed;
/// there is no global instance.
pub struct ValueCache<V> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
}

impl<V> Default for ValueCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> ValueCache<V> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    // A panic while holding the lock cannot leave a half-written entry
    // (every mutation is a single insert/remove), so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up `key`, evicting it if its TTL has elapsed.
    pub fn get(&self, key: &str) -> Option<Arc<V>> {
        let now = Instant::now();
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if !entry.is_expired(now) => Some(Arc::clone(&entry.data)),
            Some(_) => {
                entries.remove(key);
                tracing::debug!(key, "Cache entry expired");
                None
            }
            None => None,
        }
    }

    /// Store `data` under `key` for `ttl`, replacing any existing entry.
    pub fn set(&self, key: impl Into<String>, data: V, ttl: Duration) -> Arc<V> {
        let data = Arc::new(data);
        self.set_shared(key, Arc::clone(&data), ttl);
        data
    }

    pub fn set_shared(&self, key: impl Into<String>, data: Arc<V>, ttl: Duration) {
        let expiry = Instant::now().checked_add(ttl);
        self.lock().insert(key.into(), CacheEntry { data, expiry });
    }

    /// Return the cached value, or compute, store, and return it.
    ///
    /// `ttl_for` picks the lifetime from the computed value. The lock is not
    /// held while `compute` runs; concurrent misses on the same key each
    /// compute and the last write wins.
    pub async fn get_or_insert_with<F, Fut, T>(
        &self,
        key: &str,
        compute: F,
        ttl_for: T,
    ) -> Arc<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V>,
        T: FnOnce(&V) -> Duration,
    {
        if let Some(hit) = self.get(key) {
            tracing::debug!(key, "Cache hit");
            return hit;
        }
        tracing::debug!(key, "Cache miss");
        let value = compute().await;
        let ttl = ttl_for(&value);
        self.set(key, value, ttl)
    }

    pub fn invalidate(&self, key: &str) -> bool {
        self.lock().remove(key).is_some()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Drop all expired entries; returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    /// Number of stored entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_get_before_and_after_ttl() {
        let cache = ValueCache::new();
        cache.set("model:KEN", 42u32, Duration::from_millis(100));
        assert_eq!(cache.get("model:KEN").as_deref(), Some(&42));

        std::thread::sleep(Duration::from_millis(150));
        assert!(cache.get("model:KEN").is_none());
        assert!(cache.is_empty(), "expired entry should be evicted on read");
    }

    #[test]
    fn test_missing_key() {
        let cache: ValueCache<String> = ValueCache::new();
        assert!(cache.get("nope").is_none());
    }

    #[test]
    fn test_set_overwrites() {
        let cache = ValueCache::new();
        cache.set("k", "first".to_string(), Duration::from_secs(60));
        cache.set("k", "second".to_string(), Duration::from_secs(60));
        assert_eq!(cache.get("k").as_deref().map(String::as_str), Some("second"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_zero_ttl_is_immediately_expired() {
        let cache = ValueCache::new();
        cache.set("k", 1, Duration::ZERO);
        assert!(cache.get("k").is_none());
    }

    #[test]
    fn test_huge_ttl_never_expires() {
        let cache = ValueCache::new();
        cache.set("k", 1, Duration::MAX);
        assert_eq!(cache.get("k").as_deref(), Some(&1));
    }

    #[test]
    fn test_readers_share_allocation() {
        let cache = ValueCache::new();
        let stored = cache.set("k", vec![1.0, 2.0], Duration::from_secs(60));
        let read = cache.get("k").unwrap();
        assert!(Arc::ptr_eq(&stored, &read));
    }

    #[test]
    fn test_purge_and_invalidate() {
        let cache = ValueCache::new();
        cache.set("stale", 1, Duration::ZERO);
        cache.set("fresh", 2, Duration::from_secs(60));
        assert_eq!(cache.purge_expired(), 1);
        assert!(cache.invalidate("fresh"));
        assert!(!cache.invalidate("fresh"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_set_and_get() {
        let cache = Arc::new(ValueCache::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for i in 0..200 {
                        let key = format!("k{}", i % 10);
                        cache.set(key.clone(), t * 1000 + i, Duration::from_secs(60));
                        assert!(cache.get(&key).is_some());
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(cache.len(), 10);
    }

    #[tokio::test]
    async fn test_get_or_insert_with_memoizes() {
        let cache = ValueCache::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let v = cache
                .get_or_insert_with(
                    "k",
                    || async {
                        calls.fetch_add(1, Ordering::SeqCst);
                        7
                    },
                    |_| Duration::from_secs(60),
                )
                .await;
            assert_eq!(*v, 7);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_get_or_insert_with_ttl_depends_on_value() {
        let cache = ValueCache::new();
        let ttl_for = |v: &i32| {
            if *v < 0 {
                Duration::ZERO
            } else {
                Duration::from_secs(60)
            }
        };

        cache.get_or_insert_with("bad", || async { -1 }, ttl_for).await;
        cache.get_or_insert_with("good", || async { 1 }, ttl_for).await;

        assert!(cache.get("bad").is_none());
        assert_eq!(cache.get("good").as_deref(), Some(&1));
    }
}
