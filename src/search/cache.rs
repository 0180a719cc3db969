//! Bounded TTL cache for search responses.
//!
//! Process-local and non-persistent; entries live for the cache TTL or until
//! capacity eviction pushes out the oldest one. Keyed by
//! `(normalized query, limit)` so differing limits never share entries.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::models::CatalogItem;

/// Time source seam; lets tests drive TTL expiry deterministically.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock used in production.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

type CacheKey = (String, usize);

struct CacheEntry {
    items: Vec<CatalogItem>,
    stored_at: Instant,
}

/// Search result cache: TTL-bounded, capacity-bounded.
pub struct ResultCache {
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
    ttl: Duration,
    capacity: usize,
    clock: Arc<dyn Clock>,
}

impl ResultCache {
    pub fn new(ttl: Duration, capacity: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            capacity,
            clock,
        }
    }

    /// Returns a fresh entry sliced down to `limit`. Expired entries are
    /// removed on access and count as misses. An entry can hold fewer than
    /// `limit` items when the catalog itself had no more matches; that is
    /// still a hit for the limit it was computed with.
    pub fn get(&self, query_key: &str, limit: usize) -> Option<Vec<CatalogItem>> {
        let key = (query_key.to_string(), limit);
        let mut entries = self.entries.lock();
        let now = self.clock.now();
        let entry = entries.get(&key)?;
        if now.duration_since(entry.stored_at) >= self.ttl {
            entries.remove(&key);
            return None;
        }
        Some(entry.items.iter().take(limit).cloned().collect())
    }

    /// Size check, oldest-entry eviction and insert run under a single lock
    /// so concurrent writers cannot both overshoot the cap.
    pub fn put(&self, query_key: &str, limit: usize, items: Vec<CatalogItem>) {
        let key = (query_key.to_string(), limit);
        let now = self.clock.now();
        let mut entries = self.entries.lock();
        if !entries.contains_key(&key) && entries.len() >= self.capacity {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.stored_at)
                .map(|(key, _)| key.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
            }
        }
        entries.insert(key, CacheEntry { items, stored_at: now });
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::RwLock;

    /// Manually advanced clock.
    struct FakeClock {
        now: RwLock<Instant>,
    }

    impl FakeClock {
        fn new() -> Self {
            Self {
                now: RwLock::new(Instant::now()),
            }
        }

        fn advance(&self, by: Duration) {
            let mut now = self.now.write();
            *now += by;
        }
    }

    impl Clock for FakeClock {
        fn now(&self) -> Instant {
            *self.now.read()
        }
    }

    fn item(id: &str) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            name: format!("Item {}", id),
            category: None,
            height: None,
            width: None,
            length: None,
            unit: None,
            price: None,
            stock: None,
        }
    }

    fn cache_with_clock(capacity: usize) -> (ResultCache, Arc<FakeClock>) {
        let clock = Arc::new(FakeClock::new());
        let cache = ResultCache::new(Duration::from_secs(20), capacity, clock.clone());
        (cache, clock)
    }

    #[test]
    fn test_hit_and_miss() {
        let (cache, _clock) = cache_with_clock(100);
        assert!(cache.get("tabla", 50).is_none());
        cache.put("tabla", 50, vec![item("a"), item("b")]);
        let hit = cache.get("tabla", 50).unwrap();
        assert_eq!(hit.len(), 2);
        // Different limit: different key.
        assert!(cache.get("tabla", 10).is_none());
    }

    #[test]
    fn test_ttl_expiry() {
        let (cache, clock) = cache_with_clock(100);
        cache.put("tabla", 50, vec![item("a")]);
        clock.advance(Duration::from_secs(19));
        assert!(cache.get("tabla", 50).is_some());
        clock.advance(Duration::from_secs(2));
        assert!(cache.get("tabla", 50).is_none());
        // Lazy deletion dropped the expired entry.
        assert!(cache.is_empty());
    }

    #[test]
    fn test_capacity_evicts_single_oldest() {
        let (cache, clock) = cache_with_clock(100);
        for i in 0..100 {
            cache.put(&format!("q{}", i), 50, vec![item("x")]);
            clock.advance(Duration::from_millis(1));
        }
        assert_eq!(cache.len(), 100);
        cache.put("q100", 50, vec![item("x")]);
        assert_eq!(cache.len(), 100);
        // The globally-oldest entry went away; the rest survive.
        assert!(cache.get("q0", 50).is_none());
        assert!(cache.get("q1", 50).is_some());
        assert!(cache.get("q100", 50).is_some());
    }

    #[test]
    fn test_overwrite_same_key_does_not_evict() {
        let (cache, clock) = cache_with_clock(2);
        cache.put("a", 50, vec![item("1")]);
        clock.advance(Duration::from_millis(1));
        cache.put("b", 50, vec![item("2")]);
        clock.advance(Duration::from_millis(1));
        cache.put("a", 50, vec![item("3")]);
        assert_eq!(cache.len(), 2);
        assert!(cache.get("b", 50).is_some());
    }

    #[test]
    fn test_slices_to_limit() {
        let (cache, _clock) = cache_with_clock(100);
        cache.put("tabla", 3, vec![item("a"), item("b"), item("c"), item("d")]);
        let hit = cache.get("tabla", 3).unwrap();
        assert_eq!(hit.len(), 3);
    }
}
