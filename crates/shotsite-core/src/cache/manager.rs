use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

/// Default freshness window for cached responses.
pub const DEFAULT_TTL_SECS: i64 = 5 * 60;

#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub key: String,
    /// Payload of the `data` envelope field; `None` when the CMS sent `null`.
    pub value: Option<Value>,
    pub fetched_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.fetched_at
    }

    pub fn is_fresh(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        self.age(now) < ttl
    }
}

/// Unbounded map of query key to last good response.
#[derive(Debug)]
pub struct ResponseCache {
    entries: HashMap<String, CacheEntry>,
    ttl: Duration,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_TTL_SECS))
    }
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Entry for `key` only if it is younger than the TTL.
    pub fn fresh(&self, key: &str, now: DateTime<Utc>) -> Option<&CacheEntry> {
        self.entries.get(key).filter(|e| e.is_fresh(self.ttl, now))
    }

    /// Entry for `key` regardless of age.
    pub fn stale(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    /// Store a response, superseding any previous entry for the key.
    pub fn store(&mut self, key: &str, value: Option<Value>, now: DateTime<Utc>) {
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                key: key.to_string(),
                value,
                fetched_at: now,
            },
        );
    }

    pub fn evict(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_fresh_within_ttl() {
        let mut cache = ResponseCache::default();
        let now = Utc::now();
        cache.store("/products", Some(json!([1, 2])), now);

        assert!(cache.fresh("/products", now + Duration::minutes(4)).is_some());
        assert!(cache.fresh("/products", now + Duration::minutes(5)).is_none());
    }

    #[test]
    fn test_stale_entry_is_retained() {
        let mut cache = ResponseCache::new(Duration::seconds(1));
        let then = Utc::now() - Duration::hours(3);
        cache.store("/educators", Some(json!([])), then);

        assert!(cache.fresh("/educators", Utc::now()).is_none());
        let stale = cache.stale("/educators").expect("stale entry kept");
        assert_eq!(stale.value, Some(json!([])));
        assert!(stale.age(Utc::now()) >= Duration::hours(3));
    }

    #[test]
    fn test_store_supersedes_previous_entry() {
        let mut cache = ResponseCache::default();
        let now = Utc::now();
        cache.store("/news-page", Some(json!({"v": 1})), now);
        cache.store("/news-page", Some(json!({"v": 2})), now);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stale("/news-page").and_then(|e| e.value.clone()), Some(json!({"v": 2})));
    }

    #[test]
    fn test_evict_and_clear() {
        let mut cache = ResponseCache::default();
        let now = Utc::now();
        cache.store("/a", None, now);
        cache.store("/b", None, now);

        assert!(cache.evict("/a"));
        assert!(!cache.evict("/a"));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_null_payload_is_cached() {
        let mut cache = ResponseCache::default();
        let now = Utc::now();
        cache.store("/homepage-hero?populate=*", None, now);
        let entry = cache.fresh("/homepage-hero?populate=*", now).expect("cached");
        assert!(entry.value.is_none());
    }
}
