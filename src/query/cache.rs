//! Bounded in-memory cache of completed gateway calls.

use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use lru::LruCache;

use crate::search::{Operation, SearchResult};

/// `(operation, exact query string)`
pub type CacheKey = (Operation, String);

/// How a cached entry can be used
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup<'a> {
    /// Nothing cached for that key
    Miss,
    /// Cached and still fresh: no need to ask again
    Fresh(&'a [SearchResult]),
    /// Cached but old: show it, and refresh
    Stale(&'a [SearchResult]),
}

struct CacheEntry {
    results: Vec<SearchResult>,
    fetched_at: Instant,
}

/// Append/overwrite-only cache; the least recently used entry is evicted when full
pub struct ResultCache {
    entries: LruCache<CacheKey, CacheEntry>,
    stale_after: Duration,
}

impl ResultCache {
    /// Creates a cache holding up to `capacity` entries (at least one), fresh for `stale_after`
    pub fn new(capacity: usize, stale_after: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
            stale_after,
        }
    }

    /// Looks up a key as seen at `now`
    pub fn lookup(&mut self, operation: Operation, query: &str, now: Instant) -> CacheLookup<'_> {
        let stale_after = self.stale_after;
        match self.entries.get(&(operation, query.to_string())) {
            None => CacheLookup::Miss,
            Some(entry) if now.saturating_duration_since(entry.fetched_at) < stale_after => {
                CacheLookup::Fresh(&entry.results)
            }
            Some(entry) => CacheLookup::Stale(&entry.results),
        }
    }

    /// Stores (or overwrites) the results for a key
    pub fn insert(&mut self, operation: Operation, query: &str, results: Vec<SearchResult>, now: Instant) {
        self.entries.put(
            (operation, query.to_string()),
            CacheEntry {
                results,
                fetched_at: now,
            },
        );
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is cached
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::UserResult;

    fn rows() -> Vec<SearchResult> {
        vec![SearchResult::User(UserResult {
            id: "user-1".into(),
            name: "octocat".into(),
            ..Default::default()
        })]
    }

    #[test]
    fn fresh_then_stale() {
        let t0 = Instant::now();
        let mut cache = ResultCache::new(8, Duration::from_secs(60));
        assert_eq!(cache.lookup(Operation::Accounts, "octo", t0), CacheLookup::Miss);

        cache.insert(Operation::Accounts, "octo", rows(), t0);
        assert!(matches!(cache.lookup(Operation::Accounts, "octo", t0), CacheLookup::Fresh(r) if r.len() == 1));
        assert!(matches!(
            cache.lookup(Operation::Accounts, "octo", t0 + Duration::from_secs(61)),
            CacheLookup::Stale(_)
        ));
    }

    #[test]
    fn keyed_by_operation_and_exact_query() {
        let t0 = Instant::now();
        let mut cache = ResultCache::new(8, Duration::from_secs(60));
        cache.insert(Operation::Accounts, "abc", rows(), t0);
        assert_eq!(cache.lookup(Operation::Repositories, "abc", t0), CacheLookup::Miss);
        assert_eq!(cache.lookup(Operation::Accounts, "abcd", t0), CacheLookup::Miss);
        assert_eq!(cache.lookup(Operation::Accounts, "ab", t0), CacheLookup::Miss);
    }

    #[test]
    fn bounded() {
        let t0 = Instant::now();
        let mut cache = ResultCache::new(2, Duration::from_secs(60));
        cache.insert(Operation::Accounts, "one", rows(), t0);
        cache.insert(Operation::Accounts, "two", rows(), t0);
        cache.insert(Operation::Accounts, "three", rows(), t0);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.lookup(Operation::Accounts, "one", t0), CacheLookup::Miss);
    }
}
