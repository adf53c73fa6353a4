//! In-memory class-division cache with TTL
//!
//! Caches the class-division map per session so filter dropdowns do not
//! refetch it on every render. Entries are keyed by session-token prefix
//! and expire after a fixed freshness window; there is no LRU or
//! size-based eviction.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use campusline_shared::ClassDivision;

/// Default cache TTL (5 minutes)
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Cache entry with expiration
#[derive(Clone)]
struct CacheEntry {
    divisions: Vec<ClassDivision>,
    expires_at: Instant,
}

impl CacheEntry {
    fn new(divisions: Vec<ClassDivision>, ttl: Duration) -> Self {
        Self {
            divisions,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() > self.expires_at
    }
}

/// Thread-safe in-memory division cache
pub struct DivisionCache {
    /// Maps session-token prefix -> cached division list
    cache: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl Default for DivisionCache {
    fn default() -> Self {
        Self::new()
    }
}

impl DivisionCache {
    /// Create a new cache with the default TTL
    pub fn new() -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
            ttl: DEFAULT_CACHE_TTL,
        }
    }

    /// Create a new cache with a custom TTL
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Get the cached division list for a session, if fresh
    pub fn get(&self, token_prefix: &str) -> Option<Vec<ClassDivision>> {
        let cache = self.cache.read().ok()?;
        let entry = cache.get(token_prefix)?;

        if entry.is_expired() {
            None
        } else {
            Some(entry.divisions.clone())
        }
    }

    /// Cache the division list for a session
    pub fn set(&self, token_prefix: &str, divisions: Vec<ClassDivision>) {
        if let Ok(mut cache) = self.cache.write() {
            cache.insert(
                token_prefix.to_string(),
                CacheEntry::new(divisions, self.ttl),
            );
        }
    }

    /// Invalidate a specific session's entry
    pub fn invalidate(&self, token_prefix: &str) {
        if let Ok(mut cache) = self.cache.write() {
            cache.remove(token_prefix);
        }
    }

    /// Clear expired entries (call periodically for memory management)
    pub fn cleanup(&self) {
        if let Ok(mut cache) = self.cache.write() {
            cache.retain(|_, entry| !entry.is_expired());
        }
    }

    /// Number of live (unexpired) entries
    pub fn len(&self) -> usize {
        self.cache
            .read()
            .map(|cache| cache.values().filter(|e| !e.is_expired()).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use campusline_shared::ClassDivisionId;
    use std::thread::sleep;

    fn division(name: &str) -> ClassDivision {
        ClassDivision {
            id: ClassDivisionId::new(),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_cache_get_set() {
        let cache = DivisionCache::new();

        assert!(cache.get("tok-aaaa").is_none());

        cache.set("tok-aaaa", vec![division("Grade 5 A")]);
        let cached = cache.get("tok-aaaa").unwrap();
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[0].name, "Grade 5 A");
    }

    #[test]
    fn test_cache_keyed_per_session() {
        let cache = DivisionCache::new();

        cache.set("tok-aaaa", vec![division("Grade 5 A")]);
        assert!(cache.get("tok-bbbb").is_none());
    }

    #[test]
    fn test_cache_expiration() {
        let cache = DivisionCache::with_ttl(Duration::from_millis(50));

        cache.set("tok-aaaa", vec![division("Grade 5 A")]);
        assert!(cache.get("tok-aaaa").is_some());

        sleep(Duration::from_millis(60));
        assert!(cache.get("tok-aaaa").is_none());
    }

    #[test]
    fn test_cache_invalidate() {
        let cache = DivisionCache::new();

        cache.set("tok-aaaa", vec![division("Grade 5 A")]);
        cache.invalidate("tok-aaaa");
        assert!(cache.get("tok-aaaa").is_none());
    }

    #[test]
    fn test_cleanup_drops_expired() {
        let cache = DivisionCache::with_ttl(Duration::from_millis(10));

        cache.set("tok-aaaa", vec![division("Grade 5 A")]);
        sleep(Duration::from_millis(20));
        cache.cleanup();
        assert!(cache.is_empty());
    }
}
