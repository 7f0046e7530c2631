//! TTL score cache backed by a concurrent map.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

use archgen_core::cache::ScoreCache;

/// Concurrent TTL cache for perceptual scores. Expired entries are
/// dropped lazily on read; there is no background sweeper.
#[derive(Clone, Default)]
pub struct TtlScoreCache {
    entries: Arc<DashMap<String, (f64, Instant)>>,
}

impl TtlScoreCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ScoreCache for TtlScoreCache {
    fn get(&self, key: &str) -> Option<f64> {
        // The read guard must be released before remove() touches the
        // same shard.
        if let Some(entry) = self.entries.get(key) {
            if entry.1 > Instant::now() {
                return Some(entry.0);
            }
        } else {
            return None;
        }
        self.entries.remove(key);
        None
    }

    fn put(&self, key: &str, score: f64, ttl: Duration) {
        self.entries
            .insert(key.to_string(), (score, Instant::now() + ttl));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_then_get() {
        let cache = TtlScoreCache::new();
        cache.put("ssim|a|b", 0.97, Duration::from_secs(60));
        assert_eq!(cache.get("ssim|a|b"), Some(0.97));
        assert_eq!(cache.get("ssim|a|c"), None);
    }

    #[test]
    fn test_expired_entry_is_dropped() {
        let cache = TtlScoreCache::new();
        cache.put("ssim|a|b", 0.97, Duration::ZERO);
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(cache.get("ssim|a|b"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_put_overwrites() {
        let cache = TtlScoreCache::new();
        cache.put("k", 0.5, Duration::from_secs(60));
        cache.put("k", 0.9, Duration::from_secs(60));
        assert_eq!(cache.get("k"), Some(0.9));
        assert_eq!(cache.len(), 1);
    }
}
