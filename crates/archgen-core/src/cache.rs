//! Score cache trait.
//!
//! Perceptual scoring (SSIM in particular) is the expensive part of drift
//! validation, so results may be cached. The cache is an injected
//! interface with a TTL rather than a module-level singleton, so tests
//! can substitute deterministic or no-op implementations. Implementations
//! live in archgen-infra.

use std::time::Duration;

/// Abstraction over a TTL cache of perceptual scores, keyed by an
/// image-pair identifier.
pub trait ScoreCache: Send + Sync {
    /// Fetch a cached score, if present and not expired.
    fn get(&self, key: &str) -> Option<f64>;

    /// Store a score under `key` for at most `ttl`.
    fn put(&self, key: &str, score: f64, ttl: Duration);
}

/// Cache that stores nothing. The deterministic default for tests and for
/// pipelines where caching is not wanted.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopScoreCache;

impl ScoreCache for NoopScoreCache {
    fn get(&self, _key: &str) -> Option<f64> {
        None
    }

    fn put(&self, _key: &str, _score: f64, _ttl: Duration) {}
}
