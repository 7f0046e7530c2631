//! ImageMetrics trait definition.
//!
//! Perceptual comparison primitives between two images addressed by URL.
//! The reqwest/img_hash implementation lives in archgen-infra; tests use
//! scripted stubs.

use archgen_types::error::MetricsError;

/// Perceptual similarity measures between two images.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait ImageMetrics: Send + Sync {
    /// Hamming distance between the perceptual hashes of the two images.
    /// 0 means perceptually identical; 64 is the maximum for a 64-bit hash.
    fn phash_distance(
        &self,
        a_url: &str,
        b_url: &str,
    ) -> impl std::future::Future<Output = Result<u32, MetricsError>> + Send;

    /// Mean structural similarity index between the two images, in
    /// `[0.0, 1.0]` (1.0 = structurally identical).
    fn ssim(
        &self,
        a_url: &str,
        b_url: &str,
    ) -> impl std::future::Future<Output = Result<f64, MetricsError>> + Send;
}
