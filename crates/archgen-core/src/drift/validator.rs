//! Drift validation policy.
//!
//! A candidate render is accepted only when BOTH checks pass:
//! - DNA-level: no field outside the modification's declared targets
//!   changed between baseline DNA and candidate DNA;
//! - image-level: `ssim >= min_ssim` AND `hash_distance <= max_distance`
//!   against the reference image.
//!
//! Rejections come back as a [`DriftReport`] naming the offending fields
//! and carrying correction hints the orchestrator uses to intensify the
//! lock on retry.

use std::time::Duration;

use archgen_types::dna::DesignDna;
use archgen_types::drift::{CorrectionHint, DriftIssue, DriftReport, DriftThresholds};
use archgen_types::error::MetricsError;

use crate::cache::ScoreCache;
use crate::dna::compare;

use super::metrics::ImageMetrics;

/// 64-bit perceptual hash, so 64 is the maximum possible distance.
const MAX_HASH_BITS: f64 = 64.0;

/// Drift validator combining the symbolic and perceptual checks.
pub struct DriftValidator<M, C> {
    metrics: M,
    cache: C,
    thresholds: DriftThresholds,
    cache_ttl: Duration,
}

impl<M: ImageMetrics, C: ScoreCache> DriftValidator<M, C> {
    pub fn new(metrics: M, cache: C, thresholds: DriftThresholds, cache_ttl: Duration) -> Self {
        Self {
            metrics,
            cache,
            thresholds,
            cache_ttl,
        }
    }

    pub fn thresholds(&self) -> &DriftThresholds {
        &self.thresholds
    }

    /// Validate a candidate render against the reference.
    ///
    /// `declared_groups` are the field groups the modification is allowed
    /// to touch; any DNA change outside them is a violation regardless of
    /// how the images compare.
    pub async fn validate(
        &self,
        baseline_dna: &DesignDna,
        candidate_dna: &DesignDna,
        declared_groups: &[&str],
        reference_image_url: &str,
        candidate_image_url: &str,
    ) -> Result<DriftReport, MetricsError> {
        let mut issues = Vec::new();
        let mut hints = Vec::new();

        // Symbolic check.
        let diff = compare(baseline_dna, candidate_dna);
        for field in diff.changed {
            if !declared_groups.contains(&field.group()) {
                hints.push(CorrectionHint::RestateLock { field: field.clone() });
                hints.push(CorrectionHint::StrengthenNegative { field: field.clone() });
                issues.push(DriftIssue::StructuralChange { field });
            }
        }

        // Perceptual check.
        let ssim = self
            .cached_ssim(reference_image_url, candidate_image_url)
            .await?;
        let hash_distance = self
            .metrics
            .phash_distance(reference_image_url, candidate_image_url)
            .await?;

        if ssim < self.thresholds.min_ssim {
            issues.push(DriftIssue::SsimBelowThreshold {
                ssim,
                min_ssim: self.thresholds.min_ssim,
            });
            hints.push(CorrectionHint::RaiseGuidance);
        }
        if hash_distance > self.thresholds.max_hash_distance {
            issues.push(DriftIssue::HashDistanceExceeded {
                distance: hash_distance,
                max_distance: self.thresholds.max_hash_distance,
            });
            if !hints.contains(&CorrectionHint::RaiseGuidance) {
                hints.push(CorrectionHint::RaiseGuidance);
            }
        }

        let passed = issues.is_empty();
        let score = composite_score(ssim, hash_distance);

        tracing::debug!(
            ssim,
            hash_distance,
            passed,
            issues = issues.len(),
            "drift validation complete"
        );

        Ok(DriftReport {
            score,
            passed,
            ssim_score: ssim,
            hash_distance,
            issues,
            retry_needed: !passed,
            correction_hints: if passed { Vec::new() } else { hints },
        })
    }

    async fn cached_ssim(&self, a: &str, b: &str) -> Result<f64, MetricsError> {
        let key = format!("ssim|{a}|{b}");
        if let Some(score) = self.cache.get(&key) {
            return Ok(score);
        }
        let score = self.metrics.ssim(a, b).await?;
        self.cache.put(&key, score, self.cache_ttl);
        Ok(score)
    }
}

/// Composite consistency score: mean of the SSIM score and the normalized
/// hash-distance score, clamped to `[0, 1]`.
fn composite_score(ssim: f64, hash_distance: u32) -> f64 {
    let hash_score = 1.0 - (hash_distance as f64 / MAX_HASH_BITS);
    ((ssim + hash_score) / 2.0).clamp(0.0, 1.0)
}
