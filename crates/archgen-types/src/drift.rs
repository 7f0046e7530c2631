//! Drift report shapes produced by the validator.
//!
//! Drift is unintended divergence between the baseline (or previous
//! version) and a new generation, measured structurally against the DNA
//! and perceptually against the image (SSIM + perceptual hash distance).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::dna::FieldPath;

/// Tunable accept/reject thresholds for perceptual drift.
///
/// The defaults (SSIM 0.92, hash distance 15) are empirical policy values
/// carried from the source system; re-validate them when switching
/// generation backends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriftThresholds {
    #[serde(default = "default_min_ssim")]
    pub min_ssim: f64,
    #[serde(default = "default_max_hash_distance")]
    pub max_hash_distance: u32,
}

fn default_min_ssim() -> f64 {
    0.92
}

fn default_max_hash_distance() -> u32 {
    15
}

impl Default for DriftThresholds {
    fn default() -> Self {
        Self {
            min_ssim: default_min_ssim(),
            max_hash_distance: default_max_hash_distance(),
        }
    }
}

/// One detected drift violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DriftIssue {
    /// A DNA field outside the declared modification targets changed.
    StructuralChange { field: FieldPath },
    /// Structural similarity fell below the configured minimum.
    SsimBelowThreshold { ssim: f64, min_ssim: f64 },
    /// Perceptual hash distance exceeded the configured maximum.
    HashDistanceExceeded { distance: u32, max_distance: u32 },
}

impl fmt::Display for DriftIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriftIssue::StructuralChange { field } => {
                write!(f, "undeclared change to '{field}'")
            }
            DriftIssue::SsimBelowThreshold { ssim, min_ssim } => {
                write!(f, "ssim {ssim:.3} below threshold {min_ssim:.3}")
            }
            DriftIssue::HashDistanceExceeded { distance, max_distance } => {
                write!(f, "hash distance {distance} exceeds maximum {max_distance}")
            }
        }
    }
}

/// A prompt-strengthening action the orchestrator applies before a retry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CorrectionHint {
    /// Add negative-prompt terms forbidding drift of the named field.
    StrengthenNegative { field: FieldPath },
    /// Restate the frozen declaration of the named field more forcefully.
    RestateLock { field: FieldPath },
    /// Raise guidance strength so the prompt dominates the sampler.
    RaiseGuidance,
}

/// Result of one drift validation, embedded into the resulting `Version`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftReport {
    /// Composite consistency score in `[0, 1]` (1.0 = no measurable drift).
    pub score: f64,
    pub passed: bool,
    pub ssim_score: f64,
    pub hash_distance: u32,
    pub issues: Vec<DriftIssue>,
    pub retry_needed: bool,
    pub correction_hints: Vec<CorrectionHint>,
}

impl DriftReport {
    /// A passing report with no issues, for flows where perceptual
    /// comparison has no reference image (the create flow).
    pub fn clean(score: f64) -> Self {
        Self {
            score,
            passed: true,
            ssim_score: 1.0,
            hash_distance: 0,
            issues: Vec::new(),
            retry_needed: false,
            correction_hints: Vec::new(),
        }
    }
}
