//! Pipeline configuration shapes.

use serde::{Deserialize, Serialize};

use crate::drift::DriftThresholds;

/// What happens when a second create/modify arrives for a design that
/// already has an operation in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Fail immediately with `Busy`.
    FailFast,
    /// Wait for the in-flight operation to finish, then proceed.
    Queue,
}

impl Default for ConflictPolicy {
    fn default() -> Self {
        ConflictPolicy::FailFast
    }
}

/// Tunable knobs for the generation/modification pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Maximum generation attempts per modify call before `DriftExceeded`.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default)]
    pub thresholds: DriftThresholds,

    /// Minimum interval between upstream calls, shared across all designs.
    #[serde(default = "default_min_call_interval_ms")]
    pub min_call_interval_ms: u64,

    /// Transparent retries inside the generation client when the upstream
    /// answers with a rate limit. Not a business retry.
    #[serde(default = "default_rate_limit_retries")]
    pub rate_limit_retries: u32,

    #[serde(default)]
    pub conflict_policy: ConflictPolicy,

    /// TTL for cached perceptual scores.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Composite sheet render size.
    #[serde(default = "default_sheet_width")]
    pub sheet_width: u32,
    #[serde(default = "default_sheet_height")]
    pub sheet_height: u32,
}

fn default_max_attempts() -> u32 {
    2
}

fn default_min_call_interval_ms() -> u64 {
    1_000
}

fn default_rate_limit_retries() -> u32 {
    3
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_sheet_width() -> u32 {
    1536
}

fn default_sheet_height() -> u32 {
    1024
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            thresholds: DriftThresholds::default(),
            min_call_interval_ms: default_min_call_interval_ms(),
            rate_limit_retries: default_rate_limit_retries(),
            conflict_policy: ConflictPolicy::default(),
            cache_ttl_secs: default_cache_ttl_secs(),
            sheet_width: default_sheet_width(),
            sheet_height: default_sheet_height(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.max_attempts, 2);
        assert_eq!(config.conflict_policy, ConflictPolicy::FailFast);
        assert_eq!(config.min_call_interval_ms, 1_000);
        assert!((config.thresholds.min_ssim - 0.92).abs() < f64::EPSILON);
    }

    #[test]
    fn test_deserialize_empty_uses_defaults() {
        let config: PipelineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn test_conflict_policy_serde() {
        let p: ConflictPolicy = serde_json::from_str("\"queue\"").unwrap();
        assert_eq!(p, ConflictPolicy::Queue);
        assert_eq!(serde_json::to_string(&ConflictPolicy::FailFast).unwrap(), "\"fail_fast\"");
    }
}
