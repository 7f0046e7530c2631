//! Generation request/response types for the external image model.
//!
//! These types model the narrow contract the pipeline depends on: one
//! prompt pair plus a seed in, one image URL plus metadata out. The
//! concrete provider lives in archgen-infra.

use serde::{Deserialize, Serialize};

/// Request to the generation backend for one composite sheet render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub negative_prompt: String,
    /// Sampler seed. Determinism of repeated renders hinges on this value
    /// being identical for "the same" design.
    pub seed: u64,
    pub width: u32,
    pub height: u32,
    /// Previous render to start from (img2img modify flow).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub init_image_url: Option<String>,
    /// Denoising strength for img2img, `0.0..=1.0`; lower preserves more
    /// of the init image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strength: Option<f64>,
}

/// Response from the generation backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub image_url: String,
    /// Seed the backend actually used (echoed back for verification).
    pub seed: u64,
    pub model: String,
    pub latency_ms: u64,
    pub trace_id: String,
}

/// Errors from generation backend operations.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("rate limited (retry after {retry_after_ms:?}ms)")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("upstream call timed out")]
    Timeout,

    #[error("upstream server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid upstream response: {0}")]
    InvalidResponse(String),
}

impl GenerationError {
    /// Whether the generation client may transparently retry this error.
    /// Only quota pushback is retried inside the client; everything else
    /// is an orchestrator-level decision.
    pub fn is_transient(&self) -> bool {
        matches!(self, GenerationError::RateLimited { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serde_skips_absent_options() {
        let req = GenerationRequest {
            prompt: "front elevation".into(),
            negative_prompt: "duplicate buildings".into(),
            seed: 123456,
            width: 1536,
            height: 1024,
            init_image_url: None,
            strength: None,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(!json.contains("init_image_url"));
        assert!(!json.contains("strength"));
    }

    #[test]
    fn test_error_display() {
        let err = GenerationError::Server {
            status: 503,
            message: "overloaded".into(),
        };
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("overloaded"));
    }

    #[test]
    fn test_only_rate_limited_is_transient() {
        assert!(GenerationError::RateLimited { retry_after_ms: Some(200) }.is_transient());
        assert!(!GenerationError::Timeout.is_transient());
        assert!(!GenerationError::Transport("reset".into()).is_transient());
    }
}
