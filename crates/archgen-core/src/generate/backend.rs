//! GenerationBackend trait definition.
//!
//! This is the narrow contract the pipeline depends on: one prompt pair
//! plus a seed in, one image URL plus metadata out. Concrete providers
//! live in archgen-infra (e.g., `RestGenerationBackend`).

use archgen_types::generation::{GenerationError, GenerationRequest, GenerationResult};

/// Trait for generation model backends.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
/// Implementations perform exactly one upstream call per invocation;
/// retries of any kind are the caller's decision.
pub trait GenerationBackend: Send + Sync {
    /// Human-readable backend name (e.g., "rest", "stub").
    fn name(&self) -> &str;

    /// Render one image for the given request.
    fn generate(
        &self,
        request: &GenerationRequest,
    ) -> impl std::future::Future<Output = Result<GenerationResult, GenerationError>> + Send;
}
