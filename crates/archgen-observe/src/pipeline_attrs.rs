//! Span attribute constants for pipeline instrumentation.
//!
//! Shared names keep create/modify/validate spans queryable with one set
//! of attribute keys across the codebase. All constants are string
//! slices usable in `tracing::span!` and `tracing::info_span!` field
//! names.
//!
//! Span naming convention: `"{operation} {design_id}"`
//! (e.g., `"modify_design 0198c6a1-..."`).

// --- Required attributes ---

/// The pipeline operation being performed (e.g., "create_design").
pub const PIPELINE_OPERATION: &str = "pipeline.operation";

/// The design the operation targets.
pub const DESIGN_ID: &str = "design.id";

// --- Recommended attributes ---

/// The version produced by an accepted modification.
pub const VERSION_ID: &str = "design.version_id";

/// The generation model requested from the backend.
pub const RENDER_MODEL: &str = "render.model";

/// The sampler seed sent with the render request.
pub const RENDER_SEED: &str = "render.seed";

/// 1-based attempt number within the bounded retry loop.
pub const RENDER_ATTEMPT: &str = "render.attempt";

/// SSIM score from drift validation.
pub const DRIFT_SSIM: &str = "drift.ssim";

/// Perceptual hash distance from drift validation.
pub const DRIFT_HASH_DISTANCE: &str = "drift.hash_distance";

/// Whether drift validation accepted the render.
pub const DRIFT_PASSED: &str = "drift.passed";

// --- Operation name values ---

/// Create flow: normalize DNA, render, persist the baseline.
pub const OP_CREATE_DESIGN: &str = "create_design";

/// Modify flow: locked render with bounded drift retries.
pub const OP_MODIFY_DESIGN: &str = "modify_design";

/// Drift validation of one candidate render.
pub const OP_VALIDATE_DRIFT: &str = "validate_drift";
