//! Error taxonomy for the Archgen pipeline.

use thiserror::Error;

use crate::drift::DriftReport;
use crate::generation::GenerationError;

/// Errors surfaced by the design pipeline (create/modify/history flows).
///
/// Nothing here is ever silently downgraded to a placeholder result: drift
/// failures carry the last report, validation failures carry the offending
/// field.
#[derive(Debug, Error)]
pub enum DesignError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("upstream generation failed: {0}")]
    Upstream(#[from] GenerationError),

    #[error("consistency checks failed after {attempts} attempts")]
    DriftExceeded {
        attempts: u32,
        /// The last report produced before giving up.
        report: DriftReport,
    },

    #[error("no baseline exists for design '{0}'")]
    BaselineNotFound(String),

    #[error("a baseline already exists for design '{0}'")]
    AlreadyExists(String),

    #[error("design '{0}' has an operation in flight")]
    Busy(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("storage error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("image metrics error: {0}")]
    Metrics(#[from] MetricsError),
}

/// Errors from perceptual image comparison.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("failed to fetch image '{url}': {message}")]
    Fetch { url: String, message: String },

    #[error("failed to decode image: {0}")]
    Decode(String),
}

/// Errors from store/repository operations (used by trait definitions in
/// archgen-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}
