//! Baseline store and history repository trait definitions.
//!
//! Implementations live in archgen-infra (SQLite and in-memory). The
//! orchestrator never depends on which backend is active.

use archgen_types::design::{BaselineArtifactBundle, DesignId, Version, VersionId};
use archgen_types::error::RepositoryError;

/// Write-once storage for baseline artifact bundles.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait BaselineStore: Send + Sync {
    /// Atomically create the baseline for a design.
    ///
    /// Must fail with [`RepositoryError::Conflict`] when a baseline for
    /// the same design id already exists; implementations provide
    /// create-if-absent semantics, not upsert.
    fn create(
        &self,
        bundle: &BaselineArtifactBundle,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Fetch a design's baseline, if one exists.
    fn get(
        &self,
        design_id: &DesignId,
    ) -> impl std::future::Future<Output = Result<Option<BaselineArtifactBundle>, RepositoryError>> + Send;
}

/// Append-only persistence of accepted versions.
///
/// Versions are never edited or removed; the repository holds no
/// business rules.
pub trait HistoryRepository: Send + Sync {
    /// Append one accepted version to a design's history.
    fn add_version(
        &self,
        design_id: &DesignId,
        version: &Version,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// All design ids with recorded history, oldest first.
    fn list_designs(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<DesignId>, RepositoryError>> + Send;

    /// All versions of a design in append order.
    fn get_versions(
        &self,
        design_id: &DesignId,
    ) -> impl std::future::Future<Output = Result<Vec<Version>, RepositoryError>> + Send;

    /// One specific version of a design.
    fn get_version(
        &self,
        design_id: &DesignId,
        version_id: &VersionId,
    ) -> impl std::future::Future<Output = Result<Option<Version>, RepositoryError>> + Send;
}
