//! Design service facade.
//!
//! The public surface callers use: create a design, modify it, read its
//! history. Thin by intent; pipeline mechanics (locks, retries, pacing)
//! live in the [`Orchestrator`], persistence behind the store traits.
//!
//! Generic over the backend, metrics, cache, and store traits so
//! archgen-core never depends on archgen-infra.

use tokio_util::sync::CancellationToken;

use archgen_types::design::{
    DesignCreated, DesignHistory, DesignId, DesignModified, ModifyRequest,
};
use archgen_types::dna::RawDesignDna;
use archgen_types::error::DesignError;

use crate::cache::ScoreCache;
use crate::drift::ImageMetrics;
use crate::generate::GenerationBackend;
use crate::orchestrator::Orchestrator;
use crate::store::{BaselineStore, HistoryRepository};

/// Service exposing the design lifecycle.
pub struct DesignService<B, M, C, S, H> {
    orchestrator: Orchestrator<B, M, C, S, H>,
}

impl<B, M, C, S, H> DesignService<B, M, C, S, H>
where
    B: GenerationBackend,
    M: ImageMetrics,
    C: ScoreCache,
    S: BaselineStore,
    H: HistoryRepository,
{
    pub fn new(orchestrator: Orchestrator<B, M, C, S, H>) -> Self {
        Self { orchestrator }
    }

    /// Create a design from raw DNA and persist its write-once baseline.
    pub async fn create_design(&self, raw: &RawDesignDna) -> Result<DesignCreated, DesignError> {
        self.orchestrator
            .create_design(raw, &CancellationToken::new())
            .await
    }

    /// Create a design, abandoning the pipeline when `cancel` fires.
    pub async fn create_design_with_cancel(
        &self,
        raw: &RawDesignDna,
        cancel: &CancellationToken,
    ) -> Result<DesignCreated, DesignError> {
        self.orchestrator.create_design(raw, cancel).await
    }

    /// Apply a modification to an existing design.
    pub async fn modify_design(
        &self,
        request: &ModifyRequest,
    ) -> Result<DesignModified, DesignError> {
        self.orchestrator
            .modify_design(request, &CancellationToken::new())
            .await
    }

    /// Apply a modification, abandoning the pipeline when `cancel` fires.
    /// A result already rendered upstream is discarded, never persisted.
    pub async fn modify_design_with_cancel(
        &self,
        request: &ModifyRequest,
        cancel: &CancellationToken,
    ) -> Result<DesignModified, DesignError> {
        self.orchestrator.modify_design(request, cancel).await
    }

    /// Baseline plus append-only version list for one design.
    pub async fn get_design_history(
        &self,
        design_id: &DesignId,
    ) -> Result<DesignHistory, DesignError> {
        self.orchestrator.get_design_history(design_id).await
    }

    /// All design ids with recorded history, oldest first.
    pub async fn list_designs(&self) -> Result<Vec<DesignId>, DesignError> {
        self.orchestrator.list_designs().await
    }
}
