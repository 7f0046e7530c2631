//! Pipeline engine.
//!
//! Drives the create and modify flows through the state machine in
//! [`super::state`]: build prompt, generate, validate, then accept or
//! intensify-and-retry. The engine owns the per-design in-flight locks,
//! the generation client, and the drift validator; persistence goes
//! through the [`BaselineStore`] and [`HistoryRepository`] ports.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use archgen_types::config::{ConflictPolicy, PipelineConfig};
use archgen_types::design::{
    BaselineArtifactBundle, DesignCreated, DesignHistory, DesignId, DesignModified, ModifyRequest,
    Version, VersionId,
};
use archgen_types::dna::DesignDna;
use archgen_types::dna::RawDesignDna;
use archgen_types::error::{DesignError, RepositoryError};
use archgen_types::generation::{GenerationError, GenerationRequest};

use crate::cache::ScoreCache;
use crate::dna::{dna_hash, normalize, short_hash};
use crate::drift::{DriftValidator, ImageMetrics};
use crate::generate::{GenerationBackend, GenerationClient};
use crate::layout::LayoutConfig;
use crate::prompt::{PromptBuilder, PromptBundle, PromptMode, intensify, with_consistency_lock};
use crate::seed::{SHEET_PANEL_KEY, derive_seed};
use crate::store::{BaselineStore, HistoryRepository};

use super::state::{PipelineEvent, PipelineState, transition};

/// Denoising strength for modify renders seeded from the reference image.
/// Low enough that frozen panels survive, high enough to apply the delta.
const MODIFY_STRENGTH: f64 = 0.35;

/// Keyword groups inferred from free-text deltas. A delta mentioning any
/// keyword declares the group as a modification target, the same as the
/// matching quick toggle.
const GROUP_KEYWORDS: &[(&str, &[&str])] = &[
    ("materials", &["material", "brick", "render", "cladding", "facade color", "paint"]),
    ("roof", &["roof", "pitch", "gable", "hip", "mansard"]),
    ("openings", &["window", "door", "opening", "glazing"]),
    ("dimensions", &["floor", "storey", "story", "height", "width", "length", "taller", "wider"]),
];

/// The pipeline engine: one instance per process, shared across calls.
pub struct Orchestrator<B, M, C, S, H> {
    client: GenerationClient<B>,
    validator: DriftValidator<M, C>,
    baselines: S,
    history: H,
    config: PipelineConfig,
    layout: LayoutConfig,
    /// Per-design in-flight locks. An entry outlives its operation; the
    /// map grows with the number of distinct designs touched, not calls.
    in_flight: DashMap<DesignId, Arc<Mutex<()>>>,
}

impl<B, M, C, S, H> Orchestrator<B, M, C, S, H>
where
    B: GenerationBackend,
    M: ImageMetrics,
    C: ScoreCache,
    S: BaselineStore,
    H: HistoryRepository,
{
    pub fn new(backend: B, metrics: M, cache: C, baselines: S, history: H, config: PipelineConfig) -> Self {
        let client = GenerationClient::new(
            backend,
            Duration::from_millis(config.min_call_interval_ms),
            config.rate_limit_retries,
        );
        let validator = DriftValidator::new(
            metrics,
            cache,
            config.thresholds.clone(),
            Duration::from_secs(config.cache_ttl_secs),
        );
        let layout = LayoutConfig::standard(config.sheet_width, config.sheet_height);
        Self {
            client,
            validator,
            baselines,
            history,
            config,
            layout,
            in_flight: DashMap::new(),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Create a new design from raw DNA: normalize, render the composite
    /// sheet once, and persist the write-once baseline bundle.
    pub async fn create_design(
        &self,
        raw: &RawDesignDna,
        cancel: &CancellationToken,
    ) -> Result<DesignCreated, DesignError> {
        let dna = normalize(raw);
        self.layout
            .validate()
            .map_err(DesignError::Validation)?;

        let design_id = DesignId::new();
        let hash = dna_hash(&dna);
        let sheet_seed = derive_seed(dna.seed, &hash, SHEET_PANEL_KEY);

        let mut state = PipelineState::Idle;
        advance(&mut state, PipelineEvent::Start);

        let bundle = PromptBuilder::build(&dna, &self.layout, PromptMode::Create);
        advance(&mut state, PipelineEvent::PromptReady);

        tracing::info!(
            design_id = %design_id,
            dna_hash = short_hash(&dna),
            seed = dna.seed,
            backend = self.client.backend_name(),
            "creating design"
        );

        let result = self
            .generate_checked(&bundle, sheet_seed, None, cancel, &mut state)
            .await?;
        advance(&mut state, PipelineEvent::GenerationFinished);

        // No reference image exists yet, so the create flow validates
        // structure only; the first accepted render IS the reference.
        if result.image_url.is_empty() {
            advance(&mut state, PipelineEvent::Abort);
            return Err(DesignError::Upstream(GenerationError::InvalidResponse(
                "backend returned an empty image url".to_string(),
            )));
        }
        advance(&mut state, PipelineEvent::ValidationPassed);

        let baseline = BaselineArtifactBundle {
            design_id: design_id.clone(),
            baseline_image_url: result.image_url.clone(),
            baseline_dna: dna.clone(),
            consistency_locks: PromptBuilder::element_lines(&dna),
            seed: dna.seed,
            base_prompt: bundle.prompt.clone(),
            panel_coordinates: self.layout.panel_coordinates(),
            consistency_score: 1.0,
            created_at: Utc::now(),
        };

        self.baselines.create(&baseline).await.map_err(|err| match err {
            RepositoryError::Conflict(_) => DesignError::AlreadyExists(design_id.to_string()),
            other => DesignError::Repository(other),
        })?;

        tracing::info!(design_id = %design_id, image_url = %result.image_url, "baseline persisted");

        Ok(DesignCreated {
            design_id,
            image_url: result.image_url,
            seed: dna.seed,
            consistency_score: baseline.consistency_score,
        })
    }

    /// Modify an existing design: render against its frozen baseline with
    /// a consistency-locked prompt and bounded drift retries.
    pub async fn modify_design(
        &self,
        request: &ModifyRequest,
        cancel: &CancellationToken,
    ) -> Result<DesignModified, DesignError> {
        if request.delta_prompt.trim().is_empty() {
            return Err(DesignError::Validation("empty delta prompt".to_string()));
        }

        let _guard = self.acquire(&request.design_id).await?;

        let baseline = self
            .baselines
            .get(&request.design_id)
            .await?
            .ok_or_else(|| DesignError::BaselineNotFound(request.design_id.to_string()))?;

        let candidate_dna: DesignDna = match &request.updated_dna {
            Some(raw) => normalize(raw),
            None => baseline.baseline_dna.clone(),
        };

        let declared = declared_groups(request);

        // The frozen base prompt is re-paired with its deterministic
        // negative half, then locked down to the declared targets.
        let base = PromptBundle {
            prompt: baseline.base_prompt.clone(),
            negative_prompt: PromptBuilder::negative_prompt(PromptMode::Modify),
        };
        let mut bundle = with_consistency_lock(
            &base,
            &request.delta_prompt,
            request.user_prompt.as_deref(),
            &baseline.baseline_dna,
            &declared,
        );

        // Same derivation inputs as at create time, so the sampler seed is
        // bit-identical on every modification.
        let hash = dna_hash(&baseline.baseline_dna);
        let sheet_seed = derive_seed(baseline.seed, &hash, SHEET_PANEL_KEY);

        let versions = self.history.get_versions(&request.design_id).await?;
        let reference_url = versions
            .last()
            .map(|v| v.image_url.clone())
            .unwrap_or_else(|| baseline.baseline_image_url.clone());

        let mut state = PipelineState::Idle;
        advance(&mut state, PipelineEvent::Start);
        advance(&mut state, PipelineEvent::PromptReady);

        tracing::info!(
            design_id = %request.design_id,
            declared = ?declared,
            max_attempts = self.config.max_attempts,
            "modifying design"
        );

        let mut attempt = 0;
        loop {
            attempt += 1;

            let result = self
                .generate_checked(&bundle, sheet_seed, Some(reference_url.clone()), cancel, &mut state)
                .await?;
            advance(&mut state, PipelineEvent::GenerationFinished);

            let report = self
                .validator
                .validate(
                    &baseline.baseline_dna,
                    &candidate_dna,
                    &declared,
                    &reference_url,
                    &result.image_url,
                )
                .await?;

            if report.passed {
                advance(&mut state, PipelineEvent::ValidationPassed);

                let version = Version {
                    version_id: VersionId::new(),
                    prompt: bundle.prompt.clone(),
                    image_url: result.image_url.clone(),
                    seed: baseline.seed,
                    consistency_score: report.score,
                    ssim_score: report.ssim_score,
                    hash_distance: report.hash_distance,
                    drift_report: Some(report.clone()),
                    created_at: Utc::now(),
                };
                self.history.add_version(&request.design_id, &version).await?;

                tracing::info!(
                    design_id = %request.design_id,
                    version_id = %version.version_id,
                    attempt,
                    score = report.score,
                    "modification accepted"
                );

                return Ok(DesignModified {
                    version_id: version.version_id,
                    image_url: version.image_url,
                    consistency_score: report.score,
                    drift_report: version.drift_report,
                });
            }

            if attempt >= self.config.max_attempts {
                advance(&mut state, PipelineEvent::ValidationFailedFinal);
                tracing::warn!(
                    design_id = %request.design_id,
                    attempts = attempt,
                    issues = report.issues.len(),
                    "drift retries exhausted"
                );
                return Err(DesignError::DriftExceeded {
                    attempts: attempt,
                    report,
                });
            }

            advance(&mut state, PipelineEvent::ValidationFailedRetry);
            tracing::warn!(
                design_id = %request.design_id,
                attempt,
                issues = report.issues.len(),
                "drift detected, intensifying lock"
            );
            bundle = intensify(&bundle, &report.correction_hints);
            advance(&mut state, PipelineEvent::RetryPromptReady);
        }
    }

    /// Baseline plus the full append-only version list for one design.
    pub async fn get_design_history(
        &self,
        design_id: &DesignId,
    ) -> Result<DesignHistory, DesignError> {
        let baseline = self
            .baselines
            .get(design_id)
            .await?
            .ok_or_else(|| DesignError::BaselineNotFound(design_id.to_string()))?;
        let versions = self.history.get_versions(design_id).await?;
        Ok(DesignHistory { baseline, versions })
    }

    /// All design ids with recorded history, oldest first.
    pub async fn list_designs(&self) -> Result<Vec<DesignId>, DesignError> {
        Ok(self.history.list_designs().await?)
    }

    /// One upstream render with cancellation checked on both sides of the
    /// call. A cancellation observed after the call discards the result.
    async fn generate_checked(
        &self,
        bundle: &PromptBundle,
        seed: u64,
        init_image_url: Option<String>,
        cancel: &CancellationToken,
        state: &mut PipelineState,
    ) -> Result<archgen_types::generation::GenerationResult, DesignError> {
        if cancel.is_cancelled() {
            advance(state, PipelineEvent::Abort);
            return Err(DesignError::Cancelled);
        }

        let strength = init_image_url.as_ref().map(|_| MODIFY_STRENGTH);
        let request = GenerationRequest {
            prompt: bundle.prompt.clone(),
            negative_prompt: bundle.negative_prompt.clone(),
            seed,
            width: self.config.sheet_width,
            height: self.config.sheet_height,
            init_image_url,
            strength,
        };

        let result = self.client.generate(&request).await?;

        if cancel.is_cancelled() {
            advance(state, PipelineEvent::Abort);
            return Err(DesignError::Cancelled);
        }
        Ok(result)
    }

    /// Take the per-design in-flight lock according to the conflict
    /// policy. The returned guard is held for the whole operation.
    async fn acquire(
        &self,
        design_id: &DesignId,
    ) -> Result<tokio::sync::OwnedMutexGuard<()>, DesignError> {
        let lock = self
            .in_flight
            .entry(design_id.clone())
            .or_default()
            .clone();
        match self.config.conflict_policy {
            ConflictPolicy::FailFast => lock
                .try_lock_owned()
                .map_err(|_| DesignError::Busy(design_id.to_string())),
            ConflictPolicy::Queue => Ok(lock.lock_owned().await),
        }
    }
}

/// Drive one transition, logging it. The engine only emits event
/// sequences the state machine defines; an undefined transition is a bug
/// and degrades to `Failed` rather than panicking.
fn advance(state: &mut PipelineState, event: PipelineEvent) {
    match transition(*state, event) {
        Ok(next) => {
            tracing::debug!(from = %state, to = %next, ?event, "pipeline transition");
            *state = next;
        }
        Err(err) => {
            tracing::error!(%err, "undefined pipeline transition");
            *state = PipelineState::Failed;
        }
    }
}

/// Field groups a modification declares as targets: active quick toggles
/// plus groups inferred from keywords in the delta text.
fn declared_groups(request: &ModifyRequest) -> Vec<&'static str> {
    let mut groups = request.quick_toggles.declared_groups();
    let delta = request.delta_prompt.to_lowercase();
    for (group, keywords) in GROUP_KEYWORDS {
        if !groups.contains(group) && keywords.iter().any(|k| delta.contains(k)) {
            groups.push(group);
        }
    }
    groups
}
