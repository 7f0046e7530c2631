//! SQLite baseline store implementation.
//!
//! Implements `BaselineStore` from `archgen-core` using sqlx with split
//! read/write pools. The `design_id` primary key enforces the write-once
//! property at the database level; a second insert for the same design
//! surfaces as `RepositoryError::Conflict`.

use chrono::{DateTime, Utc};
use sqlx::Row;

use archgen_core::store::BaselineStore;
use archgen_types::design::{BaselineArtifactBundle, DesignId, PanelCoordinates};
use archgen_types::dna::DesignDna;
use archgen_types::error::RepositoryError;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `BaselineStore`.
pub struct SqliteBaselineStore {
    pool: DatabasePool,
}

impl SqliteBaselineStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to the domain bundle.
struct BaselineRow {
    design_id: String,
    baseline_image_url: String,
    baseline_dna: String,
    consistency_locks: String,
    seed: i64,
    base_prompt: String,
    panel_coordinates: String,
    consistency_score: f64,
    created_at: String,
}

impl BaselineRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            design_id: row.try_get("design_id")?,
            baseline_image_url: row.try_get("baseline_image_url")?,
            baseline_dna: row.try_get("baseline_dna")?,
            consistency_locks: row.try_get("consistency_locks")?,
            seed: row.try_get("seed")?,
            base_prompt: row.try_get("base_prompt")?,
            panel_coordinates: row.try_get("panel_coordinates")?,
            consistency_score: row.try_get("consistency_score")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_bundle(self) -> Result<BaselineArtifactBundle, RepositoryError> {
        let design_id = self
            .design_id
            .parse::<DesignId>()
            .map_err(|e| RepositoryError::Query(format!("invalid design id: {e}")))?;

        let baseline_dna: DesignDna = serde_json::from_str(&self.baseline_dna)
            .map_err(|e| RepositoryError::Query(format!("invalid DNA JSON: {e}")))?;

        let consistency_locks: Vec<String> = serde_json::from_str(&self.consistency_locks)
            .map_err(|e| RepositoryError::Query(format!("invalid locks JSON: {e}")))?;

        let panel_coordinates: Vec<PanelCoordinates> =
            serde_json::from_str(&self.panel_coordinates)
                .map_err(|e| RepositoryError::Query(format!("invalid panel JSON: {e}")))?;

        Ok(BaselineArtifactBundle {
            design_id,
            baseline_image_url: self.baseline_image_url,
            baseline_dna,
            consistency_locks,
            seed: self.seed as u64,
            base_prompt: self.base_prompt,
            panel_coordinates,
            consistency_score: self.consistency_score,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

pub(crate) fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

impl BaselineStore for SqliteBaselineStore {
    async fn create(&self, bundle: &BaselineArtifactBundle) -> Result<(), RepositoryError> {
        let dna_json = serde_json::to_string(&bundle.baseline_dna)
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        let locks_json = serde_json::to_string(&bundle.consistency_locks)
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        let panels_json = serde_json::to_string(&bundle.panel_coordinates)
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let result = sqlx::query(
            "INSERT INTO baselines (design_id, baseline_image_url, baseline_dna, consistency_locks, seed, base_prompt, panel_coordinates, consistency_score, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(bundle.design_id.to_string())
        .bind(&bundle.baseline_image_url)
        .bind(&dna_json)
        .bind(&locks_json)
        .bind(bundle.seed as i64)
        .bind(&bundle.base_prompt)
        .bind(&panels_json)
        .bind(bundle.consistency_score)
        .bind(format_datetime(&bundle.created_at))
        .execute(&self.pool.writer)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err))
                if db_err.message().contains("UNIQUE")
                    || db_err.message().contains("PRIMARY KEY") =>
            {
                Err(RepositoryError::Conflict(format!(
                    "baseline for design '{}' already exists",
                    bundle.design_id
                )))
            }
            Err(e) => Err(RepositoryError::Query(e.to_string())),
        }
    }

    async fn get(
        &self,
        design_id: &DesignId,
    ) -> Result<Option<BaselineArtifactBundle>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM baselines WHERE design_id = ?")
            .bind(design_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let baseline_row =
                    BaselineRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(baseline_row.into_bundle()?))
            }
            None => Ok(None),
        }
    }
}
