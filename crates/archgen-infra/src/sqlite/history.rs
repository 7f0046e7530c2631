//! SQLite history repository implementation.
//!
//! Append-only: the table sees INSERTs and SELECTs, never UPDATE or
//! DELETE. Read order is rowid, which is insertion order in SQLite.

use sqlx::Row;

use archgen_core::store::HistoryRepository;
use archgen_types::design::{DesignId, Version, VersionId};
use archgen_types::drift::DriftReport;
use archgen_types::error::RepositoryError;

use super::baseline::{format_datetime, parse_datetime};
use super::pool::DatabasePool;

/// SQLite-backed implementation of `HistoryRepository`.
pub struct SqliteHistoryRepository {
    pool: DatabasePool,
}

impl SqliteHistoryRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct VersionRow {
    version_id: String,
    prompt: String,
    image_url: String,
    seed: i64,
    consistency_score: f64,
    ssim_score: f64,
    hash_distance: i64,
    drift_report: Option<String>,
    created_at: String,
}

impl VersionRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            version_id: row.try_get("version_id")?,
            prompt: row.try_get("prompt")?,
            image_url: row.try_get("image_url")?,
            seed: row.try_get("seed")?,
            consistency_score: row.try_get("consistency_score")?,
            ssim_score: row.try_get("ssim_score")?,
            hash_distance: row.try_get("hash_distance")?,
            drift_report: row.try_get("drift_report")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_version(self) -> Result<Version, RepositoryError> {
        let version_id = self
            .version_id
            .parse::<VersionId>()
            .map_err(|e| RepositoryError::Query(format!("invalid version id: {e}")))?;

        let drift_report: Option<DriftReport> = self
            .drift_report
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(|e| RepositoryError::Query(format!("invalid report JSON: {e}")))?;

        Ok(Version {
            version_id,
            prompt: self.prompt,
            image_url: self.image_url,
            seed: self.seed as u64,
            consistency_score: self.consistency_score,
            ssim_score: self.ssim_score,
            hash_distance: self.hash_distance as u32,
            drift_report,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

impl HistoryRepository for SqliteHistoryRepository {
    async fn add_version(
        &self,
        design_id: &DesignId,
        version: &Version,
    ) -> Result<(), RepositoryError> {
        let report_json = version
            .drift_report
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        sqlx::query(
            "INSERT INTO design_versions (version_id, design_id, prompt, image_url, seed, consistency_score, ssim_score, hash_distance, drift_report, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(version.version_id.to_string())
        .bind(design_id.to_string())
        .bind(&version.prompt)
        .bind(&version.image_url)
        .bind(version.seed as i64)
        .bind(version.consistency_score)
        .bind(version.ssim_score)
        .bind(version.hash_distance as i64)
        .bind(&report_json)
        .bind(format_datetime(&version.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn list_designs(&self) -> Result<Vec<DesignId>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT design_id FROM design_versions GROUP BY design_id ORDER BY MIN(rowid)",
        )
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter()
            .map(|row| {
                let id: String = row
                    .try_get("design_id")
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                id.parse::<DesignId>()
                    .map_err(|e| RepositoryError::Query(format!("invalid design id: {e}")))
            })
            .collect()
    }

    async fn get_versions(&self, design_id: &DesignId) -> Result<Vec<Version>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM design_versions WHERE design_id = ? ORDER BY rowid")
            .bind(design_id.to_string())
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut versions = Vec::with_capacity(rows.len());
        for row in &rows {
            let version_row =
                VersionRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            versions.push(version_row.into_version()?);
        }
        Ok(versions)
    }

    async fn get_version(
        &self,
        design_id: &DesignId,
        version_id: &VersionId,
    ) -> Result<Option<Version>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM design_versions WHERE design_id = ? AND version_id = ?")
            .bind(design_id.to_string())
            .bind(version_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let version_row =
                    VersionRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(version_row.into_version()?))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::baseline::SqliteBaselineStore;
    use archgen_core::dna::normalize;
    use archgen_core::store::BaselineStore;
    use archgen_types::design::BaselineArtifactBundle;
    use archgen_types::dna::{RawDesignDna, RawNumber};
    use archgen_types::drift::DriftReport;
    use chrono::Utc;

    async fn test_pool() -> (tempfile::TempDir, DatabasePool) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
        let pool = DatabasePool::new(&url).await.unwrap();
        (dir, pool)
    }

    /// design_versions references baselines, so tests seed one first.
    async fn seeded_design(pool: &DatabasePool) -> DesignId {
        let dna = normalize(&RawDesignDna {
            project_id: Some("villa".into()),
            seed: Some(123456),
            length_m: Some(RawNumber::Number(15.0)),
            ..Default::default()
        });
        let bundle = BaselineArtifactBundle {
            design_id: DesignId::new(),
            baseline_image_url: "mem://baseline.png".into(),
            baseline_dna: dna,
            consistency_locks: Vec::new(),
            seed: 123456,
            base_prompt: "sheet".into(),
            panel_coordinates: Vec::new(),
            consistency_score: 1.0,
            created_at: Utc::now(),
        };
        SqliteBaselineStore::new(pool.clone())
            .create(&bundle)
            .await
            .unwrap();
        bundle.design_id
    }

    fn version(n: u32) -> Version {
        Version {
            version_id: VersionId::new(),
            prompt: format!("prompt {n}"),
            image_url: format!("mem://render-{n}.png"),
            seed: 123456,
            consistency_score: 0.95,
            ssim_score: 0.96,
            hash_distance: 6,
            drift_report: Some(DriftReport::clean(0.95)),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_versions_come_back_in_append_order() {
        let (_dir, pool) = test_pool().await;
        let repo = SqliteHistoryRepository::new(pool.clone());
        let design_id = seeded_design(&pool).await;

        let first = version(1);
        let second = version(2);
        repo.add_version(&design_id, &first).await.unwrap();
        repo.add_version(&design_id, &second).await.unwrap();

        let versions = repo.get_versions(&design_id).await.unwrap();
        assert_eq!(versions.len(), 2);
        assert_eq!(versions[0].version_id, first.version_id);
        assert_eq!(versions[1].version_id, second.version_id);
        assert_eq!(versions[0].prompt, "prompt 1");
    }

    #[tokio::test]
    async fn test_version_roundtrip_preserves_report() {
        let (_dir, pool) = test_pool().await;
        let repo = SqliteHistoryRepository::new(pool.clone());
        let design_id = seeded_design(&pool).await;

        let v = version(1);
        repo.add_version(&design_id, &v).await.unwrap();
        let loaded = repo
            .get_version(&design_id, &v.version_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.drift_report, v.drift_report);
        assert_eq!(loaded.seed, v.seed);
        assert_eq!(loaded.hash_distance, v.hash_distance);
    }

    #[tokio::test]
    async fn test_list_designs_ordered_by_first_version() {
        let (_dir, pool) = test_pool().await;
        let repo = SqliteHistoryRepository::new(pool.clone());
        let a = seeded_design(&pool).await;
        let b = seeded_design(&pool).await;

        repo.add_version(&b, &version(1)).await.unwrap();
        repo.add_version(&a, &version(2)).await.unwrap();
        repo.add_version(&b, &version(3)).await.unwrap();

        assert_eq!(repo.list_designs().await.unwrap(), vec![b, a]);
    }

    #[tokio::test]
    async fn test_get_version_missing_is_none() {
        let (_dir, pool) = test_pool().await;
        let repo = SqliteHistoryRepository::new(pool.clone());
        let design_id = seeded_design(&pool).await;
        assert!(
            repo.get_version(&design_id, &VersionId::new())
                .await
                .unwrap()
                .is_none()
        );
    }
}
