//! In-memory history repository.

use std::sync::Arc;
use std::sync::Mutex;

use dashmap::DashMap;

use archgen_core::store::HistoryRepository;
use archgen_types::design::{DesignId, Version, VersionId};
use archgen_types::error::RepositoryError;

/// Concurrent in-memory implementation of `HistoryRepository`. Cheap to
/// clone; clones share the same maps.
#[derive(Clone, Default)]
pub struct MemoryHistoryRepository {
    versions: Arc<DashMap<DesignId, Vec<Version>>>,
    /// Design ids in order of first recorded version.
    order: Arc<Mutex<Vec<DesignId>>>,
}

impl MemoryHistoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryRepository for MemoryHistoryRepository {
    async fn add_version(
        &self,
        design_id: &DesignId,
        version: &Version,
    ) -> Result<(), RepositoryError> {
        let mut entry = self.versions.entry(design_id.clone()).or_default();
        if entry.is_empty() {
            self.order
                .lock()
                .map_err(|_| RepositoryError::Query("order lock poisoned".to_string()))?
                .push(design_id.clone());
        }
        entry.push(version.clone());
        Ok(())
    }

    async fn list_designs(&self) -> Result<Vec<DesignId>, RepositoryError> {
        Ok(self
            .order
            .lock()
            .map_err(|_| RepositoryError::Query("order lock poisoned".to_string()))?
            .clone())
    }

    async fn get_versions(&self, design_id: &DesignId) -> Result<Vec<Version>, RepositoryError> {
        Ok(self
            .versions
            .get(design_id)
            .map(|v| v.clone())
            .unwrap_or_default())
    }

    async fn get_version(
        &self,
        design_id: &DesignId,
        version_id: &VersionId,
    ) -> Result<Option<Version>, RepositoryError> {
        Ok(self
            .versions
            .get(design_id)
            .and_then(|v| v.iter().find(|v| &v.version_id == version_id).cloned()))
    }
}
