//! In-memory baseline store.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use archgen_core::store::BaselineStore;
use archgen_types::design::{BaselineArtifactBundle, DesignId};
use archgen_types::error::RepositoryError;

/// Concurrent in-memory implementation of `BaselineStore`. Cheap to
/// clone; clones share the same map.
#[derive(Clone, Default)]
pub struct MemoryBaselineStore {
    baselines: Arc<DashMap<DesignId, BaselineArtifactBundle>>,
}

impl MemoryBaselineStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BaselineStore for MemoryBaselineStore {
    async fn create(&self, bundle: &BaselineArtifactBundle) -> Result<(), RepositoryError> {
        // The entry API makes create-if-absent a single atomic step.
        match self.baselines.entry(bundle.design_id.clone()) {
            Entry::Occupied(_) => Err(RepositoryError::Conflict(format!(
                "baseline for design '{}' already exists",
                bundle.design_id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(bundle.clone());
                Ok(())
            }
        }
    }

    async fn get(
        &self,
        design_id: &DesignId,
    ) -> Result<Option<BaselineArtifactBundle>, RepositoryError> {
        Ok(self.baselines.get(design_id).map(|b| b.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use archgen_core::dna::normalize;
    use archgen_types::dna::RawDesignDna;
    use chrono::Utc;

    fn bundle() -> BaselineArtifactBundle {
        BaselineArtifactBundle {
            design_id: DesignId::new(),
            baseline_image_url: "mem://baseline.png".into(),
            baseline_dna: normalize(&RawDesignDna::default()),
            consistency_locks: Vec::new(),
            seed: 123456,
            base_prompt: "sheet".into(),
            panel_coordinates: Vec::new(),
            consistency_score: 1.0,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let store = MemoryBaselineStore::new();
        let b = bundle();
        store.create(&b).await.unwrap();
        assert_eq!(store.get(&b.design_id).await.unwrap().unwrap(), b);
    }

    #[tokio::test]
    async fn test_create_is_write_once() {
        let store = MemoryBaselineStore::new();
        let b = bundle();
        store.create(&b).await.unwrap();

        let mut second = b.clone();
        second.baseline_image_url = "mem://other.png".into();
        assert!(matches!(
            store.create(&second).await.unwrap_err(),
            RepositoryError::Conflict(_)
        ));
        // First write wins.
        assert_eq!(
            store.get(&b.design_id).await.unwrap().unwrap().baseline_image_url,
            "mem://baseline.png"
        );
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = MemoryBaselineStore::new();
        let clone = store.clone();
        let b = bundle();
        store.create(&b).await.unwrap();
        assert!(clone.get(&b.design_id).await.unwrap().is_some());
    }
}
