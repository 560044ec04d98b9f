//! In-memory artifact index implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::domain::WardenError;
use crate::ports::{ArtifactEntry, ArtifactIndex};

struct IndexState {
    collections: HashMap<String, Vec<ArtifactEntry>>,
    invalidations: u64,
}

/// In-memory implementation of `ArtifactIndex` for development and tests.
///
/// Listing order is deterministic: collections sorted by name, artifacts
/// sorted by id, mirroring what the real listing service returns.
pub struct InMemoryArtifactIndex {
    state: Mutex<IndexState>,
}

impl InMemoryArtifactIndex {
    pub fn new(tree: HashMap<String, Vec<(String, DateTime<Utc>)>>) -> Self {
        let collections = tree
            .into_iter()
            .map(|(collection, artifacts)| {
                let entries = artifacts
                    .into_iter()
                    .map(|(artifact, modified_at)| ArtifactEntry {
                        artifact,
                        modified_at,
                    })
                    .collect();
                (collection, entries)
            })
            .collect();
        Self {
            state: Mutex::new(IndexState {
                collections,
                invalidations: 0,
            }),
        }
    }

    /// Remove one artifact from the fixture (mirrors a deletion on the
    /// real server).
    pub async fn remove_artifact(&self, collection: &str, artifact: &str) {
        let mut state = self.state.lock().await;
        if let Some(entries) = state.collections.get_mut(collection) {
            entries.retain(|e| e.artifact != artifact);
        }
    }

    /// How many times the cache was invalidated (test inspection).
    pub async fn invalidation_count(&self) -> u64 {
        self.state.lock().await.invalidations
    }
}

#[async_trait]
impl ArtifactIndex for InMemoryArtifactIndex {
    async fn list_collections(&self) -> Result<Vec<String>, WardenError> {
        let state = self.state.lock().await;
        let mut names: Vec<String> = state.collections.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn list_artifacts(&self, collection: &str) -> Result<Vec<ArtifactEntry>, WardenError> {
        let state = self.state.lock().await;
        let mut entries = state
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_default();
        entries.sort_by(|a, b| a.artifact.cmp(&b.artifact));
        Ok(entries)
    }

    async fn invalidate_cache(&self) {
        let mut state = self.state.lock().await;
        state.invalidations += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn listings_are_sorted() {
        let mut tree = HashMap::new();
        tree.insert(
            "zeta".to_string(),
            vec![
                ("2".to_string(), Utc::now()),
                ("1".to_string(), Utc::now()),
            ],
        );
        tree.insert("alpha".to_string(), vec![]);
        let index = InMemoryArtifactIndex::new(tree);

        assert_eq!(index.list_collections().await.unwrap(), vec!["alpha", "zeta"]);
        let artifacts = index.list_artifacts("zeta").await.unwrap();
        assert_eq!(artifacts[0].artifact, "1");
        assert_eq!(artifacts[1].artifact, "2");
    }

    #[tokio::test]
    async fn unknown_collection_lists_empty() {
        let index = InMemoryArtifactIndex::new(HashMap::new());
        assert!(index.list_artifacts("nope").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalidations_are_counted() {
        let index = InMemoryArtifactIndex::new(HashMap::new());
        index.invalidate_cache().await;
        index.invalidate_cache().await;
        assert_eq!(index.invalidation_count().await, 2);
    }
}
