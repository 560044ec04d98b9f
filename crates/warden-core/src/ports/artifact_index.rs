//! ArtifactIndex port - read-only listing of the build store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::WardenError;

/// One build directory as seen by the listing service.
#[derive(Debug, Clone)]
pub struct ArtifactEntry {
    pub artifact: String,
    pub modified_at: DateTime<Utc>,
}

/// ArtifactIndex lists collections and the builds inside them.
///
/// Contract notes:
/// - Implementations may absorb transport failures into empty lists
///   (logged); callers treat empty as "no candidates", not as an error.
///   An `Err` from either listing call is fatal to the run in progress.
/// - Implementations may cache; the orchestrator calls
///   `invalidate_cache` after a non-dry-run pass so the next listing
///   reflects the deletions.
#[async_trait]
pub trait ArtifactIndex: Send + Sync {
    /// Names of all collections under the artifact root.
    async fn list_collections(&self) -> Result<Vec<String>, WardenError>;

    /// Builds in one collection, with modification times.
    async fn list_artifacts(&self, collection: &str) -> Result<Vec<ArtifactEntry>, WardenError>;

    /// Drop any cached listing.
    async fn invalidate_cache(&self);
}
