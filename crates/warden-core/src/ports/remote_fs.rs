//! RemoteFs port - command execution on the file server.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::WardenError;

/// Disk usage of the filesystem holding the artifact root.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DiskUsage {
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub free_bytes: u64,
    pub usage_percent: f64,
}

/// RemoteFs runs the few filesystem operations the engine needs on the
/// remote server. Transport (SSH, agent, local exec) is the
/// implementation's business; timeouts too - the orchestrator only sees
/// `Err` and decides per call site whether that is fatal or
/// per-candidate.
#[async_trait]
pub trait RemoteFs: Send + Sync {
    /// Disk usage for the filesystem containing `root_path`.
    /// Unparseable output is an error (fatal to a run).
    async fn disk_usage(&self, root_path: &str) -> Result<DiskUsage, WardenError>;

    /// Recursive size of a directory in bytes. Implementations return
    /// `Ok(0)` when the size is unavailable (e.g. empty `du` output).
    async fn directory_size(&self, path: &str) -> Result<u64, WardenError>;

    /// Recursively delete a directory. `Ok(false)` means the command ran
    /// and reported failure (nonzero exit).
    async fn delete_directory(&self, path: &str) -> Result<bool, WardenError>;

    /// Whether a directory exists.
    async fn directory_exists(&self, path: &str) -> Result<bool, WardenError>;
}

/// Remote path of one build directory: `<root>/<collection>/<artifact>`.
pub fn artifact_path(root: &str, collection: &str, artifact: &str) -> String {
    format!("{}/{}/{}", root.trim_end_matches('/'), collection, artifact)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_path_joins_and_trims() {
        assert_eq!(
            artifact_path("/data/binaries", "app-main", "1234"),
            "/data/binaries/app-main/1234"
        );
        assert_eq!(
            artifact_path("/data/binaries/", "app-main", "1234"),
            "/data/binaries/app-main/1234"
        );
    }
}
