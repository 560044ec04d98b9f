//! Simulated remote file server.
//!
//! Models the build store as a path -> size map on a disk of fixed
//! capacity. Deleting a directory frees its bytes, so the usage the
//! orchestrator re-polls during a run actually falls as it deletes -
//! which is what makes the target-threshold early exit exercisable
//! without a real server. Failures are scriptable per path.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::WardenError;
use crate::ports::{DiskUsage, RemoteFs};

struct SimState {
    total_bytes: u64,
    used_bytes: u64,
    dirs: HashMap<String, u64>,
    fail_deletes: HashSet<String>,
    fail_disk_usage: bool,
    fail_disk_usage_after: Option<u64>,
    disk_usage_calls: u64,
    disk_usage_delay: Option<Duration>,
}

pub struct SimRemoteFs {
    state: Mutex<SimState>,
}

impl SimRemoteFs {
    /// `base_used_bytes` is space consumed outside the build directories
    /// (never freed by deletions).
    pub fn new(total_bytes: u64, base_used_bytes: u64) -> Self {
        Self {
            state: Mutex::new(SimState {
                total_bytes,
                used_bytes: base_used_bytes,
                dirs: HashMap::new(),
                fail_deletes: HashSet::new(),
                fail_disk_usage: false,
                fail_disk_usage_after: None,
                disk_usage_calls: 0,
                disk_usage_delay: None,
            }),
        }
    }

    pub async fn add_directory(&self, path: impl Into<String>, size_bytes: u64) {
        let mut state = self.state.lock().await;
        state.used_bytes += size_bytes;
        state.dirs.insert(path.into(), size_bytes);
    }

    /// Make `delete_directory` report failure for this path.
    pub async fn fail_delete_on(&self, path: impl Into<String>) {
        self.state.lock().await.fail_deletes.insert(path.into());
    }

    /// Make `disk_usage` fail until switched back off.
    pub async fn set_disk_usage_failure(&self, fail: bool) {
        self.state.lock().await.fail_disk_usage = fail;
    }

    /// Make `disk_usage` fail after `n` more successful calls.
    pub async fn fail_disk_usage_after(&self, n: u64) {
        let mut state = self.state.lock().await;
        state.fail_disk_usage_after = Some(state.disk_usage_calls + n);
    }

    /// Delay every `disk_usage` call (models a slow remote).
    pub async fn set_disk_usage_delay(&self, delay: Duration) {
        self.state.lock().await.disk_usage_delay = Some(delay);
    }

    pub async fn usage_percent(&self) -> f64 {
        let state = self.state.lock().await;
        state.used_bytes as f64 / state.total_bytes as f64 * 100.0
    }
}

#[async_trait]
impl RemoteFs for SimRemoteFs {
    async fn disk_usage(&self, _root_path: &str) -> Result<DiskUsage, WardenError> {
        let delay = self.state.lock().await.disk_usage_delay;
        if let Some(delay) = delay {
            // Sleep outside the lock so pollers are not blocked with us.
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock().await;
        state.disk_usage_calls += 1;
        let failing = state.fail_disk_usage
            || state
                .fail_disk_usage_after
                .is_some_and(|limit| state.disk_usage_calls > limit);
        if failing {
            return Err(WardenError::DiskUsage("simulated df failure".to_string()));
        }
        Ok(DiskUsage {
            total_bytes: state.total_bytes,
            used_bytes: state.used_bytes,
            free_bytes: state.total_bytes - state.used_bytes,
            usage_percent: state.used_bytes as f64 / state.total_bytes as f64 * 100.0,
        })
    }

    async fn directory_size(&self, path: &str) -> Result<u64, WardenError> {
        let state = self.state.lock().await;
        Ok(state.dirs.get(path).copied().unwrap_or(0))
    }

    async fn delete_directory(&self, path: &str) -> Result<bool, WardenError> {
        let mut state = self.state.lock().await;
        if state.fail_deletes.contains(path) {
            return Ok(false);
        }
        if let Some(size) = state.dirs.remove(path) {
            state.used_bytes -= size;
        }
        // rm -rf on a missing path still exits 0
        Ok(true)
    }

    async fn directory_exists(&self, path: &str) -> Result<bool, WardenError> {
        let state = self.state.lock().await;
        Ok(state.dirs.contains_key(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn deleting_frees_bytes_and_lowers_usage() {
        let remote = SimRemoteFs::new(1000, 500);
        remote.add_directory("/data/binaries/app/1", 300).await;

        let before = remote.disk_usage("/data/binaries").await.unwrap();
        assert_eq!(before.used_bytes, 800);
        assert_eq!(before.usage_percent, 80.0);

        assert!(remote.delete_directory("/data/binaries/app/1").await.unwrap());

        let after = remote.disk_usage("/data/binaries").await.unwrap();
        assert_eq!(after.used_bytes, 500);
        assert_eq!(after.usage_percent, 50.0);
        assert!(!remote.directory_exists("/data/binaries/app/1").await.unwrap());
    }

    #[tokio::test]
    async fn scripted_delete_failure_keeps_bytes() {
        let remote = SimRemoteFs::new(1000, 0);
        remote.add_directory("/data/binaries/app/1", 100).await;
        remote.fail_delete_on("/data/binaries/app/1").await;

        assert!(!remote.delete_directory("/data/binaries/app/1").await.unwrap());
        assert_eq!(remote.disk_usage("/").await.unwrap().used_bytes, 100);
        assert!(remote.directory_exists("/data/binaries/app/1").await.unwrap());
    }

    #[tokio::test]
    async fn disk_usage_failure_is_an_error() {
        let remote = SimRemoteFs::new(1000, 0);
        remote.set_disk_usage_failure(true).await;
        assert!(remote.disk_usage("/").await.is_err());

        remote.set_disk_usage_failure(false).await;
        assert!(remote.disk_usage("/").await.is_ok());
    }

    #[tokio::test]
    async fn disk_usage_can_fail_after_n_calls() {
        let remote = SimRemoteFs::new(1000, 0);
        remote.fail_disk_usage_after(2).await;

        assert!(remote.disk_usage("/").await.is_ok());
        assert!(remote.disk_usage("/").await.is_ok());
        assert!(remote.disk_usage("/").await.is_err());
        assert!(remote.disk_usage("/").await.is_err());
    }

    #[tokio::test]
    async fn missing_directory_sizes_to_zero() {
        let remote = SimRemoteFs::new(1000, 0);
        assert_eq!(remote.directory_size("/nope").await.unwrap(), 0);
    }
}
