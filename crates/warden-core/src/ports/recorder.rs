//! RunRecorder port - persistence of run summaries and deletion logs.

use async_trait::async_trait;

use crate::domain::{CleanupLogEntry, CleanupRun, RunId, WardenError};

/// RunRecorder persists cleanup history.
///
/// The orchestrator owns the `CleanupRun` value and hands it over twice:
/// once at creation (status `running`, gets an id back) and once at
/// finalization (terminal status, finalized exactly once). Log entries
/// are appended as candidates are processed.
#[async_trait]
pub trait RunRecorder: Send + Sync {
    /// Persist a new run record and assign its id.
    async fn create_run(&self, run: &CleanupRun) -> Result<RunId, WardenError>;

    /// Persist the terminal state of a run previously created.
    async fn finalize_run(&self, run: &CleanupRun) -> Result<(), WardenError>;

    /// Append one deletion (or dry-run consideration) log entry.
    async fn append_log(&self, entry: &CleanupLogEntry) -> Result<(), WardenError>;
}
