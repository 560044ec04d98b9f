//! Cleanup run and log records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::RunId;

/// What initiated a cleanup run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    Scheduled,
    Manual,
}

/// Run lifecycle state.
///
/// State transitions:
/// - Running -> Completed (loop finished or threshold short-circuit)
/// - Running -> Failed (fatal error caught at the orchestrator boundary)
///
/// Both terminal states are reached exactly once, via the methods below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, RunStatus::Completed | RunStatus::Failed)
    }
}

/// Record of one cleanup run.
///
/// Design:
/// - Single source of truth for the run while it executes; owned and
///   mutated only by the orchestrator that created it.
/// - The recorder persists it at creation and again at finalization.
/// - State transitions via methods, not direct field access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupRun {
    pub id: RunId,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub trigger: TriggerKind,
    pub dry_run: bool,
    pub disk_usage_before: Option<f64>,
    pub disk_usage_after: Option<f64>,
    pub builds_deleted: u32,
    pub bytes_freed: u64,
    pub status: RunStatus,
    pub error_message: Option<String>,
}

impl CleanupRun {
    pub fn new(
        trigger: TriggerKind,
        dry_run: bool,
        disk_usage_before: f64,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: RunId::AD_HOC, // replaced once the recorder assigns one
            started_at,
            finished_at: None,
            trigger,
            dry_run,
            disk_usage_before: Some(disk_usage_before),
            disk_usage_after: None,
            builds_deleted: 0,
            bytes_freed: 0,
            status: RunStatus::Running,
            error_message: None,
        }
    }

    /// Count one successful deletion.
    pub fn record_deletion(&mut self, size_bytes: u64) {
        self.builds_deleted += 1;
        self.bytes_freed += size_bytes;
    }

    /// Mark completed.
    pub fn mark_completed(&mut self, disk_usage_after: Option<f64>, finished_at: DateTime<Utc>) {
        self.status = RunStatus::Completed;
        self.disk_usage_after = disk_usage_after;
        self.finished_at = Some(finished_at);
    }

    /// Mark failed with the captured error text.
    pub fn mark_failed(&mut self, error: String, finished_at: DateTime<Utc>) {
        self.status = RunStatus::Failed;
        self.error_message = Some(error);
        self.finished_at = Some(finished_at);
    }
}

/// Persisted trace of one processed candidate (deleted, or considered
/// under dry-run), or of an ad-hoc deletion (`run_id = 0`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupLogEntry {
    pub run_id: RunId,
    pub deleted_at: DateTime<Utc>,
    pub collection: String,
    pub artifact: String,
    pub class_name: String,
    pub age_days: f64,
    pub size_bytes: u64,
    pub score: f64,
    pub dry_run: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run() -> CleanupRun {
        CleanupRun::new(TriggerKind::Manual, false, 95.0, Utc::now())
    }

    #[test]
    fn new_run_starts_running() {
        let run = run();
        assert_eq!(run.status, RunStatus::Running);
        assert!(!run.status.is_terminal());
        assert_eq!(run.disk_usage_before, Some(95.0));
        assert!(run.finished_at.is_none());
        assert_eq!(run.builds_deleted, 0);
        assert_eq!(run.bytes_freed, 0);
    }

    #[test]
    fn deletions_accumulate() {
        let mut run = run();
        run.record_deletion(100);
        run.record_deletion(250);
        assert_eq!(run.builds_deleted, 2);
        assert_eq!(run.bytes_freed, 350);
    }

    #[test]
    fn mark_completed_is_terminal() {
        let mut run = run();
        run.mark_completed(Some(78.0), Utc::now());
        assert_eq!(run.status, RunStatus::Completed);
        assert!(run.status.is_terminal());
        assert_eq!(run.disk_usage_after, Some(78.0));
        assert!(run.finished_at.is_some());
        assert!(run.error_message.is_none());
    }

    #[test]
    fn mark_failed_captures_error() {
        let mut run = run();
        run.mark_failed("df unreachable".to_string(), Utc::now());
        assert_eq!(run.status, RunStatus::Failed);
        assert_eq!(run.error_message.as_deref(), Some("df unreachable"));
        assert!(run.finished_at.is_some());
    }

    #[test]
    fn trigger_kind_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&TriggerKind::Scheduled).unwrap(),
            "\"scheduled\""
        );
        assert_eq!(
            serde_json::to_string(&RunStatus::Completed).unwrap(),
            "\"completed\""
        );
    }
}
