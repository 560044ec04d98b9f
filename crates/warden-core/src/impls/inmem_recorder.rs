//! In-memory run recorder implementation.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{CleanupLogEntry, CleanupRun, RunId, WardenError};
use crate::ports::RunRecorder;

struct RecorderState {
    runs: Vec<CleanupRun>,
    logs: Vec<CleanupLogEntry>,
    next_run_id: u64,
}

/// In-memory implementation of `RunRecorder` for development and tests.
///
/// Run ids start at 1; 0 stays reserved for ad-hoc log entries.
pub struct InMemoryRecorder {
    state: Mutex<RecorderState>,
}

impl InMemoryRecorder {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RecorderState {
                runs: Vec::new(),
                logs: Vec::new(),
                next_run_id: 1,
            }),
        }
    }

    pub async fn runs(&self) -> Vec<CleanupRun> {
        self.state.lock().await.runs.clone()
    }

    pub async fn logs(&self) -> Vec<CleanupLogEntry> {
        self.state.lock().await.logs.clone()
    }

    pub async fn get_run(&self, run_id: RunId) -> Option<CleanupRun> {
        let state = self.state.lock().await;
        state.runs.iter().find(|r| r.id == run_id).cloned()
    }
}

impl Default for InMemoryRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RunRecorder for InMemoryRecorder {
    async fn create_run(&self, run: &CleanupRun) -> Result<RunId, WardenError> {
        let mut state = self.state.lock().await;
        let id = RunId::new(state.next_run_id);
        state.next_run_id += 1;

        let mut stored = run.clone();
        stored.id = id;
        state.runs.push(stored);
        Ok(id)
    }

    async fn finalize_run(&self, run: &CleanupRun) -> Result<(), WardenError> {
        let mut state = self.state.lock().await;
        let Some(stored) = state.runs.iter_mut().find(|r| r.id == run.id) else {
            return Err(WardenError::Recorder(format!("unknown run {}", run.id)));
        };
        *stored = run.clone();
        Ok(())
    }

    async fn append_log(&self, entry: &CleanupLogEntry) -> Result<(), WardenError> {
        let mut state = self.state.lock().await;
        state.logs.push(entry.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::TriggerKind;

    #[tokio::test]
    async fn create_assigns_sequential_ids_from_one() {
        let recorder = InMemoryRecorder::new();
        let run = CleanupRun::new(TriggerKind::Manual, false, 90.0, Utc::now());

        let id1 = recorder.create_run(&run).await.unwrap();
        let id2 = recorder.create_run(&run).await.unwrap();

        assert_eq!(id1, RunId::new(1));
        assert_eq!(id2, RunId::new(2));
        assert!(!id1.is_ad_hoc());
    }

    #[tokio::test]
    async fn finalize_replaces_stored_run() {
        let recorder = InMemoryRecorder::new();
        let mut run = CleanupRun::new(TriggerKind::Scheduled, false, 95.0, Utc::now());
        run.id = recorder.create_run(&run).await.unwrap();

        run.record_deletion(1000);
        run.mark_completed(Some(79.0), Utc::now());
        recorder.finalize_run(&run).await.unwrap();

        let stored = recorder.get_run(run.id).await.unwrap();
        assert_eq!(stored.builds_deleted, 1);
        assert_eq!(stored.disk_usage_after, Some(79.0));
    }

    #[tokio::test]
    async fn finalize_unknown_run_errors() {
        let recorder = InMemoryRecorder::new();
        let mut run = CleanupRun::new(TriggerKind::Manual, true, 50.0, Utc::now());
        run.id = RunId::new(42);
        assert!(recorder.finalize_run(&run).await.is_err());
    }
}
