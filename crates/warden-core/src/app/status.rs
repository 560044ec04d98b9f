//! Single-flight guard and progress snapshot.
//!
//! At most one cleanup run may be active process-wide. Two independent
//! trigger paths (the periodic scheduler and manual requests) race for
//! that slot, so the check-and-transition must be one atomic step: both
//! happen under the same mutex in `try_begin`, never as a bare flag read
//! followed by a separate write.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::domain::RunId;

/// Read-only status snapshot for external pollers. Not persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineStatus {
    pub running: bool,
    pub current_run_id: Option<RunId>,
    pub progress: Option<String>,
}

#[derive(Default)]
struct StatusInner {
    running: bool,
    current_run_id: Option<RunId>,
    progress: Option<String>,
}

/// Process-wide run state: the single-flight flag plus the progress text.
///
/// The mutex only ever guards field reads/writes, never I/O, so status
/// polling and new trigger attempts stay responsive while a run is
/// blocked on a slow remote call.
#[derive(Default)]
pub struct EngineState {
    inner: Mutex<StatusInner>,
}

impl EngineState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Atomically claim the run slot. `None` means a run is already
    /// active - an expected, retryable outcome for the caller.
    ///
    /// The returned guard releases the slot on drop, so the flag is
    /// cleared on every exit path: normal finalization, fatal error
    /// propagation, or panic inside the run.
    pub fn try_begin(self: &Arc<Self>) -> Option<RunGuard> {
        let mut inner = self.inner.lock().expect("engine state lock poisoned");
        if inner.running {
            return None;
        }
        inner.running = true;
        inner.current_run_id = None;
        inner.progress = Some("starting".to_string());
        drop(inner);

        Some(RunGuard {
            state: Arc::clone(self),
        })
    }

    pub fn status(&self) -> EngineStatus {
        let inner = self.inner.lock().expect("engine state lock poisoned");
        EngineStatus {
            running: inner.running,
            current_run_id: inner.current_run_id,
            progress: inner.progress.clone(),
        }
    }

    fn end(&self) {
        let mut inner = self.inner.lock().expect("engine state lock poisoned");
        inner.running = false;
        inner.current_run_id = None;
        inner.progress = None;
    }
}

/// Exclusive permission to execute one cleanup run.
pub struct RunGuard {
    state: Arc<EngineState>,
}

impl RunGuard {
    /// Publish the recorder-assigned run id.
    pub fn set_run_id(&self, run_id: RunId) {
        let mut inner = self.state.inner.lock().expect("engine state lock poisoned");
        inner.current_run_id = Some(run_id);
    }

    /// Update the human-readable progress line.
    pub fn set_progress(&self, progress: impl Into<String>) {
        let mut inner = self.state.inner.lock().expect("engine state lock poisoned");
        inner.progress = Some(progress.into());
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.state.end();
    }
}
