//! Periodic disk check.
//!
//! Runs the scheduled trigger path: every `check_interval_minutes`, start
//! a real cleanup pass. The single-flight guard is what prevents overlap
//! with manual triggers - the scheduler itself does no coordination
//! beyond observing `Busy`.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::app::orchestrator::{CleanupEngine, RunOutcome};
use crate::domain::TriggerKind;

/// Handle for the scheduled check loop.
/// - `request_shutdown()` stops the loop after the current tick
/// - `shutdown_and_join()` also waits for it to finish
pub struct Scheduler {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl Scheduler {
    /// Spawn the check loop with the given cadence.
    pub fn spawn(engine: Arc<CleanupEngine>, interval: Duration) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let join = tokio::spawn(async move {
            check_loop(engine, interval, shutdown_rx).await;
        });
        Self { shutdown_tx, join }
    }

    /// Request shutdown. A pass already in flight runs to completion;
    /// this only stops future ticks. (スケジューラは走行中の run を中断しない)
    pub fn request_shutdown(&self) {
        // ignore send error: receiver may already be gone
        let _ = self.shutdown_tx.send(true);
    }

    /// Shutdown and wait for the loop to exit.
    pub async fn shutdown_and_join(self) {
        self.request_shutdown();
        let _ = self.join.await;
    }
}

async fn check_loop(
    engine: Arc<CleanupEngine>,
    interval: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    tracing::info!(interval_secs = interval.as_secs(), "scheduler started");
    let mut ticker = tokio::time::interval(interval);
    // The first tick fires immediately; skip it so startup is not a
    // surprise cleanup.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    break;
                }
            }
            _ = ticker.tick() => {
                run_scheduled_check(&engine).await;
            }
        }
    }
    tracing::info!("scheduler stopped");
}

/// One scheduled tick. There is no synchronous caller to report to, so
/// fatal run errors are absorbed here: logged, loop continues.
async fn run_scheduled_check(engine: &CleanupEngine) {
    tracing::info!("running scheduled disk check");
    match engine.run_cleanup(TriggerKind::Scheduled, false).await {
        Ok(RunOutcome::Completed(run)) => {
            tracing::info!(
                run_id = %run.id,
                builds_deleted = run.builds_deleted,
                bytes_freed = run.bytes_freed,
                "scheduled check finished"
            );
        }
        Ok(RunOutcome::Busy) => {
            tracing::info!("cleanup already running, skipping scheduled check");
        }
        Err(e) => {
            tracing::error!(error = %e, "scheduled cleanup failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::config::{ConfigStore, WardenConfig};
    use crate::impls::{InMemoryArtifactIndex, InMemoryRecorder, SimRemoteFs};
    use crate::ports::{ArtifactIndex, RemoteFs, RunRecorder, SystemClock};

    fn engine_over(
        remote: Arc<SimRemoteFs>,
        recorder: Arc<InMemoryRecorder>,
    ) -> Arc<CleanupEngine> {
        CleanupEngine::new(
            Arc::new(ConfigStore::new(WardenConfig::default())),
            Arc::new(InMemoryArtifactIndex::new(HashMap::new())) as Arc<dyn ArtifactIndex>,
            remote as Arc<dyn RemoteFs>,
            recorder as Arc<dyn RunRecorder>,
            Arc::new(SystemClock),
        )
    }

    #[tokio::test]
    async fn scheduled_tick_records_a_scheduled_run() {
        // Usage below trigger: the tick short-circuits, but a run is
        // still recorded with the scheduled trigger kind.
        let remote = Arc::new(SimRemoteFs::new(1000, 500));
        let recorder = Arc::new(InMemoryRecorder::new());
        let engine = engine_over(remote, Arc::clone(&recorder));

        run_scheduled_check(&engine).await;

        let runs = recorder.runs().await;
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].trigger, crate::domain::TriggerKind::Scheduled);
    }

    #[tokio::test]
    async fn fatal_errors_are_absorbed_at_the_tick_boundary() {
        let remote = Arc::new(SimRemoteFs::new(1000, 500));
        remote.set_disk_usage_failure(true).await;
        let recorder = Arc::new(InMemoryRecorder::new());
        let engine = engine_over(remote, Arc::clone(&recorder));

        // Must not panic or propagate; there is no caller to report to.
        run_scheduled_check(&engine).await;
        assert!(recorder.runs().await.is_empty());
    }

    #[tokio::test]
    async fn scheduler_ticks_and_shuts_down() {
        let remote = Arc::new(SimRemoteFs::new(1000, 500));
        let recorder = Arc::new(InMemoryRecorder::new());
        let engine = engine_over(remote, Arc::clone(&recorder));

        let scheduler = Scheduler::spawn(engine, Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(90)).await;
        scheduler.shutdown_and_join().await;

        // A few ticks fired while we slept.
        assert!(!recorder.runs().await.is_empty());
    }
}
