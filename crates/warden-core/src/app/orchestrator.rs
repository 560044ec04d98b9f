//! Cleanup orchestration.
//!
//! Drives one cleanup pass end to end: claim the single-flight slot,
//! record the run, short-circuit or enumerate, delete in score order while
//! re-polling disk usage, finalize exactly once. Fatal errors are caught
//! at this boundary, persisted on the run record, and re-raised; the run
//! slot is released on every exit path.

use std::sync::Arc;

use crate::app::enumerator::collect_candidates;
use crate::app::status::{EngineState, EngineStatus, RunGuard};
use crate::config::{ConfigStore, WardenConfig};
use crate::domain::{
    Candidate, ClassResolver, CleanupLogEntry, CleanupRun, RunId, TriggerKind, WardenError,
};
use crate::ports::{ArtifactIndex, Clock, RemoteFs, RunRecorder, artifact_path};

/// Result of a synchronous cleanup trigger.
///
/// `Busy` is an expected, frequent outcome (two trigger paths race for one
/// slot), so it is a variant here rather than an error: callers retry
/// later, they do not report a fault.
#[derive(Debug)]
pub enum RunOutcome {
    Completed(CleanupRun),
    Busy,
}

/// Result of a background cleanup trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnOutcome {
    Started,
    Busy,
}

/// The retention engine: decides what to delete and executes the pass.
pub struct CleanupEngine {
    config: Arc<ConfigStore>,
    index: Arc<dyn ArtifactIndex>,
    remote: Arc<dyn RemoteFs>,
    recorder: Arc<dyn RunRecorder>,
    clock: Arc<dyn Clock>,
    state: Arc<EngineState>,
}

impl CleanupEngine {
    pub fn new(
        config: Arc<ConfigStore>,
        index: Arc<dyn ArtifactIndex>,
        remote: Arc<dyn RemoteFs>,
        recorder: Arc<dyn RunRecorder>,
        clock: Arc<dyn Clock>,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            index,
            remote,
            recorder,
            clock,
            state: EngineState::new(),
        })
    }

    /// Snapshot of the run-in-progress state, for external pollers.
    pub fn status(&self) -> EngineStatus {
        self.state.status()
    }

    /// Execute a cleanup pass, blocking the caller until it finishes.
    ///
    /// Used for dry-runs (no destructive calls, expected to be fast) and
    /// by the scheduler, which runs on its own task anyway.
    pub async fn run_cleanup(
        &self,
        trigger: TriggerKind,
        dry_run: bool,
    ) -> Result<RunOutcome, WardenError> {
        let Some(guard) = self.state.try_begin() else {
            return Ok(RunOutcome::Busy);
        };
        let result = self.execute(&guard, trigger, dry_run).await;
        drop(guard);
        result.map(RunOutcome::Completed)
    }

    /// Start a real cleanup pass on a background task.
    ///
    /// The caller gets an immediate acknowledgment; outcome and errors are
    /// observable only through the run record and `status()`, never as a
    /// return value.
    pub fn spawn_cleanup(self: &Arc<Self>, trigger: TriggerKind) -> SpawnOutcome {
        let Some(guard) = self.state.try_begin() else {
            return SpawnOutcome::Busy;
        };
        let engine = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = engine.execute(&guard, trigger, false).await {
                tracing::error!(error = %e, "background cleanup failed");
            }
            drop(guard);
        });
        SpawnOutcome::Started
    }

    /// One full pass. The caller holds the run slot.
    async fn execute(
        &self,
        guard: &RunGuard,
        trigger: TriggerKind,
        dry_run: bool,
    ) -> Result<CleanupRun, WardenError> {
        let config = self.config.snapshot();

        // Fatal if unanswerable: without a usage reading there is nothing
        // to decide. No run record exists yet on this path.
        let disk = self.remote.disk_usage(&config.server.artifact_root).await?;

        let mut run = CleanupRun::new(trigger, dry_run, disk.usage_percent, self.clock.now());
        run.id = self.recorder.create_run(&run).await?;
        guard.set_run_id(run.id);
        tracing::info!(
            run_id = %run.id,
            trigger = ?trigger,
            dry_run,
            usage_percent = disk.usage_percent,
            "cleanup run started"
        );

        match self.run_pass(guard, &mut run, &config, disk.usage_percent).await {
            Ok(()) => {
                self.recorder.finalize_run(&run).await?;
                Ok(run)
            }
            Err(e) => {
                tracing::error!(run_id = %run.id, error = %e, "cleanup run failed");
                run.mark_failed(e.to_string(), self.clock.now());
                if let Err(persist) = self.recorder.finalize_run(&run).await {
                    tracing::error!(run_id = %run.id, error = %persist, "failed to persist failed run");
                }
                Err(e)
            }
        }
    }

    async fn run_pass(
        &self,
        guard: &RunGuard,
        run: &mut CleanupRun,
        config: &WardenConfig,
        usage_before: f64,
    ) -> Result<(), WardenError> {
        let trigger_threshold = config.disk.trigger_threshold_percent;
        let target_threshold = config.disk.target_threshold_percent;
        let root = &config.server.artifact_root;

        // A real run below the trigger has nothing to do. Dry-runs always
        // enumerate: they exist to preview policy effects.
        if !run.dry_run && usage_before < trigger_threshold {
            let msg = format!(
                "disk usage {usage_before:.1}% is below trigger threshold {trigger_threshold:.1}%"
            );
            tracing::info!("{msg}");
            guard.set_progress(msg);
            run.mark_completed(Some(usage_before), self.clock.now());
            return Ok(());
        }

        guard.set_progress("collecting build list");
        let resolver = ClassResolver::new(&config.class_mappings, &config.retention_classes);
        let candidates =
            collect_candidates(self.index.as_ref(), &resolver, self.clock.now()).await?;
        tracing::info!(count = candidates.len(), "found deletable builds");

        let total = candidates.len();
        for (i, candidate) in candidates.iter().enumerate() {
            if !run.dry_run {
                let usage = self.remote.disk_usage(root).await?.usage_percent;
                if usage <= target_threshold {
                    let msg =
                        format!("target reached: {usage:.1}% <= {target_threshold:.1}%");
                    tracing::info!("{msg}");
                    guard.set_progress(msg);
                    break;
                }
            }

            guard.set_progress(format!(
                "deleting {}/{} (score: {:.1}) [{}/{}]",
                candidate.collection,
                candidate.artifact,
                candidate.score,
                i + 1,
                total
            ));

            match self.process_candidate(run, candidate, root).await {
                Ok(size_bytes) => {
                    let entry = CleanupLogEntry {
                        run_id: run.id,
                        deleted_at: self.clock.now(),
                        collection: candidate.collection.clone(),
                        artifact: candidate.artifact.clone(),
                        class_name: candidate.class.name.clone(),
                        age_days: candidate.age_days,
                        size_bytes,
                        score: candidate.score,
                        dry_run: run.dry_run,
                    };
                    self.recorder.append_log(&entry).await?;
                }
                // Per-candidate failure: logged, skipped, never counted,
                // never fatal to the run.
                Err(e) => {
                    tracing::error!(
                        collection = %candidate.collection,
                        artifact = %candidate.artifact,
                        error = %e,
                        "skipping build"
                    );
                }
            }
        }

        let disk_usage_after = if run.dry_run {
            run.disk_usage_before
        } else {
            let after = self.remote.disk_usage(root).await?.usage_percent;
            self.index.invalidate_cache().await;
            Some(after)
        };
        run.mark_completed(disk_usage_after, self.clock.now());

        let msg = format!(
            "completed: {} builds deleted, {} bytes freed",
            run.builds_deleted, run.bytes_freed
        );
        tracing::info!(run_id = %run.id, "{msg}");
        guard.set_progress(msg);
        Ok(())
    }

    /// Delete (or, under dry-run, merely consider) one candidate.
    /// Returns the bytes attributed to its log entry.
    async fn process_candidate(
        &self,
        run: &mut CleanupRun,
        candidate: &Candidate,
        root: &str,
    ) -> Result<u64, WardenError> {
        if run.dry_run {
            return Ok(0);
        }

        let path = artifact_path(root, &candidate.collection, &candidate.artifact);
        let size_bytes = self.remote.directory_size(&path).await?;

        if !self.remote.delete_directory(&path).await? {
            return Err(WardenError::DeleteFailed { path });
        }
        run.record_deletion(size_bytes);
        Ok(size_bytes)
    }

    /// Delete one named build outside any run.
    ///
    /// No scoring, no thresholds, no single-flight: verify, measure,
    /// delete, log with `run_id = 0`. Returns the bytes freed.
    pub async fn delete_build(
        &self,
        collection: &str,
        artifact: &str,
    ) -> Result<u64, WardenError> {
        let config = self.config.snapshot();
        let path = artifact_path(&config.server.artifact_root, collection, artifact);

        if !self.remote.directory_exists(&path).await? {
            return Err(WardenError::NotFound {
                collection: collection.to_string(),
                artifact: artifact.to_string(),
            });
        }

        let size_bytes = self.remote.directory_size(&path).await?;
        if !self.remote.delete_directory(&path).await? {
            return Err(WardenError::DeleteFailed { path });
        }

        let resolver = ClassResolver::new(&config.class_mappings, &config.retention_classes);
        let entry = CleanupLogEntry {
            run_id: RunId::AD_HOC,
            deleted_at: self.clock.now(),
            collection: collection.to_string(),
            artifact: artifact.to_string(),
            class_name: resolver.resolve(collection).name,
            age_days: 0.0,
            size_bytes,
            score: 0.0,
            dry_run: false,
        };
        self.recorder.append_log(&entry).await?;
        self.index.invalidate_cache().await;

        tracing::info!(collection, artifact, size_bytes, "deleted build");
        Ok(size_bytes)
    }
}
