//! Error type for the retention engine.
//!
//! One crate-level enum; the variants follow the operational taxonomy:
//! - `Busy` is an expected outcome of a start attempt, not a fault. The
//!   engine API surfaces it as `RunOutcome::Busy` / `SpawnOutcome::Busy`;
//!   the variant exists for the paths that must propagate it as an error
//!   (ad-hoc callers matching on it).
//! - `DiskUsage` and `Listing` are fatal to a run.
//! - `Remote` is fatal outside the deletion loop, per-candidate inside it
//!   (the orchestrator decides; the type does not).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WardenError {
    #[error("cleanup already in progress")]
    Busy,

    #[error("disk usage query failed: {0}")]
    DiskUsage(String),

    #[error("artifact listing failed: {0}")]
    Listing(String),

    #[error("remote command failed: {0}")]
    Remote(String),

    #[error("build not found: {collection}/{artifact}")]
    NotFound { collection: String, artifact: String },

    #[error("failed to delete {path}")]
    DeleteFailed { path: String },

    #[error("recorder error: {0}")]
    Recorder(String),

    #[error("config error: {0}")]
    Config(String),
}
