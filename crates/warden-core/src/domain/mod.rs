//! Domain model (ids, retention classes, scoring, candidates, run records).

pub mod candidate;
pub mod errors;
pub mod ids;
pub mod retention;
pub mod run;
pub mod score;

pub use candidate::Candidate;
pub use errors::WardenError;
pub use ids::RunId;
pub use retention::{ClassMapping, ClassResolver, RetentionClass};
pub use run::{CleanupLogEntry, CleanupRun, RunStatus, TriggerKind};
pub use score::{compute_score, score_order};
