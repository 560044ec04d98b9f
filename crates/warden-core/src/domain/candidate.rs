//! Deletion candidates.

use chrono::{DateTime, Utc};

use super::retention::RetentionClass;

/// One build considered for deletion in a cleanup pass.
///
/// Transient: computed at run start, sorted, consumed by the deletion loop,
/// never persisted. The persisted trace of a processed candidate is its
/// `CleanupLogEntry`.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub collection: String,
    pub artifact: String,
    pub modified_at: DateTime<Utc>,
    pub age_days: f64,
    pub class: RetentionClass,
    pub score: f64,
}
