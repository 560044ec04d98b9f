//! Candidate enumeration.
//!
//! Walks every collection in the artifact index, attaches retention class
//! and score to every build, and returns the list sorted in deletion order.

use chrono::{DateTime, Utc};

use crate::domain::score::{compute_score, score_order};
use crate::domain::{Candidate, ClassResolver, WardenError};
use crate::ports::ArtifactIndex;

/// Builds modified more recently than this are never candidates: they may
/// still be written by an in-progress transfer.
pub const IN_PROGRESS_WINDOW_MINUTES: f64 = 10.0;

/// Collect all deletable builds, sorted ascending by score.
///
/// The sort is stable, so equal scores keep listing order - test
/// expectations stay reproducible. Empty listings contribute no
/// candidates; a listing error aborts enumeration (fatal to the run).
pub async fn collect_candidates(
    index: &dyn ArtifactIndex,
    resolver: &ClassResolver,
    now: DateTime<Utc>,
) -> Result<Vec<Candidate>, WardenError> {
    let collections = index.list_collections().await?;
    let mut candidates = Vec::new();

    for collection in collections {
        let class = resolver.resolve(&collection);
        let artifacts = index.list_artifacts(&collection).await?;

        for entry in artifacts {
            let age_seconds = (now - entry.modified_at).num_seconds() as f64;
            let age_minutes = age_seconds / 60.0;
            if age_minutes < IN_PROGRESS_WINDOW_MINUTES {
                tracing::info!(
                    collection = %collection,
                    artifact = %entry.artifact,
                    age_minutes = age_minutes as i64,
                    "skipping build modified within safety window, possibly in-progress"
                );
                continue;
            }

            let age_days = age_seconds / 86_400.0;
            let score = compute_score(class.priority, class.retention_days, age_days);
            candidates.push(Candidate {
                collection: collection.clone(),
                artifact: entry.artifact,
                modified_at: entry.modified_at,
                age_days,
                class: class.clone(),
                score,
            });
        }
    }

    candidates.sort_by(|a, b| score_order(a.score, b.score));
    Ok(candidates)
}
