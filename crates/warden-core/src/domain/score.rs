//! Deletion-order scoring.
//!
//! The score is the single sort key of the cleanup pass: candidates are
//! deleted in ascending score order (lowest first).

use std::cmp::Ordering;

/// Compute the deletion score for one build. Lower score = delete first.
///
/// `priority * 1000 + (retention_days - age_days) * 10`
///
/// The 1000 multiplier makes priority dominate: any candidate in a
/// lower-priority class sorts before any candidate in a higher-priority
/// class, even an expired one. Within a class, the remaining-retention term
/// orders builds by how far past (negative) or short of (positive) their
/// retention budget they are, so the most-expired build goes first.
///
/// Tier dominance is intended policy, not a bug. The term is deliberately
/// unclamped: an age overrun larger than 100 days per priority step could
/// in principle cross tiers. Do not change the formula without confirming
/// intent.
pub fn compute_score(priority: i32, retention_days: u32, age_days: f64) -> f64 {
    let remaining_days = retention_days as f64 - age_days;
    priority as f64 * 1000.0 + remaining_days * 10.0
}

/// Total order over scores, for the candidate sort.
///
/// Scores are finite for any real input (days and small integers), so the
/// NaN arm never fires in practice; treating NaN as equal keeps the sort
/// total and stable either way.
pub fn score_order(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}
