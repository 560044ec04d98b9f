//! Domain identifiers (strongly-typed IDs).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a CleanupRun, assigned by the run recorder.
///
/// Integer-backed because `0` is reserved: log entries written for ad-hoc
/// single-build deletions (outside any run) carry `run_id = 0`.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RunId(u64);

impl RunId {
    /// Reserved id for log entries not belonging to a run.
    pub const AD_HOC: RunId = RunId(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }

    pub fn is_ad_hoc(self) -> bool {
        self == Self::AD_HOC
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ad_hoc_is_zero() {
        assert_eq!(RunId::AD_HOC.value(), 0);
        assert!(RunId::AD_HOC.is_ad_hoc());
        assert!(!RunId::new(1).is_ad_hoc());
    }

    #[test]
    fn run_ids_are_sortable_and_serializable() {
        let id1 = RunId::new(1);
        let id2 = RunId::new(2);
        assert!(id1 < id2);

        let serialized = serde_json::to_string(&id2).unwrap();
        assert_eq!(serialized, "2");
        let deserialized: RunId = serde_json::from_str(&serialized).unwrap();
        assert_eq!(id2, deserialized);
    }

    #[test]
    fn display_has_prefix() {
        assert_eq!(RunId::new(7).to_string(), "run-7");
    }
}
