//! Retention classes and collection classification.
//!
//! A retention class is a named policy `(retention_days, priority)` applied
//! to a collection. Collections are mapped to classes by an ordered list of
//! glob patterns; the first match wins. Classification never fails: unmatched
//! names and undefined class names both resolve to a default.

use globset::{Glob, GlobMatcher};
use serde::{Deserialize, Serialize};

/// Fallback class name when no mapping pattern matches.
pub const FALLBACK_CLASS_NAME: &str = "nightly";

/// Fallback retention period when the matched class name is not defined.
pub const FALLBACK_RETENTION_DAYS: u32 = 3;

/// Fallback priority when the matched class name is not defined.
pub const FALLBACK_PRIORITY: i32 = 1;

/// A named retention policy.
///
/// `priority` is an ordinal where higher means "more valuable / delete
/// later". Classes are configured as an ordered list and snapshotted at run
/// start; a run never observes a mid-run config edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionClass {
    pub name: String,
    pub retention_days: u32,
    pub priority: i32,
}

impl RetentionClass {
    /// The hard-coded fallback for a class name with no definition.
    pub fn fallback(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            retention_days: FALLBACK_RETENTION_DAYS,
            priority: FALLBACK_PRIORITY,
        }
    }
}

/// Maps a collection-name glob pattern to a class name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassMapping {
    pub pattern: String,
    pub class: String,
}

/// Resolves collection names to retention classes.
///
/// Built once per run from the config snapshot; mapping patterns are
/// compiled up front so per-collection resolution is just matcher probes.
/// Patterns that fail to compile are skipped (classification must always
/// succeed, so a bad pattern can only widen the fallback, never error).
pub struct ClassResolver {
    mappings: Vec<(GlobMatcher, String)>,
    classes: Vec<RetentionClass>,
}

impl ClassResolver {
    pub fn new(mappings: &[ClassMapping], classes: &[RetentionClass]) -> Self {
        let mut compiled = Vec::with_capacity(mappings.len());
        for mapping in mappings {
            match Glob::new(&mapping.pattern) {
                Ok(glob) => compiled.push((glob.compile_matcher(), mapping.class.clone())),
                Err(e) => {
                    tracing::warn!(pattern = %mapping.pattern, error = %e, "skipping invalid class mapping pattern");
                }
            }
        }
        Self {
            mappings: compiled,
            classes: classes.to_vec(),
        }
    }

    /// Resolve a collection name to its retention class.
    ///
    /// First pattern match wins; no match means `"nightly"`. The matched
    /// class name is then looked up in the defined classes by exact name;
    /// an undefined name keeps the matched name but takes the fallback
    /// period and priority.
    pub fn resolve(&self, collection: &str) -> RetentionClass {
        let mut matched = FALLBACK_CLASS_NAME;
        for (matcher, class) in &self.mappings {
            if matcher.is_match(collection) {
                matched = class;
                break;
            }
        }

        for class in &self.classes {
            if class.name == matched {
                return class.clone();
            }
        }

        RetentionClass::fallback(matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classes() -> Vec<RetentionClass> {
        vec![
            RetentionClass {
                name: "nightly".to_string(),
                retention_days: 3,
                priority: 1,
            },
            RetentionClass {
                name: "release".to_string(),
                retention_days: 30,
                priority: 3,
            },
        ]
    }

    fn mappings() -> Vec<ClassMapping> {
        vec![
            ClassMapping {
                pattern: "release-*".to_string(),
                class: "release".to_string(),
            },
            ClassMapping {
                pattern: "*".to_string(),
                class: "nightly".to_string(),
            },
        ]
    }

    #[test]
    fn first_matching_pattern_wins() {
        let resolver = ClassResolver::new(&mappings(), &classes());

        let class = resolver.resolve("release-2026");
        assert_eq!(class.name, "release");
        assert_eq!(class.retention_days, 30);
        assert_eq!(class.priority, 3);

        // "release-2026" also matches "*", but the earlier mapping took it.
        let class = resolver.resolve("app-main");
        assert_eq!(class.name, "nightly");
    }

    #[test]
    fn unmatched_collection_falls_back_to_nightly() {
        // No catch-all mapping: nothing matches "oddball".
        let only_release = vec![ClassMapping {
            pattern: "release-*".to_string(),
            class: "release".to_string(),
        }];
        let resolver = ClassResolver::new(&only_release, &classes());

        let class = resolver.resolve("oddball");
        assert_eq!(class.name, "nightly");
        assert_eq!(class.retention_days, 3);
        assert_eq!(class.priority, 1);
    }

    #[test]
    fn undefined_class_name_gets_hard_coded_defaults() {
        let mappings = vec![ClassMapping {
            pattern: "exp-*".to_string(),
            class: "experimental".to_string(),
        }];
        let resolver = ClassResolver::new(&mappings, &classes());

        let class = resolver.resolve("exp-42");
        assert_eq!(class.name, "experimental");
        assert_eq!(class.retention_days, FALLBACK_RETENTION_DAYS);
        assert_eq!(class.priority, FALLBACK_PRIORITY);
    }

    #[test]
    fn no_mappings_no_classes_yields_exact_fallback() {
        let resolver = ClassResolver::new(&[], &[]);
        let class = resolver.resolve("anything");
        assert_eq!(class, RetentionClass::fallback("nightly"));
    }

    #[test]
    fn invalid_pattern_is_skipped() {
        let mappings = vec![
            ClassMapping {
                pattern: "release-[".to_string(),
                class: "release".to_string(),
            },
            ClassMapping {
                pattern: "release-*".to_string(),
                class: "release".to_string(),
            },
        ];
        let resolver = ClassResolver::new(&mappings, &classes());

        // The broken pattern is dropped; the valid one still matches.
        assert_eq!(resolver.resolve("release-1").name, "release");
    }
}
