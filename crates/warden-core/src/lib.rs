//! warden-core
//!
//! Retention engine for build artifacts on a remote file server: decides
//! which builds to delete when disk usage crosses a threshold, deletes
//! them in score order until a target is reached, and records every run.
//!
//! # Module layout
//! - **domain**: pure model (ids, retention classes + classification,
//!   scoring, candidates, run/log records, errors)
//! - **ports**: collaborator seams (ArtifactIndex, RemoteFs, RunRecorder,
//!   Clock)
//! - **app**: application logic (CleanupEngine, enumerator, single-flight
//!   state, Scheduler)
//! - **impls**: in-memory / simulated port implementations for
//!   development and tests
//! - **config**: thresholds, classes and mappings; YAML loading; shared
//!   store with per-run snapshots

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;
