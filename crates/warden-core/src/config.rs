//! Configuration: thresholds, retention classes, class mappings.
//!
//! Loaded from a YAML file; a missing file means defaults. The live config
//! sits behind `ConfigStore` so it can be replaced at runtime, while each
//! cleanup run takes an immutable snapshot at start and never observes a
//! mid-run edit.

use std::path::Path;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::domain::{ClassMapping, RetentionClass, WardenError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Root directory of the build store on the remote server.
    #[serde(default = "default_artifact_root")]
    pub artifact_root: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            artifact_root: default_artifact_root(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiskConfig {
    /// Usage percent above which a cleanup pass is warranted.
    #[serde(default = "default_trigger_threshold")]
    pub trigger_threshold_percent: f64,

    /// Usage percent at which a running pass may stop early.
    #[serde(default = "default_target_threshold")]
    pub target_threshold_percent: f64,

    /// Cadence of the scheduled disk check.
    #[serde(default = "default_check_interval")]
    pub check_interval_minutes: u64,
}

impl Default for DiskConfig {
    fn default() -> Self {
        Self {
            trigger_threshold_percent: default_trigger_threshold(),
            target_threshold_percent: default_target_threshold(),
            check_interval_minutes: default_check_interval(),
        }
    }
}

fn default_artifact_root() -> String {
    "/data/binaries".to_string()
}

fn default_trigger_threshold() -> f64 {
    90.0
}

fn default_target_threshold() -> f64 {
    80.0
}

fn default_check_interval() -> u64 {
    5
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WardenConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub disk: DiskConfig,

    #[serde(default)]
    pub retention_classes: Vec<RetentionClass>,

    #[serde(default)]
    pub class_mappings: Vec<ClassMapping>,
}

impl WardenConfig {
    /// Parse a YAML document.
    pub fn from_yaml(source: &str) -> Result<Self, WardenError> {
        serde_yaml::from_str(source).map_err(|e| WardenError::Config(e.to_string()))
    }

    /// Load from a YAML file; a missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self, WardenError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let source =
            std::fs::read_to_string(path).map_err(|e| WardenError::Config(e.to_string()))?;
        Self::from_yaml(&source)
    }
}

/// Shared, replaceable configuration.
///
/// `snapshot()` is what the orchestrator calls at run start; the returned
/// Arc stays valid for the whole pass even if `replace()` lands mid-run.
pub struct ConfigStore {
    inner: RwLock<Arc<WardenConfig>>,
}

impl ConfigStore {
    pub fn new(config: WardenConfig) -> Self {
        Self {
            inner: RwLock::new(Arc::new(config)),
        }
    }

    pub fn snapshot(&self) -> Arc<WardenConfig> {
        Arc::clone(&self.inner.read().expect("config lock poisoned"))
    }

    pub fn replace(&self, config: WardenConfig) {
        *self.inner.write().expect("config lock poisoned") = Arc::new(config);
    }
}
