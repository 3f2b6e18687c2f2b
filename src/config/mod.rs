//! `.snippetscope.toml` configuration.

mod loader;

pub use loader::{
    directory_ancestors, load_config, load_config_from, load_config_from_path, parse_and_validate_config,
    CONFIG_FILE_NAME,
};

use crate::core::DEFAULT_TOP_ISSUES;
use crate::traversal::DEFAULT_MAX_DEPTH;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Bounds for `analysis.max_walk_depth`.
pub const MIN_WALK_DEPTH: usize = 8;
pub const MAX_WALK_DEPTH: usize = 512;

/// Root configuration structure for snippetscope
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnippetscopeConfig {
    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub rule_engine: RuleEngineConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Recursion cap for tree walks, clamped to [8, 512]
    #[serde(default = "default_max_walk_depth")]
    pub max_walk_depth: usize,

    /// Number of entries in the summary's top issues
    #[serde(default = "default_top_issues")]
    pub top_issues: usize,

    /// Detector ids that never run
    #[serde(default)]
    pub disabled_detectors: Vec<String>,
}

fn default_max_walk_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_top_issues() -> usize {
    DEFAULT_TOP_ISSUES
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_walk_depth: default_max_walk_depth(),
            top_issues: default_top_issues(),
            disabled_detectors: Vec::new(),
        }
    }
}

impl AnalysisConfig {
    pub fn is_disabled(&self, detector_id: &str) -> bool {
        self.disabled_detectors.iter().any(|id| id == detector_id)
    }
}

/// External rule engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleEngineConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Executable name or path
    #[serde(default = "default_command")]
    pub command: String,

    /// Directory holding the `eslint.<config>.config.mjs` files
    #[serde(default = "default_config_dir")]
    pub config_dir: PathBuf,
}

fn default_command() -> String {
    "eslint".to_string()
}

fn default_config_dir() -> PathBuf {
    PathBuf::from("rule-configs")
}

impl Default for RuleEngineConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            command: default_command(),
            config_dir: default_config_dir(),
        }
    }
}
