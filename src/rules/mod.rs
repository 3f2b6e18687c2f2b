//! External rule-engine adapter.
//!
//! An ESLint-compatible linter can contribute extra detections. The engine
//! sits behind the [`RuleEngine`] trait so the orchestrator never depends on
//! a process being available; [`lint`] turns every failure into an empty
//! result and a `warn!` log line.

mod process;
mod remap;

pub use process::ProcessRuleEngine;
pub use remap::{slug_for_rule, RULE_REMAP};

use crate::config::RuleEngineConfig;
use crate::core::{Detection, DetectionSource, Diagnostic, Finding, Location};
use crate::errors::Result;
use std::fmt;

/// One of the four fixed engine configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleConfig {
    Plain,
    Typed,
    PlainFramework,
    TypedFramework,
}

impl RuleConfig {
    pub fn select(uses_framework: bool, uses_typed_superset: bool) -> Self {
        match (uses_typed_superset, uses_framework) {
            (false, false) => RuleConfig::Plain,
            (true, false) => RuleConfig::Typed,
            (false, true) => RuleConfig::PlainFramework,
            (true, true) => RuleConfig::TypedFramework,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RuleConfig::Plain => "plain",
            RuleConfig::Typed => "typed",
            RuleConfig::PlainFramework => "plain-framework",
            RuleConfig::TypedFramework => "typed-framework",
        }
    }

    /// Engine configuration file inside the configured directory.
    pub fn config_file(self) -> String {
        format!("eslint.{}.config.mjs", self.name())
    }

    /// File name passed with `--stdin-filename`; selects the engine's parser.
    pub fn stdin_filename(self) -> &'static str {
        match self {
            RuleConfig::Plain => "snippet.js",
            RuleConfig::Typed => "snippet.ts",
            RuleConfig::PlainFramework => "snippet.jsx",
            RuleConfig::TypedFramework => "snippet.tsx",
        }
    }
}

impl fmt::Display for RuleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single violation reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleViolation {
    pub rule_id: String,
    pub message: String,
    /// 1-based
    pub line: usize,
    /// 0-based
    pub column: usize,
    pub fixable: bool,
}

impl RuleViolation {
    pub fn into_detection(self) -> Detection {
        let location = Location::new(self.line, self.column);
        let mut finding = Finding::issue(slug_for_rule(&self.rule_id), location).with_details(self.message);
        finding.tags.trivial = self.fixable;
        Detection::from_finding(finding, DetectionSource::ExternalRuleEngine)
    }
}

pub trait RuleEngine: Send + Sync {
    fn lint(&self, code: &str, config: RuleConfig) -> Result<Vec<RuleViolation>>;
}

/// Engine used when linting is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRuleEngine;

impl RuleEngine for NoopRuleEngine {
    fn lint(&self, _code: &str, _config: RuleConfig) -> Result<Vec<RuleViolation>> {
        Ok(Vec::new())
    }
}

/// Run the engine and translate its violations. Never fails.
pub fn lint(
    engine: &dyn RuleEngine,
    code: &str,
    uses_framework: bool,
    uses_typed_superset: bool,
) -> Vec<Detection> {
    lint_with_diagnostic(engine, code, uses_framework, uses_typed_superset).0
}

/// Like [`lint`], also returning a diagnostic when the engine failed.
pub fn lint_with_diagnostic(
    engine: &dyn RuleEngine,
    code: &str,
    uses_framework: bool,
    uses_typed_superset: bool,
) -> (Vec<Detection>, Option<Diagnostic>) {
    let config = RuleConfig::select(uses_framework, uses_typed_superset);
    match engine.lint(code, config) {
        Ok(violations) => {
            tracing::debug!(%config, violations = violations.len(), "Rule engine finished");
            let detections = violations
                .into_iter()
                .map(RuleViolation::into_detection)
                .collect();
            (detections, None)
        }
        Err(e) => {
            tracing::warn!(%config, "Rule engine failed, continuing without it: {}", e);
            (Vec::new(), Some(Diagnostic::rule_engine(e.to_string())))
        }
    }
}

/// Build the engine described by the configuration.
///
/// A missing executable degrades to [`NoopRuleEngine`] with a warning.
pub fn engine_from_config(config: &RuleEngineConfig) -> Box<dyn RuleEngine> {
    if !config.enabled {
        return Box::new(NoopRuleEngine);
    }
    match ProcessRuleEngine::locate(&config.command, &config.config_dir) {
        Ok(engine) => Box::new(engine),
        Err(e) => {
            tracing::warn!("Rule engine disabled: {}", e);
            Box::new(NoopRuleEngine)
        }
    }
}
