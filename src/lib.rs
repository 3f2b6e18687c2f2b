//! snippetscope finds teachable patterns in JavaScript, TypeScript and JSX snippets.
//!
//! [`analyze`] parses a snippet with tree-sitter, runs the detector library and an
//! optional external rule engine, and returns an [`AnalysisResult`]. The
//! [`curriculum`] module maps those detections onto learning topics and picks what
//! a learner should see first.

pub mod analysis;
pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod curriculum;
pub mod detectors;
pub mod errors;
pub mod frontend;
pub mod inference;
pub mod output;
pub mod rules;
pub mod traversal;

pub use crate::analysis::{analyze, Analyzer};
pub use crate::config::SnippetscopeConfig;
pub use crate::core::{
    AnalysisResult, Detection, DetectionSource, Diagnostic, DiagnosticKind, Dialect, Location,
    Summary, TopIssue, TreeInfo,
};
pub use crate::curriculum::{
    classify, prioritize, Curriculum, CurriculumTopic, Layer, LearnerLevel, ThreeLayerAnalysis,
    MAX_SURFACED_ISSUES,
};
pub use crate::rules::{NoopRuleEngine, ProcessRuleEngine, RuleConfig, RuleEngine, RuleViolation};
