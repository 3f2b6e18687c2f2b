//! Core data model shared by every stage of the analysis pipeline.
//!
//! - [`SourceUnit`] and [`Dialect`] describe the input snippet
//! - [`Finding`] is what an individual detector produces
//! - [`Detection`] is the immutable, source-tagged unit of output
//! - [`AnalysisResult`] bundles detections, tree metadata, diagnostics and a summary

pub mod detection;
pub mod result;
pub mod source;

pub use detection::{Detection, DetectionSource, Finding, Location, Tags};
pub use result::{
    AnalysisResult, Diagnostic, DiagnosticKind, Summary, TopIssue, TreeInfo, DEFAULT_TOP_ISSUES,
};
pub use source::{Dialect, SourceUnit};
