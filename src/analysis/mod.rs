//! Analysis orchestration.
//!
//! One call parses the snippet once, builds the inference maps, runs every
//! applicable detector and the external rule engine, and assembles the
//! [`AnalysisResult`](crate::core::AnalysisResult). Nothing in here returns an error: parse problems,
//! detector panics and rule-engine failures all end up as diagnostics.

mod orchestrator;

pub use orchestrator::{analyze, Analyzer};
