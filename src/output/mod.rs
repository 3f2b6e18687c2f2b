//! Report rendering for the command-line front end.

pub mod json;
pub mod terminal;

use crate::core::AnalysisResult;
use crate::curriculum::{ClassifiedDetection, Layer, LearnerLevel, ThreeLayerAnalysis};
use clap::ValueEnum;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Terminal,
}

/// Per-layer issue counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LayerCounts {
    pub fundamentals: usize,
    pub intermediate: usize,
    pub patterns: usize,
    pub unclassified: usize,
}

impl LayerCounts {
    pub fn from_analysis(analysis: &ThreeLayerAnalysis) -> Self {
        Self {
            fundamentals: analysis.issue_count(Layer::Fundamentals),
            intermediate: analysis.issue_count(Layer::Intermediate),
            patterns: analysis.issue_count(Layer::Patterns),
            unclassified: analysis.unclassified.len(),
        }
    }
}

/// What a learner at `level` should look at first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerView {
    pub level: LearnerLevel,
    pub layer_counts: LayerCounts,
    pub surfaced: Vec<ClassifiedDetection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReport {
    pub path: PathBuf,
    #[serde(flatten)]
    pub result: AnalysisResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub learner: Option<LearnerView>,
}
