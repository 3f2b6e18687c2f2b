// Test utility module for snippetscope integration tests
#![allow(dead_code)]

use snippetscope::{analyze, AnalysisResult, Detection};

/// Analyze with the default configuration and an inferred dialect.
pub fn analyze_snippet(code: &str) -> AnalysisResult {
    analyze(code, None)
}

pub fn slugs(result: &AnalysisResult) -> Vec<&str> {
    result.detections.iter().map(|d| d.topic_slug()).collect()
}

pub fn find<'a>(result: &'a AnalysisResult, slug: &str) -> Vec<&'a Detection> {
    result
        .detections
        .iter()
        .filter(|d| d.topic_slug() == slug)
        .collect()
}

/// Detections reduced to the fields that must be stable across runs.
pub fn fingerprint(result: &AnalysisResult) -> Vec<(String, bool, bool, bool, bool, Option<(usize, usize)>)> {
    result
        .detections
        .iter()
        .map(|d| {
            (
                d.topic_slug().to_string(),
                d.is_positive(),
                d.is_negative(),
                d.is_idiomatic(),
                d.is_trivial(),
                d.location().map(|l| (l.line, l.column)),
            )
        })
        .collect()
}
