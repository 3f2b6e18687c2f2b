//! Analysis output: detections, tree metadata, diagnostics and summary.

use super::detection::{Detection, Location};
use super::source::Dialect;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Number of entries in [`Summary::top_issues`] unless configured otherwise.
pub const DEFAULT_TOP_ISSUES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// Syntax error or missing token; the tree is partial
    Parse,
    /// A detector panicked; its contribution was dropped
    DetectorFault,
    /// The external rule engine failed; no engine detections were added
    RuleEngine,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl Diagnostic {
    pub fn parse(message: impl Into<String>, location: Option<Location>) -> Self {
        Self {
            kind: DiagnosticKind::Parse,
            message: message.into(),
            location,
        }
    }

    pub fn detector_fault(detector: &str, message: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::DetectorFault,
            message: format!("detector '{}' failed: {}", detector, message.into()),
            location: None,
        }
    }

    pub fn rule_engine(message: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::RuleEngine,
            message: message.into(),
            location: None,
        }
    }
}

/// Metadata about the syntax tree the detections were computed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeInfo {
    pub dialect: Dialect,
    pub uses_framework: bool,
    pub uses_typed_superset: bool,
    pub statement_count: usize,
    /// True when the parser had to recover from errors
    pub partial: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopIssue {
    pub topic_slug: String,
    pub count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_location: Option<Location>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total: usize,
    pub positive: usize,
    pub negative: usize,
    pub idiomatic: usize,
    pub trivial: usize,
    pub distinct_topics: Vec<String>,
    pub top_issues: Vec<TopIssue>,
}

impl Summary {
    /// Aggregate counts over `detections`.
    ///
    /// Top issues are the non-trivial negative detections grouped by slug,
    /// ordered by count (descending) and then by first appearance.
    pub fn compute(detections: &[Detection], top_n: usize) -> Self {
        let distinct_topics: BTreeSet<&str> =
            detections.iter().map(|d| d.topic_slug()).collect();

        let mut order: Vec<&str> = Vec::new();
        let mut groups: HashMap<&str, (usize, Option<Location>)> = HashMap::new();
        for detection in detections
            .iter()
            .filter(|d| d.is_negative() && !d.is_trivial())
        {
            let entry = groups.entry(detection.topic_slug()).or_insert_with(|| {
                order.push(detection.topic_slug());
                (0, detection.location())
            });
            entry.0 += 1;
        }

        let mut top_issues: Vec<TopIssue> = order
            .iter()
            .map(|slug| {
                let (count, first_location) = groups[slug];
                TopIssue {
                    topic_slug: slug.to_string(),
                    count,
                    first_location,
                }
            })
            .collect();
        // Stable sort keeps first-appearance order among equal counts
        top_issues.sort_by(|a, b| b.count.cmp(&a.count));
        top_issues.truncate(top_n);

        Self {
            total: detections.len(),
            positive: detections.iter().filter(|d| d.is_positive()).count(),
            negative: detections.iter().filter(|d| d.is_negative()).count(),
            idiomatic: detections.iter().filter(|d| d.is_idiomatic()).count(),
            trivial: detections.iter().filter(|d| d.is_trivial()).count(),
            distinct_topics: distinct_topics.into_iter().map(String::from).collect(),
            top_issues,
        }
    }
}

/// Everything one call to `analyze` produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub tree: TreeInfo,
    pub detections: Vec<Detection>,
    pub summary: Summary,
    pub diagnostics: Vec<Diagnostic>,
}

impl AnalysisResult {
    pub fn has_topic(&self, slug: &str) -> bool {
        self.detections.iter().any(|d| d.topic_slug() == slug)
    }

    pub fn detections_for<'a>(&'a self, slug: &'a str) -> impl Iterator<Item = &'a Detection> + 'a {
        self.detections.iter().filter(move |d| d.topic_slug() == slug)
    }

    pub fn issues(&self) -> impl Iterator<Item = &Detection> {
        self.detections.iter().filter(|d| d.is_negative())
    }

    pub fn parse_diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.kind == DiagnosticKind::Parse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DetectionSource, Finding};

    fn detection(finding: Finding) -> Detection {
        Detection::from_finding(finding, DetectionSource::NativeDetector)
    }

    #[test]
    fn test_summary_counts() {
        let detections = vec![
            detection(Finding::issue("loose-equality", Location::new(1, 0)).trivial()),
            detection(Finding::good_practice("arrow-function", Location::new(2, 0))),
            detection(Finding::acceptable("json-deep-clone", Location::new(3, 0))),
        ];
        let summary = Summary::compute(&detections, DEFAULT_TOP_ISSUES);

        assert_eq!(summary.total, 3);
        assert_eq!(summary.positive, 2);
        assert_eq!(summary.negative, 2);
        assert_eq!(summary.idiomatic, 1);
        assert_eq!(summary.trivial, 1);
        assert_eq!(
            summary.distinct_topics,
            vec!["arrow-function", "json-deep-clone", "loose-equality"]
        );
    }

    #[test]
    fn test_top_issues_skip_trivial_and_rank_by_count() {
        let detections = vec![
            detection(Finding::issue("empty-catch", Location::new(1, 0))),
            detection(Finding::issue("eval-usage", Location::new(2, 0))),
            detection(Finding::issue("eval-usage", Location::new(5, 0))),
            detection(Finding::issue("prefer-const", Location::new(6, 0)).trivial()),
        ];
        let summary = Summary::compute(&detections, 1);

        assert_eq!(summary.top_issues.len(), 1);
        assert_eq!(summary.top_issues[0].topic_slug, "eval-usage");
        assert_eq!(summary.top_issues[0].count, 2);
        assert_eq!(summary.top_issues[0].first_location, Some(Location::new(2, 0)));
    }

    #[test]
    fn test_top_issue_ties_keep_first_appearance() {
        let detections = vec![
            detection(Finding::issue("b-topic", Location::new(1, 0))),
            detection(Finding::issue("a-topic", Location::new(2, 0))),
        ];
        let summary = Summary::compute(&detections, 5);
        let slugs: Vec<_> = summary.top_issues.iter().map(|t| t.topic_slug.as_str()).collect();
        assert_eq!(slugs, vec!["b-topic", "a-topic"]);
    }
}
