//! Detections and the detector-side findings they are built from.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Source position. `line` is 1-based, `column` is 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Which stage of the pipeline produced a detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DetectionSource {
    NativeDetector,
    DataFlowDetector,
    ExternalRuleEngine,
}

/// The four classification tags.
///
/// The tags are independent: a finding may be both positive and negative
/// ("works, but there is a better way").
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Tags {
    pub positive: bool,
    pub negative: bool,
    pub idiomatic: bool,
    pub trivial: bool,
}

impl Tags {
    pub const ISSUE: Tags = Tags {
        positive: false,
        negative: true,
        idiomatic: false,
        trivial: false,
    };

    pub const GOOD_PRACTICE: Tags = Tags {
        positive: true,
        negative: false,
        idiomatic: true,
        trivial: false,
    };

    pub const ACCEPTABLE: Tags = Tags {
        positive: true,
        negative: true,
        idiomatic: false,
        trivial: false,
    };
}

/// What a detector reports before the orchestrator tags it with its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub slug: String,
    pub tags: Tags,
    pub location: Option<Location>,
    pub details: Option<String>,
}

impl Finding {
    pub fn new(slug: impl Into<String>, tags: Tags, location: Location) -> Self {
        Self {
            slug: slug.into(),
            tags,
            location: Some(location),
            details: None,
        }
    }

    /// A problem worth pointing out.
    pub fn issue(slug: impl Into<String>, location: Location) -> Self {
        Self::new(slug, Tags::ISSUE, location)
    }

    /// An idiomatic good practice.
    pub fn good_practice(slug: impl Into<String>, location: Location) -> Self {
        Self::new(slug, Tags::GOOD_PRACTICE, location)
    }

    /// Correct code that still deserves a style note.
    pub fn acceptable(slug: impl Into<String>, location: Location) -> Self {
        Self::new(slug, Tags::ACCEPTABLE, location)
    }

    pub fn trivial(mut self) -> Self {
        self.tags.trivial = true;
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Sort key used by the source-order post-filters; findings without a
    /// location sort last.
    pub fn source_order(&self) -> (usize, usize) {
        self.location
            .map(|loc| (loc.line, loc.column))
            .unwrap_or((usize::MAX, usize::MAX))
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// One reported finding, tagged with the stage that produced it.
///
/// Fields are private so a detection cannot be altered after construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    topic_slug: String,
    detected: bool,
    is_positive: bool,
    is_negative: bool,
    is_idiomatic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    is_trivial: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    source: DetectionSource,
}

impl Detection {
    pub fn from_finding(finding: Finding, source: DetectionSource) -> Self {
        Self {
            topic_slug: finding.slug,
            detected: true,
            is_positive: finding.tags.positive,
            is_negative: finding.tags.negative,
            is_idiomatic: finding.tags.idiomatic,
            is_trivial: finding.tags.trivial,
            location: finding.location,
            details: finding.details,
            source,
        }
    }

    pub fn topic_slug(&self) -> &str {
        &self.topic_slug
    }

    pub fn detected(&self) -> bool {
        self.detected
    }

    pub fn is_positive(&self) -> bool {
        self.is_positive
    }

    pub fn is_negative(&self) -> bool {
        self.is_negative
    }

    pub fn is_idiomatic(&self) -> bool {
        self.is_idiomatic
    }

    pub fn is_trivial(&self) -> bool {
        self.is_trivial
    }

    pub fn location(&self) -> Option<Location> {
        self.location
    }

    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    pub fn source(&self) -> DetectionSource {
        self.source
    }

    pub fn tags(&self) -> Tags {
        Tags {
            positive: self.is_positive,
            negative: self.is_negative,
            idiomatic: self.is_idiomatic,
            trivial: self.is_trivial,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detection_wire_shape() {
        let finding = Finding::issue("loose-equality", Location::new(3, 4))
            .trivial()
            .with_details("use ===");
        let detection = Detection::from_finding(finding, DetectionSource::NativeDetector);

        let value = serde_json::to_value(&detection).unwrap();
        assert_eq!(
            value,
            json!({
                "topicSlug": "loose-equality",
                "detected": true,
                "isPositive": false,
                "isNegative": true,
                "isIdiomatic": false,
                "isTrivial": true,
                "location": { "line": 3, "column": 4 },
                "details": "use ===",
                "source": "native-detector"
            })
        );
    }

    #[test]
    fn test_optional_fields_are_omitted() {
        let mut finding = Finding::good_practice("arrow-function", Location::new(1, 0));
        finding.location = None;
        let detection = Detection::from_finding(finding, DetectionSource::DataFlowDetector);
        let value = serde_json::to_value(&detection).unwrap();

        assert!(value.get("isTrivial").is_none());
        assert!(value.get("location").is_none());
        assert!(value.get("details").is_none());
        assert_eq!(value["source"], "data-flow-detector");
    }

    #[test]
    fn test_tags_are_independent() {
        let detection = Detection::from_finding(
            Finding::acceptable("json-deep-clone", Location::new(1, 0)),
            DetectionSource::NativeDetector,
        );
        assert!(detection.is_positive());
        assert!(detection.is_negative());
        assert!(!detection.is_idiomatic());
    }

    #[test]
    fn test_source_order_puts_unlocated_last() {
        let mut unlocated = Finding::issue("a", Location::new(1, 0));
        unlocated.location = None;
        let located = Finding::issue("a", Location::new(99, 3));
        assert!(located.source_order() < unlocated.source_order());
    }
}
