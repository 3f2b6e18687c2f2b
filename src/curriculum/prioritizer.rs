use super::{ClassifiedDetection, Layer, ThreeLayerAnalysis};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum number of issues shown to a learner at once.
pub const MAX_SURFACED_ISSUES: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LearnerLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl LearnerLevel {
    fn sees(self, layer: Layer) -> bool {
        match layer {
            Layer::Fundamentals => true,
            Layer::Intermediate | Layer::Patterns => self != LearnerLevel::Beginner,
        }
    }
}

impl fmt::Display for LearnerLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LearnerLevel::Beginner => "beginner",
            LearnerLevel::Intermediate => "intermediate",
            LearnerLevel::Advanced => "advanced",
        };
        f.write_str(name)
    }
}

impl FromStr for LearnerLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "beginner" => Ok(LearnerLevel::Beginner),
            "intermediate" => Ok(LearnerLevel::Intermediate),
            "advanced" => Ok(LearnerLevel::Advanced),
            other => Err(format!("unknown learner level '{}'", other)),
        }
    }
}

/// Issues to show, fundamentals first.
///
/// Any fundamental issue suppresses every other layer, whatever the level.
/// Within a layer non-trivial issues come before trivial ones, then source
/// order. The list never exceeds [`MAX_SURFACED_ISSUES`].
pub fn prioritize(analysis: &ThreeLayerAnalysis, level: LearnerLevel) -> Vec<ClassifiedDetection> {
    let layers: &[Layer] = if analysis.has_fundamental_issues() {
        &[Layer::Fundamentals]
    } else {
        &Layer::ALL
    };

    layers
        .iter()
        .filter(|layer| level.sees(**layer))
        .flat_map(|layer| {
            let mut issues: Vec<&ClassifiedDetection> = analysis.issues(*layer).collect();
            issues.sort_by_key(|c| {
                let location = c.detection.location();
                (
                    c.detection.is_trivial(),
                    location.is_none(),
                    location.map(|l| (l.line, l.column)),
                )
            });
            issues
        })
        .take(MAX_SURFACED_ISSUES)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Detection, DetectionSource, Finding, Location};

    fn classified(layer: Layer, slug: &str, line: usize, trivial: bool) -> ClassifiedDetection {
        let mut finding = Finding::issue(slug, Location::new(line, 0));
        finding.tags.trivial = trivial;
        ClassifiedDetection {
            topic: format!("{}-topic", slug),
            layer,
            detection: Detection::from_finding(finding, DetectionSource::NativeDetector),
        }
    }

    fn slugs(list: &[ClassifiedDetection]) -> Vec<&str> {
        list.iter().map(|c| c.detection.topic_slug()).collect()
    }

    #[test]
    fn test_fundamentals_suppress_other_layers() {
        let analysis = ThreeLayerAnalysis {
            fundamentals: vec![classified(Layer::Fundamentals, "var-hoisting", 3, false)],
            patterns: vec![
                classified(Layer::Patterns, "list-missing-key", 1, false),
                classified(Layer::Patterns, "stale-state-update", 2, false),
            ],
            ..Default::default()
        };
        let surfaced = prioritize(&analysis, LearnerLevel::Advanced);
        assert_eq!(slugs(&surfaced), vec!["var-hoisting"]);
    }

    #[test]
    fn test_beginner_sees_only_fundamentals() {
        let analysis = ThreeLayerAnalysis {
            intermediate: vec![classified(Layer::Intermediate, "await-in-loop", 1, false)],
            ..Default::default()
        };
        assert!(prioritize(&analysis, LearnerLevel::Beginner).is_empty());
        assert_eq!(prioritize(&analysis, LearnerLevel::Intermediate).len(), 1);
    }

    #[test]
    fn test_non_trivial_first_then_source_order() {
        let analysis = ThreeLayerAnalysis {
            fundamentals: vec![
                classified(Layer::Fundamentals, "prefer-const", 1, true),
                classified(Layer::Fundamentals, "loose-equality", 4, false),
                classified(Layer::Fundamentals, "var-hoisting", 2, false),
            ],
            ..Default::default()
        };
        let surfaced = prioritize(&analysis, LearnerLevel::Beginner);
        assert_eq!(slugs(&surfaced), vec!["var-hoisting", "loose-equality", "prefer-const"]);
    }

    #[test]
    fn test_truncated_to_limit() {
        let analysis = ThreeLayerAnalysis {
            intermediate: (1..=4)
                .map(|line| classified(Layer::Intermediate, "await-in-loop", line, false))
                .collect(),
            patterns: (1..=4)
                .map(|line| classified(Layer::Patterns, "list-missing-key", line, false))
                .collect(),
            ..Default::default()
        };
        let surfaced = prioritize(&analysis, LearnerLevel::Advanced);
        assert_eq!(surfaced.len(), MAX_SURFACED_ISSUES);
        assert_eq!(surfaced[4].layer, Layer::Patterns);
    }

    #[test]
    fn test_positive_only_detections_are_not_issues() {
        let mut good = classified(Layer::Fundamentals, "const-declaration", 1, false);
        good.detection = Detection::from_finding(
            Finding::good_practice("const-declaration", Location::new(1, 0)),
            DetectionSource::NativeDetector,
        );
        let analysis = ThreeLayerAnalysis {
            fundamentals: vec![good],
            patterns: vec![classified(Layer::Patterns, "list-missing-key", 2, false)],
            ..Default::default()
        };
        assert_eq!(slugs(&prioritize(&analysis, LearnerLevel::Advanced)), vec!["list-missing-key"]);
    }

    #[test]
    fn test_level_parsing() {
        assert_eq!("Advanced".parse::<LearnerLevel>(), Ok(LearnerLevel::Advanced));
        assert!("expert".parse::<LearnerLevel>().is_err());
    }
}
