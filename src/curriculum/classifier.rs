use super::{Curriculum, CurriculumTopic, Layer};
use crate::core::{AnalysisResult, Detection, DetectionSource};
use serde::Serialize;

/// A detection assigned to a curriculum topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedDetection {
    pub topic: String,
    pub layer: Layer,
    pub detection: Detection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreeLayerAnalysis {
    pub fundamentals: Vec<ClassifiedDetection>,
    pub intermediate: Vec<ClassifiedDetection>,
    pub patterns: Vec<ClassifiedDetection>,
    /// Detections no topic claimed; never surfaced to learners
    pub unclassified: Vec<Detection>,
}

impl ThreeLayerAnalysis {
    pub fn layer(&self, layer: Layer) -> &[ClassifiedDetection] {
        match layer {
            Layer::Fundamentals => &self.fundamentals,
            Layer::Intermediate => &self.intermediate,
            Layer::Patterns => &self.patterns,
        }
    }

    /// Negative detections in `layer`.
    pub fn issues(&self, layer: Layer) -> impl Iterator<Item = &ClassifiedDetection> {
        self.layer(layer).iter().filter(|c| c.detection.is_negative())
    }

    pub fn issue_count(&self, layer: Layer) -> usize {
        self.issues(layer).count()
    }

    pub fn has_fundamental_issues(&self) -> bool {
        self.issues(Layer::Fundamentals).next().is_some()
    }
}

/// Topic checks that cannot be written as a slug list.
fn inferred_match(topic: &CurriculumTopic, detection: &Detection) -> bool {
    let slug = detection.topic_slug();
    match topic.slug.as_str() {
        "mutation-and-references" => detection.source() == DetectionSource::DataFlowDetector,
        "react-hooks-rules" => {
            slug.starts_with("hooks-") || slug.starts_with("effect-") || slug.starts_with("state-")
        }
        "async-error-handling" => matches!(
            slug,
            "promise-without-catch" | "json-parse-without-try" | "empty-catch"
        ),
        _ => false,
    }
}

fn topic_for<'c>(curriculum: &'c Curriculum, detection: &Detection) -> Option<(Layer, &'c CurriculumTopic)> {
    curriculum.topics().find(|(_, topic)| {
        topic.is_triggered_by(detection.topic_slug()) || inferred_match(topic, detection)
    })
}

/// Bucket every detection by the first topic that claims it.
pub fn classify(result: &AnalysisResult, curriculum: &Curriculum) -> ThreeLayerAnalysis {
    let mut analysis = ThreeLayerAnalysis::default();
    for detection in &result.detections {
        let Some((layer, topic)) = topic_for(curriculum, detection) else {
            analysis.unclassified.push(detection.clone());
            continue;
        };
        let classified = ClassifiedDetection {
            topic: topic.slug.clone(),
            layer,
            detection: detection.clone(),
        };
        match layer {
            Layer::Fundamentals => analysis.fundamentals.push(classified),
            Layer::Intermediate => analysis.intermediate.push(classified),
            Layer::Patterns => analysis.patterns.push(classified),
        }
    }
    tracing::debug!(
        fundamentals = analysis.fundamentals.len(),
        intermediate = analysis.intermediate.len(),
        patterns = analysis.patterns.len(),
        unclassified = analysis.unclassified.len(),
        "Classified detections"
    );
    analysis
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;
    use crate::core::{Finding, Location};

    fn catalog() -> Curriculum {
        Curriculum::from_json_str(
            r#"{
              "fundamentals": [
                {"slug": "scope", "name": "Scope", "triggers": ["var-hoisting"]},
                {"slug": "mutation-and-references", "name": "Mutation"}
              ],
              "intermediate": [
                {"slug": "async-error-handling", "name": "Async errors"},
                {"slug": "error-handling", "name": "Errors", "triggers": ["empty-catch"]}
              ],
              "patterns": [
                {"slug": "react-hooks-rules", "name": "Hooks"}
              ]
            }"#,
        )
        .unwrap()
    }

    fn detection(slug: &str, source: DetectionSource) -> Detection {
        Detection::from_finding(Finding::issue(slug, Location::new(1, 0)), source)
    }

    #[test]
    fn test_trigger_match() {
        let result = analyze("var x = 1;", None);
        let analysis = classify(&result, &catalog());
        assert_eq!(analysis.fundamentals.len(), 1);
        assert_eq!(analysis.fundamentals[0].topic, "scope");
        assert_eq!(analysis.issue_count(Layer::Fundamentals), 1);
    }

    #[test]
    fn test_inferred_checks() {
        let curriculum = catalog();
        let flow = detection("storage-object-serialization", DetectionSource::DataFlowDetector);
        assert_eq!(topic_for(&curriculum, &flow).unwrap().1.slug, "mutation-and-references");

        let hook = detection("effect-async-callback", DetectionSource::NativeDetector);
        assert_eq!(topic_for(&curriculum, &hook).unwrap().0, Layer::Patterns);

        // The earlier topic in the same layer claims it first
        let catch = detection("empty-catch", DetectionSource::NativeDetector);
        assert_eq!(topic_for(&curriculum, &catch).unwrap().1.slug, "async-error-handling");
    }

    #[test]
    fn test_unmatched_goes_to_unclassified() {
        let result = analyze("const f = () => 1;", None);
        let analysis = classify(&result, &catalog());
        assert!(analysis.fundamentals.is_empty());
        assert!(!analysis.unclassified.is_empty());
    }
}
