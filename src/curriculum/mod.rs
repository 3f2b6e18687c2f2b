//! Curriculum catalog and the three-layer model.
//!
//! The catalog is external data: topics grouped into fundamentals,
//! intermediate and pattern layers, each with the detection slugs that
//! trigger it. [`classify`] buckets an analysis result by layer and
//! [`prioritize`] picks what to show a learner.

mod classifier;
mod prioritizer;

pub use classifier::{classify, ClassifiedDetection, ThreeLayerAnalysis};
pub use prioritizer::{prioritize, LearnerLevel, MAX_SURFACED_ISSUES};

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

const BUILTIN_CATALOG: &str = include_str!("../../data/curriculum.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    Fundamentals,
    Intermediate,
    Patterns,
}

impl Layer {
    pub const ALL: [Layer; 3] = [Layer::Fundamentals, Layer::Intermediate, Layer::Patterns];
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Layer::Fundamentals => "fundamentals",
            Layer::Intermediate => "intermediate",
            Layer::Patterns => "patterns",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurriculumTopic {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    /// Detection slugs that map onto this topic
    #[serde(default)]
    pub triggers: Vec<String>,
}

impl CurriculumTopic {
    pub fn is_triggered_by(&self, slug: &str) -> bool {
        self.slug == slug || self.triggers.iter().any(|t| t == slug)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Curriculum {
    #[serde(default)]
    pub fundamentals: Vec<CurriculumTopic>,
    #[serde(default)]
    pub intermediate: Vec<CurriculumTopic>,
    #[serde(default)]
    pub patterns: Vec<CurriculumTopic>,
}

impl Curriculum {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let curriculum: Curriculum = serde_json::from_str(json)?;
        curriculum.validate()?;
        Ok(curriculum)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::file_system("Failed to read curriculum", path, e))?;
        Self::from_json_str(&json)
            .map_err(|e| e.with_context(format!("Failed to load {}", path.display())))
    }

    /// The catalog shipped with the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_json_str(BUILTIN_CATALOG)
    }

    pub fn layer(&self, layer: Layer) -> &[CurriculumTopic] {
        match layer {
            Layer::Fundamentals => &self.fundamentals,
            Layer::Intermediate => &self.intermediate,
            Layer::Patterns => &self.patterns,
        }
    }

    /// Every topic with its layer, in classification order.
    pub fn topics(&self) -> impl Iterator<Item = (Layer, &CurriculumTopic)> {
        Layer::ALL
            .into_iter()
            .flat_map(move |layer| self.layer(layer).iter().map(move |topic| (layer, topic)))
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for (layer, topic) in self.topics() {
            if topic.slug.is_empty() {
                return Err(Error::Curriculum(format!("topic in {} has an empty slug", layer)));
            }
            if !seen.insert(topic.slug.as_str()) {
                return Err(Error::Curriculum(format!("duplicate topic slug '{}'", topic.slug)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_builtin_catalog_loads() {
        let curriculum = Curriculum::builtin().unwrap();
        assert!(!curriculum.fundamentals.is_empty());
        assert!(!curriculum.intermediate.is_empty());
        assert!(!curriculum.patterns.is_empty());
    }

    #[test]
    fn test_builtin_triggers_are_known_detectors() {
        let curriculum = Curriculum::builtin().unwrap();
        for (_, topic) in curriculum.topics() {
            for trigger in &topic.triggers {
                assert!(
                    crate::detectors::find_detector(trigger).is_some(),
                    "{} triggers unknown slug {}",
                    topic.slug,
                    trigger
                );
            }
        }
    }

    #[test]
    fn test_duplicate_slug_rejected() {
        let json = r#"{
            "fundamentals": [{"slug": "scope", "name": "Scope"}],
            "patterns": [{"slug": "scope", "name": "Scope again"}]
        }"#;
        assert!(matches!(Curriculum::from_json_str(json), Err(Error::Curriculum(_))));
    }

    #[test]
    fn test_missing_layers_default_to_empty() {
        let curriculum = Curriculum::from_json_str(r#"{"intermediate": []}"#).unwrap();
        assert_eq!(curriculum.topics().count(), 0);
    }

    #[test]
    fn test_from_path() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(
            file.path(),
            r#"{"fundamentals": [{"slug": "scope", "name": "Scope", "triggers": ["var-hoisting"]}]}"#,
        )
        .unwrap();
        let curriculum = Curriculum::from_path(file.path()).unwrap();
        assert!(curriculum.fundamentals[0].is_triggered_by("var-hoisting"));
        assert!(curriculum.fundamentals[0].is_triggered_by("scope"));
    }
}
