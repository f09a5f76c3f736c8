use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::pattern::{PatternInstance, RuleName};
use super::quality::QualityScore;
use super::recommendation::Recommendation;
use super::relationship::RelationshipMap;

/// The complete output of one `analyze` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub summary: Summary,
    pub patterns: BTreeMap<String, PatternReport>,
    pub relationships: RelationshipMap,
    pub recommendations: Vec<Recommendation>,
}

impl AnalysisResult {
    pub fn empty(components_analyzed: usize) -> Self {
        Self {
            summary: Summary {
                components_analyzed,
                ..Summary::default()
            },
            patterns: BTreeMap::new(),
            relationships: RelationshipMap::new(),
            recommendations: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_patterns_detected: usize,
    pub unique_pattern_types: usize,
    pub components_analyzed: usize,
    pub most_common_patterns: Vec<PatternFrequency>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternFrequency {
    pub name: String,
    /// Number of instances in the class
    pub frequency: usize,
    /// Number of distinct components using it
    pub components: usize,
}

/// Per-class report: usage figures plus the quality score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternReport {
    pub rule: RuleName,
    pub total_usage: usize,
    pub component_coverage: usize,
    pub components: Vec<String>,
    pub variations: Vec<Variation>,
    pub representative: String,
    pub isolated_template: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selector_path: Vec<String>,
    #[serde(flatten)]
    pub quality: QualityScore,
}

/// Members sharing one normalized structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variation {
    pub structure: String,
    pub frequency: usize,
    /// Up to three raw markup samples
    pub examples: Vec<String>,
}

/// Output of the `extract` command: raw instances of one component.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractResult {
    pub component: String,
    pub instances: Vec<PatternInstance>,
}
