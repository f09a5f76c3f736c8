//! Threshold rules that turn scores into recommendations.

use crate::config::AnalysisOptions;
use crate::engine::registry;
use crate::engine::similarity::structure_similarity;
use crate::models::pattern::PatternClass;
use crate::models::quality::QualityScore;
use crate::models::recommendation::{Priority, Recommendation, RecommendationKind};

fn recommendation(
    class: &PatternClass,
    kind: RecommendationKind,
    priority: Priority,
    message: String,
    suggestion: &str,
) -> Recommendation {
    Recommendation {
        class_id: class.class_id.clone(),
        kind,
        message,
        suggestion: suggestion.to_string(),
        priority,
    }
}

/// Every rule that fires for `class`, in rule order.
fn for_class(
    index: usize,
    classes: &[PatternClass],
    score: &QualityScore,
    options: &AnalysisOptions,
) -> Vec<Recommendation> {
    let class = &classes[index];
    let id = &class.class_id;
    let mut out = Vec::new();

    if score.complexity > options.complexity_threshold {
        out.push(recommendation(
            class,
            RecommendationKind::Complexity,
            Priority::High,
            format!("Pattern '{id}' has high complexity ({:.2})", score.complexity),
            "Consider breaking it down into smaller, reusable components",
        ));
    }

    let variations = registry::variations(class).len();
    if variations > options.variation_limit {
        out.push(recommendation(
            class,
            RecommendationKind::Consistency,
            Priority::Medium,
            format!("Pattern '{id}' has {variations} variations"),
            "Standardize on a single implementation and reuse it",
        ));
    }

    let own = class.representative().normalized_structure();
    for (other_index, other) in classes.iter().enumerate() {
        if other_index == index {
            continue;
        }
        let score = structure_similarity(own, other.representative().normalized_structure());
        if score > options.similarity_threshold {
            out.push(recommendation(
                class,
                RecommendationKind::Duplication,
                Priority::Medium,
                format!(
                    "Pattern '{id}' is similar to '{}' ({score:.2})",
                    other.class_id
                ),
                "Consider merging them into one shared component",
            ));
        }
    }

    if score.maintainability < options.maintainability_threshold {
        out.push(recommendation(
            class,
            RecommendationKind::Maintainability,
            Priority::High,
            format!(
                "Pattern '{id}' has low maintainability ({:.2})",
                score.maintainability
            ),
            "Simplify the template and reduce bindings and style rules",
        ));
    }

    let unchecked = !score.accessibility_applicable && options.skip_unchecked_accessibility;
    if !unchecked && score.accessibility < options.accessibility_threshold {
        out.push(recommendation(
            class,
            RecommendationKind::Accessibility,
            Priority::High,
            format!(
                "Pattern '{id}' has low accessibility ({:.2})",
                score.accessibility
            ),
            "Add ARIA attributes, labels and semantic HTML elements",
        ));
    }

    out
}

/// Recommendations for all classes, highest priority first. Within one
/// priority the class creation order is kept.
pub fn generate(
    classes: &[PatternClass],
    scores: &[QualityScore],
    options: &AnalysisOptions,
) -> Vec<Recommendation> {
    let mut all: Vec<Recommendation> = classes
        .iter()
        .zip(scores)
        .enumerate()
        .flat_map(|(index, (_, score))| for_class(index, classes, score, options))
        .collect();
    all.sort_by(|a, b| b.priority.cmp(&a.priority));
    all
}
