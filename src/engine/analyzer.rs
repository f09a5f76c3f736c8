//! The full pipeline: extract, group, score, relate, recommend.
//!
//! Every call starts from scratch. The similarity memo lives for one call
//! only and nothing is carried over between calls.

use anyhow::Result;
use rayon::prelude::*;
use std::cmp::Reverse;
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::config::AnalysisOptions;
use crate::engine::registry::{self, PatternRegistry};
use crate::engine::similarity::SimilarityCache;
use crate::engine::{extractor, recommend, relationships, scorer};
use crate::error::SightError;
use crate::models::analysis::{AnalysisResult, PatternFrequency, PatternReport, Summary};
use crate::models::component::ComponentRecord;
use crate::models::pattern::{PatternClass, PatternInstance};
use crate::models::quality::QualityScore;

const MOST_COMMON_LIMIT: usize = 5;

/// Check every record before any work is done.
fn validate(components: &[ComponentRecord]) -> Result<()> {
    for (index, component) in components.iter().enumerate() {
        component.validate().map_err(|e| {
            SightError::malformed(format!("component record #{index}: {}", e.message))
        })?;
    }
    Ok(())
}

/// Instances of all components, in component order then rule order.
pub fn extract_all(components: &[ComponentRecord], options: &AnalysisOptions) -> Vec<PatternInstance> {
    let per_component: Vec<Vec<PatternInstance>> = if options.parallel {
        components
            .par_iter()
            .map(|c| extractor::extract(c, options.chunk_size))
            .collect()
    } else {
        components
            .iter()
            .map(|c| extractor::extract(c, options.chunk_size))
            .collect()
    };
    per_component.into_iter().flatten().collect()
}

/// Run the whole analysis over `components`.
///
/// Fails with `MALFORMED_INPUT` before producing anything when a record is
/// invalid. No patterns at all is a valid, empty result.
pub fn analyze(components: &[ComponentRecord], options: &AnalysisOptions) -> Result<AnalysisResult> {
    options.validate()?;
    validate(components)?;

    let instances = extract_all(components, options);
    if instances.is_empty() {
        info!(components = components.len(), "no patterns found");
        return Ok(AnalysisResult::empty(components.len()));
    }

    let cache = SimilarityCache::new();
    let registry = PatternRegistry::register(instances, options.similarity_threshold, &cache);
    let classes = registry.classes();

    let scores: Vec<QualityScore> = classes.iter().map(scorer::score).collect();
    let relationships = relationships::analyze(
        &registry,
        options.similarity_threshold,
        &cache,
        options.parallel,
    );
    let recommendations = recommend::generate(classes, &scores, options);

    let patterns: BTreeMap<String, PatternReport> = classes
        .iter()
        .zip(&scores)
        .map(|(class, score)| (class.class_id.clone(), report(class, *score)))
        .collect();

    let summary = Summary {
        total_patterns_detected: registry.instance_count(),
        unique_pattern_types: registry.len(),
        components_analyzed: components.len(),
        most_common_patterns: most_common(classes),
    };

    debug!(memoized_pairs = cache.len(), "similarity memo size");
    info!(
        components = components.len(),
        instances = summary.total_patterns_detected,
        classes = summary.unique_pattern_types,
        recommendations = recommendations.len(),
        "analysis complete"
    );

    Ok(AnalysisResult {
        summary,
        patterns,
        relationships,
        recommendations,
    })
}

fn report(class: &PatternClass, quality: QualityScore) -> PatternReport {
    let representative = class.representative();
    PatternReport {
        rule: class.rule(),
        total_usage: class.members().len(),
        component_coverage: class.components_using().len(),
        components: class.components_using().iter().cloned().collect(),
        variations: registry::variations(class),
        representative: representative.raw_markup().to_string(),
        isolated_template: representative.isolated_template().to_string(),
        selector_path: representative.selector_path().to_vec(),
        quality,
    }
}

/// Largest classes first; ties keep creation order.
fn most_common(classes: &[PatternClass]) -> Vec<PatternFrequency> {
    let mut ranked: Vec<&PatternClass> = classes.iter().collect();
    ranked.sort_by_key(|class| Reverse(class.members().len()));
    ranked
        .into_iter()
        .take(MOST_COMMON_LIMIT)
        .map(|class| PatternFrequency {
            name: class.class_id.clone(),
            frequency: class.members().len(),
            components: class.components_using().len(),
        })
        .collect()
}
