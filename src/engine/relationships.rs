//! Edges between pattern classes.
//!
//! Each unordered pair is classified once and recorded in both directions:
//! strict containment of representative markup first, then representative
//! similarity, then shared components.

use rayon::prelude::*;
use std::collections::BTreeSet;
use tracing::debug;

use crate::engine::registry::PatternRegistry;
use crate::engine::similarity::SimilarityCache;
use crate::models::pattern::PatternClass;
use crate::models::relationship::{Relationship, RelationshipKind, RelationshipMap};

type Edge = (String, String, Relationship);

/// Classify one pair. Returns the `a -> b` and `b -> a` edges.
fn classify(
    a: &PatternClass,
    b: &PatternClass,
    threshold: f64,
    cache: &SimilarityCache,
) -> Vec<Edge> {
    let rep_a = a.representative();
    let rep_b = b.representative();
    let shared: BTreeSet<String> = a
        .components_using()
        .intersection(b.components_using())
        .cloned()
        .collect();

    let edge = |from: &PatternClass, to: &PatternClass, kind, strength| {
        (
            from.class_id.clone(),
            to.class_id.clone(),
            Relationship {
                kind,
                strength,
                shared_components: shared.clone(),
            },
        )
    };

    let (raw_a, raw_b) = (rep_a.raw_markup(), rep_b.raw_markup());
    let edges = if raw_a != raw_b && raw_b.contains(raw_a) {
        let strength = cache.similarity(rep_a, rep_b);
        vec![
            edge(a, b, RelationshipKind::NestedChild, strength),
            edge(b, a, RelationshipKind::NestedParent, strength),
        ]
    } else if raw_a != raw_b && raw_a.contains(raw_b) {
        let strength = cache.similarity(rep_a, rep_b);
        vec![
            edge(a, b, RelationshipKind::NestedParent, strength),
            edge(b, a, RelationshipKind::NestedChild, strength),
        ]
    } else {
        let strength = cache.similarity(rep_a, rep_b);
        if strength > threshold {
            vec![
                edge(a, b, RelationshipKind::Similar, strength),
                edge(b, a, RelationshipKind::Similar, strength),
            ]
        } else if !shared.is_empty() {
            let relative = |class: &PatternClass| {
                shared.len() as f64 / class.components_using().len().max(1) as f64
            };
            vec![
                edge(a, b, RelationshipKind::CoOccurring, relative(a)),
                edge(b, a, RelationshipKind::CoOccurring, relative(b)),
            ]
        } else {
            Vec::new()
        }
    };

    edges
        .into_iter()
        .filter(|(_, _, rel)| rel.strength > 0.0)
        .collect()
}

/// Relationship map over every pair of classes in `registry`.
pub fn analyze(
    registry: &PatternRegistry,
    threshold: f64,
    cache: &SimilarityCache,
    parallel: bool,
) -> RelationshipMap {
    let classes = registry.classes();
    let pairs: Vec<(usize, usize)> = (0..classes.len())
        .flat_map(|i| (i + 1..classes.len()).map(move |j| (i, j)))
        .collect();

    let classify_pair = |&(i, j): &(usize, usize)| classify(&classes[i], &classes[j], threshold, cache);
    let edges: Vec<Vec<Edge>> = if parallel {
        pairs.par_iter().map(classify_pair).collect()
    } else {
        pairs.iter().map(classify_pair).collect()
    };

    let mut map = RelationshipMap::new();
    for (from, to, relationship) in edges.into_iter().flatten() {
        map.entry(from).or_default().insert(to, relationship);
    }

    debug!(
        pairs = pairs.len(),
        sources = map.len(),
        "relationships analyzed"
    );
    map
}
