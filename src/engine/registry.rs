//! Grouping of pattern instances into pattern classes.
//!
//! Grouping is first-match: an instance joins the earliest-created class
//! whose representative it is similar enough to, even when a later class
//! would be a closer fit. The outcome therefore depends on input order, and
//! callers must hand instances over in a reproducible order.

use tracing::debug;

use crate::engine::markup;
use crate::engine::similarity::SimilarityCache;
use crate::models::analysis::Variation;
use crate::models::pattern::{PatternClass, PatternInstance};

const VARIATION_EXAMPLES: usize = 3;

/// Pattern classes of one analysis run, in creation order.
#[derive(Debug, Clone, Default)]
pub struct PatternRegistry {
    classes: Vec<PatternClass>,
}

impl PatternRegistry {
    /// Group `instances` in order. The registry starts empty on every call.
    pub fn register(
        instances: impl IntoIterator<Item = PatternInstance>,
        threshold: f64,
        cache: &SimilarityCache,
    ) -> Self {
        let mut registry = Self::default();
        for instance in instances {
            registry.insert(instance, threshold, cache);
        }
        debug!(
            classes = registry.classes.len(),
            instances = registry.instance_count(),
            "pattern registry built"
        );
        registry
    }

    fn insert(&mut self, instance: PatternInstance, threshold: f64, cache: &SimilarityCache) {
        let target = self
            .classes
            .iter()
            .position(|class| cache.similarity(&instance, class.representative()) > threshold);

        match target {
            Some(index) => self.classes[index].push(instance),
            None => {
                let id = self.next_class_id(instance.rule().as_str());
                self.classes.push(PatternClass::new(id, instance));
            }
        }
    }

    /// `rule`, then `rule#2`, `rule#3` for later unrelated classes of one rule.
    fn next_class_id(&self, rule: &str) -> String {
        let taken = self
            .classes
            .iter()
            .filter(|class| class.rule().as_str() == rule)
            .count();
        if taken == 0 {
            rule.to_string()
        } else {
            format!("{rule}#{}", taken + 1)
        }
    }

    /// Classes in creation order.
    pub fn classes(&self) -> &[PatternClass] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Total number of grouped instances.
    pub fn instance_count(&self) -> usize {
        self.classes.iter().map(|class| class.members().len()).sum()
    }

}

/// Members of `class` grouped by normalized structure, in first-seen order.
pub fn variations(class: &PatternClass) -> Vec<Variation> {
    let mut groups: Vec<(String, Variation)> = Vec::new();
    for member in class.members() {
        let key = markup::canonical_form(member.normalized_structure());
        let index = match groups.iter().position(|(k, _)| *k == key) {
            Some(index) => index,
            None => {
                groups.push((
                    key,
                    Variation {
                        structure: member.normalized_structure().to_string(),
                        frequency: 0,
                        examples: Vec::new(),
                    },
                ));
                groups.len() - 1
            }
        };
        let variation = &mut groups[index].1;
        variation.frequency += 1;
        if variation.examples.len() < VARIATION_EXAMPLES {
            variation.examples.push(member.raw_markup().to_string());
        }
    }
    groups.into_iter().map(|(_, variation)| variation).collect()
}
