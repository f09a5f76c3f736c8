//! Similarity between pattern instances.
//!
//! `similarity = 0.7 * structure + 0.3 * style`, where structure is the
//! normalized Levenshtein similarity of the normalized structures and style is
//! the mean Jaccard overlap of declarations under shared selectors. When
//! neither instance has associated styles the style term carries no
//! information and the structure score is used on its own.

use ahash::AHashMap;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use crate::engine::markup;
use crate::models::pattern::PatternInstance;

const STRUCTURE_WEIGHT: f64 = 0.7;
const STYLE_WEIGHT: f64 = 0.3;

/// Classic unit-cost Levenshtein distance over chars, two rolling rows.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let (short, long): (Vec<char>, Vec<char>) = {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        if a.len() <= b.len() { (a, b) } else { (b, a) }
    };
    if short.is_empty() {
        return long.len();
    }

    let mut prev: Vec<usize> = (0..=short.len()).collect();
    let mut curr = vec![0; short.len() + 1];

    for (i, lc) in long.iter().enumerate() {
        curr[0] = i + 1;
        for (j, sc) in short.iter().enumerate() {
            let substitution = prev[j] + usize::from(lc != sc);
            curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[short.len()]
}

/// `1 - d / max_len` over whitespace-collapsed, quote-normalized text.
/// Two empty structures score 0.
pub fn structure_similarity(s1: &str, s2: &str) -> f64 {
    let a = markup::canonical_form(s1);
    let b = markup::canonical_form(s2);
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 0.0;
    }
    let distance = levenshtein(&a, &b);
    (1.0 - distance as f64 / max_len as f64).clamp(0.0, 1.0)
}

fn declarations(body: &str) -> BTreeSet<&str> {
    body.split(';')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .collect()
}

/// Jaccard index of two declaration sets; two empty sets are identical.
fn rule_similarity(body1: &str, body2: &str) -> f64 {
    let d1 = declarations(body1);
    let d2 = declarations(body2);
    let union = d1.union(&d2).count();
    if union == 0 {
        return 1.0;
    }
    d1.intersection(&d2).count() as f64 / union as f64
}

/// Mean rule similarity over the selectors both mappings share.
/// Zero when either is empty or they share no selector.
pub fn style_similarity(m1: &BTreeMap<String, String>, m2: &BTreeMap<String, String>) -> f64 {
    if m1.is_empty() || m2.is_empty() {
        return 0.0;
    }
    let scores: Vec<f64> = m1
        .iter()
        .filter_map(|(selector, body)| m2.get(selector).map(|other| rule_similarity(body, other)))
        .collect();
    if scores.is_empty() {
        return 0.0;
    }
    scores.iter().sum::<f64>() / scores.len() as f64
}

/// Weighted similarity of two instances, in `[0, 1]` and symmetric.
pub fn similarity(a: &PatternInstance, b: &PatternInstance) -> f64 {
    let structure = structure_similarity(a.normalized_structure(), b.normalized_structure());
    if a.associated_styles().is_empty() && b.associated_styles().is_empty() {
        return structure;
    }
    let style = style_similarity(a.associated_styles(), b.associated_styles());
    (STRUCTURE_WEIGHT * structure + STYLE_WEIGHT * style).clamp(0.0, 1.0)
}

type PairKey = ([u8; 32], [u8; 32]);

/// Memo table for [`similarity`], scoped to one analysis run.
///
/// Keys are the ordered pair of instance similarity keys, so `(a, b)` and
/// `(b, a)` share one entry and instances that differ only in styles never do.
#[derive(Debug, Default)]
pub struct SimilarityCache {
    entries: Mutex<AHashMap<PairKey, f64>>,
}

impl SimilarityCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn similarity(&self, a: &PatternInstance, b: &PatternInstance) -> f64 {
        let (fa, fb) = (a.similarity_key(), b.similarity_key());
        let key = if fa <= fb { (fa, fb) } else { (fb, fa) };

        if let Some(score) = self.lock().get(&key) {
            return *score;
        }
        // Computed outside the lock so rayon workers do not serialize on it.
        let score = similarity(a, b);
        self.lock().insert(key, score);
        score
    }

    /// Number of memoized pairs.
    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, AHashMap<PairKey, f64>> {
        // The map only ever holds finished values; a poisoned lock is still usable.
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
