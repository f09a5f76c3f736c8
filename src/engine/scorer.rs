//! Quality scoring of pattern classes.
//!
//! Every dimension is computed per member and averaged over the class. All
//! inputs are the members themselves; nothing here reads external state.

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use regex::Regex;
use std::sync::LazyLock;

use crate::engine::markup;
use crate::models::pattern::{PatternClass, PatternInstance};
use crate::models::quality::QualityScore;

const SEMANTIC_ELEMENTS: &[&str] = &[
    "nav", "main", "header", "footer", "section", "article", "aside", "label", "fieldset",
    "legend",
];

static SEMANTIC_OPENERS: LazyLock<AhoCorasick> = LazyLock::new(|| {
    let openers: Vec<String> = SEMANTIC_ELEMENTS.iter().map(|e| format!("<{e}")).collect();
    AhoCorasickBuilder::new()
        .ascii_case_insensitive(true)
        .match_kind(MatchKind::LeftmostFirst)
        .build(openers)
        .unwrap()
});

static ARIA_OR_ROLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s(?:\[attr\.)?(?:aria-[a-z-]+|role)\]?\s*=").unwrap()
});

static ARIA_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s(?:\[attr\.)?aria-(?:label|labelledby)\]?\s*=").unwrap()
});

static FORM_OPEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<form\b").unwrap());

static LABEL_OPEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<label\b").unwrap());

static IMG_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<img\b([^>]*)>").unwrap());

static ALT_ATTRIBUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s\[?alt\]?(?:\s*=|\s|$)").unwrap());

static BUTTON_ELEMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<button\b([^>]*)>(.*?)</button\s*>").unwrap());

/// Counts of checks for one member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Checklist {
    passed: u32,
    applicable: u32,
}

impl Checklist {
    fn check(&mut self, ok: bool) {
        self.applicable += 1;
        self.passed += u32::from(ok);
    }

    fn ratio(self) -> Option<f64> {
        (self.applicable > 0).then(|| f64::from(self.passed) / f64::from(self.applicable))
    }
}

/// Sum of non-empty `;`-separated declarations over every associated rule body.
fn declaration_count(instance: &PatternInstance) -> usize {
    instance
        .associated_styles()
        .values()
        .flat_map(|body| body.split(';'))
        .filter(|d| !d.trim().is_empty())
        .count()
}

fn pct(value: usize) -> f64 {
    value.min(100) as f64
}

/// `(template, style, logic)` percentages of one member.
pub fn complexity_parts(instance: &PatternInstance) -> (f64, f64, f64) {
    let normalized = instance.normalized_structure();
    let raw = instance.raw_markup();

    let template = pct(markup::tag_count(normalized) * 5 + markup::directive_count(normalized) * 10);
    let style = pct(declaration_count(instance) * 5);
    let logic = pct(markup::interpolation_count(raw) * 10 + markup::event_binding_count(raw) * 15);
    (template, style, logic)
}

pub fn complexity(instance: &PatternInstance) -> f64 {
    let (template, style, logic) = complexity_parts(instance);
    ((template * 0.4 + style * 0.3 + logic * 0.3) / 100.0).clamp(0.0, 1.0)
}

/// Fraction of applicable accessibility checks passed, `None` when nothing
/// in the fragment is subject to any check.
pub fn accessibility(raw: &str) -> Option<f64> {
    let mut checks = Checklist::default();

    if markup::TAG.captures_iter(raw).any(|caps| caps[1].is_empty()) {
        checks.check(ARIA_OR_ROLE.is_match(raw));
    }

    // Semantic elements only ever add passes.
    for _ in present_semantic_elements(raw) {
        checks.check(true);
    }

    if FORM_OPEN.is_match(raw) {
        checks.check(ARIA_NAME.is_match(raw));
        checks.check(LABEL_OPEN.is_match(raw));
    }

    for img in IMG_TAG.captures_iter(raw) {
        checks.check(ALT_ATTRIBUTE.is_match(&img[1]));
    }

    for button in BUTTON_ELEMENT.captures_iter(raw) {
        checks.check(ARIA_NAME.is_match(&button[1]) || !button[2].trim().is_empty());
    }

    checks.ratio()
}

fn present_semantic_elements(raw: &str) -> Vec<&'static str> {
    let bytes = raw.as_bytes();
    let mut found: Vec<&'static str> = Vec::new();
    for m in SEMANTIC_OPENERS.find_iter(raw) {
        let terminated = bytes
            .get(m.end())
            .is_none_or(|b| b.is_ascii_whitespace() || *b == b'>' || *b == b'/');
        let element = SEMANTIC_ELEMENTS[m.pattern().as_usize()];
        if terminated && !found.contains(&element) {
            found.push(element);
        }
    }
    found
}

pub fn maintainability(instance: &PatternInstance) -> f64 {
    let raw = instance.raw_markup();
    let inverse = |metric: usize, scale: f64| 1.0 - (metric as f64 / scale).min(1.0);

    let depth = markup::tag_count(instance.normalized_structure());
    let template = inverse(markup::line_count(raw) * depth, 100.0);
    let style = inverse(declaration_count(instance), 50.0);
    let bindings = markup::interpolation_count(raw)
        + markup::property_binding_count(raw)
        + markup::event_binding_count(raw);
    let binding = inverse(bindings, 20.0);
    let isolation = inverse(
        markup::residual_interpolations(instance.isolated_template()),
        10.0,
    );

    (0.4 * template + 0.2 * style + 0.2 * binding + 0.2 * isolation).clamp(0.0, 1.0)
}

pub fn best_practices(raw: &str) -> f64 {
    let mut checks = Checklist::default();
    checks.check(markup::has_click_binding(raw));
    checks.check(markup::has_property_binding(raw));
    checks.check(markup::has_structural_directive(raw));
    if markup::TAG.is_match(raw) {
        checks.check(markup::has_class_attribute(raw));
    }
    checks.check(markup::tag_count(raw) < 10);
    checks.ratio().unwrap_or(0.0)
}

/// Average every dimension over the members of `class`.
pub fn score(class: &PatternClass) -> QualityScore {
    let members = class.members();
    let n = members.len().max(1) as f64;

    let mut template = 0.0;
    let mut style = 0.0;
    let mut logic = 0.0;
    let mut complexity_sum = 0.0;
    let mut accessibility_sum = 0.0;
    let mut applicable = false;
    let mut maintainability_sum = 0.0;
    let mut best_practices_sum = 0.0;

    for member in members {
        let (t, s, l) = complexity_parts(member);
        template += t;
        style += s;
        logic += l;
        complexity_sum += complexity(member);

        if let Some(a) = accessibility(member.raw_markup()) {
            accessibility_sum += a;
            applicable = true;
        }
        maintainability_sum += maintainability(member);
        best_practices_sum += best_practices(member.raw_markup());
    }

    let unit = |sum: f64| (sum / n).clamp(0.0, 1.0);
    let percent = |sum: f64| (sum / n).round().clamp(0.0, 100.0) as u8;

    QualityScore {
        complexity: unit(complexity_sum),
        accessibility: unit(accessibility_sum),
        maintainability: unit(maintainability_sum),
        best_practices: unit(best_practices_sum),
        template_complexity_pct: percent(template),
        style_complexity_pct: percent(style),
        logic_complexity_pct: percent(logic),
        accessibility_applicable: applicable,
    }
}
