//! Lexical helpers over template markup.
//!
//! Nothing here parses HTML properly; tags and attributes are recognised with
//! tolerant regular expressions so that Angular syntax (`*ngFor`, `(click)`,
//! `[value]`, `{{ }}`) survives untouched.

use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Replaces bound attribute values in isolated templates.
pub const BOUND_PLACEHOLDER: &str = "__bound__";
/// Replaces interpolation expressions in isolated templates.
pub const EXPR_PLACEHOLDER: &str = "{{ __expr__ }}";

const ATTRS: &str = r#"(?:\s+[^\s>"'=/]+(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>"']+))?)*"#;

/// Any opening, closing or self-closing tag.
/// Groups: 1 = "/" for closing tags, 2 = tag name, 3 = attributes, 4 = "/" for self-closing.
pub static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)<(/?)([a-z][a-z0-9-]*)({ATTRS})\s*(/?)>")).unwrap()
});

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s>"'=/]+)(?:\s*=\s*("[^"]*"|'[^']*'|[^\s>"']+))?"#).unwrap()
});

pub static INTERPOLATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{[^{}]*\}\}").unwrap());

/// A complete event-handler assignment, e.g. `(click)="save()"`.
pub static EVENT_ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:\(\s*[\w.:-]+\s*\)|\bon-[\w.:-]+)\s*=\s*(?:"[^"]*"|'[^']*')"#).unwrap()
});

static BOUND_ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)(^|\s)((?:\*|\[\(?|\(|bind-|on-|bindon-)[^\s>"'=/]*)\s*=\s*(?:"[^"]*"|'[^']*')"#,
    )
    .unwrap()
});

static STRUCTURAL_DIRECTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\*ng(?:for|if)\b").unwrap());

static EVENT_BINDING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|\s)(?:\(\s*[\w.:-]+\s*\)|on-[\w.:-]+)\s*=").unwrap()
});

static PROPERTY_BINDING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|\s)(?:\[\(?[\w.:@-]+\)?\]|bind-[\w.:-]+|bindon-[\w.:-]+)\s*=").unwrap()
});

static CLICK_BINDING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:\(\s*click\s*\)|\bon-click)\s*=").unwrap());

static CLASS_ATTRIBUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:^|\s)class\s*=").unwrap());

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Attribute names that carry template semantics rather than presentation.
fn is_structural_attribute(name: &str) -> bool {
    name.starts_with(['*', '[', '(', '#', '@'])
        || ["bind-", "on-", "bindon-", "let-", "ref-"]
            .iter()
            .any(|prefix| name.to_ascii_lowercase().starts_with(prefix))
}

/// Tag/directive skeleton of a fragment.
///
/// Plain attributes are dropped, directive and binding attributes keep their
/// name with the value replaced by a placeholder, tag names are lower-cased
/// and text between tags disappears, so `<div class="a">hello</div>` becomes
/// `<div></div>`. Fragments without tags go through [`isolate_template`].
pub fn normalize_structure(markup: &str) -> String {
    if !TAG.is_match(markup) {
        return collapse_whitespace(&isolate_template(markup));
    }

    let mut out = String::with_capacity(markup.len());
    for caps in TAG.captures_iter(markup) {
        out.push('<');
        out.push_str(&caps[1]);
        out.push_str(&caps[2].to_ascii_lowercase());
        for attr in ATTRIBUTE.captures_iter(&caps[3]) {
            if is_structural_attribute(&attr[1]) {
                out.push(' ');
                out.push_str(&attr[1]);
                if attr.get(2).is_some() {
                    out.push_str("=\"");
                    out.push_str(BOUND_PLACEHOLDER);
                    out.push('"');
                }
            }
        }
        if !caps[4].is_empty() {
            out.push_str(" /");
        }
        out.push('>');
    }
    out
}

/// The fragment with every bound value and interpolation replaced by a fixed
/// placeholder, so fragments differing only in identifiers become identical.
pub fn isolate_template(markup: &str) -> String {
    let bound = BOUND_ATTRIBUTE.replace_all(markup, |caps: &Captures<'_>| {
        format!("{}{}=\"{BOUND_PLACEHOLDER}\"", &caps[1], &caps[2])
    });
    INTERPOLATION
        .replace_all(&bound, EXPR_PLACEHOLDER)
        .into_owned()
}

/// Whitespace collapsed to single spaces, single quotes turned into double.
pub fn canonical_form(markup: &str) -> String {
    collapse_whitespace(markup).replace('\'', "\"")
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// Number of `<` characters.
pub fn tag_count(markup: &str) -> usize {
    memchr::memchr_iter(b'<', markup.as_bytes()).count()
}

/// `*ngFor` / `*ngIf` occurrences.
pub fn directive_count(markup: &str) -> usize {
    STRUCTURAL_DIRECTIVE.find_iter(markup).count()
}

pub fn interpolation_count(markup: &str) -> usize {
    INTERPOLATION.find_iter(markup).count()
}

pub fn event_binding_count(markup: &str) -> usize {
    EVENT_BINDING.find_iter(markup).count()
}

pub fn property_binding_count(markup: &str) -> usize {
    PROPERTY_BINDING.find_iter(markup).count()
}

/// Interpolation openers in an isolated template that are not placeholders.
pub fn residual_interpolations(isolated: &str) -> usize {
    let openers = memchr::memmem::find_iter(isolated.as_bytes(), "{{").count();
    let placeholders = memchr::memmem::find_iter(isolated.as_bytes(), EXPR_PLACEHOLDER).count();
    openers.saturating_sub(placeholders)
}

pub fn has_click_binding(markup: &str) -> bool {
    CLICK_BINDING.is_match(markup)
}

pub fn has_property_binding(markup: &str) -> bool {
    PROPERTY_BINDING.is_match(markup)
}

pub fn has_structural_directive(markup: &str) -> bool {
    STRUCTURAL_DIRECTIVE.is_match(markup)
}

pub fn has_class_attribute(markup: &str) -> bool {
    CLASS_ATTRIBUTE.is_match(markup)
}

pub fn line_count(markup: &str) -> usize {
    markup.lines().count().max(1)
}
