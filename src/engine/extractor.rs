//! Rule-based extraction of pattern instances from one component template.
//!
//! Templates are cut into fixed-size chunks and every rule is run over every
//! chunk. Element rules find an opening tag and then walk forward counting
//! same-name tags until the matching close; an element that is never closed
//! inside its chunk yields nothing. Fragment rules match a single token.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::debug;

use crate::engine::markup::{EVENT_ASSIGNMENT, INTERPOLATION, TAG};
use crate::engine::styles::StyleIndex;
use crate::models::component::ComponentRecord;
use crate::models::pattern::{PatternInstance, RuleName};

static NG_FOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:^|\s)\*ngFor\s*=").unwrap());

static NG_IF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:^|\s)\*ngIf\s*=").unwrap());

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Split `text` into pieces of at most `size` bytes, never inside a char.
pub fn split_chunks(text: &str, size: usize) -> Vec<&str> {
    let size = size.max(1);
    let mut chunks = Vec::with_capacity(text.len() / size + 1);
    let mut start = 0;
    while start < text.len() {
        let mut end = (start + size).min(text.len());
        while !text.is_char_boundary(end) {
            end += 1;
        }
        chunks.push(&text[start..end]);
        start = end;
    }
    chunks
}

/// Every instance of every rule in `component`, rule-major then chunk order.
pub fn extract(component: &ComponentRecord, chunk_size: usize) -> Vec<PatternInstance> {
    if component.template.trim().is_empty() {
        debug!(component = %component.class_name, "empty template, nothing to extract");
        return Vec::new();
    }

    let chunks = split_chunks(&component.template, chunk_size);
    let index = StyleIndex::build(&component.class_name, &component.styles);

    let mut instances = Vec::new();
    for rule in RuleName::ALL {
        for chunk in &chunks {
            for raw in match_rule(rule, chunk) {
                let instance =
                    PatternInstance::new(rule, raw, component.class_name.as_str(), BTreeMap::new())
                        .resolve_styles(&index);
                instances.push(instance);
            }
        }
    }

    debug!(
        component = %component.class_name,
        chunks = chunks.len(),
        instances = instances.len(),
        "extracted pattern instances"
    );
    instances
}

/// Matches of one rule inside one chunk, in position order.
pub fn match_rule(rule: RuleName, chunk: &str) -> Vec<&str> {
    match rule {
        RuleName::DataList => element_matches(chunk, |_, attrs| NG_FOR.is_match(attrs)),
        RuleName::ConditionalContent => element_matches(chunk, |_, attrs| NG_IF.is_match(attrs)),
        RuleName::FormGroup => element_matches(chunk, |tag, _| tag.eq_ignore_ascii_case("form")),
        RuleName::InputField => element_matches(chunk, |tag, _| tag.eq_ignore_ascii_case("input")),
        RuleName::ActionButton => {
            element_matches(chunk, |tag, _| tag.eq_ignore_ascii_case("button"))
        }
        RuleName::DataBinding => INTERPOLATION.find_iter(chunk).map(|m| m.as_str()).collect(),
        RuleName::EventBinding => EVENT_ASSIGNMENT
            .find_iter(chunk)
            .map(|m| m.as_str())
            .collect(),
    }
}

fn element_matches<'a, F>(chunk: &'a str, accept: F) -> Vec<&'a str>
where
    F: Fn(&str, &str) -> bool,
{
    let mut matches = Vec::new();
    for caps in TAG.captures_iter(chunk) {
        if !caps[1].is_empty() {
            continue;
        }
        let tag = &caps[2];
        if !accept(tag, &caps[3]) {
            continue;
        }
        let Some(open) = caps.get(0) else { continue };

        if !caps[4].is_empty() || is_void(tag) {
            matches.push(open.as_str());
            continue;
        }
        if let Some(end) = closing_tag_end(chunk, open.end(), tag) {
            matches.push(&chunk[open.start()..end]);
        }
    }
    matches
}

fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(tag))
}

/// Byte offset just past the close of an element opened before `from`.
fn closing_tag_end(chunk: &str, from: usize, tag: &str) -> Option<usize> {
    let rest = &chunk[from..];
    let mut depth = 1usize;
    for caps in TAG.captures_iter(rest) {
        if !caps[2].eq_ignore_ascii_case(tag) {
            continue;
        }
        if !caps[1].is_empty() {
            depth -= 1;
            if depth == 0 {
                return caps.get(0).map(|m| from + m.end());
            }
        } else if caps[4].is_empty() {
            depth += 1;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(template: &str, styles: &[&str]) -> ComponentRecord {
        ComponentRecord::new(
            "TestComponent",
            template,
            styles.iter().map(|s| s.to_string()).collect(),
        )
    }

    fn summary(instances: &[PatternInstance]) -> Vec<(RuleName, &str)> {
        instances
            .iter()
            .map(|i| (i.rule(), i.raw_markup()))
            .collect()
    }

    #[test]
    fn button_with_click_yields_button_and_event() {
        let found = extract(&record(r#"<button (click)="go()">Go</button>"#, &[]), 5000);
        assert_eq!(
            summary(&found),
            vec![
                (RuleName::ActionButton, r#"<button (click)="go()">Go</button>"#),
                (RuleName::EventBinding, r#"(click)="go()""#),
            ]
        );
        assert!(found.iter().all(|i| i.source_component() == "TestComponent"));
    }

    #[test]
    fn empty_template_yields_nothing() {
        assert!(extract(&record("", &[]), 5000).is_empty());
        assert!(extract(&record("   \n", &[]), 5000).is_empty());
    }

    #[test]
    fn form_with_children_is_reported_rule_by_rule() {
        let found = extract(
            &record("<form><input><button>Submit</button></form>", &[]),
            5000,
        );
        assert_eq!(
            summary(&found),
            vec![
                (RuleName::FormGroup, "<form><input><button>Submit</button></form>"),
                (RuleName::InputField, "<input>"),
                (RuleName::ActionButton, "<button>Submit</button>"),
            ]
        );
    }

    #[test]
    fn repeaters_and_conditionals_capture_whole_elements() {
        let template = r#"<ul><li *ngFor="let u of users"><span *ngIf="u.admin">{{ u.name }}</span></li></ul>"#;
        let found = extract(&record(template, &[]), 5000);
        assert_eq!(
            summary(&found),
            vec![
                (
                    RuleName::DataList,
                    r#"<li *ngFor="let u of users"><span *ngIf="u.admin">{{ u.name }}</span></li>"#
                ),
                (
                    RuleName::ConditionalContent,
                    r#"<span *ngIf="u.admin">{{ u.name }}</span>"#
                ),
                (RuleName::DataBinding, "{{ u.name }}"),
            ]
        );
    }

    #[test]
    fn nested_same_name_elements_close_at_the_right_tag() {
        let template = r#"<div *ngIf="a"><div>inner</div><div/></div><div>after</div>"#;
        let found = match_rule(RuleName::ConditionalContent, template);
        assert_eq!(found, vec![r#"<div *ngIf="a"><div>inner</div><div/></div>"#]);
    }

    #[test]
    fn unterminated_elements_yield_nothing() {
        assert!(match_rule(RuleName::ActionButton, "<button (click)=\"x()\">Save").is_empty());
        assert!(match_rule(RuleName::DataList, r#"<li *ngFor="let x of xs">{{x}}"#).is_empty());
    }

    #[test]
    fn tag_names_match_case_insensitively() {
        assert_eq!(
            match_rule(RuleName::ActionButton, "<BUTTON>Ok</Button>"),
            vec!["<BUTTON>Ok</Button>"]
        );
        assert_eq!(
            match_rule(RuleName::InputField, r#"<input type="text"/><INPUT>"#),
            vec![r#"<input type="text"/>"#, "<INPUT>"]
        );
    }

    #[test]
    fn ng_for_must_be_an_attribute() {
        assert!(match_rule(RuleName::DataList, r#"<p title="*ngFor=x">t</p>"#).is_empty());
    }

    #[test]
    fn chunks_respect_char_boundaries() {
        let text = "aé".repeat(50);
        let chunks = split_chunks(&text, 7);
        assert_eq!(chunks.concat(), text);
        assert!(chunks.iter().all(|c| c.len() <= 8));
        assert!(split_chunks("", 10).is_empty());
    }

    #[test]
    fn elements_split_by_a_chunk_boundary_are_missed() {
        let template = format!("{}<button>Go</button>", " ".repeat(60));
        assert_eq!(extract(&record(&template, &[]), 64).len(), 0);
        assert_eq!(extract(&record(&template, &[]), 5000).len(), 1);
    }

    #[test]
    fn styles_are_attached_by_class() {
        let found = extract(
            &record(
                r#"<button class="primary">Go</button>"#,
                &[".primary { color: red } .secondary { color: blue }"],
            ),
            5000,
        );
        assert_eq!(found.len(), 1);
        let styles = found[0].associated_styles();
        assert_eq!(styles.len(), 1);
        assert_eq!(styles[".primary"], "color: red");
    }

    #[test]
    fn extraction_is_deterministic() {
        let component = record(
            r#"<form><input [(ngModel)]="a"><button (click)="s()">{{ label }}</button></form>"#,
            &[],
        );
        assert_eq!(extract(&component, 5000), extract(&component, 5000));
    }
}
