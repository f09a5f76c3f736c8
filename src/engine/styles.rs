//! Best-effort association between markup and stylesheet rules.
//!
//! Markup is walked with tree-sitter-html to collect `.class` selectors and
//! stylesheets are split into rule blocks with tree-sitter-css. A rule block
//! belongs to a fragment when its selector text mentions one of the
//! fragment's classes. There is no cascade, specificity or media awareness.

use anyhow::{Result, bail};
use std::collections::BTreeMap;
use tracing::{debug, warn};
use tree_sitter::{Language, Node, Parser, Tree};

use crate::engine::markup;
use crate::error::{ErrorCode, SightError};

fn html_language() -> Language {
    Language::new(tree_sitter_html::LANGUAGE)
}

fn css_language() -> Language {
    Language::new(tree_sitter_css::LANGUAGE)
}

fn parse(source: &str, language: &Language) -> Option<Tree> {
    let mut parser = Parser::new();
    parser.set_language(language).ok()?;
    parser.parse(source, None)
}

/// Class selectors of `markup` in depth-first element order, deduplicated.
pub fn selector_path(markup: &str) -> Vec<String> {
    let mut path = Vec::new();
    if !markup.contains('<') {
        return path;
    }
    if let Some(tree) = parse(markup, &html_language()) {
        collect_classes(tree.root_node(), markup.as_bytes(), &mut path);
    }
    path
}

fn collect_classes(node: Node<'_>, source: &[u8], path: &mut Vec<String>) {
    if matches!(node.kind(), "start_tag" | "self_closing_tag") {
        let mut cursor = node.walk();
        for attr in node.children(&mut cursor) {
            if attr.kind() != "attribute" {
                continue;
            }
            let Some(value) = class_attribute_value(attr, source) else {
                continue;
            };
            let value = markup::INTERPOLATION.replace_all(value, " ");
            for token in value.split_whitespace().filter(|t| is_css_identifier(t)) {
                let selector = format!(".{token}");
                if !path.contains(&selector) {
                    path.push(selector);
                }
            }
        }
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_classes(child, source, path);
    }
}

fn class_attribute_value<'a>(attr: Node<'_>, source: &'a [u8]) -> Option<&'a str> {
    let mut cursor = attr.walk();
    let mut children = attr.named_children(&mut cursor);

    let name = children.next()?;
    if name.kind() != "attribute_name" || !name.utf8_text(source).ok()?.eq_ignore_ascii_case("class") {
        return None;
    }

    let value = children.next()?;
    match value.kind() {
        "attribute_value" => value.utf8_text(source).ok(),
        "quoted_attribute_value" => value
            .named_child(0)
            .and_then(|inner| inner.utf8_text(source).ok()),
        _ => None,
    }
}

fn is_css_identifier(token: &str) -> bool {
    !token.is_empty()
        && !token.starts_with(|c: char| c.is_ascii_digit())
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// One `selector { body }` block of a stylesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleBlock {
    pub selector: String,
    pub body: String,
}

/// Split a stylesheet into rule blocks.
///
/// Blocks nested in `@media` or SCSS parents are returned as well. A sheet
/// that yields nothing but parse errors is an error.
pub fn parse_rule_blocks(sheet: &str) -> Result<Vec<RuleBlock>> {
    let Some(tree) = parse(sheet, &css_language()) else {
        bail!(SightError::new(
            ErrorCode::ParseError,
            "stylesheet parser returned no tree"
        ));
    };

    let root = tree.root_node();
    let mut blocks = Vec::new();
    collect_rule_blocks(root, sheet.as_bytes(), &mut blocks);

    if blocks.is_empty() && root.has_error() {
        bail!(SightError::new(
            ErrorCode::ParseError,
            "stylesheet contains no recoverable rule blocks"
        ));
    }
    Ok(blocks)
}

fn collect_rule_blocks(node: Node<'_>, source: &[u8], blocks: &mut Vec<RuleBlock>) {
    if node.kind() == "rule_set"
        && let Some(block) = rule_block(node, source)
    {
        blocks.push(block);
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_rule_blocks(child, source, blocks);
    }
}

fn rule_block(node: Node<'_>, source: &[u8]) -> Option<RuleBlock> {
    let mut selectors = None;
    let mut block = None;
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "selectors" => selectors = Some(child),
            "block" => block = Some(child),
            _ => {}
        }
    }

    let selectors = selectors?;
    if selectors.has_error() {
        return None;
    }
    let selector = selectors
        .utf8_text(source)
        .ok()?
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let body = block?
        .utf8_text(source)
        .ok()?
        .trim()
        .trim_start_matches('{')
        .trim_end_matches('}')
        .trim()
        .to_string();

    Some(RuleBlock { selector, body })
}

/// Rule blocks from all stylesheets of one component.
#[derive(Debug, Default)]
pub struct StyleIndex {
    blocks: Vec<RuleBlock>,
}

impl StyleIndex {
    /// Parse every stylesheet; one that fails to parse is skipped with a warning.
    pub fn build(component: &str, sheets: &[String]) -> Self {
        let mut blocks = Vec::new();
        for (index, sheet) in sheets.iter().enumerate() {
            if sheet.trim().is_empty() {
                continue;
            }
            match parse_rule_blocks(sheet) {
                Ok(found) => blocks.extend(found),
                Err(e) => warn!(
                    component,
                    stylesheet = index,
                    error = %e,
                    "skipping stylesheet that could not be resolved"
                ),
            }
        }
        debug!(component, rule_blocks = blocks.len(), "style index built");
        Self { blocks }
    }

    /// Selector → body for blocks whose selector mentions a class on the path.
    /// Bodies of repeated selectors are joined with `; `.
    pub fn resolve(&self, selector_path: &[String]) -> BTreeMap<String, String> {
        let mut styles: BTreeMap<String, String> = BTreeMap::new();
        if selector_path.is_empty() {
            return styles;
        }

        for block in &self.blocks {
            let mentioned = selector_path
                .iter()
                .any(|class| mentions_class(&block.selector, class));
            if !mentioned {
                continue;
            }
            styles
                .entry(block.selector.clone())
                .and_modify(|body| {
                    body.push_str("; ");
                    body.push_str(&block.body);
                })
                .or_insert_with(|| block.body.clone());
        }
        styles
    }
}

/// `.item` is mentioned by `.list .item:hover` but not by `.items`.
fn mentions_class(selector: &str, class: &str) -> bool {
    selector.match_indices(class).any(|(at, _)| {
        selector[at + class.len()..]
            .chars()
            .next()
            .is_none_or(|c| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_path_walks_depth_first() {
        let markup = r#"<ul class="list"><li class="item active" *ngFor="let x of xs"><span class="item"></span></li></ul><p class="after"></p>"#;
        assert_eq!(
            selector_path(markup),
            vec![".list", ".item", ".active", ".after"]
        );
    }

    #[test]
    fn selector_path_ignores_bindings_and_text() {
        assert!(selector_path("{{ user.name }}").is_empty());
        assert_eq!(
            selector_path(r#"<input class='field {{ __expr__ }}' [class.bad]="x">"#),
            vec![".field"]
        );
    }

    #[test]
    fn rule_blocks_are_split() {
        let sheet = ".list { margin: 0; padding: 0 }\n.item:hover,\n  .item.active { color: red; }";
        let blocks = parse_rule_blocks(sheet).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].selector, ".list");
        assert_eq!(blocks[0].body, "margin: 0; padding: 0");
        assert_eq!(blocks[1].selector, ".item:hover, .item.active");
        assert_eq!(blocks[1].body, "color: red;");
    }

    #[test]
    fn media_blocks_are_included() {
        let sheet = "@media (max-width: 600px) { .card { display: none; } }";
        let blocks = parse_rule_blocks(sheet).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].selector, ".card");
    }

    #[test]
    fn resolve_matches_whole_class_names() {
        let index = StyleIndex::build(
            "ListComponent",
            &[".item { color: red } .items { color: blue } .list .item:hover { color: green }".to_string()],
        );
        let styles = index.resolve(&[".item".to_string()]);
        let selectors: Vec<_> = styles.keys().cloned().collect();
        assert_eq!(selectors, vec![".item", ".list .item:hover"]);
    }

    #[test]
    fn resolve_joins_repeated_selectors() {
        let index = StyleIndex::build(
            "Card",
            &[".card { color: red }".to_string(), ".card { margin: 0 }".to_string()],
        );
        let styles = index.resolve(&[".card".to_string()]);
        assert_eq!(styles[".card"], "color: red; margin: 0");
    }

    #[test]
    fn unreadable_sheet_does_not_poison_the_index() {
        let index = StyleIndex::build(
            "Broken",
            &["}}}} ;;".to_string(), ".a { color: red }".to_string()],
        );
        let styles = index.resolve(&[".a".to_string()]);
        assert_eq!(styles.get(".a").map(String::as_str), Some("color: red"));
    }

    #[test]
    fn empty_path_resolves_nothing() {
        let index = StyleIndex::build("A", &[".a { color: red }".to_string()]);
        assert!(index.resolve(&[]).is_empty());
        assert_eq!(index.resolve(&[".a".to_string()]).len(), 1);
    }
}
