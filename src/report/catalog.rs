//! Static HTML pattern catalog.
//!
//! Layout under the output directory:
//!
//! ```text
//! index.html                 summary, class table, recommendations
//! relationships.html         SVG graph of class relationships
//! patterns/<slug>.html       one page per pattern class
//! assets/styles.css
//! ```

use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use std::f64::consts::PI;
use std::fmt::{self, Write};

use super::{Page, slug};
use crate::models::analysis::{AnalysisResult, PatternReport};
use crate::models::relationship::RelationshipKind;

const STYLESHEET: &str = r#"body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
    margin: 2rem;
    color: #222;
    background: #f7f7f7;
}
a { color: #1d5fbf; }
table { border-collapse: collapse; width: 100%; background: #fff; margin-bottom: 1.5rem; }
th, td { border: 1px solid #ddd; padding: 6px 10px; text-align: left; }
th { background: #1d5fbf; color: #fff; }
pre { background: #272822; color: #f8f8f2; padding: 1rem; overflow-x: auto; }
.cards { display: flex; gap: 1rem; margin-bottom: 1.5rem; }
.card { background: #fff; padding: 1rem 1.5rem; box-shadow: 0 1px 3px rgba(0,0,0,0.1); }
.card strong { display: block; font-size: 1.6rem; }
.bar { background: #e3e3e3; height: 12px; width: 300px; }
.bar span { display: block; height: 12px; background: #1d5fbf; }
.priority-high { color: #b3261e; font-weight: bold; }
.priority-medium { color: #a15c00; }
.priority-low { color: #555; }
.edge-nested_child, .edge-nested_parent { stroke: #1d5fbf; }
.edge-similar { stroke: #2e7d32; stroke-dasharray: 6 3; }
.edge-co_occurring { stroke: #999; }
.node circle { fill: #fff; stroke: #1d5fbf; stroke-width: 2; }
.node text { font-size: 12px; }
"#;

const GRAPH_SIZE: f64 = 600.0;
const GRAPH_RADIUS: f64 = 230.0;

/// Every catalog page.
pub fn render(result: &AnalysisResult) -> Vec<Page> {
    let mut pages = vec![
        Page::new("index.html", page(|out| index(out, result))),
        Page::new("relationships.html", page(|out| relationships(out, result))),
        Page::new("assets/styles.css", STYLESHEET),
    ];
    for (class_id, report) in &result.patterns {
        pages.push(Page::new(
            format!("patterns/{}.html", slug(class_id)),
            page(|out| pattern(out, result, class_id, report)),
        ));
    }
    pages
}

fn page(write: impl FnOnce(&mut String) -> fmt::Result) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write(&mut out);
    out
}

fn head(out: &mut String, title: &str, root: &str) -> fmt::Result {
    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, "<html lang=\"en\">")?;
    writeln!(out, "<head>")?;
    writeln!(out, "<meta charset=\"UTF-8\">")?;
    writeln!(out, "<title>{}</title>", text(title))?;
    writeln!(out, "<link rel=\"stylesheet\" href=\"{root}assets/styles.css\">")?;
    writeln!(out, "</head>")?;
    writeln!(out, "<body>")?;
    writeln!(
        out,
        "<nav><a href=\"{root}index.html\">Patterns</a> | <a href=\"{root}relationships.html\">Relationships</a></nav>"
    )
}

fn foot(out: &mut String) -> fmt::Result {
    writeln!(out, "</body>")?;
    writeln!(out, "</html>")
}

fn pattern_link(class_id: &str, root: &str) -> String {
    format!(
        "<a href=\"{root}patterns/{}.html\">{}</a>",
        slug(class_id),
        text(class_id)
    )
}

fn index(out: &mut String, result: &AnalysisResult) -> fmt::Result {
    let summary = &result.summary;
    head(out, "UI Pattern Catalog", "")?;
    writeln!(out, "<h1>UI Pattern Catalog</h1>")?;
    writeln!(out, "<div class=\"cards\">")?;
    for (label, value) in [
        ("Components", summary.components_analyzed),
        ("Pattern instances", summary.total_patterns_detected),
        ("Pattern classes", summary.unique_pattern_types),
        ("Recommendations", result.recommendations.len()),
    ] {
        writeln!(out, "<div class=\"card\"><strong>{value}</strong>{label}</div>")?;
    }
    writeln!(out, "</div>")?;

    writeln!(out, "<h2>Patterns</h2>")?;
    if result.patterns.is_empty() {
        writeln!(out, "<p>No patterns found.</p>")?;
    } else {
        writeln!(
            out,
            "<table><tr><th>Class</th><th>Rule</th><th>Usage</th><th>Components</th><th>Complexity</th><th>Accessibility</th><th>Maintainability</th></tr>"
        )?;
        for (class_id, report) in &result.patterns {
            let q = &report.quality;
            writeln!(
                out,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{:.2}</td><td>{:.2}</td><td>{:.2}</td></tr>",
                pattern_link(class_id, ""),
                report.rule,
                report.total_usage,
                report.component_coverage,
                q.complexity,
                q.accessibility,
                q.maintainability
            )?;
        }
        writeln!(out, "</table>")?;
    }

    if !result.recommendations.is_empty() {
        writeln!(out, "<h2>Recommendations</h2>")?;
        writeln!(out, "<ul>")?;
        for rec in &result.recommendations {
            let priority = format!("{:?}", rec.priority).to_lowercase();
            writeln!(
                out,
                "<li><span class=\"priority-{priority}\">{priority}</span> {}: {} <em>{}</em></li>",
                pattern_link(&rec.class_id, ""),
                text(&rec.message),
                text(&rec.suggestion)
            )?;
        }
        writeln!(out, "</ul>")?;
    }
    foot(out)
}

fn bar(out: &mut String, label: &str, pct: u8) -> fmt::Result {
    writeln!(
        out,
        "<tr><td>{label}</td><td><div class=\"bar\"><span style=\"width: {pct}%\"></span></div></td><td>{pct}%</td></tr>"
    )
}

fn pattern(
    out: &mut String,
    result: &AnalysisResult,
    class_id: &str,
    report: &PatternReport,
) -> fmt::Result {
    let q = &report.quality;
    head(out, class_id, "../")?;
    writeln!(out, "<h1>{}</h1>", text(class_id))?;
    writeln!(
        out,
        "<p>Rule <code>{}</code>, used {} times in {} components.</p>",
        report.rule, report.total_usage, report.component_coverage
    )?;

    writeln!(out, "<h2>Quality</h2>")?;
    writeln!(out, "<table>")?;
    for (label, value) in [
        ("Complexity", q.complexity),
        ("Accessibility", q.accessibility),
        ("Maintainability", q.maintainability),
        ("Best practices", q.best_practices),
    ] {
        writeln!(out, "<tr><td>{label}</td><td>{value:.2}</td></tr>")?;
    }
    writeln!(out, "</table>")?;

    writeln!(out, "<h2>Complexity Breakdown</h2>")?;
    writeln!(out, "<table>")?;
    bar(out, "Template", q.template_complexity_pct)?;
    bar(out, "Styles", q.style_complexity_pct)?;
    bar(out, "Logic", q.logic_complexity_pct)?;
    writeln!(out, "</table>")?;

    writeln!(out, "<h2>Template</h2>")?;
    writeln!(out, "<pre><code>{}</code></pre>", text(&report.representative))?;
    writeln!(out, "<h3>Isolated</h3>")?;
    writeln!(out, "<pre><code>{}</code></pre>", text(&report.isolated_template))?;
    if !report.selector_path.is_empty() {
        writeln!(
            out,
            "<p>Selectors: <code>{}</code></p>",
            text(&report.selector_path.join(" "))
        )?;
    }

    writeln!(out, "<h2>Variations</h2>")?;
    writeln!(out, "<table><tr><th>Structure</th><th>Uses</th><th>Example</th></tr>")?;
    for variation in &report.variations {
        let example = variation.examples.first().map(String::as_str).unwrap_or("");
        writeln!(
            out,
            "<tr><td><code>{}</code></td><td>{}</td><td><code>{}</code></td></tr>",
            text(&variation.structure),
            variation.frequency,
            text(example)
        )?;
    }
    writeln!(out, "</table>")?;

    writeln!(out, "<h2>Components</h2>")?;
    writeln!(out, "<ul>")?;
    for component in &report.components {
        writeln!(out, "<li>{}</li>", text(component))?;
    }
    writeln!(out, "</ul>")?;

    if let Some(edges) = result.relationships.get(class_id) {
        writeln!(out, "<h2>Related Patterns</h2>")?;
        writeln!(out, "<table><tr><th>Pattern</th><th>Type</th><th>Strength</th></tr>")?;
        for (target, rel) in edges {
            writeln!(
                out,
                "<tr><td>{}</td><td>{}</td><td>{:.2}</td></tr>",
                pattern_link(target, "../"),
                kind_name(rel.kind),
                rel.strength
            )?;
        }
        writeln!(out, "</table>")?;
    }

    let recs: Vec<_> = result
        .recommendations
        .iter()
        .filter(|rec| rec.class_id == class_id)
        .collect();
    if !recs.is_empty() {
        writeln!(out, "<h2>Optimization Suggestions</h2>")?;
        writeln!(out, "<ul>")?;
        for rec in recs {
            writeln!(
                out,
                "<li>{} <em>{}</em></li>",
                text(&rec.message),
                text(&rec.suggestion)
            )?;
        }
        writeln!(out, "</ul>")?;
    }
    foot(out)
}

fn kind_name(kind: RelationshipKind) -> &'static str {
    match kind {
        RelationshipKind::NestedChild => "nested_child",
        RelationshipKind::NestedParent => "nested_parent",
        RelationshipKind::Similar => "similar",
        RelationshipKind::CoOccurring => "co_occurring",
    }
}

/// Nodes evenly spaced on a circle, in class id order.
fn node_positions(count: usize) -> Vec<(f64, f64)> {
    let center = GRAPH_SIZE / 2.0;
    (0..count)
        .map(|i| {
            let angle = 2.0 * PI * i as f64 / count as f64 - PI / 2.0;
            (
                center + GRAPH_RADIUS * angle.cos(),
                center + GRAPH_RADIUS * angle.sin(),
            )
        })
        .collect()
}

fn relationships(out: &mut String, result: &AnalysisResult) -> fmt::Result {
    head(out, "Pattern Relationships", "")?;
    writeln!(out, "<h1>Pattern Relationships</h1>")?;

    let ids: Vec<&String> = result.patterns.keys().collect();
    let positions = node_positions(ids.len());
    let position = |id: &str| {
        ids.iter()
            .position(|known| known.as_str() == id)
            .map(|i| positions[i])
    };

    writeln!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{GRAPH_SIZE}\" height=\"{GRAPH_SIZE}\">"
    )?;
    // Each pair is stored in both directions; draw it once.
    for (source, targets) in &result.relationships {
        for (target, rel) in targets {
            if source >= target {
                continue;
            }
            let (Some((x1, y1)), Some((x2, y2))) = (position(source.as_str()), position(target.as_str())) else {
                continue;
            };
            writeln!(
                out,
                "<line class=\"edge-{}\" x1=\"{x1:.1}\" y1=\"{y1:.1}\" x2=\"{x2:.1}\" y2=\"{y2:.1}\" stroke-width=\"{:.1}\"/>",
                kind_name(rel.kind),
                1.0 + 3.0 * rel.strength
            )?;
        }
    }
    for (id, (x, y)) in ids.iter().zip(&positions) {
        writeln!(
            out,
            "<a href=\"patterns/{}.html\"><g class=\"node\"><circle cx=\"{x:.1}\" cy=\"{y:.1}\" r=\"18\"/><text x=\"{x:.1}\" y=\"{:.1}\" text-anchor=\"middle\">{}</text></g></a>",
            attr(&slug(id)),
            y + 32.0,
            text(id)
        )?;
    }
    writeln!(out, "</svg>")?;

    writeln!(
        out,
        "<table><tr><th>From</th><th>To</th><th>Type</th><th>Strength</th><th>Shared components</th></tr>"
    )?;
    for (source, targets) in &result.relationships {
        for (target, rel) in targets {
            let shared: Vec<&str> = rel.shared_components.iter().map(String::as_str).collect();
            writeln!(
                out,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{:.2}</td><td>{}</td></tr>",
                pattern_link(source, ""),
                pattern_link(target, ""),
                kind_name(rel.kind),
                rel.strength,
                text(&shared.join(", "))
            )?;
        }
    }
    writeln!(out, "</table>")?;
    foot(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisOptions;
    use crate::engine::analyzer;
    use crate::models::component::ComponentRecord;

    fn sample() -> AnalysisResult {
        analyzer::analyze(
            &[
                ComponentRecord::new(
                    "Login",
                    "<form><input><button>Submit</button></form>",
                    Vec::new(),
                ),
                ComponentRecord::new(
                    "Orders",
                    r#"<li *ngFor="let o of orders" (click)="open(o)">{{ o.id }}</li>"#,
                    Vec::new(),
                ),
            ],
            &AnalysisOptions::default(),
        )
        .unwrap()
    }

    fn content<'a>(pages: &'a [Page], path: &str) -> &'a str {
        &pages.iter().find(|p| p.path == path).unwrap().content
    }

    #[test]
    fn one_page_per_class_plus_index() {
        let result = sample();
        let pages = render(&result);
        assert_eq!(pages.len(), 3 + result.patterns.len());
        for class_id in result.patterns.keys() {
            let path = format!("patterns/{}.html", slug(class_id));
            assert!(pages.iter().any(|p| p.path == path), "missing {path}");
        }
        let index = content(&pages, "index.html");
        assert!(index.contains("<a href=\"patterns/form-group.html\">form-group</a>"));
        assert!(index.contains("priority-high"));
    }

    #[test]
    fn markup_is_escaped() {
        let pages = render(&sample());
        let page = content(&pages, "patterns/form-group.html");
        assert!(page.contains("&lt;form&gt;&lt;input&gt;"));
        assert!(!page.contains("<pre><code><form>"));
        assert!(page.contains("href=\"../assets/styles.css\""));
    }

    #[test]
    fn pattern_page_lists_relationships() {
        let pages = render(&sample());
        let page = content(&pages, "patterns/input-field.html");
        assert!(page.contains("Related Patterns"));
        assert!(page.contains("<td>nested_child</td>"));
    }

    #[test]
    fn graph_draws_each_pair_once() {
        let result = sample();
        let pages = render(&result);
        let graph = content(&pages, "relationships.html");

        let pairs: usize = result
            .relationships
            .iter()
            .map(|(source, targets)| targets.keys().filter(|t| source < *t).count())
            .sum();
        assert!(pairs > 0);
        assert_eq!(graph.matches("<line ").count(), pairs);
        assert_eq!(graph.matches("<circle ").count(), result.patterns.len());
    }

    #[test]
    fn nodes_sit_on_the_circle() {
        let positions = node_positions(4);
        assert!((positions[0].0 - 300.0).abs() < 1e-9);
        assert!((positions[0].1 - 70.0).abs() < 1e-9);
        assert!((positions[2].1 - 530.0).abs() < 1e-9);
    }

    #[test]
    fn empty_result_renders_index() {
        let pages = render(&AnalysisResult::empty(0));
        assert_eq!(pages.len(), 3);
        assert!(content(&pages, "index.html").contains("No patterns found."));
    }
}
