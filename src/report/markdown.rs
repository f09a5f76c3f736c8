//! Markdown developer documentation.
//!
//! Five pages, each derived from the same [`AnalysisResult`]: an overview,
//! per-class guidelines, best practices built from the recommendations, a
//! migration guide for classes flagged as complex, duplicated or
//! inconsistent, and implementation examples with variations.

use std::fmt::{self, Write};

use super::Page;
use crate::models::analysis::{AnalysisResult, PatternReport};
use crate::models::recommendation::{Recommendation, RecommendationKind};

const PAGES: [(&str, &str); 4] = [
    ("guidelines.md", "Pattern Guidelines"),
    ("best-practices.md", "Best Practices"),
    ("migration-guide.md", "Migration Guide"),
    ("examples.md", "Implementation Examples"),
];

/// Every documentation page, overview first.
pub fn render(result: &AnalysisResult) -> Vec<Page> {
    vec![
        Page::new("overview.md", page(|out| overview(out, result))),
        Page::new(PAGES[0].0, page(|out| guidelines(out, result))),
        Page::new(PAGES[1].0, page(|out| best_practices(out, result))),
        Page::new(PAGES[2].0, page(|out| migration_guide(out, result))),
        Page::new(PAGES[3].0, page(|out| examples(out, result))),
    ]
}

fn page(write: impl FnOnce(&mut String) -> fmt::Result) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write(&mut out);
    out
}

fn recommendations_for<'a>(
    result: &'a AnalysisResult,
    class_id: &'a str,
) -> impl Iterator<Item = &'a Recommendation> {
    result
        .recommendations
        .iter()
        .filter(move |rec| rec.class_id == class_id)
}

fn flagged(result: &AnalysisResult, class_id: &str, kind: RecommendationKind) -> bool {
    recommendations_for(result, class_id).any(|rec| rec.kind == kind)
}

fn code_block(out: &mut String, lang: &str, code: &str) -> fmt::Result {
    writeln!(out, "```{lang}")?;
    writeln!(out, "{}", code.trim_end())?;
    writeln!(out, "```")
}

fn overview(out: &mut String, result: &AnalysisResult) -> fmt::Result {
    let summary = &result.summary;
    writeln!(out, "# UI Pattern Documentation")?;
    writeln!(out)?;
    writeln!(
        out,
        "Guidelines for the UI patterns detected in {} components.",
        summary.components_analyzed
    )?;
    writeln!(out)?;
    writeln!(out, "| Metric | Value |")?;
    writeln!(out, "|---|---|")?;
    writeln!(out, "| Pattern instances | {} |", summary.total_patterns_detected)?;
    writeln!(out, "| Pattern classes | {} |", summary.unique_pattern_types)?;
    writeln!(out, "| Recommendations | {} |", result.recommendations.len())?;
    writeln!(out)?;
    writeln!(out, "## Contents")?;
    writeln!(out)?;
    for (index, (file, title)) in PAGES.iter().enumerate() {
        writeln!(out, "{}. [{title}]({file})", index + 1)?;
    }
    Ok(())
}

fn guidelines(out: &mut String, result: &AnalysisResult) -> fmt::Result {
    writeln!(out, "# Pattern Guidelines")?;
    if result.patterns.is_empty() {
        writeln!(out)?;
        writeln!(out, "No patterns found.")?;
        return Ok(());
    }

    for (class_id, report) in &result.patterns {
        let q = &report.quality;
        writeln!(out)?;
        writeln!(out, "## {class_id}")?;
        writeln!(out)?;
        writeln!(out, "### When to Use")?;
        writeln!(out)?;
        writeln!(out, "- Rule: `{}`", report.rule)?;
        writeln!(
            out,
            "- Used {} times in {} components: {}",
            report.total_usage,
            report.component_coverage,
            report.components.join(", ")
        )?;
        writeln!(
            out,
            "- Complexity {:.2}, accessibility {:.2}, maintainability {:.2}, best practices {:.2}",
            q.complexity, q.accessibility, q.maintainability, q.best_practices
        )?;
        writeln!(out)?;
        writeln!(out, "### Implementation")?;
        writeln!(out)?;
        code_block(out, "html", &report.isolated_template)?;
        if !report.selector_path.is_empty() {
            writeln!(out)?;
            writeln!(out, "Styled through: {}", report.selector_path.join(" "))?;
        }

        writeln!(out)?;
        writeln!(out, "### Performance Considerations")?;
        writeln!(out)?;
        let mut performance = Vec::new();
        if flagged(result, class_id, RecommendationKind::Complexity) {
            performance.push(
                "High template complexity may slow down rendering; split it into smaller components",
            );
        }
        if q.logic_complexity_pct > 0 {
            performance.push("Prefer OnPush change detection for templates with many bindings");
        }
        if q.style_complexity_pct > 0 {
            performance.push("Keep style rules shallow and scoped to the component");
        }
        bullets(out, &performance, "No specific performance considerations.")?;

        writeln!(out)?;
        writeln!(out, "### Accessibility Guidelines")?;
        writeln!(out)?;
        bullets(
            out,
            &accessibility_notes(result, class_id, report),
            "No specific accessibility guidelines.",
        )?;
    }
    Ok(())
}

fn accessibility_notes(
    result: &AnalysisResult,
    class_id: &str,
    report: &PatternReport,
) -> Vec<&'static str> {
    let markup = report.representative.to_ascii_lowercase();
    let mut notes = Vec::new();
    if markup.contains("<button") {
        notes.push("Give every button a meaningful label");
        notes.push("Add aria-label to icon-only buttons");
    }
    if markup.contains("<input") {
        notes.push("Associate inputs with a <label>");
        notes.push("Point aria-describedby at validation messages");
    }
    if markup.contains("<form") {
        notes.push("Keep every form control reachable by keyboard");
    }
    if flagged(result, class_id, RecommendationKind::Accessibility) {
        notes.push("Add the missing ARIA attributes and review the WCAG guidance for this pattern");
    }
    notes
}

fn bullets(out: &mut String, items: &[&str], empty: &str) -> fmt::Result {
    if items.is_empty() {
        return writeln!(out, "{empty}");
    }
    for item in items {
        writeln!(out, "- {item}")?;
    }
    Ok(())
}

fn best_practices(out: &mut String, result: &AnalysisResult) -> fmt::Result {
    writeln!(out, "# Best Practices")?;
    writeln!(out)?;
    writeln!(out, "## General Guidelines")?;
    writeln!(out)?;
    writeln!(out, "1. Keep patterns small and focused")?;
    writeln!(out, "2. Reuse an existing pattern before writing a new one")?;
    writeln!(out, "3. Keep naming consistent across components")?;
    writeln!(out, "4. Document intentional variations")?;
    writeln!(out)?;
    writeln!(out, "## Pattern-Specific Guidelines")?;

    if result.recommendations.is_empty() {
        writeln!(out)?;
        writeln!(out, "No pattern-specific issues found.")?;
        return Ok(());
    }
    for class_id in result.patterns.keys() {
        let mut recs = recommendations_for(result, class_id).peekable();
        if recs.peek().is_none() {
            continue;
        }
        writeln!(out)?;
        writeln!(out, "### {class_id}")?;
        writeln!(out)?;
        for rec in recs {
            writeln!(out, "- **{:?}**: {}", rec.priority, rec.message)?;
            writeln!(out, "  - Suggestion: {}", rec.suggestion)?;
        }
    }
    Ok(())
}

fn migration_guide(out: &mut String, result: &AnalysisResult) -> fmt::Result {
    writeln!(out, "# Migration Guide")?;
    writeln!(out)?;
    writeln!(out, "## Migration Strategy")?;
    writeln!(out)?;
    writeln!(out, "1. Pick the patterns listed below")?;
    writeln!(out, "2. Migrate one component at a time")?;
    writeln!(out, "3. Test each step")?;
    writeln!(out, "4. Update this documentation")?;
    writeln!(out)?;
    writeln!(out, "## Pattern Migration Guidelines")?;

    let mut any = false;
    for (class_id, report) in &result.patterns {
        let reasons: Vec<&Recommendation> = recommendations_for(result, class_id)
            .filter(|rec| {
                matches!(
                    rec.kind,
                    RecommendationKind::Complexity
                        | RecommendationKind::Duplication
                        | RecommendationKind::Consistency
                )
            })
            .collect();
        if reasons.is_empty() {
            continue;
        }
        any = true;
        writeln!(out)?;
        writeln!(out, "### Migrating {class_id}")?;
        writeln!(out)?;
        for rec in &reasons {
            writeln!(out, "- {}", rec.message)?;
        }
        writeln!(out)?;
        writeln!(out, "Current implementation:")?;
        writeln!(out)?;
        code_block(out, "html", &report.representative)?;
        writeln!(out)?;
        writeln!(out, "Shared template to converge on:")?;
        writeln!(out)?;
        code_block(out, "html", &report.isolated_template)?;
    }
    if !any {
        writeln!(out)?;
        writeln!(out, "No pattern needs migrating.")?;
    }
    Ok(())
}

fn examples(out: &mut String, result: &AnalysisResult) -> fmt::Result {
    writeln!(out, "# Implementation Examples")?;
    for (class_id, report) in &result.patterns {
        writeln!(out)?;
        writeln!(out, "## {class_id}")?;
        writeln!(out)?;
        writeln!(out, "### Basic Implementation")?;
        writeln!(out)?;
        code_block(out, "html", &report.representative)?;

        if report.variations.len() > 1 {
            writeln!(out)?;
            writeln!(out, "### Variations")?;
            for (index, variation) in report.variations.iter().enumerate() {
                writeln!(out)?;
                writeln!(out, "Variation {} ({} uses):", index + 1, variation.frequency)?;
                writeln!(out)?;
                let example = variation.examples.first().unwrap_or(&variation.structure);
                code_block(out, "html", example)?;
            }
        }
    }
    Ok(())
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
                    "Toolbar",
                    r#"<button (click)="save()">Save</button>"#,
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
    fn renders_all_sections() {
        let pages = render(&sample());
        let paths: Vec<_> = pages.iter().map(|p| p.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "overview.md",
                "guidelines.md",
                "best-practices.md",
                "migration-guide.md",
                "examples.md"
            ]
        );
        assert!(content(&pages, "overview.md").contains("[Migration Guide](migration-guide.md)"));
    }

    #[test]
    fn guidelines_cover_every_class() {
        let result = sample();
        let pages = render(&result);
        let guidelines = content(&pages, "guidelines.md");
        for class_id in result.patterns.keys() {
            assert!(guidelines.contains(&format!("## {class_id}\n")));
        }
        assert!(guidelines.contains("Associate inputs with a <label>"));
    }

    #[test]
    fn best_practices_list_recommendations() {
        let pages = render(&sample());
        let text = content(&pages, "best-practices.md");
        assert!(text.contains("### form-group"));
        assert!(text.contains("low accessibility"));
        assert!(text.contains("  - Suggestion: "));
    }

    #[test]
    fn examples_show_variations() {
        let result = analyzer::analyze(
            &[
                ComponentRecord::new("A", "<button>Go</button>", Vec::new()),
                ComponentRecord::new("B", r#"<button class="x">Stop</button>"#, Vec::new()),
                ComponentRecord::new("C", "<button><b>Go</b></button>", Vec::new()),
            ],
            &AnalysisOptions::default(),
        )
        .unwrap();
        let button = &result.patterns["action-button"];
        assert_eq!(button.variations.len(), 2);

        let pages = render(&result);
        let text = content(&pages, "examples.md");
        assert!(text.contains("Variation 1 (2 uses):"));
        assert!(text.contains("<button><b>Go</b></button>"));
    }

    #[test]
    fn empty_result_still_renders() {
        let pages = render(&AnalysisResult::empty(3));
        assert!(content(&pages, "overview.md").contains("detected in 3 components"));
        assert!(content(&pages, "guidelines.md").contains("No patterns found."));
        assert!(content(&pages, "migration-guide.md").contains("No pattern needs migrating."));
    }
}
