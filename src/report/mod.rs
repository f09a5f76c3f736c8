//! Renderers over a finished [`AnalysisResult`].
//!
//! Renderers only read the result. The export timestamp belongs here, not to
//! the analysis.

pub mod catalog;
pub mod markdown;

use anyhow::Result;
use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use std::fmt::Write;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::error::{ErrorCode, SightError};
use crate::models::analysis::AnalysisResult;

/// One generated file, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub path: String,
    pub content: String,
}

impl Page {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Write `pages` under `dir`, creating directories as needed.
pub fn write_pages(dir: &Utf8Path, pages: &[Page]) -> Result<Vec<Utf8PathBuf>> {
    let mut written = Vec::with_capacity(pages.len());
    for page in pages {
        let path = dir.join(&page.path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                SightError::new(ErrorCode::IoError, format!("Failed to create {parent}: {e}"))
            })?;
        }
        std::fs::write(&path, &page.content).map_err(|e| {
            SightError::new(ErrorCode::IoError, format!("Failed to write {path}: {e}"))
        })?;
        written.push(path);
    }
    Ok(written)
}

/// File-name-safe form of a class id: `data-list#2` becomes `data-list-2`.
pub fn slug(class_id: &str) -> String {
    class_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect()
}

/// JSON export envelope.
#[derive(Debug, Serialize)]
pub struct Export<'a> {
    pub timestamp: String,
    pub analysis_results: &'a AnalysisResult,
}

impl<'a> Export<'a> {
    pub fn at(result: &'a AnalysisResult, when: OffsetDateTime) -> Result<Self> {
        Ok(Self {
            timestamp: when.format(&Rfc3339)?,
            analysis_results: result,
        })
    }

    /// Stamped with the local time, or UTC when the offset is unknown.
    pub fn now(result: &'a AnalysisResult) -> Result<Self> {
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        Self::at(result, now)
    }

    pub fn to_json(&self, pretty: bool) -> Result<String> {
        if pretty {
            Ok(serde_json::to_string_pretty(self)?)
        } else {
            Ok(serde_json::to_string(self)?)
        }
    }
}

/// Plain-text report for terminals.
pub fn render_text(result: &AnalysisResult) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_text(&mut out, result);
    out
}

fn write_text(out: &mut String, result: &AnalysisResult) -> std::fmt::Result {
    let summary = &result.summary;
    writeln!(out, "UI Pattern Analysis Report")?;
    writeln!(out, "==========================")?;
    writeln!(out)?;
    writeln!(out, "Summary")?;
    writeln!(out, "  Components analyzed:  {}", summary.components_analyzed)?;
    writeln!(out, "  Total patterns:       {}", summary.total_patterns_detected)?;
    writeln!(out, "  Unique pattern types: {}", summary.unique_pattern_types)?;

    if result.patterns.is_empty() {
        writeln!(out)?;
        writeln!(out, "No patterns found.")?;
        return Ok(());
    }

    let width = summary
        .most_common_patterns
        .iter()
        .map(|p| p.name.len())
        .chain(std::iter::once("Pattern".len()))
        .max()
        .unwrap_or(7);
    writeln!(out)?;
    writeln!(out, "Most Common Patterns")?;
    writeln!(out, "  {:<width$}  {:>9}  {:>10}", "Pattern", "Frequency", "Components")?;
    for pattern in &summary.most_common_patterns {
        writeln!(
            out,
            "  {:<width$}  {:>9}  {:>10}",
            pattern.name, pattern.frequency, pattern.components
        )?;
    }

    writeln!(out)?;
    writeln!(out, "Pattern Details")?;
    for (class_id, report) in &result.patterns {
        let q = &report.quality;
        writeln!(out, "  [{class_id}] ({})", report.rule)?;
        writeln!(out, "    Usage:              {}", report.total_usage)?;
        writeln!(out, "    Component coverage: {}", report.component_coverage)?;
        writeln!(
            out,
            "    Complexity:         {:.2} (template {}%, style {}%, logic {}%)",
            q.complexity, q.template_complexity_pct, q.style_complexity_pct, q.logic_complexity_pct
        )?;
        writeln!(out, "    Accessibility:      {:.2}", q.accessibility)?;
        writeln!(out, "    Maintainability:    {:.2}", q.maintainability)?;
        writeln!(out, "    Best practices:     {:.2}", q.best_practices)?;
        writeln!(out, "    Variations:         {}", report.variations.len())?;
    }

    if !result.recommendations.is_empty() {
        writeln!(out)?;
        writeln!(out, "Recommendations")?;
        for rec in &result.recommendations {
            writeln!(out, "  - [{:?}] {}: {}", rec.priority, rec.class_id, rec.message)?;
            writeln!(out, "    Suggestion: {}", rec.suggestion)?;
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
    use time::macros::datetime;

    fn sample() -> AnalysisResult {
        analyzer::analyze(
            &[ComponentRecord::new(
                "Login",
                "<form><input><button>Submit</button></form>",
                Vec::new(),
            )],
            &AnalysisOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn export_wraps_result_with_timestamp() {
        let result = sample();
        let export = Export::at(&result, datetime!(2026-01-02 03:04:05 UTC)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&export.to_json(false).unwrap()).unwrap();

        assert_eq!(value["timestamp"], "2026-01-02T03:04:05Z");
        let results = &value["analysis_results"];
        assert_eq!(results["summary"]["totalPatternsDetected"], 3);
        assert_eq!(results["patterns"]["form-group"]["rule"], "form-group");
        assert!(results["patterns"]["form-group"]["accessibility"].as_f64().unwrap() < 0.7);
        assert!(results["patterns"]["form-group"].get("accessibilityApplicable").is_none());
        assert_eq!(
            results["relationships"]["input-field"]["form-group"]["type"],
            "nested_child"
        );
    }

    #[test]
    fn pretty_export_is_indented() {
        let result = AnalysisResult::empty(0);
        let json = Export::at(&result, datetime!(2026-01-02 00:00 UTC))
            .unwrap()
            .to_json(true)
            .unwrap();
        assert!(json.contains("\n  \"timestamp\""));
    }

    #[test]
    fn text_report_lists_patterns_and_recommendations() {
        let text = render_text(&sample());
        assert!(text.contains("Total patterns:       3"));
        assert!(text.contains("[form-group] (form-group)"));
        assert!(text.contains("Recommendations"));
        assert!(text.contains("low accessibility"));
    }

    #[test]
    fn slugs_are_file_safe() {
        assert_eq!(slug("data-list"), "data-list");
        assert_eq!(slug("data-list#2"), "data-list-2");
        assert_eq!(slug("Odd Name/x"), "odd-name-x");
    }

    #[test]
    fn pages_are_written_below_the_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let pages = [
            Page::new("index.html", "<html></html>"),
            Page::new("patterns/data-list.html", "<p></p>"),
        ];

        let written = write_pages(&root, &pages).unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(
            std::fs::read_to_string(root.join("patterns/data-list.html")).unwrap(),
            "<p></p>"
        );
    }

    #[test]
    fn text_report_handles_empty_results() {
        let text = render_text(&AnalysisResult::empty(4));
        assert!(text.contains("Components analyzed:  4"));
        assert!(text.contains("No patterns found."));
    }
}
