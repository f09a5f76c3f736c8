use serde::{Deserialize, Serialize};

/// Quality dimensions of one pattern class, averaged over its members.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityScore {
    pub complexity: f64,
    pub accessibility: f64,
    pub maintainability: f64,
    pub best_practices: f64,
    pub template_complexity_pct: u8,
    pub style_complexity_pct: u8,
    pub logic_complexity_pct: u8,
    /// False when no member had anything the accessibility checklist applies to.
    #[serde(skip)]
    pub accessibility_applicable: bool,
}
