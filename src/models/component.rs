use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::SightError;

/// One UI component as handed over by the loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentRecord {
    pub class_name: String,
    /// May be empty; an empty template contributes no patterns.
    pub template: String,
    #[serde(default)]
    pub styles: Vec<String>,
    /// Decorator properties such as `selector` and `templateUrl`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl ComponentRecord {
    pub fn new(
        class_name: impl Into<String>,
        template: impl Into<String>,
        styles: Vec<String>,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            template: template.into(),
            styles,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: BTreeMap<String, String>) -> Self {
        self.metadata = metadata;
        self
    }

    /// The component's element selector, when known.
    pub fn selector(&self) -> Option<&str> {
        self.metadata.get("selector").map(String::as_str)
    }

    /// Check the fields every downstream stage relies on.
    pub fn validate(&self) -> Result<(), SightError> {
        if self.class_name.trim().is_empty() {
            return Err(SightError::malformed(
                "component record is missing its className",
            ));
        }
        Ok(())
    }
}

/// Parse a JSON array of component records.
pub fn parse_records(json: &str) -> Result<Vec<ComponentRecord>, SightError> {
    serde_json::from_str(json)
        .map_err(|e| SightError::malformed(format!("invalid component manifest: {e}")))
}
