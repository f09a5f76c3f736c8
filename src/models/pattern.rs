use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::hash::{Hash, Hasher};

use crate::engine::markup;
use crate::engine::styles::{self, StyleIndex};

/// The fixed structural rules, in emission priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleName {
    DataList,
    ConditionalContent,
    FormGroup,
    InputField,
    ActionButton,
    DataBinding,
    EventBinding,
}

impl RuleName {
    pub const ALL: [RuleName; 7] = [
        Self::DataList,
        Self::ConditionalContent,
        Self::FormGroup,
        Self::InputField,
        Self::ActionButton,
        Self::DataBinding,
        Self::EventBinding,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::DataList => "data-list",
            Self::ConditionalContent => "conditional-content",
            Self::FormGroup => "form-group",
            Self::InputField => "input-field",
            Self::ActionButton => "action-button",
            Self::DataBinding => "data-binding",
            Self::EventBinding => "event-binding",
        }
    }
}

impl std::fmt::Display for RuleName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One concrete rule match inside one component's template.
///
/// The structural fields are a pure function of `raw_markup`, so two
/// instances built from the same markup compare equal regardless of where
/// they came from or which styles they picked up. Equality and hashing use `(rule, normalized_structure, raw_markup,
/// selector_path)` only.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternInstance {
    rule: RuleName,
    raw_markup: String,
    normalized_structure: String,
    isolated_template: String,
    selector_path: Vec<String>,
    source_component: String,
    associated_styles: BTreeMap<String, String>,
    #[serde(skip)]
    similarity_key: [u8; 32],
}

impl PatternInstance {
    /// Build an instance from matched markup and the styles resolved for it.
    pub fn new(
        rule: RuleName,
        raw_markup: impl Into<String>,
        source_component: impl Into<String>,
        associated_styles: BTreeMap<String, String>,
    ) -> Self {
        let raw_markup = raw_markup.into();
        let normalized_structure = markup::normalize_structure(&raw_markup);
        let isolated_template = markup::isolate_template(&raw_markup);
        let selector_path = styles::selector_path(&isolated_template);
        let similarity_key = similarity_key(&normalized_structure, &associated_styles);

        Self {
            rule,
            raw_markup,
            normalized_structure,
            isolated_template,
            selector_path,
            source_component: source_component.into(),
            associated_styles,
            similarity_key,
        }
    }

    /// Attach the rule blocks of `index` that mention this fragment's classes.
    pub fn resolve_styles(mut self, index: &StyleIndex) -> Self {
        self.associated_styles = index.resolve(&self.selector_path);
        self.similarity_key = similarity_key(&self.normalized_structure, &self.associated_styles);
        self
    }

    pub fn rule(&self) -> RuleName {
        self.rule
    }

    pub fn raw_markup(&self) -> &str {
        &self.raw_markup
    }

    pub fn normalized_structure(&self) -> &str {
        &self.normalized_structure
    }

    pub fn isolated_template(&self) -> &str {
        &self.isolated_template
    }

    /// `.class` selectors found walking the isolated markup depth-first.
    pub fn selector_path(&self) -> &[String] {
        &self.selector_path
    }

    pub fn source_component(&self) -> &str {
        &self.source_component
    }

    pub fn associated_styles(&self) -> &BTreeMap<String, String> {
        &self.associated_styles
    }

    /// BLAKE3 digest of the normalized structure and associated styles,
    /// the only inputs of similarity. Used as a memo key.
    pub fn similarity_key(&self) -> [u8; 32] {
        self.similarity_key
    }
}

fn similarity_key(normalized: &str, styles: &BTreeMap<String, String>) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&(normalized.len() as u64).to_le_bytes());
    hasher.update(normalized.as_bytes());
    for (selector, body) in styles {
        for part in [selector, body] {
            hasher.update(&(part.len() as u64).to_le_bytes());
            hasher.update(part.as_bytes());
        }
    }
    *hasher.finalize().as_bytes()
}

impl PartialEq for PatternInstance {
    fn eq(&self, other: &Self) -> bool {
        self.rule == other.rule
            && self.normalized_structure == other.normalized_structure
            && self.raw_markup == other.raw_markup
            && self.selector_path == other.selector_path
    }
}

impl Eq for PatternInstance {}

impl Hash for PatternInstance {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rule.hash(state);
        self.normalized_structure.hash(state);
        self.raw_markup.hash(state);
        self.selector_path.hash(state);
    }
}

/// A group of similar instances treated as one kind of UI pattern.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternClass {
    pub class_id: String,
    members: Vec<PatternInstance>,
    components_using: BTreeSet<String>,
}

impl PatternClass {
    pub fn new(class_id: impl Into<String>, first: PatternInstance) -> Self {
        let mut class = Self {
            class_id: class_id.into(),
            members: Vec::new(),
            components_using: BTreeSet::new(),
        };
        class.push(first);
        class
    }

    pub fn push(&mut self, instance: PatternInstance) {
        self.components_using
            .insert(instance.source_component().to_string());
        self.members.push(instance);
    }

    /// The first member; every comparison against the class goes through it.
    pub fn representative(&self) -> &PatternInstance {
        &self.members[0]
    }

    pub fn rule(&self) -> RuleName {
        self.representative().rule()
    }

    /// Members in discovery order.
    pub fn members(&self) -> &[PatternInstance] {
        &self.members
    }

    pub fn components_using(&self) -> &BTreeSet<String> {
        &self.components_using
    }
}
