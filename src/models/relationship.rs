use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    /// The source class sits inside the target class.
    NestedChild,
    /// The source class contains the target class.
    NestedParent,
    Similar,
    CoOccurring,
}

/// Edge from one pattern class to another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    #[serde(rename = "type")]
    pub kind: RelationshipKind,
    pub strength: f64,
    pub shared_components: BTreeSet<String>,
}

/// source class id -> target class id -> edge
pub type RelationshipMap = BTreeMap<String, BTreeMap<String, Relationship>>;
