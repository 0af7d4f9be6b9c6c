use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::column::ColumnMapping;

/// Lifecycle state of an event type on the platform.
///
/// The platform uses additional in-between states during mapping workflows;
/// anything that is not plain mapped/unmapped lands in `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventState {
    Unmapped,
    Mapped,
    #[serde(other)]
    Other,
}

/// One row of the platform's event-type listing. Read-only: the engine never
/// writes summaries back, so unknown attributes are simply dropped here.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTypeSummary {
    pub name: String,
    pub state: EventState,
}

/// Occurrence counts for a single distinct sample value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleStats {
    #[serde(default)]
    pub count: u64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Observation statistics for one inferred type variant of a leaf field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantStats {
    #[serde(default)]
    pub count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub samples: Option<HashMap<String, SampleStats>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Per-leaf statistics: type-variant name → counts. Present on leaves as
/// loaded from the platform, removed by the cleanup pass before submission.
pub type FieldStats = HashMap<String, VariantStats>;

/// Aggregate statistics of a whole event type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventStats {
    #[serde(default)]
    pub count: u64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One node of an event type's field tree. A node with no children is a
/// leaf — the unit that maps to a destination column.
///
/// Unknown platform attributes are carried in `extra` so a fetched tree can
/// be posted back without loss. The ancestor-prefix scratch state used while
/// resolving column names is never stored on the node; it travels through
/// the traversal as an argument.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldNode {
    #[serde(default)]
    pub field_name: String,
    #[serde(default)]
    pub fields: Vec<FieldNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<FieldStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping: Option<ColumnMapping>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl FieldNode {
    pub fn is_leaf(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A named field tree plus aggregate stats, as fetched from the platform.
/// The platform owns persistence; this struct is rewritten in memory and
/// submitted back, never stored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventType {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<EventStats>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl EventType {
    /// Total observed event count, 0 when the platform sent no stats.
    pub fn total_count(&self) -> u64 {
        self.stats.as_ref().map(|s| s.count).unwrap_or(0)
    }
}
