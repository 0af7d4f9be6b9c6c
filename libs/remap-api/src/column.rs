use serde::{Deserialize, Serialize};

/// Destination column type.
///
/// `name` is a free-form type keyword — the engine never enumerates the
/// platform's full type set. It interprets the string in exactly two ways:
/// case-insensitive containment of `char` (character types, which carry
/// `length`/`truncate`) and of `timestamp` (normalized to the configured
/// timestamp type). Everything else passes through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnType {
    #[serde(rename = "type", default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truncate: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub non_null: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ColumnType {
    pub const VARCHAR: &'static str = "VARCHAR";
    pub const BIGINT: &'static str = "BIGINT";
    pub const FLOAT_NORM: &'static str = "FLOAT_NORM";
    pub const BOOLEAN: &'static str = "BOOLEAN";
    pub const TIMESTAMP: &'static str = "TIMESTAMP";

    /// Bare type with the given keyword and no attributes.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Character types carry `length`/`truncate`; all others must not.
    pub fn is_character(&self) -> bool {
        self.name.to_lowercase().contains("char")
    }

    pub fn is_timestamp(&self) -> bool {
        self.name.to_lowercase().contains("timestamp")
    }

    /// No usable type keyword. An empty string and an absent `columnType`
    /// are the same condition everywhere in the engine.
    pub fn is_unresolved(&self) -> bool {
        self.name.is_empty()
    }
}

/// Mapping decision for one leaf field.
///
/// `sort_key_index`, `dist_key` and `primary_key` are working state for the
/// table-creation call; the cleanup pass removes them from the tree before
/// the mapping is committed. `is_discarded` stays on the committed tree but
/// is omitted from the flat column list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMapping {
    #[serde(default)]
    pub column_name: String,
    /// `None` serializes as an explicit `null`: a discarded column has no type.
    #[serde(default)]
    pub column_type: Option<ColumnType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_discarded: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_key_index: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dist_key: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine_generated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_fields: Option<serde_json::Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ColumnMapping {
    pub fn is_discarded(&self) -> bool {
        self.is_discarded == Some(true)
    }

    /// Drop the column: no name, no type.
    pub fn discard(&mut self) {
        self.is_discarded = Some(true);
        self.column_name = String::new();
        self.column_type = None;
    }

    /// Remove the key-role working state. Idempotent; absent fields stay absent.
    pub fn clear_scratch(&mut self) {
        self.sort_key_index = None;
        self.dist_key = None;
        self.primary_key = None;
    }

    /// Clone for the flat table-creation list: key roles kept, the discard
    /// flag and platform bookkeeping attributes removed.
    pub fn to_column(&self) -> ColumnMapping {
        ColumnMapping {
            is_discarded: None,
            machine_generated: None,
            sub_fields: None,
            ..self.clone()
        }
    }
}
