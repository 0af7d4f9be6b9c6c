use serde::{Deserialize, Serialize};

use crate::event::FieldNode;

/// How the platform treats fields that later show up outside the committed
/// mapping. This engine always commits strict mappings: unexpected fields
/// are rejected rather than silently mapped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MappingMode {
    #[default]
    Strict,
    Flexible,
}

/// Destination table coordinates inside the warehouse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRef {
    pub table_name: String,
    pub schema: String,
}

impl TableRef {
    /// Resolve the destination for an event type.
    ///
    /// With a configured schema the full event name becomes the table name.
    /// Without one the event name itself carries the destination as
    /// `schema.table`; a dotless name has no destination and yields `None`.
    pub fn resolve(event_name: &str, target_schema: Option<&str>) -> Option<TableRef> {
        match target_schema {
            Some(schema) => Some(TableRef {
                table_name: event_name.to_string(),
                schema: schema.to_string(),
            }),
            None => {
                let (schema, table) = event_name.split_once('.')?;
                if schema.is_empty() || table.is_empty() {
                    return None;
                }
                Some(TableRef {
                    table_name: table.to_string(),
                    schema: schema.to_string(),
                })
            }
        }
    }
}

/// Full mapping-commit payload: once accepted, future events of this type
/// are routed to the destination table.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingCommit {
    pub name: String,
    pub mapping: TableRef,
    pub fields: Vec<FieldNode>,
    pub mapping_mode: MappingMode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_schema_keeps_full_event_name_as_table() {
        let table = TableRef::resolve("production.page_viewed", Some("dataflux")).unwrap();
        assert_eq!(table.schema, "dataflux");
        assert_eq!(table.table_name, "production.page_viewed");
    }

    #[test]
    fn name_split_uses_first_dot() {
        let table = TableRef::resolve("production.page.viewed", None).unwrap();
        assert_eq!(table.schema, "production");
        assert_eq!(table.table_name, "page.viewed");
    }

    #[test]
    fn dotless_name_without_schema_has_no_destination() {
        assert!(TableRef::resolve("orphan_event", None).is_none());
        assert!(TableRef::resolve(".table", None).is_none());
        assert!(TableRef::resolve("schema.", None).is_none());
    }

    #[test]
    fn commit_payload_shape() {
        let commit = MappingCommit {
            name: "production.signup".into(),
            mapping: TableRef::resolve("production.signup", None).unwrap(),
            fields: vec![],
            mapping_mode: MappingMode::default(),
        };
        let value = serde_json::to_value(&commit).unwrap();
        assert_eq!(value["mapping"]["schema"], "production");
        assert_eq!(value["mapping"]["tableName"], "signup");
        assert_eq!(value["mappingMode"], "STRICT");
    }
}
