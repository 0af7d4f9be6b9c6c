//! Ordered type-override rules and key-role assignment.
//!
//! Rules run in a fixed order; a later rule wins over an earlier one when
//! both match the same leaf. A name matching no rule keeps whatever type
//! the platform's auto-mapper inferred.

use remap_api::column::{ColumnMapping, ColumnType};

use crate::config::MapperConfig;
use crate::naming::{contains_any, contains_pattern, fix_naming};

/// Hands out sort-key indices in document order. One allocator per
/// event-type run; the first matching field gets index 0.
#[derive(Debug, Default)]
pub struct SortKeyAllocator {
    next: i64,
}

impl SortKeyAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    fn assign(&mut self) -> i64 {
        let index = self.next;
        self.next += 1;
        index
    }
}

/// Apply the override chain to a retained, non-metadata leaf.
///
/// Order: float → bigint → varchar → varchar defaults → timestamp
/// normalization → id defaults → sort key → distribution key → primary key,
/// then length/truncate are stripped from non-character types.
pub fn apply_column_rules(
    mapper: &MapperConfig,
    column_name: &str,
    mapping: &mut ColumnMapping,
    sort_keys: &mut SortKeyAllocator,
) {
    let mut ty = mapping.column_type.take().unwrap_or_default();

    if contains_any(column_name, &mapper.force_float_patterns) {
        ty.name = ColumnType::FLOAT_NORM.into();
    }
    if contains_any(column_name, &mapper.force_bigint_patterns) {
        ty.name = ColumnType::BIGINT.into();
    }
    if contains_any(column_name, &mapper.force_varchar_patterns) {
        ty.name = ColumnType::VARCHAR.into();
    }

    if ty.name == ColumnType::VARCHAR {
        ty.length = Some(mapper.varchar_length);
        ty.truncate = Some(mapper.varchar_truncate);
    }

    if ty.is_timestamp() {
        ty.name = mapper.timestamp_type.clone();
    }

    if contains_any(column_name, &mapper.id_patterns) {
        ty.name = mapper.id_type.clone();
        ty.length = Some(mapper.id_length);
        ty.truncate = Some(mapper.id_truncate);
    }

    if contains_any(column_name, &mapper.sort_key_patterns) {
        mapping.sort_key_index = Some(sort_keys.assign());
        if ty.name == ColumnType::VARCHAR {
            ty.length = Some(mapper.sort_key_varchar_length);
        }
    } else {
        mapping.sort_key_index = Some(-1);
    }

    mapping.dist_key = Some(column_name == mapper.distribution_key);

    if column_name == mapper.primary_key {
        ty.name = mapper.primary_key_type.clone();
        ty.length = Some(mapper.primary_key_length);
        ty.truncate = Some(mapper.primary_key_truncate);
        ty.non_null = Some(true);
        mapping.primary_key = Some(true);
    } else {
        mapping.primary_key = Some(false);
    }

    if !ty.is_character() {
        ty.length = None;
        ty.truncate = None;
    }

    mapping.column_type = Some(ty);
}

/// Type rules for platform bookkeeping leaves. These are always retained;
/// a leaf the auto-mapper skipped gets a mapping synthesized from the
/// metadata marker and its fixed field name.
pub fn apply_metadata_rules(mapper: &MapperConfig, field_name: &str, mapping: &mut ColumnMapping) {
    mapping.is_discarded = Some(false);

    if mapping.column_name.is_empty() {
        mapping.column_name = format!("{}_{}", mapper.metadata_marker, fix_naming(field_name));
    }

    let mut ty = mapping.column_type.take().unwrap_or(ColumnType {
        non_null: Some(false),
        ..Default::default()
    });

    let rules = &mapper.metadata;
    let matches = |patterns: &[String]| {
        contains_any(&mapping.column_name, patterns) || contains_any(field_name, patterns)
    };

    if matches(&rules.varchar_patterns) {
        ty.name = ColumnType::VARCHAR.into();
        ty.length = Some(rules.varchar_length);
        ty.truncate = Some(false);
    }
    if matches(&rules.timestamp_patterns) {
        ty.name = ColumnType::TIMESTAMP.into();
    }
    if matches(&rules.boolean_patterns) {
        ty.name = ColumnType::BOOLEAN.into();
    }
    if matches(&rules.bigint_patterns) {
        ty.name = ColumnType::BIGINT.into();
    }

    if !ty.is_character() {
        ty.length = None;
        ty.truncate = None;
    }

    mapping.column_type = Some(ty);
}

/// Whether the rule chain can produce a type for this leaf.
///
/// Only the float/bigint/varchar/id overrides and the primary-key rule set
/// a type from nothing; every other rule rewrites an existing one. Used by
/// the strict profile to drop untypeable fields without running the chain.
pub fn resolves_type(mapper: &MapperConfig, column_name: &str, current: Option<&ColumnType>) -> bool {
    if current.is_some_and(|ty| !ty.is_unresolved()) {
        return true;
    }
    contains_any(column_name, &mapper.force_float_patterns)
        || contains_any(column_name, &mapper.force_bigint_patterns)
        || contains_any(column_name, &mapper.force_varchar_patterns)
        || contains_any(column_name, &mapper.id_patterns)
        || column_name == mapper.primary_key
}

/// Metadata detection: the marker may appear in the already-mapped column
/// name, the ancestor prefix, the raw field name, or the resolved name.
pub fn is_metadata(
    mapper: &MapperConfig,
    existing_column_name: &str,
    prefix: &str,
    field_name: &str,
    resolved: &str,
) -> bool {
    let marker = mapper.metadata_marker.as_str();
    contains_pattern(existing_column_name, marker)
        || contains_pattern(prefix, marker)
        || contains_pattern(field_name, marker)
        || contains_pattern(resolved, marker)
}
