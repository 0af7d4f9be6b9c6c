//! Field-tree traversal: resolve names, classify, type, annotate, clean.
//!
//! The traversal is pure synchronous computation over one event type's
//! private tree. The ancestor prefix travels as an argument and the sort-key
//! counter as an explicit allocator, so nothing outlives a single run.

use remap_api::column::ColumnMapping;
use remap_api::event::{EventType, FieldNode};

use crate::config::{MapperConfig, ScrubConfig};
use crate::naming::{contains_any, fix_naming};
use crate::retention::{should_discard, StatsSummary};
use crate::rules::{
    apply_column_rules, apply_metadata_rules, is_metadata, resolves_type, SortKeyAllocator,
};

/// Which discard policy a run applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingProfile {
    /// Statistics-based retention plus discard patterns. Used when mapping
    /// fresh event types.
    Standard,
    /// No statistics: only fields with no resolvable type or a discard
    /// pattern match are dropped. Used when repairing existing mappings,
    /// where the recorded statistics are no longer trustworthy.
    Strict,
}

/// Outcome of one mapping run over an event type.
#[derive(Debug, Default)]
pub struct MappedEvent {
    /// Flat list of retained columns, in document order, for table creation.
    pub columns: Vec<ColumnMapping>,
    /// Number of leaves discarded by this run.
    pub discarded: usize,
}

/// Annotate the tree in place and collect the flat column list.
///
/// Every leaf ends the run with a decided mapping: discarded leaves carry an
/// empty name and no type, retained leaves a resolved name, type and key
/// roles. Leaves the auto-mapper never gave a mapping are left untouched.
pub fn map_event_type(
    mapper: &MapperConfig,
    profile: MappingProfile,
    evt: &mut EventType,
) -> MappedEvent {
    let mut pass = MapPass {
        mapper,
        profile,
        event_total: evt.total_count(),
        sort_keys: SortKeyAllocator::new(),
        outcome: MappedEvent::default(),
    };
    for node in &mut evt.fields {
        pass.walk("", node);
    }
    tracing::debug!(
        event_type = %evt.name,
        columns = pass.outcome.columns.len(),
        discarded = pass.outcome.discarded,
        "event type annotated"
    );
    pass.outcome
}

struct MapPass<'a> {
    mapper: &'a MapperConfig,
    profile: MappingProfile,
    event_total: u64,
    sort_keys: SortKeyAllocator,
    outcome: MappedEvent,
}

impl MapPass<'_> {
    fn walk(&mut self, prefix: &str, node: &mut FieldNode) {
        if node.is_leaf() {
            self.leaf(prefix, node);
            return;
        }
        let child_prefix = child_prefix(prefix, &node.field_name);
        for child in &mut node.fields {
            self.walk(&child_prefix, child);
        }
    }

    fn leaf(&mut self, prefix: &str, node: &mut FieldNode) {
        let resolved = format!("{prefix}{}", fix_naming(&node.field_name));

        let existing = node
            .mapping
            .as_ref()
            .map(|m| m.column_name.as_str())
            .unwrap_or("");
        if is_metadata(self.mapper, existing, prefix, &node.field_name, &resolved) {
            let mapping = node.mapping.get_or_insert_with(ColumnMapping::default);
            apply_metadata_rules(self.mapper, &node.field_name, mapping);
            self.outcome.columns.push(mapping.to_column());
            return;
        }

        // A leaf without a mapping was skipped by the auto-mapper; there is
        // no decision to rewrite.
        let Some(mapping) = node.mapping.as_mut() else {
            return;
        };

        mapping.column_name = resolved.clone();

        let discarded = match self.profile {
            MappingProfile::Standard => {
                let stats = StatsSummary::of(node.stats.as_ref());
                should_discard(self.mapper, &resolved, &stats, self.event_total)
            }
            MappingProfile::Strict => {
                !resolves_type(self.mapper, &resolved, mapping.column_type.as_ref())
                    || contains_any(&resolved, &self.mapper.discard_patterns)
            }
        };

        if discarded {
            mapping.discard();
            self.outcome.discarded += 1;
            return;
        }

        mapping.is_discarded = Some(false);
        apply_column_rules(self.mapper, &resolved, mapping, &mut self.sort_keys);
        self.outcome.columns.push(mapping.to_column());
    }
}

fn child_prefix(prefix: &str, field_name: &str) -> String {
    let combined = format!("{prefix}{}", fix_naming(field_name));
    if combined.is_empty() {
        combined
    } else {
        format!("{combined}_")
    }
}

/// Strip working state from the whole tree: statistics everywhere, key-role
/// scratch fields from every mapping. Idempotent — absent state stays absent.
pub fn cleanup(evt: &mut EventType) {
    evt.stats = None;
    for node in &mut evt.fields {
        cleanup_node(node);
    }
}

fn cleanup_node(node: &mut FieldNode) {
    node.stats = None;
    if let Some(mapping) = node.mapping.as_mut() {
        mapping.clear_scratch();
    }
    for child in &mut node.fields {
        cleanup_node(child);
    }
}

/// Drop already-mapped columns matching the scrub blacklist. Returns the
/// number of columns discarded.
pub fn scrub_columns(scrub: &ScrubConfig, evt: &mut EventType) -> usize {
    let mut scrubbed = 0;
    for node in &mut evt.fields {
        scrub_node(scrub, node, &mut scrubbed);
    }
    scrubbed
}

fn scrub_node(scrub: &ScrubConfig, node: &mut FieldNode, scrubbed: &mut usize) {
    if !node.is_leaf() {
        for child in &mut node.fields {
            scrub_node(scrub, child, scrubbed);
        }
        return;
    }
    let Some(mapping) = node.mapping.as_mut() else {
        return;
    };
    if mapping.column_name.is_empty() {
        return;
    }
    if contains_any(&mapping.column_name, &scrub.blacklist)
        && contains_any(&mapping.column_name, &scrub.require)
        && !contains_any(&mapping.column_name, &scrub.exempt)
    {
        mapping.discard();
        mapping.machine_generated = Some(false);
        *scrubbed += 1;
    }
}

/// Resolved names of leaves the auto-mapper left without any mapping.
pub fn unmapped_columns(evt: &EventType) -> Vec<String> {
    let mut unmapped = Vec::new();
    for node in &evt.fields {
        scan_unmapped("", node, &mut unmapped);
    }
    unmapped
}

fn scan_unmapped(prefix: &str, node: &FieldNode, unmapped: &mut Vec<String>) {
    if !node.is_leaf() {
        let child_prefix = child_prefix(prefix, &node.field_name);
        for child in &node.fields {
            scan_unmapped(&child_prefix, child, unmapped);
        }
        return;
    }
    if node.mapping.is_none() {
        unmapped.push(format!("{prefix}{}", fix_naming(&node.field_name)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use remap_api::column::ColumnType;

    fn leaf(name: &str, ty: &str) -> FieldNode {
        FieldNode {
            field_name: name.into(),
            mapping: Some(ColumnMapping {
                column_type: Some(ColumnType::named(ty)),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn nested(name: &str, children: Vec<FieldNode>) -> FieldNode {
        FieldNode {
            field_name: name.into(),
            fields: children,
            ..Default::default()
        }
    }

    #[test]
    fn names_are_fully_qualified_through_ancestors() {
        let mapper = MapperConfig::default();
        let mut evt = EventType {
            fields: vec![nested(
                "UserProfile",
                vec![leaf("First Name", "VARCHAR")],
            )],
            ..Default::default()
        };
        map_event_type(&mapper, MappingProfile::Standard, &mut evt);
        let mapping = evt.fields[0].fields[0].mapping.as_ref().unwrap();
        assert_eq!(mapping.column_name, "user_profile_first_name");
    }

    #[test]
    fn unmapped_leaves_are_left_alone_and_reported() {
        let mapper = MapperConfig::default();
        let mut evt = EventType {
            fields: vec![nested(
                "payload",
                vec![FieldNode {
                    field_name: "rawBlob".into(),
                    ..Default::default()
                }],
            )],
            ..Default::default()
        };
        assert_eq!(unmapped_columns(&evt), vec!["payload_raw_blob"]);
        let outcome = map_event_type(&mapper, MappingProfile::Standard, &mut evt);
        assert!(outcome.columns.is_empty());
        assert!(evt.fields[0].fields[0].mapping.is_none());
    }

    #[test]
    fn strict_profile_discards_untypeable_fields() {
        let mapper = MapperConfig::default();
        let mut evt = EventType {
            fields: vec![
                FieldNode {
                    field_name: "mysteryField".into(),
                    mapping: Some(ColumnMapping::default()),
                    ..Default::default()
                },
                leaf("amount", "BIGINT"),
            ],
            ..Default::default()
        };
        let outcome = map_event_type(&mapper, MappingProfile::Strict, &mut evt);
        assert_eq!(outcome.discarded, 1);
        assert_eq!(outcome.columns.len(), 1);
        let dropped = evt.fields[0].mapping.as_ref().unwrap();
        assert!(dropped.is_discarded());
        assert_eq!(dropped.column_name, "");
        assert!(dropped.column_type.is_none());
    }

    #[test]
    fn cleanup_strips_stats_and_scratch_everywhere() {
        let mapper = MapperConfig::default();
        let mut inner = leaf("createdAt", "TIMESTAMP");
        inner.stats = Some(Default::default());
        let mut evt = EventType {
            stats: Some(Default::default()),
            fields: vec![nested("meta Block", vec![inner]), leaf("amount", "BIGINT")],
            ..Default::default()
        };
        map_event_type(&mapper, MappingProfile::Standard, &mut evt);
        cleanup(&mut evt);
        cleanup(&mut evt); // second pass is a no-op

        assert!(evt.stats.is_none());
        let deep = &evt.fields[0].fields[0];
        assert!(deep.stats.is_none());
        let mapping = deep.mapping.as_ref().unwrap();
        assert!(mapping.sort_key_index.is_none());
        assert!(mapping.dist_key.is_none());
        assert!(mapping.primary_key.is_none());
        // the decision itself survives cleanup
        assert_eq!(mapping.column_name, "meta_block_created_at");
        assert!(mapping.column_type.is_some());
    }

    #[test]
    fn scrub_discards_blacklisted_trait_columns_only() {
        let scrub = ScrubConfig::default();
        let mut traits_email = leaf("email", "VARCHAR");
        traits_email.mapping.as_mut().unwrap().column_name = "context_traits_email".into();
        let mut meta_email = leaf("email", "VARCHAR");
        meta_email.mapping.as_mut().unwrap().column_name = "meta_traits_email".into();
        let mut plain_email = leaf("email", "VARCHAR");
        plain_email.mapping.as_mut().unwrap().column_name = "user_email".into();

        let mut evt = EventType {
            fields: vec![nested(
                "context",
                vec![traits_email, meta_email, plain_email],
            )],
            ..Default::default()
        };
        let scrubbed = scrub_columns(&scrub, &mut evt);
        assert_eq!(scrubbed, 1);

        let fields = &evt.fields[0].fields;
        assert!(fields[0].mapping.as_ref().unwrap().is_discarded());
        assert_eq!(
            fields[0].mapping.as_ref().unwrap().machine_generated,
            Some(false)
        );
        assert!(!fields[1].mapping.as_ref().unwrap().is_discarded());
        assert!(!fields[2].mapping.as_ref().unwrap().is_discarded());
    }
}
