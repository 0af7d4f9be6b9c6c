//! End-to-end engine runs over realistic field trees.

use remap_api::event::EventType;
use remap_engine::annotate::{cleanup, map_event_type, MappedEvent, MappingProfile};
use remap_engine::config::MapperConfig;

/// A tree shaped like a platform auto-map response: nested user block,
/// bookkeeping fields, a near-constant leaf and a dominant-value id.
fn sample_event() -> EventType {
    serde_json::from_value(serde_json::json!({
        "name": "production.track_event",
        "state": "UNMAPPED",
        "stats": {"count": 1000},
        "fields": [
            {
                "fieldName": "messageId",
                "fields": [],
                "stats": {"string": {"count": 1000, "samples": {
                    "m1": {"count": 1}, "m2": {"count": 1}, "m3": {"count": 1}
                }}},
                "mapping": {"columnName": "", "columnType": {"type": "VARCHAR"}}
            },
            {
                "fieldName": "timestamp",
                "fields": [],
                "stats": {"timestamp": {"count": 1000, "samples": {
                    "t1": {"count": 999}
                }}},
                "mapping": {"columnName": "", "columnType": {"type": "TIMESTAMP"}}
            },
            {
                "fieldName": "userId",
                "fields": [],
                "stats": {"string": {"count": 1000, "samples": {
                    "a": {"count": 999}, "b": {"count": 1}
                }}},
                "mapping": {"columnName": "", "columnType": {"type": "BIGINT"}}
            },
            {
                "fieldName": "UserProfile",
                "fields": [
                    {
                        "fieldName": "First Name",
                        "fields": [],
                        "stats": {"string": {"count": 800, "samples": {
                            "ann": {"count": 400}, "bob": {"count": 250}, "eve": {"count": 150}
                        }}},
                        "mapping": {"columnName": "", "columnType": {"type": "VARCHAR"}}
                    },
                    {
                        "fieldName": "osName",
                        "fields": [],
                        "stats": {"string": {"count": 700, "samples": {
                            "ios": {"count": 400}, "android": {"count": 300}
                        }}},
                        "mapping": {"columnName": "", "columnType": {"type": "VARCHAR"}}
                    }
                ],
                "stats": {}
            },
            {
                "fieldName": "geolocationTimestamp",
                "fields": [],
                "stats": {"number": {"count": 900, "samples": {
                    "1": {"count": 300}, "2": {"count": 300}, "3": {"count": 300}
                }}},
                "mapping": {"columnName": "", "columnType": {"type": "FLOAT"}}
            },
            {
                "fieldName": "_metadata_event_type",
                "fields": [],
                "mapping": {"columnName": "_metadata_event_type", "columnType": {"type": "VARCHAR", "length": 255}}
            },
            {
                "fieldName": "secretPassword",
                "fields": [],
                "stats": {"string": {"count": 600, "samples": {
                    "x": {"count": 300}, "y": {"count": 300}
                }}},
                "mapping": {"columnName": "", "columnType": {"type": "VARCHAR"}}
            }
        ]
    }))
    .unwrap()
}

fn run_standard(evt: &mut EventType) -> MappedEvent {
    map_event_type(&MapperConfig::default(), MappingProfile::Standard, evt)
}

fn mapping_of<'a>(evt: &'a EventType, path: &[usize]) -> &'a remap_api::column::ColumnMapping {
    let mut node = &evt.fields[path[0]];
    for &i in &path[1..] {
        node = &node.fields[i];
    }
    node.mapping.as_ref().unwrap()
}

#[test]
fn dominant_value_discards_despite_id_pattern() {
    let mut evt = sample_event();
    run_standard(&mut evt);

    // 999 of 1000 observations share one value: near-constant, dropped even
    // though "user_id" matches the id pattern
    let user_id = mapping_of(&evt, &[2]);
    assert!(user_id.is_discarded());
    assert_eq!(user_id.column_name, "");
    assert!(user_id.column_type.is_none());
}

#[test]
fn key_columns_survive_their_own_statistics() {
    let mut evt = sample_event();
    run_standard(&mut evt);

    // message_id is the primary key; timestamp is near-constant (999 of
    // 1000 share one value) but is the distribution key
    let pk = mapping_of(&evt, &[0]);
    assert!(!pk.is_discarded());
    assert_eq!(pk.primary_key, Some(true));
    let ty = pk.column_type.as_ref().unwrap();
    assert_eq!(ty.name, "CHAR");
    assert_eq!(ty.length, Some(36));
    assert_eq!(ty.truncate, Some(false));
    assert_eq!(ty.non_null, Some(true));

    let dist = mapping_of(&evt, &[1]);
    assert!(!dist.is_discarded());
    assert_eq!(dist.dist_key, Some(true));
    assert_eq!(dist.column_type.as_ref().unwrap().name, "TIMESTAMPTZ");
}

#[test]
fn exactly_one_primary_and_one_distribution_key() {
    let mut evt = sample_event();
    let outcome = run_standard(&mut evt);

    let primaries = outcome
        .columns
        .iter()
        .filter(|c| c.primary_key == Some(true))
        .count();
    let dists = outcome
        .columns
        .iter()
        .filter(|c| c.dist_key == Some(true))
        .count();
    assert_eq!(primaries, 1);
    assert_eq!(dists, 1);
}

#[test]
fn sort_key_indices_are_contiguous_in_document_order() {
    let mut evt = sample_event();
    let outcome = run_standard(&mut evt);

    let assigned: Vec<(String, i64)> = outcome
        .columns
        .iter()
        .filter_map(|c| {
            c.sort_key_index
                .filter(|&i| i >= 0)
                .map(|i| (c.column_name.clone(), i))
        })
        .collect();

    // document order: message_id, timestamp, first name (user), os_name,
    // geolocation_timestamp — user_id was discarded and consumed no index
    let names: Vec<&str> = assigned.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "message_id",
            "timestamp",
            "user_profile_first_name",
            "user_profile_os_name",
            "geolocation_timestamp",
        ]
    );
    let indices: Vec<i64> = assigned.iter().map(|(_, i)| *i).collect();
    assert_eq!(indices, vec![0, 1, 2, 3, 4]);

    // every retained non-matching column carries -1
    for column in &outcome.columns {
        if !names.contains(&column.column_name.as_str())
            && !column.column_name.starts_with("_metadata")
        {
            assert_eq!(column.sort_key_index, Some(-1), "{}", column.column_name);
        }
    }
}

#[test]
fn bigint_override_drops_character_attributes() {
    let mut evt = sample_event();
    run_standard(&mut evt);

    // float pattern matches, then the bigint pattern wins; no length or
    // truncate on a non-character type
    let geo = mapping_of(&evt, &[4]);
    let ty = geo.column_type.as_ref().unwrap();
    assert_eq!(ty.name, "BIGINT");
    assert!(ty.length.is_none());
    assert!(ty.truncate.is_none());
}

#[test]
fn discard_pattern_beats_healthy_statistics() {
    let mut evt = sample_event();
    run_standard(&mut evt);

    let password = mapping_of(&evt, &[6]);
    assert!(password.is_discarded());
}

#[test]
fn discarded_and_cleared_are_equivalent() {
    let mut evt = sample_event();
    let outcome = run_standard(&mut evt);

    let mut visit = vec![];
    for top in &evt.fields {
        visit.push(top);
        visit.extend(top.fields.iter());
    }
    for node in visit {
        let Some(mapping) = node.mapping.as_ref() else {
            continue;
        };
        if mapping.is_discarded() {
            assert_eq!(mapping.column_name, "");
            assert!(mapping.column_type.is_none());
        } else {
            assert!(!mapping.column_name.is_empty());
            assert!(mapping.column_type.is_some());
        }
    }
    // the flat list only carries retained columns
    assert!(outcome.columns.iter().all(|c| !c.column_name.is_empty()));
}

#[test]
fn rerunning_the_engine_is_idempotent() {
    let mut evt = sample_event();
    let first = run_standard(&mut evt);
    let annotated = serde_json::to_value(&evt).unwrap();

    let second = run_standard(&mut evt);
    assert_eq!(annotated, serde_json::to_value(&evt).unwrap());
    assert_eq!(
        serde_json::to_value(&first.columns).unwrap(),
        serde_json::to_value(&second.columns).unwrap()
    );
}

#[test]
fn cleanup_leaves_no_working_state_behind() {
    let mut evt = sample_event();
    run_standard(&mut evt);
    cleanup(&mut evt);

    let value = serde_json::to_value(&evt).unwrap();
    let rendered = value.to_string();
    assert!(!rendered.contains("\"stats\""));
    assert!(!rendered.contains("sortKeyIndex"));
    assert!(!rendered.contains("distKey"));
    assert!(!rendered.contains("primaryKey"));
    // decisions survive
    assert!(rendered.contains("\"isDiscarded\""));
    assert!(rendered.contains("user_profile_first_name"));
}

#[test]
fn metadata_fields_are_retyped_and_always_kept() {
    let mut evt = sample_event();
    let outcome = run_standard(&mut evt);

    let meta = mapping_of(&evt, &[5]);
    assert!(!meta.is_discarded());
    let ty = meta.column_type.as_ref().unwrap();
    assert_eq!(ty.name, "VARCHAR");
    assert_eq!(ty.length, Some(1024));
    assert_eq!(ty.truncate, Some(false));
    assert!(outcome
        .columns
        .iter()
        .any(|c| c.column_name == "_metadata_event_type"));
}
