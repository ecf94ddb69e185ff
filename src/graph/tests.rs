//! Serialization tests with artifact-shaped fixtures

use super::*;
use serde_json::{json, Value};

/// Fixture: one unit record as it appears in a persisted artifact
fn unit_fixture() -> Value {
    json!({
        "id": 1,
        "source_text": "Der Rat tagte. Er beschloss nichts.",
        "target_text": "The council met. It decided nothing.",
        "incident_memory": {
            "entity_mapping": { "Rat": "council" },
            "discourse_connective": "",
            "context_summary": "(none)"
        },
        "local_memory": {
            "entity_mapping": {},
            "discourse_connective": "however",
            "context_summary": "The council met without result."
        }
    })
}

#[test]
fn unit_fixture_deserializes() {
    let unit: DiscourseUnit = serde_json::from_value(unit_fixture()).unwrap();
    assert_eq!(unit.id, 1);
    assert_eq!(unit.target_text.as_deref(), Some("The council met. It decided nothing."));
    assert_eq!(unit.incident_memory.entity_mapping["Rat"], "council");
    assert_eq!(unit.local_memory.discourse_connective, "however");
}

#[test]
fn untranslated_unit_serializes_null_target() {
    let unit = DiscourseUnit::new(0, "Hallo.");
    let value = serde_json::to_value(&unit).unwrap();
    assert!(value["target_text"].is_null());
    assert_eq!(value["incident_memory"]["context_summary"], "");
}

#[test]
fn unit_without_memory_fields_deserializes() {
    let unit: DiscourseUnit =
        serde_json::from_value(json!({ "id": 4, "source_text": "x" })).unwrap();
    assert_eq!(unit.id, 4);
    assert!(unit.target_text.is_none());
    assert!(unit.local_memory.is_empty());
}

#[test]
fn graph_from_segments_numbers_units_in_order() {
    let graph = DiscourseGraph::from_segments(
        vec!["a".into(), "b".into(), "c".into()],
        EdgeSet::chain(3),
    );
    let ids: Vec<UnitId> = graph.units.iter().map(|u| u.id).collect();
    assert_eq!(ids, vec![0, 1, 2]);
    assert!(graph.validate().is_ok());
}

#[test]
fn graph_with_misnumbered_unit_is_invalid() {
    let graph = DiscourseGraph::new(
        vec![DiscourseUnit::new(0, "a"), DiscourseUnit::new(2, "b")],
        EdgeSet::chain(2),
    );
    assert!(graph.validate().is_err());
}

#[test]
fn graph_round_trips_through_json() {
    let mut graph = DiscourseGraph::from_segments(vec!["a".into(), "b".into()], EdgeSet::chain(2));
    graph.units[0].target_text = Some("A".into());
    let json = serde_json::to_string(&graph).unwrap();
    let back: DiscourseGraph = serde_json::from_str(&json).unwrap();
    assert_eq!(back, graph);
}
