use std::collections::{BTreeMap, BTreeSet};

use loomdb_graph::{Error, Graph, PropertyValue, props};
use tempfile::tempdir;

fn sample_graph() -> Graph {
    let g = Graph::new();
    g.add_node_with_labels(
        "ada",
        BTreeSet::from(["Person".to_string()]),
        props([
            ("age", PropertyValue::from(36)),
            ("score", PropertyValue::from(2.5)),
        ]),
    )
    .unwrap();
    g.add_node("grace", props([("age", PropertyValue::from(45))]))
        .unwrap();
    g.add_node("alan", BTreeMap::new()).unwrap();
    g.add_edge("ada", "grace", 1.0).unwrap();
    g.add_edge("grace", "alan", 0.5).unwrap();
    g
}

#[test]
fn test_save_and_load_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("graph.json");

    let g = sample_graph();
    g.save_to_file(&path).unwrap();

    let restored = Graph::new();
    restored.load_from_file(&path).unwrap();

    assert_eq!(restored.node_count(), 3);
    assert_eq!(restored.edge_count(), 2);
    assert_eq!(restored.get_node("ada").unwrap(), g.get_node("ada").unwrap());
    assert_eq!(restored.get_edge("grace", "alan").unwrap().weight, 0.5);
    assert!(restored.get_node("ada").unwrap().has_labels(["Person"]));
}

#[test]
fn test_save_output_is_byte_idempotent() {
    let dir = tempdir().unwrap();
    let first = dir.path().join("first.json");
    let second = dir.path().join("second.json");

    let g = sample_graph();
    g.save_to_file(&first).unwrap();

    let restored = Graph::new();
    restored.load_from_file(&first).unwrap();
    restored.save_to_file(&second).unwrap();

    assert_eq!(
        std::fs::read(&first).unwrap(),
        std::fs::read(&second).unwrap()
    );
}

#[test]
fn test_load_rejects_duplicate_node_ids() {
    let doc = r#"{
      "nodes": [ { "id": "a" }, { "id": "a" } ],
      "edges": []
    }"#;

    let g = sample_graph();
    let err = g.load_from_reader(doc.as_bytes()).unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
    // The previous contents survive a failed load.
    assert_eq!(g.node_count(), 3);
}

#[test]
fn test_load_rejects_empty_node_id() {
    let doc = r#"{ "nodes": [ { "id": "" } ], "edges": [] }"#;
    let err = Graph::new().load_from_reader(doc.as_bytes()).unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[test]
fn test_load_rejects_edge_with_missing_endpoint() {
    let doc = r#"{
      "nodes": [ { "id": "a" } ],
      "edges": [ { "from": "a", "to": "ghost", "weight": 1.0 } ]
    }"#;

    let g = sample_graph();
    let err = g.load_from_reader(doc.as_bytes()).unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
    assert_eq!(g.edge_count(), 2);
}

#[test]
fn test_load_rejects_malformed_json() {
    let err = Graph::new()
        .load_from_reader("not json".as_bytes())
        .unwrap_err();
    assert!(matches!(err, Error::Json(_)));
}

#[test]
fn test_load_replaces_previous_contents() {
    let doc = r#"{ "nodes": [ { "id": "solo" } ], "edges": [] }"#;

    let g = sample_graph();
    g.load_from_reader(doc.as_bytes()).unwrap();

    assert_eq!(g.node_count(), 1);
    assert_eq!(g.edge_count(), 0);
    assert!(g.get_node("solo").is_ok());
    assert!(g.get_node("ada").is_err());
}

#[test]
fn test_untagged_property_values_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("props.json");

    let g = Graph::new();
    g.add_node(
        "n",
        props([
            ("b", PropertyValue::Bool(true)),
            ("i", PropertyValue::Int(-7)),
            ("f", PropertyValue::Float(1.25)),
            ("s", PropertyValue::from("text")),
            ("nothing", PropertyValue::Null),
        ]),
    )
    .unwrap();
    g.save_to_file(&path).unwrap();

    let restored = Graph::new();
    restored.load_from_file(&path).unwrap();
    assert_eq!(restored.get_node("n").unwrap(), g.get_node("n").unwrap());
}
