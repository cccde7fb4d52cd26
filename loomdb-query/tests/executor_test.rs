use std::collections::{BTreeMap, BTreeSet};

use loomdb_graph::{Graph, PropertyValue, props};
use loomdb_query::{Error, Result, Row, Value, execute, parse};

fn run(graph: &Graph, text: &str) -> Result<Vec<Row>> {
    execute(&parse(text)?, graph)
}

fn column_ids(rows: &[Row], column: &str) -> Vec<String> {
    rows.iter()
        .map(|row| {
            let Value::Node(node) = &row[column];
            node.id.clone()
        })
        .collect()
}

/// A -> B -> C -> D -> E, with a marker property on A.
fn chain_graph() -> Graph {
    let g = Graph::new();
    g.add_node("A", props([("k", PropertyValue::from("v"))]))
        .unwrap();
    for id in ["B", "C", "D", "E"] {
        g.add_node(id, BTreeMap::new()).unwrap();
    }
    g.add_edge("A", "B", 1.0).unwrap();
    g.add_edge("B", "C", 1.0).unwrap();
    g.add_edge("C", "D", 1.0).unwrap();
    g.add_edge("D", "E", 1.0).unwrap();
    g
}

#[test]
fn test_hop_window_bounds_endpoints() {
    let g = chain_graph();

    let rows = run(
        &g,
        "MATCH (a {k: 'v'})-[*1..3]->(b) RETURN a, b ORDER BY b;",
    )
    .unwrap();
    assert_eq!(column_ids(&rows, "a"), ["A", "A", "A"]);
    assert_eq!(column_ids(&rows, "b"), ["B", "C", "D"]);

    let rows = run(&g, "MATCH (a {k: 'v'})-[*2..3]->(b) RETURN b ORDER BY b;").unwrap();
    assert_eq!(column_ids(&rows, "b"), ["C", "D"]);
}

#[test]
fn test_unbounded_max_reaches_everything() {
    let g = chain_graph();
    let rows = run(&g, "MATCH (a {k: 'v'})-[*]->(b) RETURN b ORDER BY b;").unwrap();
    assert_eq!(column_ids(&rows, "b"), ["B", "C", "D", "E"]);
}

#[test]
fn test_plain_relationship_is_exactly_one_hop() {
    let g = chain_graph();
    let rows = run(&g, "MATCH (a {k: 'v'})-->(b) RETURN b;").unwrap();
    assert_eq!(column_ids(&rows, "b"), ["B"]);
}

#[test]
fn test_incoming_direction() {
    let g = chain_graph();
    let rows = run(&g, "MATCH (a)<-[*1..2]-(b) RETURN a, b ORDER BY a, b;").unwrap();
    // Every node with at least one ancestor within two hops.
    let pairs: Vec<(String, String)> = column_ids(&rows, "a")
        .into_iter()
        .zip(column_ids(&rows, "b"))
        .collect();
    assert!(pairs.contains(&("C".to_string(), "A".to_string())));
    assert!(pairs.contains(&("C".to_string(), "B".to_string())));
    assert!(!pairs.contains(&("C".to_string(), "D".to_string())));
}

#[test]
fn test_duplicate_paths_collapse_to_one_row() {
    // Two distinct paths from a to d.
    let g = Graph::new();
    for id in ["a", "b", "c", "d"] {
        g.add_node(id, BTreeMap::new()).unwrap();
    }
    g.add_edge("a", "b", 1.0).unwrap();
    g.add_edge("a", "c", 1.0).unwrap();
    g.add_edge("b", "d", 1.0).unwrap();
    g.add_edge("c", "d", 1.0).unwrap();

    let rows = run(&g, "MATCH (s {})-[*2..2]->(e) RETURN s, e;").unwrap();
    let rows: Vec<_> = rows
        .into_iter()
        .filter(|row| {
            let Value::Node(node) = &row["s"];
            node.id == "a"
        })
        .collect();
    assert_eq!(column_ids(&rows, "e"), ["d"]);
}

#[test]
fn test_label_matching_is_superset() {
    let g = Graph::new();
    g.add_node_with_labels(
        "p1",
        BTreeSet::from(["Person".to_string(), "Admin".to_string()]),
        BTreeMap::new(),
    )
    .unwrap();
    g.add_node_with_labels("p2", BTreeSet::from(["Person".to_string()]), BTreeMap::new())
        .unwrap();
    g.add_node("thing", BTreeMap::new()).unwrap();

    let rows = run(&g, "MATCH (n:Person) RETURN n ORDER BY n;").unwrap();
    assert_eq!(column_ids(&rows, "n"), ["p1", "p2"]);

    let rows = run(&g, "MATCH (n:Person:Admin) RETURN n;").unwrap();
    assert_eq!(column_ids(&rows, "n"), ["p1"]);
}

#[test]
fn test_integer_predicate_coercion() {
    let g = Graph::new();
    g.add_node("int", props([("age", PropertyValue::Int(42))]))
        .unwrap();
    g.add_node("text", props([("age", PropertyValue::from("42"))]))
        .unwrap();
    g.add_node("float", props([("age", PropertyValue::Float(42.7))]))
        .unwrap();
    g.add_node("other", props([("age", PropertyValue::Int(7))]))
        .unwrap();
    g.add_node("none", BTreeMap::new()).unwrap();

    // Int, parsed string, and truncated float all satisfy {age: 42}.
    let rows = run(&g, "MATCH (n {age: 42}) RETURN n ORDER BY n;").unwrap();
    assert_eq!(column_ids(&rows, "n"), ["float", "int", "text"]);
}

#[test]
fn test_string_predicate_display_fallback() {
    let g = Graph::new();
    g.add_node("s", props([("v", PropertyValue::from("42"))]))
        .unwrap();
    g.add_node("i", props([("v", PropertyValue::Int(42))]))
        .unwrap();
    g.add_node("b", props([("v", PropertyValue::Bool(true))]))
        .unwrap();

    let rows = run(&g, "MATCH (n {v: '42'}) RETURN n ORDER BY n;").unwrap();
    assert_eq!(column_ids(&rows, "n"), ["i", "s"]);

    let rows = run(&g, "MATCH (n {v: 'true'}) RETURN n;").unwrap();
    assert_eq!(column_ids(&rows, "n"), ["b"]);
}

#[test]
fn test_mismatched_coercion_is_not_an_error() {
    let g = Graph::new();
    g.add_node("n", props([("age", PropertyValue::Bool(true))]))
        .unwrap();
    let rows = run(&g, "MATCH (n {age: 42}) RETURN n;").unwrap();
    assert!(rows.is_empty());
}

#[test]
fn test_distinct_collapses_projected_rows() {
    let g = chain_graph();
    // Without the end variable projected, every (a, b) pair collapses to a.
    let rows = run(&g, "MATCH (a {k: 'v'})-[*1..3]->(b) RETURN a;").unwrap();
    assert_eq!(rows.len(), 3);

    let rows = run(&g, "MATCH (a {k: 'v'})-[*1..3]->(b) RETURN DISTINCT a;").unwrap();
    assert_eq!(column_ids(&rows, "a"), ["A"]);
}

#[test]
fn test_order_by_skip_limit() {
    let g = chain_graph();
    let rows = run(
        &g,
        "MATCH (a {k: 'v'})-[*]->(b) RETURN b ORDER BY b DESC SKIP 1 LIMIT 2;",
    )
    .unwrap();
    assert_eq!(column_ids(&rows, "b"), ["D", "C"]);

    let rows = run(&g, "MATCH (n) RETURN n ORDER BY n SKIP 10;").unwrap();
    assert!(rows.is_empty());
}

#[test]
fn test_skip_and_limit_require_integer_literals() {
    let g = chain_graph();
    assert!(matches!(
        run(&g, "MATCH (n) RETURN n SKIP n;"),
        Err(Error::Execution(_))
    ));
    assert!(matches!(
        run(&g, "MATCH (n) RETURN n LIMIT 'ten';"),
        Err(Error::Execution(_))
    ));
}

#[test]
fn test_alias_renames_output_column() {
    let g = chain_graph();
    let rows = run(&g, "MATCH (a {k: 'v'}) RETURN a AS start;").unwrap();
    assert_eq!(column_ids(&rows, "start"), ["A"]);
}

#[test]
fn test_structural_rejections() {
    let g = chain_graph();

    assert!(matches!(
        run(&g, "RETURN x;"),
        Err(Error::Structural(_))
    ));
    assert!(matches!(
        run(&g, "MATCH (a) MATCH (b) RETURN a;"),
        Err(Error::Structural(_))
    ));
    assert!(matches!(
        run(&g, "MATCH (a), (b) RETURN a;"),
        Err(Error::Structural(_))
    ));
    assert!(matches!(
        run(&g, "MATCH (a)-->(b)-->(c) RETURN a;"),
        Err(Error::Structural(_))
    ));
    assert!(matches!(
        run(&g, "OPTIONAL MATCH (a) RETURN a;"),
        Err(Error::Structural(_))
    ));
}

#[test]
fn test_execution_rejections() {
    let g = chain_graph();

    // Only bound variables can be projected.
    assert!(matches!(
        run(&g, "MATCH (a) RETURN a.age;"),
        Err(Error::Execution(_))
    ));
    assert!(matches!(
        run(&g, "MATCH (a) RETURN missing;"),
        Err(Error::Execution(_))
    ));
    // Property predicates must be literal values.
    assert!(matches!(
        run(&g, "MATCH (a {age: b}) RETURN a;"),
        Err(Error::Execution(_))
    ));
}

#[test]
fn test_where_clause_is_ignored() {
    let g = chain_graph();
    let rows = run(&g, "MATCH (n) WHERE n.age > 1000 RETURN n;").unwrap();
    // Parsed and carried, but not evaluated.
    assert_eq!(rows.len(), 5);
}

#[test]
fn test_row_values_carry_full_nodes() {
    let g = chain_graph();
    let rows = run(&g, "MATCH (a {k: 'v'}) RETURN a;").unwrap();
    let Value::Node(node) = &rows[0]["a"];
    assert_eq!(node.id, "A");
    assert_eq!(
        node.properties.get("k"),
        Some(&PropertyValue::String("v".to_string()))
    );
}
