//! A short tour of the LoomDB API: build a graph, traverse it, query it,
//! and round-trip it through a snapshot file.
//!
//! Run with: `cargo run --example tour`

use loomdb::{Dfs, Direction, GraphDb, PropertyValue, Result, Value, props};

fn main() -> Result<()> {
    let db = GraphDb::new();
    let g = db.graph();

    // A small follow graph.
    g.add_node("ada", props([("age", PropertyValue::from(36))]))?;
    g.add_node("grace", props([("age", PropertyValue::from(45))]))?;
    g.add_node("alan", props([("age", PropertyValue::from(41))]))?;
    g.add_node("edsger", props([("age", PropertyValue::from(72))]))?;

    g.add_edge("ada", "grace", 1.0)?;
    g.add_edge("grace", "alan", 0.5)?;
    g.add_edge("alan", "edsger", 2.0)?;

    println!("{} nodes, {} edges", g.node_count(), g.edge_count());

    // Walk everyone reachable from ada, then everyone who can reach edsger.
    for visit in Dfs::new(g, "ada")? {
        println!("out from ada: {} (depth {})", visit.node.id, visit.depth);
    }
    for visit in Dfs::new(g, "edsger")?.direction(Direction::Incoming) {
        println!("in to edsger: {} (depth {})", visit.node.id, visit.depth);
    }

    // The same reachability question, phrased as a query.
    let rows = db.query("MATCH (a {age: 36})-[*1..3]->(b) RETURN a, b ORDER BY b;")?;
    for row in &rows {
        let Some(Value::Node(b)) = row.get("b") else {
            continue;
        };
        println!("ada reaches {} within 3 hops", b.id);
    }

    // Snapshot round trip.
    db.save("tour.json")?;
    let restored = GraphDb::new();
    restored.load("tour.json")?;
    println!("restored {} nodes", restored.graph().node_count());

    std::fs::remove_file("tour.json")?;
    Ok(())
}
