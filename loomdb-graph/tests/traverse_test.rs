use std::collections::{BTreeMap, HashMap, HashSet};

use loomdb_graph::{Dfs, Direction, Error, Graph};

/// a -> b, a -> c, b -> d, c -> d
fn diamond() -> Graph {
    let g = Graph::new();
    for id in ["a", "b", "c", "d"] {
        g.add_node(id, BTreeMap::new()).unwrap();
    }
    g.add_edge("a", "b", 1.0).unwrap();
    g.add_edge("a", "c", 1.0).unwrap();
    g.add_edge("b", "d", 1.0).unwrap();
    g.add_edge("c", "d", 1.0).unwrap();
    g
}

/// a -> b -> c -> d
fn chain() -> Graph {
    let g = Graph::new();
    for id in ["a", "b", "c", "d"] {
        g.add_node(id, BTreeMap::new()).unwrap();
    }
    g.add_edge("a", "b", 1.0).unwrap();
    g.add_edge("b", "c", 1.0).unwrap();
    g.add_edge("c", "d", 1.0).unwrap();
    g
}

#[test]
fn test_missing_start_node_fails() {
    let g = Graph::new();
    assert!(matches!(Dfs::new(&g, "ghost"), Err(Error::NodeNotFound(_))));
}

#[test]
fn test_each_reachable_node_yielded_once() {
    let g = diamond();
    let depths: HashMap<String, u32> = Dfs::new(&g, "a")
        .unwrap()
        .map(|v| (v.node.id, v.depth))
        .collect();

    // Four yields, no repeats, each at its branch depth.
    assert_eq!(depths.len(), 4);
    assert_eq!(depths["a"], 0);
    assert_eq!(depths["b"], 1);
    assert_eq!(depths["c"], 1);
    assert_eq!(depths["d"], 2);
}

#[test]
fn test_max_depth_bounds_the_visited_set() {
    let g = diamond();

    let within_one: HashSet<String> = Dfs::new(&g, "a")
        .unwrap()
        .max_depth(1)
        .map(|v| v.node.id)
        .collect();
    assert_eq!(
        within_one,
        HashSet::from(["a".to_string(), "b".to_string(), "c".to_string()])
    );

    let within_zero: Vec<String> = Dfs::new(&g, "a")
        .unwrap()
        .max_depth(0)
        .map(|v| v.node.id)
        .collect();
    assert_eq!(within_zero, ["a"]);
}

#[test]
fn test_incoming_direction_walks_reverse_edges() {
    let g = chain();
    let seen: HashSet<String> = Dfs::new(&g, "c")
        .unwrap()
        .direction(Direction::Incoming)
        .map(|v| v.node.id)
        .collect();
    assert_eq!(
        seen,
        HashSet::from(["c".to_string(), "b".to_string(), "a".to_string()])
    );
}

#[test]
fn test_range_filter_window_includes_both_boundaries() {
    let g = chain();
    let seen: Vec<String> = Dfs::new(&g, "a")
        .unwrap()
        .range_filter(|n| n.id == "b", |n| n.id == "c")
        .map(|v| v.node.id)
        .collect();

    // Yielding starts at the node matching the start predicate and the end
    // boundary itself is still yielded; nodes outside the window are walked
    // but suppressed.
    assert_eq!(seen, ["b", "c"]);
}

#[test]
fn test_range_filter_end_matches_without_start() {
    let g = chain();
    let seen: Vec<String> = Dfs::new(&g, "a")
        .unwrap()
        .range_filter(|n| n.id == "zzz", |n| n.id == "c")
        .map(|v| v.node.id)
        .collect();

    // The start predicate never fires, so only end-matching nodes appear.
    assert_eq!(seen, ["c"]);
}

#[test]
fn test_iterate_aborts_on_callback_error() {
    let g = chain();
    let mut count = 0;
    let result = Dfs::new(&g, "a").unwrap().iterate(|visit| {
        count += 1;
        if visit.node.id == "b" {
            Err(Error::InvalidInput("stop".to_string()))
        } else {
            Ok(())
        }
    });

    assert!(result.is_err());
    assert_eq!(count, 2);
}

#[test]
fn test_current_path_tracks_parent_chain() {
    let g = chain();
    let mut dfs = Dfs::new(&g, "a").unwrap();

    assert!(dfs.current_path().is_empty());
    while let Some(visit) = dfs.next() {
        if visit.node.id == "d" {
            break;
        }
    }
    assert_eq!(dfs.current_path(), ["a", "b", "c", "d"]);
}
