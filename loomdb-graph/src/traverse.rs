//! Depth-first traversal over the graph store.
//!
//! [`Dfs`] is a stack-based iterator. Frontier entries are indices into an
//! arena of path steps, each holding its parent index, so every branch can
//! recover its full parent chain without per-branch allocations. The same
//! node may be pushed onto the stack more than once; deduplication happens
//! at pop time, which determines which of the duplicate paths gets
//! expanded.

use std::collections::HashSet;

use crate::error::Result;
use crate::store::{Graph, Node};

/// Traversal direction relative to edge orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Follow edges from `from` to `to`.
    #[default]
    Outgoing,
    /// Follow edges from `to` back to `from`.
    Incoming,
}

struct RangeFilter {
    start: Box<dyn Fn(&Node) -> bool>,
    end: Box<dyn Fn(&Node) -> bool>,
}

/// One arena entry: a node id plus the link to the step it was reached from.
struct PathStep {
    node: String,
    parent: Option<usize>,
    depth: u32,
}

/// A node yielded by the traversal, together with its depth (edges
/// traversed from the start node).
#[derive(Debug, Clone, PartialEq)]
pub struct Visit {
    pub node: Node,
    pub depth: u32,
}

/// Depth-first iterator over a [`Graph`].
///
/// Each step issues fresh read calls against the store, so a traversal
/// running concurrently with mutations observes per-call snapshots, not one
/// consistent view.
pub struct Dfs<'g> {
    graph: &'g Graph,
    arena: Vec<PathStep>,
    stack: Vec<usize>,
    visited: HashSet<String>,
    direction: Direction,
    max_depth: Option<u32>,
    range: Option<RangeFilter>,
    in_range: bool,
    last_yielded: Option<usize>,
}

impl<'g> Dfs<'g> {
    /// Creates an iterator seeded at `start_id`, with outgoing direction
    /// and unbounded depth. Fails with `NodeNotFound` if the start node is
    /// absent.
    pub fn new(graph: &'g Graph, start_id: &str) -> Result<Self> {
        graph.get_node(start_id)?;
        Ok(Self {
            graph,
            arena: vec![PathStep {
                node: start_id.to_string(),
                parent: None,
                depth: 0,
            }],
            stack: vec![0],
            visited: HashSet::new(),
            direction: Direction::default(),
            max_depth: None,
            range: None,
            in_range: false,
            last_yielded: None,
        })
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Bounds the traversal to nodes at most `depth` edges from the start.
    pub fn max_depth(mut self, depth: u32) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Restricts yielded nodes to a window: yielding begins once a popped
    /// node satisfies `start`, and ends at the first node satisfying `end`
    /// (the boundary node itself is still yielded).
    pub fn range_filter(
        mut self,
        start: impl Fn(&Node) -> bool + 'static,
        end: impl Fn(&Node) -> bool + 'static,
    ) -> Self {
        self.range = Some(RangeFilter {
            start: Box::new(start),
            end: Box::new(end),
        });
        self
    }

    /// Runs the traversal to completion, calling `f` for every yielded
    /// visit. The first callback error aborts the walk; remaining frontier
    /// entries are discarded unvisited.
    pub fn iterate(&mut self, mut f: impl FnMut(&Visit) -> Result<()>) -> Result<()> {
        while let Some(visit) = self.next() {
            f(&visit)?;
        }
        Ok(())
    }

    /// The parent chain of the most recently yielded node, start node
    /// first. Empty before the first yield.
    pub fn current_path(&self) -> Vec<String> {
        let mut path = Vec::new();
        let mut cursor = self.last_yielded;
        while let Some(ix) = cursor {
            let step = &self.arena[ix];
            path.push(step.node.clone());
            cursor = step.parent;
        }
        path.reverse();
        path
    }

    fn neighbor_ids(&self, node_id: &str) -> Vec<String> {
        let edges = match self.direction {
            Direction::Outgoing => self.graph.get_out_edges(node_id),
            Direction::Incoming => self.graph.get_in_edges(node_id),
        };
        match edges {
            Ok(edges) => edges
                .into_iter()
                .map(|e| match self.direction {
                    Direction::Outgoing => e.to,
                    Direction::Incoming => e.from,
                })
                .collect(),
            // The node vanished between read calls; its branch just ends.
            Err(_) => Vec::new(),
        }
    }
}

impl Iterator for Dfs<'_> {
    type Item = Visit;

    fn next(&mut self) -> Option<Visit> {
        while let Some(ix) = self.stack.pop() {
            let (node_id, depth) = {
                let step = &self.arena[ix];
                (step.node.clone(), step.depth)
            };

            // Pop-time deduplication: duplicates may sit on the stack.
            if self.visited.contains(&node_id) {
                continue;
            }
            let Ok(node) = self.graph.get_node(&node_id) else {
                continue;
            };
            self.visited.insert(node_id.clone());

            if let Some(range) = &self.range {
                if !self.in_range && (range.start)(&node) {
                    self.in_range = true;
                }
                if self.in_range && (range.end)(&node) {
                    self.in_range = false;
                }
            }

            if self.max_depth.is_none_or(|max| depth < max) {
                for neighbor in self.neighbor_ids(&node_id) {
                    if !self.visited.contains(&neighbor) {
                        self.arena.push(PathStep {
                            node: neighbor,
                            parent: Some(ix),
                            depth: depth + 1,
                        });
                        self.stack.push(self.arena.len() - 1);
                    }
                }
            }

            let yield_it = match &self.range {
                None => true,
                Some(range) => self.in_range || (range.end)(&node),
            };
            if yield_it {
                self.last_yielded = Some(ix);
                return Some(Visit { node, depth });
            }
        }
        None
    }
}
