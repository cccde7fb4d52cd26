//! # loomdb-graph
//!
//! The LoomDB graph store: a concurrent, in-process directed weighted
//! property graph.
//!
//! - [`Graph`] owns the node table and two adjacency indices (outgoing and
//!   incoming), guarded by a single reader/writer lock. Read accessors
//!   return independent copies; mutators are atomic with respect to the
//!   lock and never leave partial index updates behind.
//! - [`Dfs`] is a stack-based depth-first iterator with configurable
//!   direction, depth bound, and an optional in-range window over nodes.
//! - Snapshots serialize the whole graph as a flat JSON document and load
//!   it back with full validation (see the `snapshot` module).
//!
//! ```no_run
//! use loomdb_graph::{Dfs, Graph};
//! use std::collections::BTreeMap;
//!
//! # fn main() -> loomdb_graph::Result<()> {
//! let g = Graph::new();
//! g.add_node("A", BTreeMap::new())?;
//! g.add_node("B", BTreeMap::new())?;
//! g.add_edge("A", "B", 1.0)?;
//!
//! for visit in Dfs::new(&g, "A")? {
//!     println!("{} at depth {}", visit.node.id, visit.depth);
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod property;
mod snapshot;
mod store;
mod traverse;

pub use error::{Error, Result};
pub use property::PropertyValue;
pub use store::{Edge, Graph, Node};
pub use traverse::{Dfs, Direction, Visit};

/// Convenience constructor for a property map literal.
///
/// ```
/// use loomdb_graph::{props, PropertyValue};
/// let p = props([("name", PropertyValue::from("Ada")), ("age", 36.into())]);
/// assert_eq!(p.get("age"), Some(&PropertyValue::Int(36)));
/// ```
pub fn props<K: Into<String>>(
    entries: impl IntoIterator<Item = (K, PropertyValue)>,
) -> std::collections::BTreeMap<String, PropertyValue> {
    entries.into_iter().map(|(k, v)| (k.into(), v)).collect()
}
