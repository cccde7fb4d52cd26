//! # LoomDB
//!
//! An embeddable, in-process property graph for Rust.
//!
//! LoomDB keeps a directed, weighted property graph in memory behind a
//! single reader/writer lock, walks it with a stack-based depth-first
//! traversal, answers a Cypher-inspired read-only query dialect, and
//! persists the whole graph as one flat JSON snapshot.
//!
//! ## Quickstart
//!
//! ```rust,no_run
//! use loomdb::{GraphDb, PropertyValue, Result, props};
//!
//! fn main() -> Result<()> {
//!     let db = GraphDb::new();
//!
//!     db.graph().add_node("ada", props([("age", PropertyValue::from(36))]))?;
//!     db.graph().add_node("grace", props([("age", PropertyValue::from(45))]))?;
//!     db.graph().add_edge("ada", "grace", 1.0)?;
//!
//!     for row in db.query("MATCH (a {age: 36})-[*1..3]->(b) RETURN a, b;")? {
//!         println!("{row:?}");
//!     }
//!
//!     db.save("social.json")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Core concepts
//!
//! - **[`GraphDb`]**: the entry point, bundling the store, the query
//!   pipeline, and snapshot save/load. Safe to share across threads.
//! - **[`Graph`]**: the concurrent store itself, reachable through
//!   [`GraphDb::graph`] for direct node/edge calls and traversals.
//! - **[`query`]**: the query engine (re-exported from `loomdb-query`) for
//!   callers that want the AST or the executor separately.

mod error;

use std::path::Path;

pub use error::{Error, Result};
pub use loomdb_graph::{Dfs, Direction, Edge, Graph, Node, PropertyValue, Visit, props};
pub use loomdb_query as query;
pub use loomdb_query::{Row, Value};

/// The main database handle.
///
/// # Concurrency
///
/// `GraphDb` can be shared across threads; all access goes through the
/// store's internal reader/writer lock. Reads are per-call snapshots, so a
/// query or traversal that spans multiple calls may observe interleaved
/// mutations.
#[derive(Debug, Default)]
pub struct GraphDb {
    graph: Graph,
}

impl GraphDb {
    /// Creates an empty database.
    pub fn new() -> Self {
        Self {
            graph: Graph::new(),
        }
    }

    /// The underlying graph store, for direct mutation and traversal.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Parses and executes a query, returning the projected rows.
    ///
    /// ```rust,no_run
    /// # use loomdb::GraphDb;
    /// # fn main() -> loomdb::Result<()> {
    /// let db = GraphDb::new();
    /// let rows = db.query("MATCH (n) RETURN n;")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn query(&self, text: &str) -> Result<Vec<Row>> {
        let query = loomdb_query::parse(text)?;
        Ok(loomdb_query::execute(&query, &self.graph)?)
    }

    /// Writes the graph to `path` as a JSON snapshot.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        Ok(self.graph.save_to_file(path)?)
    }

    /// Replaces the graph's contents with the snapshot at `path`.
    ///
    /// The document is validated in full before anything is swapped in; on
    /// failure the previous contents are untouched.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<()> {
        Ok(self.graph.load_from_file(path)?)
    }
}
