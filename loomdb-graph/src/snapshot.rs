//! Full-graph JSON snapshots.
//!
//! The wire format is a flat document:
//!
//! ```json
//! {
//!   "nodes": [ { "id": "A", "labels": [], "properties": {} } ],
//!   "edges": [ { "from": "A", "to": "B", "weight": 1.0 } ]
//! }
//! ```
//!
//! Nodes are written sorted by id and edges sorted by `(from, to)`, so
//! serialize -> deserialize -> serialize is byte-identical after the first
//! normalization.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::store::{Edge, Graph, GraphInner, Node};

#[derive(Debug, Serialize, Deserialize)]
struct GraphDoc {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl Graph {
    /// Writes the whole graph as a pretty-printed JSON document.
    ///
    /// Takes the shared lock for the duration of the call.
    pub fn save_to_writer(&self, writer: impl Write) -> Result<()> {
        let doc = {
            let inner = self.read_inner();
            let mut nodes: Vec<Node> = inner.nodes.values().cloned().collect();
            nodes.sort_by(|a, b| a.id.cmp(&b.id));

            let mut edges: Vec<Edge> = inner
                .out
                .values()
                .flat_map(|m| m.values().cloned())
                .collect();
            edges.sort_by(|a, b| (&a.from, &a.to).cmp(&(&b.from, &b.to)));

            GraphDoc { nodes, edges }
        };

        debug!(
            nodes = doc.nodes.len(),
            edges = doc.edges.len(),
            "saving graph snapshot"
        );
        serde_json::to_writer_pretty(writer, &doc)?;
        Ok(())
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.save_to_writer(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Replaces the graph's contents with a snapshot document.
    ///
    /// The document is fully validated into a fresh node table and adjacency
    /// indices before anything is swapped in: every node id must be
    /// non-empty and unique, and every edge must reference two existing
    /// nodes. On any violation the previous in-memory state is left intact.
    pub fn load_from_reader(&self, reader: impl Read) -> Result<()> {
        let doc: GraphDoc = serde_json::from_reader(reader)?;

        let mut inner = GraphInner::default();
        for node in doc.nodes {
            if node.id.is_empty() {
                return Err(Error::InvalidInput("empty node id in snapshot".to_string()));
            }
            if inner.nodes.insert(node.id.clone(), node.clone()).is_some() {
                return Err(Error::InvalidInput(format!(
                    "duplicate node id in snapshot: {}",
                    node.id
                )));
            }
        }
        for edge in doc.edges {
            if !inner.nodes.contains_key(&edge.from) {
                return Err(Error::InvalidInput(format!(
                    "edge references missing node: {}",
                    edge.from
                )));
            }
            if !inner.nodes.contains_key(&edge.to) {
                return Err(Error::InvalidInput(format!(
                    "edge references missing node: {}",
                    edge.to
                )));
            }
            inner.link_edge(edge);
        }

        debug!(nodes = inner.nodes.len(), "loaded graph snapshot");
        self.replace_inner(inner);
        Ok(())
    }

    pub fn load_from_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let reader = BufReader::new(File::open(path)?);
        self.load_from_reader(reader)
    }
}
