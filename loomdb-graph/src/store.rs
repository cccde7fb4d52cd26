use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::property::PropertyValue;

/// A graph node: a unique string id, a set of labels, and a property map.
///
/// BTree containers keep labels and properties in a deterministic order so
/// snapshot documents serialize identically run to run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(default)]
    pub labels: BTreeSet<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyValue>,
}

impl Node {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            labels: BTreeSet::new(),
            properties: BTreeMap::new(),
        }
    }

    /// True when every label in `labels` is present on this node.
    pub fn has_labels<'a>(&self, labels: impl IntoIterator<Item = &'a str>) -> bool {
        labels.into_iter().all(|l| self.labels.contains(l))
    }
}

/// A directed weighted edge between two node ids.
///
/// At most one edge may exist per ordered `(from, to)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub weight: f64,
}

/// Adjacency index: first key is the owning endpoint, second key is the
/// opposite endpoint.
type AdjacencyIndex = HashMap<String, HashMap<String, Edge>>;

#[derive(Debug, Default)]
pub(crate) struct GraphInner {
    pub(crate) nodes: HashMap<String, Node>,
    /// Outgoing index: from -> to -> Edge.
    pub(crate) out: AdjacencyIndex,
    /// Incoming index: to -> from -> Edge.
    pub(crate) incoming: AdjacencyIndex,
}

impl GraphInner {
    /// Inserts `edge` into both adjacency indices.
    ///
    /// All index writes go through this and [`GraphInner::unlink_edge`] so
    /// the two indices cannot diverge.
    pub(crate) fn link_edge(&mut self, edge: Edge) {
        self.out
            .entry(edge.from.clone())
            .or_default()
            .insert(edge.to.clone(), edge.clone());
        self.incoming
            .entry(edge.to.clone())
            .or_default()
            .insert(edge.from.clone(), edge);
    }

    /// Removes the `from -> to` edge from both adjacency indices, pruning
    /// empty inner maps.
    pub(crate) fn unlink_edge(&mut self, from: &str, to: &str) {
        if let Some(m) = self.out.get_mut(from) {
            m.remove(to);
            if m.is_empty() {
                self.out.remove(from);
            }
        }
        if let Some(m) = self.incoming.get_mut(to) {
            m.remove(from);
            if m.is_empty() {
                self.incoming.remove(to);
            }
        }
    }
}

/// A concurrent directed weighted property graph.
///
/// One reader/writer lock guards the node table and both adjacency indices.
/// Read accessors take the shared lock and return independent copies, so no
/// caller ever iterates while holding the lock. Each accessor snapshots at
/// the instant it is called: a traversal issuing many read calls observes a
/// sequence of point-in-time snapshots, not one consistent view of the
/// whole graph.
#[derive(Debug, Default)]
pub struct Graph {
    inner: RwLock<GraphInner>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node with the given properties and no labels.
    ///
    /// Fails with `InvalidInput` on an empty id and `NodeExists` on a
    /// duplicate.
    pub fn add_node(
        &self,
        id: impl Into<String>,
        properties: BTreeMap<String, PropertyValue>,
    ) -> Result<()> {
        self.add_node_with_labels(id, BTreeSet::new(), properties)
    }

    /// Adds a node carrying both labels and properties.
    pub fn add_node_with_labels(
        &self,
        id: impl Into<String>,
        labels: BTreeSet<String>,
        properties: BTreeMap<String, PropertyValue>,
    ) -> Result<()> {
        let id = id.into();
        if id.is_empty() {
            return Err(Error::InvalidInput("empty node id".to_string()));
        }

        let mut inner = self.inner.write().unwrap();
        if inner.nodes.contains_key(&id) {
            return Err(Error::NodeExists(id));
        }
        inner.nodes.insert(
            id.clone(),
            Node {
                id,
                labels,
                properties,
            },
        );
        Ok(())
    }

    /// Merges `props` into an existing node's property map, overwriting
    /// keys that already exist.
    pub fn update_node_props(
        &self,
        id: &str,
        props: BTreeMap<String, PropertyValue>,
    ) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        let node = inner
            .nodes
            .get_mut(id)
            .ok_or_else(|| Error::NodeNotFound(id.to_string()))?;
        node.properties.extend(props);
        Ok(())
    }

    /// Removes a node and every edge incident to it, in one exclusive
    /// critical section. No orphaned index entries survive.
    pub fn remove_node(&self, id: &str) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        if !inner.nodes.contains_key(id) {
            return Err(Error::NodeNotFound(id.to_string()));
        }

        let out_neighbors: Vec<String> = inner
            .out
            .get(id)
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default();
        for to in out_neighbors {
            inner.unlink_edge(id, &to);
        }

        let in_neighbors: Vec<String> = inner
            .incoming
            .get(id)
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default();
        for from in in_neighbors {
            inner.unlink_edge(&from, id);
        }

        inner.nodes.remove(id);
        Ok(())
    }

    /// Adds a directed weighted edge. Both endpoints must already exist,
    /// and no `from -> to` edge may be present yet.
    pub fn add_edge(&self, from: &str, to: &str, weight: f64) -> Result<()> {
        if from.is_empty() || to.is_empty() {
            return Err(Error::InvalidInput("empty edge endpoint id".to_string()));
        }

        let mut inner = self.inner.write().unwrap();
        if !inner.nodes.contains_key(from) {
            return Err(Error::NodeNotFound(from.to_string()));
        }
        if !inner.nodes.contains_key(to) {
            return Err(Error::NodeNotFound(to.to_string()));
        }
        if inner.out.get(from).is_some_and(|m| m.contains_key(to)) {
            return Err(Error::EdgeExists {
                from: from.to_string(),
                to: to.to_string(),
            });
        }

        inner.link_edge(Edge {
            from: from.to_string(),
            to: to.to_string(),
            weight,
        });
        Ok(())
    }

    /// Replaces the weight of an existing edge in both indices.
    pub fn update_edge(&self, from: &str, to: &str, weight: f64) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        if !inner.out.get(from).is_some_and(|m| m.contains_key(to)) {
            return Err(Error::EdgeNotFound {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        inner.link_edge(Edge {
            from: from.to_string(),
            to: to.to_string(),
            weight,
        });
        Ok(())
    }

    pub fn remove_edge(&self, from: &str, to: &str) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        if !inner.out.get(from).is_some_and(|m| m.contains_key(to)) {
            return Err(Error::EdgeNotFound {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        inner.unlink_edge(from, to);
        Ok(())
    }

    pub fn get_edge(&self, from: &str, to: &str) -> Result<Edge> {
        let inner = self.inner.read().unwrap();
        inner
            .out
            .get(from)
            .and_then(|m| m.get(to))
            .cloned()
            .ok_or_else(|| Error::EdgeNotFound {
                from: from.to_string(),
                to: to.to_string(),
            })
    }

    /// Returns a copy of the node, or `NodeNotFound`.
    pub fn get_node(&self, id: &str) -> Result<Node> {
        let inner = self.inner.read().unwrap();
        inner
            .nodes
            .get(id)
            .cloned()
            .ok_or_else(|| Error::NodeNotFound(id.to_string()))
    }

    /// Returns an independent point-in-time copy of every node.
    ///
    /// Iteration order is unspecified.
    pub fn all_nodes(&self) -> Vec<Node> {
        let inner = self.inner.read().unwrap();
        inner.nodes.values().cloned().collect()
    }

    /// Returns every node whose `key` property equals `value`.
    pub fn nodes_by_property(&self, key: &str, value: &PropertyValue) -> Vec<Node> {
        let inner = self.inner.read().unwrap();
        inner
            .nodes
            .values()
            .filter(|n| n.properties.get(key) == Some(value))
            .cloned()
            .collect()
    }

    /// Copies of the edges leaving `from`. Fails if the node is absent.
    pub fn get_out_edges(&self, from: &str) -> Result<Vec<Edge>> {
        let inner = self.inner.read().unwrap();
        if !inner.nodes.contains_key(from) {
            return Err(Error::NodeNotFound(from.to_string()));
        }
        Ok(inner
            .out
            .get(from)
            .map(|m| m.values().cloned().collect())
            .unwrap_or_default())
    }

    /// Copies of the edges arriving at `to`. Fails if the node is absent.
    pub fn get_in_edges(&self, to: &str) -> Result<Vec<Edge>> {
        let inner = self.inner.read().unwrap();
        if !inner.nodes.contains_key(to) {
            return Err(Error::NodeNotFound(to.to_string()));
        }
        Ok(inner
            .incoming
            .get(to)
            .map(|m| m.values().cloned().collect())
            .unwrap_or_default())
    }

    pub fn node_count(&self) -> usize {
        self.inner.read().unwrap().nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.inner
            .read()
            .unwrap()
            .out
            .values()
            .map(|m| m.len())
            .sum()
    }

    pub(crate) fn read_inner(&self) -> std::sync::RwLockReadGuard<'_, GraphInner> {
        self.inner.read().unwrap()
    }

    pub(crate) fn replace_inner(&self, new_inner: GraphInner) {
        *self.inner.write().unwrap() = new_inner;
    }
}
