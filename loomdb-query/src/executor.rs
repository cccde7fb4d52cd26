//! Query execution against a graph store.
//!
//! The executor accepts a single MATCH over one linear pattern: either a
//! lone node pattern or a node-relationship-node chain. Start candidates
//! come from a label and property scan; chains run a depth-first traversal
//! per candidate and keep endpoints inside the hop window, deduplicated by
//! the `(start, end)` pair.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use loomdb_graph::{Dfs, Direction, Graph, Node, PropertyValue};
use rustc_hash::FxHashSet;
use serde::Serialize;
use tracing::debug;

use crate::ast::{
    EdgeDirection, EdgePattern, Expression, NodePattern, PatternElement, Query, ReadingClause,
    ReturnClause,
};
use crate::error::{Error, Result};

/// A projected cell. The dialect projects whole nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Value {
    Node(Node),
}

/// One result row, keyed by output column name.
pub type Row = BTreeMap<String, Value>;

pub fn execute(query: &Query, graph: &Graph) -> Result<Vec<Row>> {
    let single = &query.root;
    if single.reading_clauses.len() != 1 {
        return Err(Error::Structural(
            "query must contain exactly one MATCH clause".to_string(),
        ));
    }
    let ReadingClause::Match(clause) = &single.reading_clauses[0];
    if clause.optional {
        return Err(Error::Structural(
            "OPTIONAL MATCH is not supported".to_string(),
        ));
    }
    if clause.patterns.len() != 1 {
        return Err(Error::Structural(
            "MATCH must contain exactly one pattern".to_string(),
        ));
    }
    if clause.where_clause.is_some() {
        // Carried in the AST but not evaluated.
        debug!("ignoring WHERE clause");
    }

    let rows = match clause.patterns[0].elements.as_slice() {
        [PatternElement::Node(node)] => execute_single_node(node, &single.return_clause, graph)?,
        [
            PatternElement::Node(start),
            PatternElement::Edge(edge),
            PatternElement::Node(end),
        ] => execute_chain(start, edge, end, &single.return_clause, graph)?,
        _ => {
            return Err(Error::Structural(
                "only single-relationship patterns are supported".to_string(),
            ));
        }
    };

    let rows = finish(rows, &single.return_clause)?;
    debug!(rows = rows.len(), "query executed");
    Ok(rows)
}

/// Nodes matching a pattern's label and property predicates, sorted by id
/// for deterministic row order.
fn candidates(pattern: &NodePattern, graph: &Graph) -> Result<Vec<Node>> {
    let matcher = compile_matcher(pattern)?;
    let mut nodes: Vec<Node> = graph.all_nodes().into_iter().filter(|n| matcher(n)).collect();
    nodes.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(nodes)
}

fn execute_single_node(
    pattern: &NodePattern,
    ret: &ReturnClause,
    graph: &Graph,
) -> Result<Vec<Row>> {
    let mut rows = Vec::new();
    for node in candidates(pattern, graph)? {
        let mut bindings = Vec::new();
        if let Some(variable) = &pattern.variable {
            bindings.push((variable.clone(), node));
        }
        rows.push(project(ret, &bindings)?);
    }
    Ok(rows)
}

fn execute_chain(
    start_pattern: &NodePattern,
    edge: &EdgePattern,
    end_pattern: &NodePattern,
    ret: &ReturnClause,
    graph: &Graph,
) -> Result<Vec<Row>> {
    let direction = match edge.direction {
        EdgeDirection::Outgoing | EdgeDirection::Undirected => Direction::Outgoing,
        EdgeDirection::Incoming => Direction::Incoming,
    };
    // A plain relationship is exactly one hop; variable-length bounds
    // default to at least one hop and no upper bound.
    let (min_hops, max_hops) = match edge.hops {
        None => (1, Some(1)),
        Some(hops) => (hops.min.unwrap_or(1), hops.max),
    };

    let end_matcher = compile_matcher(end_pattern)?;
    let mut seen: FxHashSet<(String, String)> = FxHashSet::default();
    let mut rows = Vec::new();

    for start in candidates(start_pattern, graph)? {
        let mut dfs = Dfs::new(graph, &start.id)?.direction(direction);
        if let Some(max) = max_hops {
            dfs = dfs.max_depth(max);
        }
        if end_pattern.is_constrained() {
            dfs = dfs.range_filter(compile_matcher(start_pattern)?, compile_matcher(end_pattern)?);
        }

        for visit in dfs {
            if visit.depth < min_hops {
                continue;
            }
            if !end_matcher(&visit.node) {
                continue;
            }
            if !seen.insert((start.id.clone(), visit.node.id.clone())) {
                continue;
            }
            let mut bindings = Vec::new();
            if let Some(variable) = &start_pattern.variable {
                bindings.push((variable.clone(), start.clone()));
            }
            if let Some(variable) = &end_pattern.variable {
                bindings.push((variable.clone(), visit.node));
            }
            rows.push(project(ret, &bindings)?);
        }
    }
    Ok(rows)
}

/// Compiles a node pattern's predicates into an owned matcher closure.
/// Property predicates must be literals.
fn compile_matcher(pattern: &NodePattern) -> Result<Box<dyn Fn(&Node) -> bool>> {
    let labels = pattern.labels.clone();
    let mut props = Vec::new();
    for (key, expr) in &pattern.properties {
        match expr {
            Expression::Literal(value) => props.push((key.clone(), value.clone())),
            _ => {
                return Err(Error::Execution(format!(
                    "property {key} must be a literal value"
                )));
            }
        }
    }
    Ok(Box::new(move |node: &Node| {
        labels.iter().all(|label| node.labels.contains(label))
            && props.iter().all(|(key, literal)| {
                node.properties
                    .get(key)
                    .is_some_and(|stored| literal_matches(literal, stored))
            })
    }))
}

/// Predicate-literal comparison with coercion. Integer literals try the
/// integral, truncated-float, and parsed-string readings of the stored
/// value; string literals fall back to the stored value's display
/// rendering. A failed coercion means no match, never an error.
fn literal_matches(literal: &PropertyValue, stored: &PropertyValue) -> bool {
    match literal {
        PropertyValue::Int(want) => int_matches(*want, stored),
        PropertyValue::String(want) => str_matches(want, stored),
        PropertyValue::Float(want) => match stored {
            PropertyValue::Float(have) => have == want,
            PropertyValue::Int(have) => *have as f64 == *want,
            _ => false,
        },
        PropertyValue::Bool(want) => matches!(stored, PropertyValue::Bool(have) if have == want),
        PropertyValue::Null => matches!(stored, PropertyValue::Null),
    }
}

fn int_matches(want: i64, stored: &PropertyValue) -> bool {
    match stored {
        PropertyValue::Int(have) => *have == want,
        PropertyValue::Float(have) => have.trunc() as i64 == want,
        PropertyValue::String(have) => have.parse::<i64>() == Ok(want),
        _ => false,
    }
}

fn str_matches(want: &str, stored: &PropertyValue) -> bool {
    match stored {
        PropertyValue::String(have) => have == want,
        other => other.to_string() == want,
    }
}

fn project(ret: &ReturnClause, bindings: &[(String, Node)]) -> Result<Row> {
    let mut row = Row::new();
    for item in &ret.items {
        let Expression::Variable(variable) = &item.expression else {
            return Err(Error::Execution(
                "only variable projections are supported".to_string(),
            ));
        };
        let Some((_, node)) = bindings.iter().find(|(name, _)| name == variable) else {
            return Err(Error::Execution(format!("undefined variable {variable}")));
        };
        let column = item.alias.clone().unwrap_or_else(|| variable.clone());
        row.insert(column, Value::Node(node.clone()));
    }
    Ok(row)
}

/// DISTINCT, ORDER BY, SKIP, and LIMIT, applied in that order to the
/// projected rows.
fn finish(mut rows: Vec<Row>, ret: &ReturnClause) -> Result<Vec<Row>> {
    if ret.distinct {
        let mut seen = FxHashSet::default();
        rows.retain(|row| {
            let key: Vec<(String, String)> = row
                .iter()
                .map(|(column, value)| match value {
                    Value::Node(node) => (column.clone(), node.id.clone()),
                })
                .collect();
            seen.insert(key)
        });
    }

    if !ret.order_by.is_empty() {
        let mut keyed = Vec::with_capacity(rows.len());
        for row in rows {
            let keys: Vec<SortKey> = ret
                .order_by
                .iter()
                .map(|item| sort_key(&item.expression, &row))
                .collect::<Result<_>>()?;
            keyed.push((keys, row));
        }
        // Stable sort: ties keep their insertion order.
        keyed.sort_by(|a, b| {
            for (i, item) in ret.order_by.iter().enumerate() {
                let ord = a.0[i].cmp(&b.0[i]);
                let ord = if item.descending { ord.reverse() } else { ord };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        });
        rows = keyed.into_iter().map(|(_, row)| row).collect();
    }

    if let Some(skip) = &ret.skip {
        let n = count_argument(skip, "SKIP")?;
        if n < rows.len() {
            rows.drain(..n);
        } else {
            rows.clear();
        }
    }
    if let Some(limit) = &ret.limit {
        rows.truncate(count_argument(limit, "LIMIT")?);
    }
    Ok(rows)
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum SortKey {
    /// A literal key is the same for every row, so it never reorders.
    Const,
    Id(String),
}

fn sort_key(expr: &Expression, row: &Row) -> Result<SortKey> {
    match expr {
        Expression::Variable(variable) => match row.get(variable) {
            Some(Value::Node(node)) => Ok(SortKey::Id(node.id.clone())),
            None => Err(Error::Execution(format!(
                "ORDER BY references unprojected variable {variable}"
            ))),
        },
        Expression::Literal(_) => Ok(SortKey::Const),
        _ => Err(Error::Execution(
            "unsupported ORDER BY expression".to_string(),
        )),
    }
}

fn count_argument(expr: &Expression, clause: &str) -> Result<usize> {
    match expr {
        Expression::Literal(PropertyValue::Int(n)) if *n >= 0 => Ok(*n as usize),
        _ => Err(Error::Execution(format!(
            "{clause} requires a non-negative integer literal"
        ))),
    }
}
