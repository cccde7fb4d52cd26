//! Abstract syntax tree for the query dialect.
//!
//! The tree is immutable once built. Hop and depth bounds use `Option<u32>`
//! with `None` meaning unbounded.

use std::collections::BTreeMap;

use loomdb_graph::PropertyValue;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Query {
    pub root: SingleQuery,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SingleQuery {
    pub reading_clauses: Vec<ReadingClause>,
    pub return_clause: ReturnClause,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ReadingClause {
    Match(MatchClause),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchClause {
    pub optional: bool,
    pub patterns: Vec<MatchPattern>,
    pub where_clause: Option<Expression>,
}

/// One comma-separated pattern part, optionally named (`p = (...)`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchPattern {
    pub variable: Option<String>,
    pub elements: Vec<PatternElement>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum PatternElement {
    Node(NodePattern),
    Edge(EdgePattern),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NodePattern {
    pub variable: Option<String>,
    pub labels: Vec<String>,
    /// Property predicates. Values are expressions at parse time; the
    /// executor only accepts literals here.
    pub properties: BTreeMap<String, Expression>,
}

impl NodePattern {
    /// True when the pattern constrains candidates beyond "any node".
    pub fn is_constrained(&self) -> bool {
        !self.labels.is_empty() || !self.properties.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EdgePattern {
    pub variable: Option<String>,
    pub direction: EdgeDirection,
    /// Relationship type alternatives (`:A|B`).
    pub types: Vec<String>,
    /// `None` for a plain single-hop relationship, `Some` for `[*..]` forms.
    pub hops: Option<HopRange>,
    pub properties: BTreeMap<String, Expression>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeDirection {
    Outgoing,
    Incoming,
    Undirected,
}

/// Variable-length relationship bounds. `[*]` is `(None, None)`, `[*2]` is
/// `(Some(2), Some(2))`, `[*1..3]` is `(Some(1), Some(3))`, and the
/// half-open forms leave the missing side `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HopRange {
    pub min: Option<u32>,
    pub max: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReturnClause {
    pub distinct: bool,
    pub items: Vec<ReturnItem>,
    pub order_by: Vec<OrderByItem>,
    pub skip: Option<Expression>,
    pub limit: Option<Expression>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReturnItem {
    pub expression: Expression,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderByItem {
    pub expression: Expression,
    pub descending: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Expression {
    Variable(String),
    /// `variable.key` access.
    Property { variable: String, key: String },
    Literal(PropertyValue),
    Binary {
        op: BinaryOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    And,
    Or,
    Xor,
}
