//! Error and result types for the query crate.

use std::fmt;

use thiserror::Error;

use crate::token::Pos;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The scanner produced an illegal token, a bad string, or a bad escape.
    #[error("lexical error: {0}")]
    Lexical(LexicalError),
    /// The token stream does not match the grammar.
    #[error("syntax error: {0}")]
    Syntax(ParseError),
    /// The query parsed but its shape is outside the supported subset.
    #[error("unsupported query shape: {0}")]
    Structural(String),
    /// The query could not be evaluated against the graph.
    #[error("execution error: {0}")]
    Execution(String),
    #[error(transparent)]
    Graph(#[from] loomdb_graph::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LexicalError {
    pub message: String,
    pub pos: Pos,
}

impl fmt::Display for LexicalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.message, self.pos)
    }
}

/// A fail-fast parse error: the offending token, the spellings that would
/// have been accepted in its place, and where it sits in the input.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// A free-form message; when set it replaces the found/expected rendering.
    pub message: Option<String>,
    pub found: String,
    pub expected: Vec<String>,
    pub pos: Pos,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{} at {}", message, self.pos),
            None => write!(
                f,
                "found {}, expected {} at {}",
                self.found,
                self.expected.join(", "),
                self.pos
            ),
        }
    }
}
