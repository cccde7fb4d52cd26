//! # loomdb-query
//!
//! The LoomDB query front end and executor: a Cypher-inspired read-only
//! dialect over the `loomdb-graph` store.
//!
//! The pipeline is scanner → parser → executor. [`parse`] turns query text
//! into an immutable [`ast::Query`]; [`execute`] runs it against a
//! [`loomdb_graph::Graph`] and returns projected rows.
//!
//! ```no_run
//! use loomdb_graph::Graph;
//!
//! # fn main() -> loomdb_query::Result<()> {
//! let graph = Graph::new();
//! let query = loomdb_query::parse("MATCH (a)-[*1..3]->(b) RETURN a, b;")?;
//! let rows = loomdb_query::execute(&query, &graph)?;
//! # Ok(())
//! # }
//! ```

pub mod ast;
mod error;
mod executor;
mod parser;
mod scanner;
mod token;

pub use error::{Error, LexicalError, ParseError, Result};
pub use executor::{Row, Value, execute};
pub use parser::{Parser, parse};
pub use scanner::Scanner;
pub use token::{Pos, Token, TokenKind};
