use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

/// The error type for LoomDB operations.
#[derive(Debug)]
pub enum Error {
    /// IO error interacting with the filesystem.
    Io(std::io::Error),
    /// Error from the graph store or snapshot layer.
    Graph(String),
    /// The query text could not be tokenized or parsed.
    Parse(String),
    /// The query parsed but could not be executed.
    Query(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "IO error: {e}"),
            Error::Graph(e) => write!(f, "Graph error: {e}"),
            Error::Parse(e) => write!(f, "Parse error: {e}"),
            Error::Query(e) => write!(f, "Query error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

// Convert member-crate errors to strings to hide internal types.
impl From<loomdb_graph::Error> for Error {
    fn from(e: loomdb_graph::Error) -> Self {
        match e {
            loomdb_graph::Error::Io(e) => Error::Io(e),
            _ => Error::Graph(e.to_string()),
        }
    }
}

impl From<loomdb_query::Error> for Error {
    fn from(e: loomdb_query::Error) -> Self {
        match e {
            loomdb_query::Error::Lexical(_) | loomdb_query::Error::Syntax(_) => {
                Error::Parse(e.to_string())
            }
            loomdb_query::Error::Graph(e) => e.into(),
            _ => Error::Query(e.to_string()),
        }
    }
}
