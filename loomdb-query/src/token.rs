//! Lexical tokens for the query dialect.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// Token kinds produced by the scanner.
///
/// The reserved-word table is wider than what the executor consumes; every
/// keyword must still tokenize without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    // Specials.
    Illegal,
    Eof,
    Ws,
    Comment,
    BadString,
    BadEscape,

    // Literals.
    Ident,
    Number,
    Integer,
    Str,
    True,
    False,
    Null,

    // Operators.
    Plus,      // +
    Sub,       // -
    Mul,       // *
    Div,       // /
    Mod,       // %
    Pow,       // ^
    Eq,        // =
    Neq,       // <>
    Lt,        // <
    Lte,       // <=
    Gt,        // >
    Gte,       // >=
    Inc,       // +=
    Bar,       // |
    And,
    Or,
    Xor,
    Not,

    // Punctuation.
    Lparen,
    Rparen,
    Lbrace,
    Rbrace,
    Lbracket,
    Rbracket,
    Comma,
    Colon,
    Semicolon,
    Dot,
    DoubleDot,

    // Edge arrows and the `[*..]` variable-length relationship token.
    EdgeRight, // ->
    EdgeLeft,  // <-
    RelRange,  // [*1..3]

    // Keywords.
    Add,
    All,
    As,
    Asc,
    Ascending,
    By,
    Case,
    Constraint,
    Contains,
    Create,
    Delete,
    Desc,
    Descending,
    Detach,
    Distinct,
    Do,
    Drop,
    Else,
    End,
    Ends,
    Exists,
    For,
    In,
    Is,
    Limit,
    Mandatory,
    Match,
    Merge,
    Of,
    On,
    Optional,
    Order,
    Remove,
    Require,
    Return,
    Scalar,
    Set,
    Skip,
    Starts,
    Then,
    Union,
    Unique,
    Unwind,
    When,
    Where,
    With,
}

/// Keyword spellings, including the word operators and literal keywords.
const KEYWORDS: &[(&str, TokenKind)] = &[
    ("add", TokenKind::Add),
    ("all", TokenKind::All),
    ("and", TokenKind::And),
    ("as", TokenKind::As),
    ("asc", TokenKind::Asc),
    ("ascending", TokenKind::Ascending),
    ("by", TokenKind::By),
    ("case", TokenKind::Case),
    ("constraint", TokenKind::Constraint),
    ("contains", TokenKind::Contains),
    ("create", TokenKind::Create),
    ("delete", TokenKind::Delete),
    ("desc", TokenKind::Desc),
    ("descending", TokenKind::Descending),
    ("detach", TokenKind::Detach),
    ("distinct", TokenKind::Distinct),
    ("do", TokenKind::Do),
    ("drop", TokenKind::Drop),
    ("else", TokenKind::Else),
    ("end", TokenKind::End),
    ("ends", TokenKind::Ends),
    ("exists", TokenKind::Exists),
    ("false", TokenKind::False),
    ("for", TokenKind::For),
    ("in", TokenKind::In),
    ("is", TokenKind::Is),
    ("limit", TokenKind::Limit),
    ("mandatory", TokenKind::Mandatory),
    ("match", TokenKind::Match),
    ("merge", TokenKind::Merge),
    ("not", TokenKind::Not),
    ("null", TokenKind::Null),
    ("of", TokenKind::Of),
    ("on", TokenKind::On),
    ("optional", TokenKind::Optional),
    ("or", TokenKind::Or),
    ("order", TokenKind::Order),
    ("remove", TokenKind::Remove),
    ("require", TokenKind::Require),
    ("return", TokenKind::Return),
    ("scalar", TokenKind::Scalar),
    ("set", TokenKind::Set),
    ("skip", TokenKind::Skip),
    ("starts", TokenKind::Starts),
    ("then", TokenKind::Then),
    ("true", TokenKind::True),
    ("union", TokenKind::Union),
    ("unique", TokenKind::Unique),
    ("unwind", TokenKind::Unwind),
    ("when", TokenKind::When),
    ("where", TokenKind::Where),
    ("with", TokenKind::With),
    ("xor", TokenKind::Xor),
];

/// Returns the keyword token for an identifier, or `Ident` if it is not a
/// reserved word. Case-insensitive. The table is built once and is
/// read-only afterwards.
pub fn lookup(ident: &str) -> TokenKind {
    static TABLE: OnceLock<HashMap<&'static str, TokenKind>> = OnceLock::new();
    let table = TABLE.get_or_init(|| KEYWORDS.iter().copied().collect());
    table
        .get(ident.to_ascii_lowercase().as_str())
        .copied()
        .unwrap_or(TokenKind::Ident)
}

impl TokenKind {
    /// The canonical spelling of the token kind: the symbol text for
    /// operators and punctuation, the uppercase word for keywords.
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Illegal => "ILLEGAL",
            TokenKind::Eof => "EOF",
            TokenKind::Ws => "WS",
            TokenKind::Comment => "COMMENT",
            TokenKind::BadString => "BADSTRING",
            TokenKind::BadEscape => "BADESCAPE",
            TokenKind::Ident => "IDENT",
            TokenKind::Number => "NUMBER",
            TokenKind::Integer => "INTEGER",
            TokenKind::Str => "STRING",
            TokenKind::True => "TRUE",
            TokenKind::False => "FALSE",
            TokenKind::Null => "NULL",
            TokenKind::Plus => "+",
            TokenKind::Sub => "-",
            TokenKind::Mul => "*",
            TokenKind::Div => "/",
            TokenKind::Mod => "%",
            TokenKind::Pow => "^",
            TokenKind::Eq => "=",
            TokenKind::Neq => "<>",
            TokenKind::Lt => "<",
            TokenKind::Lte => "<=",
            TokenKind::Gt => ">",
            TokenKind::Gte => ">=",
            TokenKind::Inc => "+=",
            TokenKind::Bar => "|",
            TokenKind::And => "AND",
            TokenKind::Or => "OR",
            TokenKind::Xor => "XOR",
            TokenKind::Not => "NOT",
            TokenKind::Lparen => "(",
            TokenKind::Rparen => ")",
            TokenKind::Lbrace => "{",
            TokenKind::Rbrace => "}",
            TokenKind::Lbracket => "[",
            TokenKind::Rbracket => "]",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::Semicolon => ";",
            TokenKind::Dot => ".",
            TokenKind::DoubleDot => "..",
            TokenKind::EdgeRight => "->",
            TokenKind::EdgeLeft => "<-",
            TokenKind::RelRange => "REL_RANGE",
            TokenKind::Add => "ADD",
            TokenKind::All => "ALL",
            TokenKind::As => "AS",
            TokenKind::Asc => "ASC",
            TokenKind::Ascending => "ASCENDING",
            TokenKind::By => "BY",
            TokenKind::Case => "CASE",
            TokenKind::Constraint => "CONSTRAINT",
            TokenKind::Contains => "CONTAINS",
            TokenKind::Create => "CREATE",
            TokenKind::Delete => "DELETE",
            TokenKind::Desc => "DESC",
            TokenKind::Descending => "DESCENDING",
            TokenKind::Detach => "DETACH",
            TokenKind::Distinct => "DISTINCT",
            TokenKind::Do => "DO",
            TokenKind::Drop => "DROP",
            TokenKind::Else => "ELSE",
            TokenKind::End => "END",
            TokenKind::Ends => "ENDS",
            TokenKind::Exists => "EXISTS",
            TokenKind::For => "FOR",
            TokenKind::In => "IN",
            TokenKind::Is => "IS",
            TokenKind::Limit => "LIMIT",
            TokenKind::Mandatory => "MANDATORY",
            TokenKind::Match => "MATCH",
            TokenKind::Merge => "MERGE",
            TokenKind::Of => "OF",
            TokenKind::On => "ON",
            TokenKind::Optional => "OPTIONAL",
            TokenKind::Order => "ORDER",
            TokenKind::Remove => "REMOVE",
            TokenKind::Require => "REQUIRE",
            TokenKind::Return => "RETURN",
            TokenKind::Scalar => "SCALAR",
            TokenKind::Set => "SET",
            TokenKind::Skip => "SKIP",
            TokenKind::Starts => "STARTS",
            TokenKind::Then => "THEN",
            TokenKind::Union => "UNION",
            TokenKind::Unique => "UNIQUE",
            TokenKind::Unwind => "UNWIND",
            TokenKind::When => "WHEN",
            TokenKind::Where => "WHERE",
            TokenKind::With => "WITH",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source position of a token: zero-based line and column, byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pos {
    pub line: u32,
    pub column: u32,
    pub offset: usize,
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Rendered one-based for humans.
        write!(f, "line {}, column {}", self.line + 1, self.column + 1)
    }
}

/// A scanned token: kind, literal text (empty for fixed spellings), and
/// position. Used only during parsing and discarded after.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lit: String,
    pub pos: Pos,
}

impl Token {
    pub fn new(kind: TokenKind, lit: impl Into<String>, pos: Pos) -> Self {
        Self {
            kind,
            lit: lit.into(),
            pos,
        }
    }

    /// Human-readable text for error messages: the literal when present,
    /// otherwise the kind's canonical spelling.
    pub fn text(&self) -> &str {
        if self.lit.is_empty() {
            self.kind.as_str()
        } else {
            &self.lit
        }
    }
}

impl Default for Token {
    fn default() -> Self {
        Self {
            kind: TokenKind::Illegal,
            lit: String::new(),
            pos: Pos::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_lookup_is_case_insensitive() {
        assert_eq!(lookup("match"), TokenKind::Match);
        assert_eq!(lookup("MATCH"), TokenKind::Match);
        assert_eq!(lookup("MaTcH"), TokenKind::Match);
        assert_eq!(lookup("matches"), TokenKind::Ident);
    }

    #[test]
    fn reserved_words_cover_operators_and_literals() {
        assert_eq!(lookup("xor"), TokenKind::Xor);
        assert_eq!(lookup("true"), TokenKind::True);
        assert_eq!(lookup("null"), TokenKind::Null);
        assert_eq!(lookup("mandatory"), TokenKind::Mandatory);
    }
}
