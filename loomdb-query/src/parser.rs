//! Recursive-descent parser.
//!
//! The parser pulls tokens through a small pushback buffer, skipping
//! whitespace and comments, and fails fast on the first unexpected token
//! with the list of spellings that would have been accepted in its place.

use std::collections::BTreeMap;

use loomdb_graph::PropertyValue;

use crate::ast::*;
use crate::error::{Error, LexicalError, ParseError, Result};
use crate::scanner::Scanner;
use crate::token::{Token, TokenKind};

/// Parses a query text into its AST.
///
/// Statements may be separated by semicolons; the last one becomes the
/// query root.
pub fn parse(input: &str) -> Result<Query> {
    Parser::new(input).parse_query()
}

/// Fixed-length circular token buffer over the scanner. `unscan` pushes
/// the last returned token back. Pushback replays raw tokens, so callers
/// that skip whitespace must not unscan past the last significant token.
struct BufScanner {
    s: Scanner,
    buf: [Token; 3],
    i: usize,
    n: usize,
}

impl BufScanner {
    fn new(input: &str) -> Self {
        Self {
            s: Scanner::new(input),
            buf: [Token::default(), Token::default(), Token::default()],
            i: 0,
            n: 0,
        }
    }

    fn scan(&mut self) -> Token {
        if self.n > 0 {
            self.n -= 1;
            return self.curr();
        }
        self.i = (self.i + 1) % self.buf.len();
        self.buf[self.i] = self.s.scan();
        self.curr()
    }

    fn unscan(&mut self) {
        self.n += 1;
    }

    fn curr(&self) -> Token {
        let len = self.buf.len();
        self.buf[(self.i + len - self.n) % len].clone()
    }
}

pub struct Parser {
    s: BufScanner,
}

impl Parser {
    pub fn new(input: &str) -> Self {
        Self {
            s: BufScanner::new(input),
        }
    }

    /// Next significant token. Whitespace and comments are skipped; lexical
    /// violations become errors here.
    fn scan_ignore_whitespace(&mut self) -> Result<Token> {
        loop {
            let tok = self.s.scan();
            match tok.kind {
                TokenKind::Ws | TokenKind::Comment => {}
                TokenKind::BadString => {
                    return Err(Error::Lexical(LexicalError {
                        message: format!("unterminated string {:?}", tok.lit),
                        pos: tok.pos,
                    }));
                }
                TokenKind::BadEscape => {
                    return Err(Error::Lexical(LexicalError {
                        message: format!("invalid escape {:?}", tok.lit),
                        pos: tok.pos,
                    }));
                }
                TokenKind::Illegal => {
                    return Err(Error::Lexical(LexicalError {
                        message: format!("illegal token {:?}", tok.lit),
                        pos: tok.pos,
                    }));
                }
                _ => return Ok(tok),
            }
        }
    }

    fn unscan(&mut self) {
        self.s.unscan();
    }

    pub fn parse_query(&mut self) -> Result<Query> {
        let mut root = None;
        loop {
            let tok = self.scan_ignore_whitespace()?;
            match tok.kind {
                TokenKind::Eof => {
                    return match root {
                        Some(root) => Ok(Query { root }),
                        None => Err(syntax(&tok, &["MATCH", "RETURN"])),
                    };
                }
                TokenKind::Semicolon => {}
                _ => {
                    self.unscan();
                    root = Some(self.parse_single_query()?);
                }
            }
        }
    }

    fn parse_single_query(&mut self) -> Result<SingleQuery> {
        let mut reading_clauses = Vec::new();
        loop {
            let tok = self.scan_ignore_whitespace()?;
            match tok.kind {
                TokenKind::Optional => {
                    let tok = self.scan_ignore_whitespace()?;
                    if tok.kind != TokenKind::Match {
                        return Err(syntax(&tok, &["MATCH"]));
                    }
                    reading_clauses.push(ReadingClause::Match(self.parse_match_clause(true)?));
                }
                TokenKind::Match => {
                    reading_clauses.push(ReadingClause::Match(self.parse_match_clause(false)?));
                }
                TokenKind::Return => {
                    let return_clause = self.parse_return_clause()?;
                    let tok = self.scan_ignore_whitespace()?;
                    match tok.kind {
                        TokenKind::Semicolon => {}
                        TokenKind::Eof => self.unscan(),
                        _ => return Err(syntax(&tok, &[";"])),
                    }
                    return Ok(SingleQuery {
                        reading_clauses,
                        return_clause,
                    });
                }
                _ => return Err(syntax(&tok, &["MATCH", "RETURN"])),
            }
        }
    }

    fn parse_match_clause(&mut self, optional: bool) -> Result<MatchClause> {
        let mut patterns = vec![self.parse_match_pattern()?];
        loop {
            let tok = self.scan_ignore_whitespace()?;
            if tok.kind == TokenKind::Comma {
                patterns.push(self.parse_match_pattern()?);
            } else {
                self.unscan();
                break;
            }
        }

        let tok = self.scan_ignore_whitespace()?;
        let where_clause = if tok.kind == TokenKind::Where {
            Some(self.parse_expression()?)
        } else {
            self.unscan();
            None
        };

        Ok(MatchClause {
            optional,
            patterns,
            where_clause,
        })
    }

    fn parse_match_pattern(&mut self) -> Result<MatchPattern> {
        // A leading identifier can only be a path variable (`p = (...)`),
        // so anything but `=` after it is an error.
        let tok = self.scan_ignore_whitespace()?;
        let variable = if tok.kind == TokenKind::Ident {
            let eq = self.scan_ignore_whitespace()?;
            if eq.kind != TokenKind::Eq {
                return Err(syntax(&eq, &["="]));
            }
            Some(tok.lit)
        } else {
            self.unscan();
            None
        };

        let elements = self.parse_pattern_elements()?;
        Ok(MatchPattern { variable, elements })
    }

    fn parse_pattern_elements(&mut self) -> Result<Vec<PatternElement>> {
        let mut elements = vec![PatternElement::Node(self.parse_node_pattern()?)];
        loop {
            let tok = self.scan_ignore_whitespace()?;
            match tok.kind {
                TokenKind::Sub | TokenKind::EdgeLeft => {
                    self.unscan();
                    elements.push(PatternElement::Edge(self.parse_edge_pattern()?));
                    elements.push(PatternElement::Node(self.parse_node_pattern()?));
                }
                _ => {
                    self.unscan();
                    break;
                }
            }
        }
        Ok(elements)
    }

    fn parse_node_pattern(&mut self) -> Result<NodePattern> {
        let tok = self.scan_ignore_whitespace()?;
        if tok.kind != TokenKind::Lparen {
            return Err(syntax(&tok, &["("]));
        }

        let mut node = NodePattern::default();

        let tok = self.scan_ignore_whitespace()?;
        if tok.kind == TokenKind::Ident {
            node.variable = Some(tok.lit);
        } else {
            self.unscan();
        }

        loop {
            let tok = self.scan_ignore_whitespace()?;
            if tok.kind != TokenKind::Colon {
                self.unscan();
                break;
            }
            let label = self.scan_ignore_whitespace()?;
            if label.kind != TokenKind::Ident {
                return Err(syntax(&label, &["label"]));
            }
            node.labels.push(label.lit);
        }

        let tok = self.scan_ignore_whitespace()?;
        if tok.kind == TokenKind::Lbrace {
            node.properties = self.parse_properties()?;
        } else {
            self.unscan();
        }

        let tok = self.scan_ignore_whitespace()?;
        if tok.kind != TokenKind::Rparen {
            return Err(syntax(&tok, &[")"]));
        }
        Ok(node)
    }

    fn parse_edge_pattern(&mut self) -> Result<EdgePattern> {
        let open = self.scan_ignore_whitespace()?;
        let from_left = match open.kind {
            TokenKind::EdgeLeft => true,
            TokenKind::Sub => false,
            _ => return Err(syntax(&open, &["-", "<-"])),
        };

        let mut edge = EdgePattern {
            variable: None,
            direction: EdgeDirection::Undirected,
            types: Vec::new(),
            hops: None,
            properties: BTreeMap::new(),
        };

        let tok = self.scan_ignore_whitespace()?;
        match tok.kind {
            TokenKind::Lbracket => self.parse_edge_body(&mut edge)?,
            TokenKind::RelRange => edge.hops = Some(parse_rel_range(&tok)?),
            _ => self.unscan(),
        }

        let close = self.scan_ignore_whitespace()?;
        edge.direction = match (from_left, close.kind) {
            (true, TokenKind::Sub) => EdgeDirection::Incoming,
            (true, TokenKind::EdgeRight) => {
                return Err(Error::Syntax(ParseError {
                    message: Some("bidirectional relationships are not supported".to_string()),
                    found: close.text().to_string(),
                    expected: vec!["-".to_string()],
                    pos: close.pos,
                }));
            }
            (false, TokenKind::EdgeRight) => EdgeDirection::Outgoing,
            (false, TokenKind::Sub) => EdgeDirection::Undirected,
            (true, _) => return Err(syntax(&close, &["-"])),
            (false, _) => return Err(syntax(&close, &["->", "-"])),
        };
        Ok(edge)
    }

    /// Bracketed relationship detail: `[var? (:Type(|Type)*)? (*bounds)?
    /// ({props})?]`. The opening bracket is already consumed.
    fn parse_edge_body(&mut self, edge: &mut EdgePattern) -> Result<()> {
        let tok = self.scan_ignore_whitespace()?;
        if tok.kind == TokenKind::Ident {
            edge.variable = Some(tok.lit);
        } else {
            self.unscan();
        }

        let tok = self.scan_ignore_whitespace()?;
        if tok.kind == TokenKind::Colon {
            loop {
                let ty = self.scan_ignore_whitespace()?;
                if ty.kind != TokenKind::Ident {
                    return Err(syntax(&ty, &["relationship type"]));
                }
                edge.types.push(ty.lit);
                let bar = self.scan_ignore_whitespace()?;
                if bar.kind != TokenKind::Bar {
                    self.unscan();
                    break;
                }
            }
        } else {
            self.unscan();
        }

        let tok = self.scan_ignore_whitespace()?;
        if tok.kind == TokenKind::Mul {
            edge.hops = Some(self.parse_hop_bounds(&tok)?);
        } else {
            self.unscan();
        }

        let tok = self.scan_ignore_whitespace()?;
        if tok.kind == TokenKind::Lbrace {
            edge.properties = self.parse_properties()?;
        } else {
            self.unscan();
        }

        let tok = self.scan_ignore_whitespace()?;
        if tok.kind != TokenKind::Rbracket {
            return Err(syntax(&tok, &["]"]));
        }
        Ok(())
    }

    /// Hop bounds after a `*` inside brackets: `*`, `*2`, `*1..3`, `*..3`,
    /// `*1..`. A bare count means exactly that many hops.
    fn parse_hop_bounds(&mut self, star: &Token) -> Result<HopRange> {
        let mut hops = HopRange::default();

        let tok = self.scan_ignore_whitespace()?;
        if tok.kind == TokenKind::Integer {
            hops.min = Some(parse_u32(&tok)?);
        } else {
            self.unscan();
        }

        let tok = self.scan_ignore_whitespace()?;
        if tok.kind == TokenKind::DoubleDot {
            let tok = self.scan_ignore_whitespace()?;
            if tok.kind == TokenKind::Integer {
                hops.max = Some(parse_u32(&tok)?);
            } else {
                self.unscan();
            }
        } else {
            self.unscan();
            hops.max = hops.min;
        }

        validate_hop_range(hops, star)?;
        Ok(hops)
    }

    /// `{ key: value, ... }` with the opening brace already consumed.
    fn parse_properties(&mut self) -> Result<BTreeMap<String, Expression>> {
        let mut props = BTreeMap::new();

        let tok = self.scan_ignore_whitespace()?;
        if tok.kind == TokenKind::Rbrace {
            return Ok(props);
        }
        self.unscan();

        loop {
            let key = self.scan_ignore_whitespace()?;
            let key = match key.kind {
                TokenKind::Ident | TokenKind::Str => key.lit,
                _ => return Err(syntax(&key, &["property key"])),
            };
            let colon = self.scan_ignore_whitespace()?;
            if colon.kind != TokenKind::Colon {
                return Err(syntax(&colon, &[":"]));
            }
            props.insert(key, self.parse_operand()?);

            let tok = self.scan_ignore_whitespace()?;
            match tok.kind {
                TokenKind::Comma => {}
                TokenKind::Rbrace => break,
                _ => return Err(syntax(&tok, &[",", "}"])),
            }
        }
        Ok(props)
    }

    fn parse_return_clause(&mut self) -> Result<ReturnClause> {
        let tok = self.scan_ignore_whitespace()?;
        let distinct = tok.kind == TokenKind::Distinct;
        if !distinct {
            self.unscan();
        }

        let mut items = vec![self.parse_return_item()?];
        loop {
            let tok = self.scan_ignore_whitespace()?;
            if tok.kind == TokenKind::Comma {
                items.push(self.parse_return_item()?);
            } else {
                self.unscan();
                break;
            }
        }

        let mut order_by = Vec::new();
        let tok = self.scan_ignore_whitespace()?;
        if tok.kind == TokenKind::Order {
            let by = self.scan_ignore_whitespace()?;
            if by.kind != TokenKind::By {
                return Err(syntax(&by, &["BY"]));
            }
            loop {
                order_by.push(self.parse_order_by_item()?);
                let tok = self.scan_ignore_whitespace()?;
                if tok.kind != TokenKind::Comma {
                    self.unscan();
                    break;
                }
            }
        } else {
            self.unscan();
        }

        let tok = self.scan_ignore_whitespace()?;
        let skip = if tok.kind == TokenKind::Skip {
            Some(self.parse_expression()?)
        } else {
            self.unscan();
            None
        };

        let tok = self.scan_ignore_whitespace()?;
        let limit = if tok.kind == TokenKind::Limit {
            Some(self.parse_expression()?)
        } else {
            self.unscan();
            None
        };

        Ok(ReturnClause {
            distinct,
            items,
            order_by,
            skip,
            limit,
        })
    }

    fn parse_return_item(&mut self) -> Result<ReturnItem> {
        let expression = self.parse_expression()?;
        let tok = self.scan_ignore_whitespace()?;
        let alias = if tok.kind == TokenKind::As {
            let name = self.scan_ignore_whitespace()?;
            if name.kind != TokenKind::Ident {
                return Err(syntax(&name, &["identifier"]));
            }
            Some(name.lit)
        } else {
            self.unscan();
            None
        };
        Ok(ReturnItem { expression, alias })
    }

    fn parse_order_by_item(&mut self) -> Result<OrderByItem> {
        let expression = self.parse_expression()?;
        let tok = self.scan_ignore_whitespace()?;
        let descending = match tok.kind {
            TokenKind::Desc | TokenKind::Descending => true,
            TokenKind::Asc | TokenKind::Ascending => false,
            _ => {
                self.unscan();
                false
            }
        };
        Ok(OrderByItem {
            expression,
            descending,
        })
    }

    fn parse_expression(&mut self) -> Result<Expression> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expression> {
        let mut left = self.parse_and()?;
        loop {
            let tok = self.scan_ignore_whitespace()?;
            let op = match tok.kind {
                TokenKind::Or => BinaryOp::Or,
                TokenKind::Xor => BinaryOp::Xor,
                _ => {
                    self.unscan();
                    return Ok(left);
                }
            };
            let right = self.parse_and()?;
            left = Expression::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
    }

    fn parse_and(&mut self) -> Result<Expression> {
        let mut left = self.parse_comparison()?;
        loop {
            let tok = self.scan_ignore_whitespace()?;
            if tok.kind != TokenKind::And {
                self.unscan();
                return Ok(left);
            }
            let right = self.parse_comparison()?;
            left = Expression::Binary {
                op: BinaryOp::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
    }

    fn parse_comparison(&mut self) -> Result<Expression> {
        let left = self.parse_operand()?;
        let tok = self.scan_ignore_whitespace()?;
        let op = match tok.kind {
            TokenKind::Eq => BinaryOp::Eq,
            TokenKind::Neq => BinaryOp::Neq,
            TokenKind::Lt => BinaryOp::Lt,
            TokenKind::Lte => BinaryOp::Lte,
            TokenKind::Gt => BinaryOp::Gt,
            TokenKind::Gte => BinaryOp::Gte,
            _ => {
                self.unscan();
                return Ok(left);
            }
        };
        let right = self.parse_operand()?;
        Ok(Expression::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn parse_operand(&mut self) -> Result<Expression> {
        let tok = self.scan_ignore_whitespace()?;
        match tok.kind {
            TokenKind::Str => Ok(Expression::Literal(PropertyValue::String(tok.lit))),
            TokenKind::Integer => Ok(Expression::Literal(PropertyValue::Int(parse_i64(&tok)?))),
            TokenKind::Number => Ok(Expression::Literal(PropertyValue::Float(parse_f64(&tok)?))),
            TokenKind::True => Ok(Expression::Literal(PropertyValue::Bool(true))),
            TokenKind::False => Ok(Expression::Literal(PropertyValue::Bool(false))),
            TokenKind::Null => Ok(Expression::Literal(PropertyValue::Null)),
            TokenKind::Sub => {
                let num = self.scan_ignore_whitespace()?;
                match num.kind {
                    TokenKind::Integer => {
                        Ok(Expression::Literal(PropertyValue::Int(-parse_i64(&num)?)))
                    }
                    TokenKind::Number => {
                        Ok(Expression::Literal(PropertyValue::Float(-parse_f64(&num)?)))
                    }
                    _ => Err(syntax(&num, &["number"])),
                }
            }
            TokenKind::Ident => {
                let dot = self.scan_ignore_whitespace()?;
                if dot.kind == TokenKind::Dot {
                    let key = self.scan_ignore_whitespace()?;
                    if key.kind != TokenKind::Ident {
                        return Err(syntax(&key, &["property name"]));
                    }
                    Ok(Expression::Property {
                        variable: tok.lit,
                        key: key.lit,
                    })
                } else {
                    self.unscan();
                    Ok(Expression::Variable(tok.lit))
                }
            }
            TokenKind::Lparen => {
                let inner = self.parse_expression()?;
                let close = self.scan_ignore_whitespace()?;
                if close.kind != TokenKind::Rparen {
                    return Err(syntax(&close, &[")"]));
                }
                Ok(inner)
            }
            _ => Err(syntax(&tok, &["expression"])),
        }
    }
}

fn syntax(found: &Token, expected: &[&str]) -> Error {
    Error::Syntax(ParseError {
        message: None,
        found: found.text().to_string(),
        expected: expected.iter().map(|s| s.to_string()).collect(),
        pos: found.pos,
    })
}

fn parse_u32(tok: &Token) -> Result<u32> {
    tok.lit.parse().map_err(|_| {
        Error::Syntax(ParseError {
            message: Some(format!("integer literal {} out of range", tok.lit)),
            found: tok.lit.clone(),
            expected: vec!["integer".to_string()],
            pos: tok.pos,
        })
    })
}

fn parse_i64(tok: &Token) -> Result<i64> {
    tok.lit.parse().map_err(|_| {
        Error::Syntax(ParseError {
            message: Some(format!("integer literal {} out of range", tok.lit)),
            found: tok.lit.clone(),
            expected: vec!["integer".to_string()],
            pos: tok.pos,
        })
    })
}

fn parse_f64(tok: &Token) -> Result<f64> {
    tok.lit.parse().map_err(|_| {
        Error::Syntax(ParseError {
            message: Some(format!("invalid number literal {}", tok.lit)),
            found: tok.lit.clone(),
            expected: vec!["number".to_string()],
            pos: tok.pos,
        })
    })
}

/// Bounds from a whole `[*...]` token, e.g. `[*]`, `[*2]`, `[*1..3]`.
fn parse_rel_range(tok: &Token) -> Result<HopRange> {
    let malformed = || {
        Error::Syntax(ParseError {
            message: Some(format!("malformed relationship range {}", tok.lit)),
            found: tok.lit.clone(),
            expected: vec!["[*min..max]".to_string()],
            pos: tok.pos,
        })
    };

    let body = tok
        .lit
        .strip_prefix("[*")
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(malformed)?
        .trim();

    let bound = |s: &str| -> Result<Option<u32>> {
        let s = s.trim();
        if s.is_empty() {
            Ok(None)
        } else {
            s.parse().map(Some).map_err(|_| malformed())
        }
    };

    let hops = match body.split_once("..") {
        Some((lo, hi)) => HopRange {
            min: bound(lo)?,
            max: bound(hi)?,
        },
        None => {
            let n = bound(body)?;
            HopRange { min: n, max: n }
        }
    };

    validate_hop_range(hops, tok)?;
    Ok(hops)
}

fn validate_hop_range(hops: HopRange, tok: &Token) -> Result<()> {
    if let (Some(min), Some(max)) = (hops.min, hops.max) {
        if min > max {
            return Err(Error::Syntax(ParseError {
                message: Some(format!("invalid hop range: {min} exceeds {max}")),
                found: tok.text().to_string(),
                expected: vec!["min <= max".to_string()],
                pos: tok.pos,
            }));
        }
    }
    Ok(())
}
