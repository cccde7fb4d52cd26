//! Lexical scanner.
//!
//! Converts query text into positioned [`Token`]s. Whitespace and comments
//! are emitted as tokens of their own and filtered by the parser. Lexical
//! violations surface as `BadString` / `BadEscape` / `Illegal` tokens; the
//! parser turns them into errors.

use crate::token::{Pos, Token, TokenKind, lookup};

const EOF_CHAR: char = '\0';

/// Character reader with pushback and position tracking.
///
/// The whole input is decoded up front, one `(char, Pos)` per code point,
/// with `\r\n` normalized to `\n`. `unread` simply steps the cursor back,
/// restoring the previous position exactly.
struct CharReader {
    buf: Vec<(char, Pos)>,
    i: usize,
    end: Pos,
}

impl CharReader {
    fn new(input: &str) -> Self {
        let mut buf = Vec::with_capacity(input.len());
        let mut pos = Pos::default();
        let mut chars = input.char_indices().peekable();
        while let Some((offset, mut ch)) = chars.next() {
            if ch == '\r' {
                if let Some((_, '\n')) = chars.peek() {
                    chars.next();
                }
                ch = '\n';
            }
            buf.push((ch, Pos { offset, ..pos }));
            if ch == '\n' {
                pos.line += 1;
                pos.column = 0;
            } else {
                pos.column += 1;
            }
        }
        let end = Pos {
            offset: input.len(),
            ..pos
        };
        Self { buf, i: 0, end }
    }

    fn read(&mut self) -> (char, Pos) {
        match self.buf.get(self.i) {
            Some(&(ch, pos)) => {
                self.i += 1;
                (ch, pos)
            }
            None => (EOF_CHAR, self.end),
        }
    }

    fn unread(&mut self) {
        if self.i > 0 {
            self.i -= 1;
        }
    }

    fn peek(&self) -> char {
        self.buf.get(self.i).map_or(EOF_CHAR, |&(ch, _)| ch)
    }

    /// One character past the next one, without consuming anything.
    fn peek2(&self) -> char {
        self.buf.get(self.i + 1).map_or(EOF_CHAR, |&(ch, _)| ch)
    }
}

/// The lexical scanner. Produces one token per [`Scanner::scan`] call,
/// ending with an `Eof` token that repeats indefinitely.
pub struct Scanner {
    r: CharReader,
}

impl Scanner {
    pub fn new(input: &str) -> Self {
        Self {
            r: CharReader::new(input),
        }
    }

    pub fn scan(&mut self) -> Token {
        let (ch0, pos) = self.r.read();

        if is_whitespace(ch0) {
            return self.scan_whitespace(ch0, pos);
        }
        if is_letter(ch0) || ch0 == '_' {
            self.r.unread();
            return self.scan_ident(pos, true);
        }
        if ch0.is_ascii_digit() {
            return self.scan_number(ch0, pos);
        }

        match ch0 {
            EOF_CHAR => Token::new(TokenKind::Eof, "", pos),
            '"' | '\'' => self.scan_string(ch0, pos),
            '`' => {
                self.r.unread();
                self.scan_ident(pos, false)
            }
            '+' => {
                if self.r.peek() == '=' {
                    self.r.read();
                    Token::new(TokenKind::Inc, "", pos)
                } else {
                    Token::new(TokenKind::Plus, "", pos)
                }
            }
            '*' => Token::new(TokenKind::Mul, "", pos),
            '%' => Token::new(TokenKind::Mod, "", pos),
            '^' => Token::new(TokenKind::Pow, "", pos),
            '(' => Token::new(TokenKind::Lparen, "", pos),
            ')' => Token::new(TokenKind::Rparen, "", pos),
            '{' => Token::new(TokenKind::Lbrace, "", pos),
            '}' => Token::new(TokenKind::Rbrace, "", pos),
            '[' => {
                // `[*` opens a variable-length relationship token that runs
                // through the matching `]`.
                if self.r.peek() == '*' {
                    self.scan_rel_range(pos)
                } else {
                    Token::new(TokenKind::Lbracket, "", pos)
                }
            }
            ']' => Token::new(TokenKind::Rbracket, "", pos),
            ',' => Token::new(TokenKind::Comma, "", pos),
            ';' => Token::new(TokenKind::Semicolon, "", pos),
            ':' => Token::new(TokenKind::Colon, "", pos),
            '-' => {
                if self.r.peek() == '>' {
                    self.r.read();
                    Token::new(TokenKind::EdgeRight, "", pos)
                } else {
                    Token::new(TokenKind::Sub, "", pos)
                }
            }
            '=' => Token::new(TokenKind::Eq, "", pos),
            '.' => {
                if self.r.peek() == '.' {
                    self.r.read();
                    Token::new(TokenKind::DoubleDot, "", pos)
                } else {
                    Token::new(TokenKind::Dot, "", pos)
                }
            }
            '|' => Token::new(TokenKind::Bar, "", pos),
            '<' => match self.r.peek() {
                '>' => {
                    self.r.read();
                    Token::new(TokenKind::Neq, "", pos)
                }
                '=' => {
                    self.r.read();
                    Token::new(TokenKind::Lte, "", pos)
                }
                '-' => {
                    self.r.read();
                    Token::new(TokenKind::EdgeLeft, "", pos)
                }
                _ => Token::new(TokenKind::Lt, "", pos),
            },
            '>' => {
                if self.r.peek() == '=' {
                    self.r.read();
                    Token::new(TokenKind::Gte, "", pos)
                } else {
                    Token::new(TokenKind::Gt, "", pos)
                }
            }
            '/' => match self.r.peek() {
                '*' => {
                    self.r.read();
                    if self.skip_until_end_comment() {
                        Token::new(TokenKind::Comment, "/*", pos)
                    } else {
                        Token::new(TokenKind::Illegal, "/*", pos)
                    }
                }
                '/' => {
                    self.r.read();
                    self.skip_until_newline();
                    Token::new(TokenKind::Comment, "//", pos)
                }
                _ => Token::new(TokenKind::Div, "", pos),
            },
            other => Token::new(TokenKind::Illegal, other.to_string(), pos),
        }
    }

    fn scan_whitespace(&mut self, first: char, pos: Pos) -> Token {
        let mut lit = String::new();
        lit.push(first);
        loop {
            let (ch, _) = self.r.read();
            if ch == EOF_CHAR {
                break;
            }
            if !is_whitespace(ch) {
                self.r.unread();
                break;
            }
            lit.push(ch);
        }
        Token::new(TokenKind::Ws, lit, pos)
    }

    /// Scans an identifier: a bare ident run, or a backtick/quote-delimited
    /// string treated as an identifier. When `keyword_lookup` is set, bare
    /// identifiers are checked against the reserved-word table.
    fn scan_ident(&mut self, pos: Pos, keyword_lookup: bool) -> Token {
        let (first, _) = self.r.read();
        if first == '`' || first == '"' || first == '\'' {
            let tok = self.scan_string(first, pos);
            return match tok.kind {
                TokenKind::Str => Token::new(TokenKind::Ident, tok.lit, pos),
                _ => tok, // BadString / BadEscape pass through
            };
        }

        let mut lit = String::new();
        lit.push(first);
        loop {
            let (ch, _) = self.r.read();
            if is_ident_char(ch) {
                lit.push(ch);
            } else {
                if ch != EOF_CHAR {
                    self.r.unread();
                }
                break;
            }
        }

        if keyword_lookup {
            let kind = lookup(&lit);
            if kind != TokenKind::Ident {
                return Token::new(kind, lit, pos);
            }
        }
        Token::new(TokenKind::Ident, lit, pos)
    }

    /// Scans a quoted string body. The opening quote is `ending`; escapes
    /// are `\n`, `\\`, `\"`, `\'` and `` \` ``. Any other escape is a
    /// `BadEscape`; EOF or a raw newline before the closing quote is a
    /// `BadString`.
    fn scan_string(&mut self, ending: char, pos: Pos) -> Token {
        let mut lit = String::new();
        loop {
            let (ch, _) = self.r.read();
            if ch == ending {
                return Token::new(TokenKind::Str, lit, pos);
            }
            if ch == EOF_CHAR || ch == '\n' {
                return Token::new(TokenKind::BadString, lit, pos);
            }
            if ch == '\\' {
                let (esc, _) = self.r.read();
                match esc {
                    'n' => lit.push('\n'),
                    '\\' => lit.push('\\'),
                    '"' => lit.push('"'),
                    '\'' => lit.push('\''),
                    '`' => lit.push('`'),
                    other => {
                        let mut bad = String::from('\\');
                        if other != EOF_CHAR {
                            bad.push(other);
                        }
                        return Token::new(TokenKind::BadEscape, bad, pos);
                    }
                }
            } else {
                lit.push(ch);
            }
        }
    }

    /// Scans an integer or decimal literal. A `.` followed by another `.`
    /// belongs to a range operator, not to this number.
    fn scan_number(&mut self, first: char, pos: Pos) -> Token {
        let mut lit = String::new();
        lit.push(first);
        lit.push_str(&self.scan_digits());

        if self.r.peek() == '.' && self.r.peek2().is_ascii_digit() {
            let (dot, _) = self.r.read();
            lit.push(dot);
            lit.push_str(&self.scan_digits());
            return Token::new(TokenKind::Number, lit, pos);
        }
        Token::new(TokenKind::Integer, lit, pos)
    }

    fn scan_digits(&mut self) -> String {
        let mut digits = String::new();
        loop {
            let (ch, _) = self.r.read();
            if ch.is_ascii_digit() {
                digits.push(ch);
            } else {
                if ch != EOF_CHAR {
                    self.r.unread();
                }
                break;
            }
        }
        digits
    }

    /// Scans `[*` through the matching `]` as one token, e.g. `[*1..3]`.
    fn scan_rel_range(&mut self, pos: Pos) -> Token {
        let mut lit = String::from("[");
        loop {
            let (ch, _) = self.r.read();
            if ch == EOF_CHAR {
                return Token::new(TokenKind::Illegal, lit, pos);
            }
            lit.push(ch);
            if ch == ']' {
                return Token::new(TokenKind::RelRange, lit, pos);
            }
        }
    }

    fn skip_until_newline(&mut self) {
        loop {
            let (ch, _) = self.r.read();
            if ch == '\n' || ch == EOF_CHAR {
                return;
            }
        }
    }

    /// Skips to the first `*/`. Block comments do not nest. Returns false
    /// on EOF before the terminator.
    fn skip_until_end_comment(&mut self) -> bool {
        loop {
            let (ch, _) = self.r.read();
            match ch {
                '*' => {
                    if self.r.peek() == '/' {
                        self.r.read();
                        return true;
                    }
                }
                EOF_CHAR => return false,
                _ => {}
            }
        }
    }
}

fn is_whitespace(ch: char) -> bool {
    ch == ' ' || ch == '\t' || ch == '\n'
}

fn is_letter(ch: char) -> bool {
    ch.is_ascii_alphabetic()
}

fn is_ident_char(ch: char) -> bool {
    is_letter(ch) || ch.is_ascii_digit() || ch == '_'
}
