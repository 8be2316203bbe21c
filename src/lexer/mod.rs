//! Tokenizer: indentation tracking, URL/URN literals, FLASH keywords, lazy
//! regex scanning, comments (spec §4.1).

pub mod error;
pub mod token;

pub use error::LexError;
pub use token::{Token, TokenKind};

use crate::diagnostics::{ErrorCode, Position};

/// Operators recognized by the lexer, longest-match first. `.` and `..`
/// are both here; longer entries must precede their prefixes.
const OPERATORS: &[&str] = &[
    "..", ":=", "!=", "<=", ">=", "??", "?:", "~>", "and", "or", "in", "(", ")", "[", "]", "{",
    "}", ".", ",", "@", "#", "+", "-", "*", "/", "%", "|", "=", "<", ">", "^", ":", "?", ";",
    "!", "&",
];

/// A pull-based tokenizer over a source buffer.
pub struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: u32,
    line_start: usize,
    line_indent: u32,
    indent_emitted_this_line: bool,
    /// Whether the parser is currently inside a FLASH block, which
    /// controls synthetic `indent`/`blockindent` emission.
    pub flash_mode: bool,
    peeked: Option<Token>,
}

impl<'a> Lexer<'a> {
    /// Build a lexer over `src`.
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            line: 1,
            line_start: 0,
            line_indent: 0,
            indent_emitted_this_line: false,
            flash_mode: false,
            peeked: None,
        }
    }

    fn position(&self) -> Position {
        Position { offset: self.pos, line: self.line, start: self.pos }
    }

    fn peek_byte(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_byte_at(&self, n: usize) -> Option<u8> {
        self.bytes.get(self.pos + n).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let rest = &self.src[self.pos..];
        let ch = rest.chars().next()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    /// Consume whitespace and comments, tracking line/indent state. On a
    /// newline, the indent accumulator resets; each leading space/tab on
    /// the new line adds to it (space=1, tab=2) until a non-blank char.
    fn skip_trivia(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek_byte() {
                Some(b'\r') => {
                    self.pos += 1;
                    if self.peek_byte() == Some(b'\n') {
                        self.pos += 1;
                    }
                    self.newline();
                }
                Some(b'\n') => {
                    self.pos += 1;
                    self.newline();
                }
                Some(b' ') => {
                    self.pos += 1;
                    self.line_indent += 1;
                }
                Some(b'\t') => {
                    self.pos += 1;
                    self.line_indent += 2;
                }
                Some(b'/') if self.peek_byte_at(1) == Some(b'/') => {
                    while !matches!(self.peek_byte(), None | Some(b'\n') | Some(b'\r')) {
                        self.pos += 1;
                    }
                }
                Some(b'/') if self.peek_byte_at(1) == Some(b'*') => {
                    let start = self.position();
                    self.pos += 2;
                    loop {
                        match self.peek_byte() {
                            None => return Err(LexError::new(ErrorCode::S0106, start, &[])),
                            Some(b'*') if self.peek_byte_at(1) == Some(b'/') => {
                                self.pos += 2;
                                break;
                            }
                            Some(b'\n') => {
                                self.pos += 1;
                                self.newline();
                            }
                            _ => {
                                self.pos += 1;
                            }
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn newline(&mut self) {
        self.line += 1;
        self.line_start = self.pos;
        self.line_indent = 0;
        self.indent_emitted_this_line = false;
    }

    fn is_at_line_start(&self) -> bool {
        self.bytes[self.line_start..self.pos].iter().all(|b| *b == b' ' || *b == b'\t')
    }

    /// Peek at the next token without consuming it.
    pub fn peek(&mut self) -> Result<&Token, LexError> {
        if self.peeked.is_none() {
            let tok = self.scan_next()?;
            self.peeked = Some(tok);
        }
        Ok(self.peeked.as_ref().unwrap())
    }

    /// Consume and return the next token.
    pub fn next(&mut self) -> Result<Token, LexError> {
        if let Some(tok) = self.peeked.take() {
            return Ok(tok);
        }
        self.scan_next()
    }

    fn scan_next(&mut self) -> Result<Token, LexError> {
        self.skip_trivia()?;

        let at_line_start = self.is_at_line_start();
        let indent = self.line_indent;

        if at_line_start && self.flash_mode && !self.indent_emitted_this_line {
            if self.rest().starts_with("Instance:") || self.rest().starts_with("InstanceOf:") {
                self.indent_emitted_this_line = true;
                return Ok(Token::new(TokenKind::BlockIndent, self.position()).with_indent(indent));
            }
            if matches!(self.peek_byte(), Some(b'*') | Some(b'$')) {
                self.indent_emitted_this_line = true;
                return Ok(Token::new(TokenKind::Indent, self.position()).with_indent(indent));
            }
        }

        let start = self.position();
        let Some(ch) = self.peek_byte() else {
            return Ok(Token::new(TokenKind::Eof, start));
        };

        if self.rest().starts_with("http://")
            || self.rest().starts_with("https://")
            || self.rest().starts_with("urn:")
        {
            return Ok(self.scan_url(start));
        }

        if self.rest().starts_with("InstanceOf:") {
            self.pos += "InstanceOf:".len();
            return Ok(Token::new(TokenKind::InstanceOf, start));
        }

        if ch == b'"' || ch == b'\'' {
            return self.scan_string(start, ch as char);
        }

        if ch == b'`' {
            return self.scan_quoted_name(start);
        }

        if ch.is_ascii_digit() || (ch == b'-' && self.peek_byte_at(1).is_some_and(|b| b.is_ascii_digit())) {
            // `-` is also a unary/binary operator; only consume as a number
            // when it is unambiguously a numeric literal start is handled
            // by the parser (it requests numbers only in prefix position).
            if ch.is_ascii_digit() {
                return self.scan_number(start);
            }
        }

        if ch == b'$' {
            return Ok(self.scan_variable(start));
        }

        if is_name_start(ch as char) || !ch.is_ascii() {
            return Ok(self.scan_name(start));
        }

        self.scan_operator(start)
    }

    fn scan_url(&mut self, start: Position) -> Token {
        let begin = self.pos;
        while !matches!(self.peek_byte(), None | Some(b' ') | Some(b'\t') | Some(b'\n') | Some(b'\r') | Some(b')')) {
            self.pos += 1;
        }
        let text = self.src[begin..self.pos].to_string();
        Token::new(TokenKind::Url(text), start)
    }

    fn scan_string(&mut self, start: Position, quote: char) -> Result<Token, LexError> {
        self.pos += 1;
        let mut out = String::new();
        loop {
            match self.advance() {
                None => return Err(LexError::new(ErrorCode::S0101, start, &[])),
                Some(c) if c == quote => break,
                Some('\\') => match self.advance() {
                    Some('"') => out.push('"'),
                    Some('\'') => out.push('\''),
                    Some('\\') => out.push('\\'),
                    Some('/') => out.push('/'),
                    Some('b') => out.push('\u{8}'),
                    Some('f') => out.push('\u{c}'),
                    Some('n') => out.push('\n'),
                    Some('r') => out.push('\r'),
                    Some('t') => out.push('\t'),
                    Some('u') => {
                        let mut hex = String::with_capacity(4);
                        for _ in 0..4 {
                            match self.advance() {
                                Some(h) if h.is_ascii_hexdigit() => hex.push(h),
                                _ => return Err(LexError::new(ErrorCode::S0104, start, &[])),
                            }
                        }
                        let code = u32::from_str_radix(&hex, 16).unwrap_or(0);
                        match char::from_u32(code) {
                            Some(c) => out.push(c),
                            None => return Err(LexError::new(ErrorCode::S0104, start, &[])),
                        }
                    }
                    Some(other) => {
                        return Err(LexError::new(
                            ErrorCode::S0103,
                            start,
                            &[("char", other.to_string())],
                        ));
                    }
                    None => return Err(LexError::new(ErrorCode::S0101, start, &[])),
                },
                Some(c) => out.push(c),
            }
        }
        Ok(Token::new(TokenKind::String(out), start))
    }

    fn scan_quoted_name(&mut self, start: Position) -> Result<Token, LexError> {
        self.pos += 1;
        let begin = self.pos;
        loop {
            match self.peek_byte() {
                None => return Err(LexError::new(ErrorCode::S0105, start, &[])),
                Some(b'`') => {
                    let name = self.src[begin..self.pos].to_string();
                    self.pos += 1;
                    return Ok(Token::new(TokenKind::Name(name), start));
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    fn scan_number(&mut self, start: Position) -> Result<Token, LexError> {
        let begin = self.pos;
        if self.peek_byte() == Some(b'0') {
            self.pos += 1;
        } else {
            while self.peek_byte().is_some_and(|b| b.is_ascii_digit()) {
                self.pos += 1;
            }
        }
        if self.peek_byte() == Some(b'.') && self.peek_byte_at(1).is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
            while self.peek_byte().is_some_and(|b| b.is_ascii_digit()) {
                self.pos += 1;
            }
        }
        if matches!(self.peek_byte(), Some(b'e') | Some(b'E')) {
            let save = self.pos;
            self.pos += 1;
            if matches!(self.peek_byte(), Some(b'+') | Some(b'-')) {
                self.pos += 1;
            }
            if self.peek_byte().is_some_and(|b| b.is_ascii_digit()) {
                while self.peek_byte().is_some_and(|b| b.is_ascii_digit()) {
                    self.pos += 1;
                }
            } else {
                self.pos = save;
            }
        }
        let text = &self.src[begin..self.pos];
        match text.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(Token::new(TokenKind::Number(n), start)),
            _ => Err(LexError::new(ErrorCode::S0102, start, &[("token", text.to_string())])),
        }
    }

    fn scan_variable(&mut self, start: Position) -> Token {
        self.pos += 1;
        let begin = self.pos;
        while self.peek_byte().is_some_and(|b| is_name_continue(b as char)) {
            self.pos += 1;
        }
        let name = self.src[begin..self.pos].to_string();
        Token::new(TokenKind::Variable(name), start)
    }

    fn scan_name(&mut self, start: Position) -> Token {
        let begin = self.pos;
        while let Some(ch) = self.rest().chars().next() {
            if is_name_continue(ch) {
                self.pos += ch.len_utf8();
            } else {
                break;
            }
        }
        let text = &self.src[begin..self.pos];
        match text {
            "true" => Token::new(TokenKind::Value(serde_json::Value::Bool(true)), start),
            "false" => Token::new(TokenKind::Value(serde_json::Value::Bool(false)), start),
            "null" => Token::new(TokenKind::Value(serde_json::Value::Null), start),
            "and" | "or" | "in" => Token::new(TokenKind::Operator(intern_keyword(text)), start),
            _ => Token::new(TokenKind::Name(text.to_string()), start),
        }
    }

    fn scan_operator(&mut self, start: Position) -> Result<Token, LexError> {
        for op in OPERATORS {
            if op.chars().next().unwrap().is_ascii_alphabetic() {
                continue; // keywords handled by scan_name
            }
            if self.rest().starts_with(op) {
                self.pos += op.len();
                return Ok(Token::new(TokenKind::Operator(op), start));
            }
        }
        Err(LexError::new(
            ErrorCode::S0211,
            start,
            &[("token", (self.peek_byte().map(|b| b as char).unwrap_or(' ')).to_string())],
        ))
    }

    /// Rewind by one byte after a bare `/` was consumed as an operator
    /// token, so [`Lexer::scan_regex`] can re-scan from the delimiter.
    pub fn unscan_slash(&mut self) {
        self.peeked = None;
        self.pos -= 1;
    }

    /// Scan a regex literal `/pattern/flags`, invoked by the parser when
    /// `/` appears in a prefix position. The caller must already be
    /// positioned with the opening `/` unconsumed (no token yet peeked).
    pub fn scan_regex(&mut self) -> Result<Token, LexError> {
        self.peeked = None;
        let start = self.position();
        if self.peek_byte() != Some(b'/') {
            return Err(LexError::new(ErrorCode::S0302, start, &[]));
        }
        self.pos += 1;
        let mut pattern = String::new();
        let mut depth: i32 = 0;
        loop {
            match self.peek_byte() {
                None => return Err(LexError::new(ErrorCode::S0302, start, &[])),
                Some(b'\\') => {
                    pattern.push(self.advance().unwrap());
                    if let Some(c) = self.advance() {
                        pattern.push(c);
                    }
                }
                Some(b'(') | Some(b'[') | Some(b'{') => {
                    depth += 1;
                    pattern.push(self.advance().unwrap());
                }
                Some(b')') | Some(b']') | Some(b'}') => {
                    depth -= 1;
                    pattern.push(self.advance().unwrap());
                }
                Some(b'/') if depth <= 0 => {
                    self.pos += 1;
                    break;
                }
                Some(b'\n') | None => return Err(LexError::new(ErrorCode::S0302, start, &[])),
                _ => pattern.push(self.advance().unwrap()),
            }
        }
        let flags_begin = self.pos;
        while matches!(self.peek_byte(), Some(b'i') | Some(b'm') | Some(b'g')) {
            self.pos += 1;
        }
        let flags = self.src[flags_begin..self.pos].to_string();
        Ok(Token::new(TokenKind::Regex { pattern, flags }, start))
    }
}

fn is_name_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_'
}

fn is_name_continue(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

fn intern_keyword(s: &str) -> &'static str {
    match s {
        "and" => "and",
        "or" => "or",
        "in" => "in",
        _ => unreachable!("intern_keyword called with non-keyword {s}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        let mut lex = Lexer::new(src);
        let mut out = Vec::new();
        loop {
            let tok = lex.next().unwrap();
            let done = matches!(tok.kind, TokenKind::Eof);
            out.push(tok.kind);
            if done {
                break;
            }
        }
        out
    }

    #[test]
    fn scans_arithmetic_expression() {
        let toks = kinds("1 + 2 * 3");
        assert_eq!(
            toks,
            vec![
                TokenKind::Number(1.0),
                TokenKind::Operator("+"),
                TokenKind::Number(2.0),
                TokenKind::Operator("*"),
                TokenKind::Number(3.0),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn scans_string_with_escapes() {
        let toks = kinds(r#""a\nb""#);
        assert_eq!(toks[0], TokenKind::String("a\nb".to_string()));
    }

    #[test]
    fn unterminated_string_is_s0101() {
        let mut lex = Lexer::new("\"abc");
        let err = lex.next().unwrap_err();
        assert_eq!(err.0.code, "S0101");
    }

    #[test]
    fn scans_variable_and_path() {
        let toks = kinds("$foo.bar");
        assert_eq!(
            toks,
            vec![
                TokenKind::Variable("foo".to_string()),
                TokenKind::Operator("."),
                TokenKind::Name("bar".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn scans_url_literal() {
        let toks = kinds("http://example.org/fhir/StructureDefinition/Patient");
        assert_eq!(
            toks[0],
            TokenKind::Url("http://example.org/fhir/StructureDefinition/Patient".to_string())
        );
    }

    #[test]
    fn flash_mode_emits_indent_before_star_rule() {
        let mut lex = Lexer::new("* id = 'x'");
        lex.flash_mode = true;
        let first = lex.next().unwrap();
        assert_eq!(first.kind, TokenKind::Indent);
        assert_eq!(first.indent, Some(0));
    }
}
