//! Token kinds produced by the lexer (spec component B).

use crate::diagnostics::Position;

/// A lexical token together with its source position.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The token's kind and payload.
    pub kind: TokenKind,
    /// Position of the first character of this token.
    pub position: Position,
    /// Line-indent accumulated up to this token (space=1, tab=2), only
    /// meaningful on `Indent`/`BlockIndent` tokens.
    pub indent: Option<u32>,
}

impl Token {
    pub(crate) fn new(kind: TokenKind, position: Position) -> Self {
        Self { kind, position, indent: None }
    }

    pub(crate) fn with_indent(mut self, indent: u32) -> Self {
        self.indent = Some(indent);
        self
    }
}

/// The distinguishable shapes of token the lexer can produce.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// A bare or backtick-quoted name.
    Name(String),
    /// A `$name` or bare `$` variable reference.
    Variable(String),
    /// A numeric literal, already parsed.
    Number(f64),
    /// A string literal, escapes already resolved.
    String(String),
    /// `true`/`false`/`null`, carried as a pre-built JSON value so the
    /// parser does not need to special-case the three keywords.
    Value(serde_json::Value),
    /// An operator or punctuation symbol, e.g. `"+"`, `".."`, `":="`.
    Operator(&'static str),
    /// A lazily-scanned regular expression literal `/pattern/flags`.
    Regex { pattern: String, flags: String },
    /// A single-line `http://`, `https://`, or `urn:` literal.
    Url(String),
    /// A synthetic indentation marker emitted at the start of a FLASH
    /// rule/bind line. Carries the indent level via [`Token::indent`].
    Indent,
    /// A synthetic marker emitted before `Instance:`/`InstanceOf:`.
    BlockIndent,
    /// The `InstanceOf:` keyword, value is the profile identifier token
    /// text that follows (filled in by the lexer when unambiguous) or
    /// empty when the identifier is itself emitted as a separate token.
    InstanceOf,
    /// End of input.
    Eof,
}

impl TokenKind {
    /// A human-readable rendering used in error messages.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Name(n) => n.clone(),
            TokenKind::Variable(n) => format!("${n}"),
            TokenKind::Number(n) => n.to_string(),
            TokenKind::String(s) => format!("{s:?}"),
            TokenKind::Value(v) => v.to_string(),
            TokenKind::Operator(op) => (*op).to_string(),
            TokenKind::Regex { pattern, flags } => format!("/{pattern}/{flags}"),
            TokenKind::Url(u) => u.clone(),
            TokenKind::Indent => "(indent)".to_string(),
            TokenKind::BlockIndent => "(blockindent)".to_string(),
            TokenKind::InstanceOf => "InstanceOf:".to_string(),
            TokenKind::Eof => "(end)".to_string(),
        }
    }
}
