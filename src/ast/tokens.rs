use std::fmt;

use crate::lexer::Position;
use crate::value::Duration;

/// Kind of a lexical token, with the decoded payload for literals.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    /// Integer literal
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 0
    /// ```
    Int(i64),

    /// Integer immediately followed by a unit suffix
    ///
    /// # Examples
    /// ```text
    /// 3d
    /// 2weeks
    /// 1y
    /// ```
    Duration(Duration),

    /// Double-quoted string, escapes already resolved
    ///
    /// # Examples
    /// ```text
    /// "id"
    /// "say \"hi\""
    /// ```
    Str(String),

    /// Function name or variable
    Ident(String),

    /// Project shorthand, payload includes the leading `+`
    ///
    /// # Examples
    /// ```text
    /// +garden
    /// +work.reports
    /// ```
    Project(String),

    /// Context shorthand, payload includes the leading `@`
    ///
    /// # Examples
    /// ```text
    /// @phone
    /// ```
    Context(String),

    // Keywords
    True,
    False,
    Exists,
    Forall,
    In,

    // Operators
    /// `&&` or `and`
    And,
    /// `||` or `or`
    Or,
    /// `->` or `impl`
    Implies,
    /// `!`
    Not,
    Plus,
    Minus,
    /// `==`
    EqEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Delimiters
    /// `(` or `{`
    LParen,
    /// `)` or `}`
    RParen,
    Colon,
    Comma,

    /// Lexing failed; scanning stops here
    Error(String),

    /// End of input
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Int(n) => write!(f, "integer {}", n),
            TokenKind::Duration(d) => write!(f, "duration {}", d),
            TokenKind::Str(s) => write!(f, "string \"{}\"", s),
            TokenKind::Ident(name) => write!(f, "identifier '{}'", name),
            TokenKind::Project(p) => write!(f, "project '{}'", p),
            TokenKind::Context(c) => write!(f, "context '{}'", c),
            TokenKind::True => f.write_str("'true'"),
            TokenKind::False => f.write_str("'false'"),
            TokenKind::Exists => f.write_str("'exists'"),
            TokenKind::Forall => f.write_str("'forall'"),
            TokenKind::In => f.write_str("'in'"),
            TokenKind::And => f.write_str("'&&'"),
            TokenKind::Or => f.write_str("'||'"),
            TokenKind::Implies => f.write_str("'->'"),
            TokenKind::Not => f.write_str("'!'"),
            TokenKind::Plus => f.write_str("'+'"),
            TokenKind::Minus => f.write_str("'-'"),
            TokenKind::EqEq => f.write_str("'=='"),
            TokenKind::Lt => f.write_str("'<'"),
            TokenKind::LtEq => f.write_str("'<='"),
            TokenKind::Gt => f.write_str("'>'"),
            TokenKind::GtEq => f.write_str("'>='"),
            TokenKind::LParen => f.write_str("'('"),
            TokenKind::RParen => f.write_str("')'"),
            TokenKind::Colon => f.write_str("':'"),
            TokenKind::Comma => f.write_str("','"),
            TokenKind::Error(message) => write!(f, "error ({})", message),
            TokenKind::Eof => f.write_str("end of input"),
        }
    }
}

/// A token with the position of its first character and its source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: Position,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, position: Position, text: impl Into<String>) -> Self {
        Token {
            kind,
            position,
            text: text.into(),
        }
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}
