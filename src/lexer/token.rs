use serde::{Deserialize, Serialize};

/// A single token from the source code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// The type of token
    pub kind: TokenKind,
    /// Original text of the token
    pub lexeme: String,
    /// Line number where token starts (1-indexed)
    pub line: usize,
    /// Column number where token starts (1-indexed)
    pub column: usize,
    /// Byte offset just past the end of the token
    pub end: usize,
}

impl Token {
    /// Creates a new token with the given properties
    pub fn new(kind: TokenKind, lexeme: String, line: usize, column: usize, end: usize) -> Self {
        Token {
            kind,
            lexeme,
            line,
            column,
            end,
        }
    }
}

/// All token types of the reader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TokenKind {
    // Delimiters
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,

    // Reader macros
    /// `'` quote
    Quote,
    /// `` ` `` quasiquote
    Backtick,
    /// `~` unquote
    Tilde,
    /// `~@` splice-unquote
    TildeAt,
    /// `@` deref
    At,
    /// `#(` anonymous function literal
    HashParen,
    /// `#_` discard
    HashUnderscore,

    // Literals
    /// Integer literal
    Integer(i64),
    /// Floating-point literal
    Float(f64),
    /// String literal (escapes already processed)
    String(String),
    /// Regex literal `#"..."` (raw pattern text)
    Regex(String),
    /// `true`
    True,
    /// `false`
    False,
    /// `nil`
    Nil,

    // Identifiers
    /// Keyword name, without the leading `:`
    Keyword(String),
    /// Symbol name
    Symbol(String),

    /// End of input
    Eof,
}

impl TokenKind {
    /// Short description used in syntax errors
    pub fn describe(&self) -> String {
        match self {
            TokenKind::LeftParen => "'('".to_string(),
            TokenKind::RightParen => "')'".to_string(),
            TokenKind::LeftBracket => "'['".to_string(),
            TokenKind::RightBracket => "']'".to_string(),
            TokenKind::LeftBrace => "'{'".to_string(),
            TokenKind::RightBrace => "'}'".to_string(),
            TokenKind::Eof => "end of input".to_string(),
            other => format!("{:?}", other),
        }
    }
}
