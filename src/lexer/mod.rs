//! Lexical analysis for Parens
//!
//! Converts source text into a stream of tokens. Commas count as whitespace
//! and `;` starts a line comment.

mod sexpr_scanner;
mod token;

pub use sexpr_scanner::SExprScanner;
pub use token::{Token, TokenKind};
