//! # Parens - a small Clojure-flavoured Lisp
//!
//! An embeddable interpreter for a Clojure subset: a reader, a tail-call
//! trampolining evaluator with macros and quasiquote, a native primitive
//! library, and a bootstrap library written in the language itself.
//!
//! ## Quick Start
//!
//! ```rust
//! use parens::{Evaluator, Result};
//!
//! # fn main() -> Result<()> {
//! let mut evaluator = Evaluator::new()?;
//!
//! // Definitions persist between calls
//! evaluator.evaluate("(defn square [x] (* x x))")?;
//! assert_eq!(evaluator.evaluate("(map square [1 2 3])")?, "(1 4 9)");
//!
//! // Keywords, maps and vectors are callable
//! assert_eq!(evaluator.evaluate("(:a {:a 1 :b 2})")?, "1");
//! # Ok(())
//! # }
//! ```
//!
//! ### Reading and printing
//!
//! Source text becomes ordinary [`Value`]s; there is no separate AST.
//!
//! ```rust
//! use parens::{pr_str, read_str, Value};
//!
//! # fn main() -> parens::Result<()> {
//! let form = read_str("(+ 1 [2 \"three\"])")?;
//! assert!(matches!(form, Value::List(_)));
//! assert_eq!(pr_str(&form, true), "(+ 1 [2 \"three\"])");
//! # Ok(())
//! # }
//! ```
//!
//! ## Language Overview
//!
//! - **Data**: `nil`, booleans, integers, floats, strings, symbols,
//!   `:keywords`, lists `(1 2)`, vectors `[1 2]`, maps `{:a 1}`, atoms and
//!   regexes `#"\d+"`
//! - **Special forms**: `def`, `let*`, `if`, `do`, `fn`, `defmacro`, `quote`,
//!   `quasiquote`, `macroexpand`, `try`/`catch`/`finally`, `loop`/`recur`,
//!   `deftest`/`testing`
//! - **Bootstrap macros**: `defn`, `let`, `when`, `cond`, `and`, `or`, `->`,
//!   `->>`, `dotimes`, `doseq`
//!
//! Tail positions (`if` branches, the last form of `do`/`let*`/`fn`
//! bodies, `recur`) run in constant host stack:
//!
//! ```rust
//! # fn main() -> parens::Result<()> {
//! let mut evaluator = parens::Evaluator::new()?;
//! let sum = evaluator.evaluate("(loop [i 0 acc 0] (if (= i 10000) acc (recur (inc i) (+ acc i))))")?;
//! assert_eq!(sum, "49995000");
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Every failure is an [`Error`]. Inside the language, `try/catch` catches
//! all of them: values raised with `throw` are bound as they are, any other
//! failure is bound as its message string.
//!
//! ```rust
//! use parens::{Error, Evaluator};
//!
//! # fn main() -> parens::Result<()> {
//! let mut evaluator = Evaluator::new()?;
//! assert!(matches!(
//!     evaluator.evaluate("undefined-thing"),
//!     Err(Error::UnboundSymbol { .. })
//! ));
//! assert_eq!(
//!     evaluator.evaluate("(try (/ 1 0) (catch e (str \"caught: \" e)))")?,
//!     "\"caught: Division by zero\""
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Source Code → Scanner → Tokens → Parser → Forms → Evaluator → Value → Printer
//! ```
//!
//! - [`Scanner`] - Tokenizes source code
//! - [`Parser`] - Reads tokens into forms
//! - [`Evaluator`] - Evaluates forms against the root [`Environment`]
//! - [`ToolRegistry`] - Native primitives

#![warn(missing_docs)]

/// Version of the Parens interpreter
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod error;
pub mod lexer;
pub mod parser;
pub mod runtime;
pub mod tools;

// Re-export main types
pub use error::{Error, Result};
pub use lexer::{SExprScanner, Token, TokenKind};
pub use parser::{read_all, read_next, read_str, SExprParser};
pub use runtime::{
    pr_str, Env, Environment, EvaluatorConfig, LispEvaluator, TestRecord, TestSession, Value,
};
pub use tools::{Callback, Tool, ToolRegistry};

/// Type alias for the S-expression scanner (lexer).
/// Converts raw source text into tokens for the parser.
pub type Scanner = SExprScanner;

/// Type alias for the S-expression parser (the reader).
pub type Parser = SExprParser;

/// Type alias for the LISP evaluator (interpreter).
pub type Evaluator = LispEvaluator;
