//! Parens reader
//!
//! Turns source text into forms. Forms are ordinary [`Value`](crate::runtime::Value)s;
//! there is no separate syntax tree.

mod sexpr_parser;

pub use sexpr_parser::{read_all, read_next, read_str, SExprParser, MAX_NESTING};
