//! Error types for the Parens interpreter

use thiserror::Error;

use crate::runtime::{printer, Value};

/// Interpreter errors
///
/// Every failure the reader, evaluator or a primitive can produce funnels
/// through this one enum. In-language `try/catch` sees all of them the same
/// way, through [`Error::catch_value`].
#[derive(Error, Debug, Clone)]
pub enum Error {
    // Reader errors
    /// Syntax error encountered while reading
    ///
    /// **Triggered by:** unbalanced delimiters, unterminated strings, bad
    /// escapes, trailing content after a form
    /// **Example:** `(+ 1 2))`
    #[error("Syntax error at line {line}, column {col}: {message}")]
    SyntaxError {
        /// Line number where error occurred
        line: usize,
        /// Column number where error occurred
        col: usize,
        /// Error description
        message: String,
    },

    /// Source ended before a complete form was read
    #[error("Unexpected end of input")]
    UnexpectedEof,

    // Runtime errors
    /// Symbol with no binding in any enclosing frame
    ///
    /// **Triggered by:** referencing a symbol that was never `def`ed or bound
    /// **Example:** `(+ undefined-thing 1)`
    #[error("'{name}' not found")]
    UnboundSymbol {
        /// Symbol name
        name: String,
    },

    /// Type mismatch error
    ///
    /// **Triggered by:** a primitive or special form receiving the wrong kind of value
    /// **Example:** `(+ "hello" 5)`
    #[error("Type error: expected {expected}, got {got}")]
    TypeError {
        /// Expected type
        expected: String,
        /// Actual type
        got: String,
    },

    /// Wrong number of arguments
    ///
    /// **Triggered by:** calling a function, primitive or special form with too
    /// few or too many arguments
    #[error("Wrong number of arguments to {name}: expected {expected}, got {got}")]
    ArityError {
        /// Callee name
        name: String,
        /// Expected argument count description
        expected: String,
        /// Actual argument count
        got: usize,
    },

    /// Invalid arguments provided to a primitive
    #[error("Invalid arguments for {tool}: {reason}")]
    InvalidArguments {
        /// Primitive or special form name
        tool: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Division by zero error
    #[error("Division by zero")]
    DivisionByZero,

    /// Sequence index out of bounds
    #[error("Index out of bounds: {index} for sequence of length {length}")]
    IndexOutOfBounds {
        /// Requested index
        index: i64,
        /// Sequence length
        length: usize,
    },

    /// Attempt to call a non-callable value
    #[error("Value is not callable: {type_name}")]
    NotCallable {
        /// Type of non-callable value
        type_name: String,
    },

    /// `recur` evaluated with no enclosing `loop`
    #[error("recur used outside of loop")]
    InvalidRecur,

    /// Non-tail evaluation nested deeper than the configured limit
    #[error("Recursion limit exceeded (max depth: {limit})")]
    RecursionLimit {
        /// Configured maximum depth
        limit: usize,
    },

    /// Invalid regular expression
    #[error("Invalid regex {pattern}: {reason}")]
    InvalidRegex {
        /// Pattern text
        pattern: String,
        /// Failure reason from the regex engine
        reason: String,
    },

    // User-defined
    /// Value raised by interpreted code through `throw`
    #[error("{}", printer::pr_str(.0, false))]
    UserSignaled(Box<Value>),

    /// The bootstrap library failed to load
    #[error("Bootstrap failed: {0}")]
    BootstrapFailed(String),

    /// Evaluator configuration could not be parsed
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Create a type error from an expected description and the offending value
    pub fn type_error(expected: impl Into<String>, got: &Value) -> Self {
        Error::TypeError {
            expected: expected.into(),
            got: got.type_name().to_string(),
        }
    }

    /// Create an arity error
    pub fn arity(name: impl Into<String>, expected: impl Into<String>, got: usize) -> Self {
        Error::ArityError {
            name: name.into(),
            expected: expected.into(),
            got,
        }
    }

    /// Value bound to the symbol of a `catch` clause.
    ///
    /// Values raised with `throw` are handed over unchanged; every host-side
    /// failure becomes its message string.
    pub fn catch_value(&self) -> Value {
        match self {
            Error::UserSignaled(value) => (**value).clone(),
            other => Value::string(other.to_string()),
        }
    }
}

/// Result type for Parens operations
pub type Result<T> = std::result::Result<T, Error>;
