//! Runtime for Parens programs: values, environments, evaluation and printing

mod config;
mod environment;
mod lisp_evaluator;
pub mod printer;
mod quasiquote;
mod session;
mod special_forms;
mod value;

pub use config::EvaluatorConfig;
pub use environment::{Env, Environment, LoopPoint};
pub use lisp_evaluator::LispEvaluator;
pub use printer::{pr_seq, pr_str};
pub use quasiquote::quasiquote;
pub use session::{TestRecord, TestSession};
pub use special_forms::SpecialForm;
pub use value::{Closure, Function, Params, Value};

/// Remaining stack below which recursive walks move to a fresh segment
const STACK_RED_ZONE: usize = 128 * 1024;
/// Size of each stack segment allocated on demand
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024;

/// Runs `f`, first switching to a new stack segment when the current one is
/// nearly used up.
///
/// Every recursive walk over forms or values goes through this, so nesting
/// depth is bounded by memory and `max_depth`, never by the thread's stack.
pub(crate) fn with_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, f)
}
