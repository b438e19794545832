//! Standard primitive library
//!
//! Only what has to be native lives here, plus the sequence functions that
//! would copy their input on every step if written in the language itself.
//! Everything else (`defn`, `cond`, `comp`, ...) is defined by the bootstrap
//! library in `runtime/core.clj`.

pub mod arithmetic;
pub mod atoms;
pub mod collections;
pub mod meta;
pub mod patterns;
pub mod predicates;
pub mod sequences;
pub mod strings;
pub mod time;

use crate::tools::ToolRegistry;

/// Register all standard library tools
pub fn register_all(registry: &mut ToolRegistry) {
    arithmetic::register(registry);
    predicates::register(registry);
    collections::register(registry);
    sequences::register(registry);
    strings::register(registry);
    atoms::register(registry);
    meta::register(registry);
    patterns::register(registry);
    time::register(registry);
}
