//! Primitive library for Parens
//!
//! Every builtin function is a [`Tool`]: a named native callable registered
//! in a [`ToolRegistry`] and installed into the root environment at startup.
//! Tools that need to call back into the interpreter (`apply`, `map`,
//! `swap!`, `eval`) do so through the [`Callback`] they are handed.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::runtime::{Env, Value};

/// Interpreter services available to a running primitive
pub trait Callback {
    /// Applies any callable value to already-evaluated arguments
    fn apply(&mut self, f: &Value, args: &[Value]) -> Result<Value>;

    /// Evaluates a form in the root environment
    fn eval_root(&mut self, form: &Value) -> Result<Value>;

    /// Returns a fresh symbol that cannot clash with user code
    fn gensym(&mut self, prefix: &str) -> Value;
}

/// Tool trait - every primitive implements this
pub trait Tool: Send + Sync {
    /// Name the primitive is bound to in the root environment
    fn name(&self) -> &str;

    /// Tool description
    fn description(&self) -> &str;

    /// Execute the tool
    fn execute(&self, args: &[Value], ctx: &mut dyn Callback) -> Result<Value>;

    /// Exact number of arguments, checked before `execute` runs
    fn arity(&self) -> Option<usize> {
        None // None means variadic
    }
}

/// Defines a unit struct implementing [`Tool`] around a block.
///
/// ```ignore
/// primitive!(IncTool, "inc", "Add one", arity = Some(1), |args, _ctx| {
///     add(&args[0], &Value::Int(1))
/// });
/// ```
macro_rules! primitive {
    ($tool:ident, $name:literal, $desc:literal, arity = $arity:expr, |$args:ident, $ctx:ident| $body:block) => {
        #[doc = $desc]
        pub struct $tool;

        impl $crate::tools::Tool for $tool {
            fn name(&self) -> &str {
                $name
            }

            fn description(&self) -> &str {
                $desc
            }

            #[allow(unused_variables)]
            fn execute(
                &self,
                $args: &[$crate::runtime::Value],
                $ctx: &mut dyn $crate::tools::Callback,
            ) -> $crate::error::Result<$crate::runtime::Value> $body

            fn arity(&self) -> Option<usize> {
                $arity
            }
        }
    };
    ($tool:ident, $name:literal, $desc:literal, |$args:ident, $ctx:ident| $body:block) => {
        primitive!($tool, $name, $desc, arity = None, |$args, $ctx| $body);
    };
}

pub mod stdlib;

/// Tool registry
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create new registry with the standard library
    pub fn new() -> Self {
        let mut registry = ToolRegistry::empty();
        stdlib::register_all(&mut registry);
        registry
    }

    /// Create empty registry (for testing)
    pub fn empty() -> Self {
        ToolRegistry {
            tools: HashMap::new(),
        }
    }

    /// Register a tool, replacing any previous tool of the same name
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        let name = tool.name().to_string();
        self.tools.insert(name, Arc::new(tool));
    }

    /// Get tool by name
    pub fn get(&self, name: &str) -> Result<Arc<dyn Tool>> {
        self.tools
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnboundSymbol {
                name: name.to_string(),
            })
    }

    /// Check if tool exists
    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// List all tool names
    pub fn list_tools(&self) -> Vec<String> {
        let mut names: Vec<_> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Get tool count
    pub fn count(&self) -> usize {
        self.tools.len()
    }

    /// Binds every registered tool under its name in `env`
    pub fn install(&self, env: &Env) {
        for (name, tool) in &self.tools {
            env.set(name.as_str(), Value::primitive(Arc::clone(tool)));
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Checks a variadic argument count against an inclusive range
pub(crate) fn check_arity(name: &str, args: &[Value], min: usize, max: Option<usize>) -> Result<()> {
    let ok = args.len() >= min && max.map_or(true, |max| args.len() <= max);
    if ok {
        return Ok(());
    }
    let expected = match max {
        Some(max) if max == min => min.to_string(),
        Some(max) => format!("{} to {}", min, max),
        None => format!("at least {}", min),
    };
    Err(Error::arity(name, expected, args.len()))
}
