use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::runtime::Value;

/// Shared handle to a scope frame
///
/// Frames are kept alive by whoever references them: the evaluator while a
/// form runs in them, closures that captured them, and child frames.
pub type Env = Rc<Environment>;

/// Environment frame for variable scoping
pub struct Environment {
    /// Variables defined in this frame
    variables: RefCell<HashMap<Rc<str>, Value>>,
    /// Enclosing frame (None for the root environment)
    outer: Option<Env>,
    /// Set on frames created by `loop`; the target of `recur`
    loop_point: Option<LoopPoint>,
}

/// One `loop` activation: what `recur` needs to jump back
#[derive(Debug, Clone)]
pub struct LoopPoint {
    /// Unique activation id
    pub id: u64,
    /// Loop variable names in declaration order
    pub bindings: Rc<[Rc<str>]>,
    /// Loop body
    pub body: Value,
}

impl Environment {
    /// Creates a new root environment
    pub fn new() -> Env {
        Rc::new(Environment {
            variables: RefCell::new(HashMap::new()),
            outer: None,
            loop_point: None,
        })
    }

    /// Creates a new frame nested inside `outer`
    pub fn child(outer: &Env) -> Env {
        Rc::new(Environment {
            variables: RefCell::new(HashMap::new()),
            outer: Some(Rc::clone(outer)),
            loop_point: None,
        })
    }

    /// Creates the frame of a `loop` activation
    pub fn loop_frame(outer: &Env, point: LoopPoint) -> Env {
        Rc::new(Environment {
            variables: RefCell::new(HashMap::new()),
            outer: Some(Rc::clone(outer)),
            loop_point: Some(point),
        })
    }

    /// Binds (or rebinds) a name in this frame
    pub fn set(&self, name: impl Into<Rc<str>>, value: Value) {
        self.variables.borrow_mut().insert(name.into(), value);
    }

    /// Gets the value of a variable, searching outward through enclosing frames
    pub fn get(&self, name: &str) -> Result<Value> {
        self.find(name).ok_or_else(|| Error::UnboundSymbol {
            name: name.to_string(),
        })
    }

    /// Like [`Environment::get`] but reports a missing binding as `None`
    pub fn find(&self, name: &str) -> Option<Value> {
        let mut frame = self;
        loop {
            if let Some(value) = frame.variables.borrow().get(name) {
                return Some(value.clone());
            }
            match &frame.outer {
                Some(outer) => frame = outer.as_ref(),
                None => return None,
            }
        }
    }

    /// Checks if a variable exists in any enclosing frame
    pub fn exists(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Innermost enclosing `loop` frame together with its activation record
    pub fn find_loop(self: &Rc<Self>) -> Option<(Env, LoopPoint)> {
        let mut frame = Rc::clone(self);
        loop {
            if let Some(point) = &frame.loop_point {
                let point = point.clone();
                return Some((frame, point));
            }
            let outer = frame.outer.as_ref().map(Rc::clone)?;
            frame = outer;
        }
    }

    /// Enclosing frame, `None` for the root
    pub fn outer(&self) -> Option<&Env> {
        self.outer.as_ref()
    }

    /// Number of frames from here to the root (1 for the root)
    pub fn scope_depth(&self) -> usize {
        let mut depth = 1;
        let mut frame = self;
        while let Some(outer) = &frame.outer {
            depth += 1;
            frame = outer.as_ref();
        }
        depth
    }

    /// Number of bindings held directly in this frame
    pub fn len(&self) -> usize {
        self.variables.borrow().len()
    }

    /// True when this frame holds no bindings
    pub fn is_empty(&self) -> bool {
        self.variables.borrow().is_empty()
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Environment")
            .field("bindings", &self.len())
            .field("depth", &self.scope_depth())
            .field("loop", &self.loop_point.as_ref().map(|p| p.id))
            .finish()
    }
}
