//! Atom operations: the only mutable values in the language

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::runtime::Value;
use crate::tools::{check_arity, ToolRegistry};

/// Register atom tools
pub fn register(registry: &mut ToolRegistry) {
    registry.register(AtomTool);
    registry.register(DerefTool);
    registry.register(ResetTool);
    registry.register(SwapTool);
}

fn cell(value: &Value) -> Result<&Rc<RefCell<Value>>> {
    match value {
        Value::Atom(cell) => Ok(cell),
        other => Err(Error::type_error("atom", other)),
    }
}

primitive!(AtomTool, "atom", "Create an atom holding a value", arity = Some(1), |args, _ctx| {
    Ok(Value::atom(args[0].clone()))
});

primitive!(DerefTool, "deref", "Current value of an atom", arity = Some(1), |args, _ctx| {
    Ok(cell(&args[0])?.borrow().clone())
});

primitive!(ResetTool, "reset!", "Replace the value of an atom", arity = Some(2), |args, _ctx| {
    let value = args[1].clone();
    *cell(&args[0])?.borrow_mut() = value.clone();
    Ok(value)
});

primitive!(SwapTool, "swap!", "Replace the value of an atom with (f current args...)", |args, ctx| {
    check_arity("swap!", args, 2, None)?;
    let cell = cell(&args[0])?;

    // The borrow is released before calling back into the interpreter, which
    // may read the same atom. On failure the atom keeps its old value.
    let current = cell.borrow().clone();
    let mut call_args = Vec::with_capacity(args.len() - 1);
    call_args.push(current);
    call_args.extend(args[2..].iter().cloned());

    let updated = ctx.apply(&args[1], &call_args)?;
    *cell.borrow_mut() = updated.clone();
    Ok(updated)
});
