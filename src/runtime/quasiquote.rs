//! Quasiquote expansion
//!
//! Rewrites a quasiquoted template into ordinary code that rebuilds it:
//! `` `(a ~b ~@c) `` becomes `(cons (quote a) (cons b (concat c ())))`.
//! The rewrite is purely syntactic; nothing is evaluated here.

use crate::runtime::{with_stack, Value};

/// Expands the body of a `quasiquote` form
pub fn quasiquote(form: &Value) -> Value {
    with_stack(|| match form {
        Value::List(items) => {
            if form.is_call_to("unquote") {
                return items.get(1).cloned().unwrap_or(Value::Nil);
            }
            rebuild(items)
        }
        Value::Vector(items) => Value::list(vec![Value::symbol("vec"), rebuild(items)]),
        Value::Symbol(_) | Value::Map(_) => Value::list(vec![Value::symbol("quote"), form.clone()]),
        _ => form.clone(),
    })
}

/// Folds the elements right to left into nested `cons`/`concat` calls
fn rebuild(items: &[Value]) -> Value {
    items.iter().rev().fold(Value::list(vec![]), |acc, item| {
        if item.is_call_to("splice-unquote") {
            let spliced = item
                .as_sequence()
                .ok()
                .and_then(|parts| parts.get(1).cloned())
                .unwrap_or(Value::Nil);
            Value::list(vec![Value::symbol("concat"), spliced, acc])
        } else {
            Value::list(vec![Value::symbol("cons"), quasiquote(item), acc])
        }
    })
}
