//! Arithmetic and numeric comparison
//!
//! Integers stay integers as long as the result is exact: `(/ 6 3)` is `2`,
//! `(/ 1 2)` is `0.5`. Integer overflow promotes the result to a float.

use std::cmp::Ordering;

use crate::error::{Error, Result};
use crate::runtime::Value;
use crate::tools::{check_arity, ToolRegistry};

/// Register arithmetic tools
pub fn register(registry: &mut ToolRegistry) {
    registry.register(AddTool);
    registry.register(SubtractTool);
    registry.register(MultiplyTool);
    registry.register(DivideTool);
    registry.register(ModTool);
    registry.register(QuotTool);
    registry.register(RemTool);
    registry.register(IncTool);
    registry.register(DecTool);

    registry.register(LessTool);
    registry.register(LessEqualTool);
    registry.register(GreaterTool);
    registry.register(GreaterEqualTool);
}

fn binary_op(
    a: &Value,
    b: &Value,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Ok(match int_op(*x, *y) {
            Some(n) => Value::Int(n),
            None => Value::Float(float_op(*x as f64, *y as f64)),
        }),
        _ => Ok(Value::Float(float_op(a.as_float()?, b.as_float()?))),
    }
}

fn require_number(value: &Value) -> Result<&Value> {
    match value {
        Value::Int(_) | Value::Float(_) => Ok(value),
        other => Err(Error::type_error("number", other)),
    }
}

pub(crate) fn add(a: &Value, b: &Value) -> Result<Value> {
    binary_op(require_number(a)?, require_number(b)?, i64::checked_add, |x, y| x + y)
}

pub(crate) fn subtract(a: &Value, b: &Value) -> Result<Value> {
    binary_op(require_number(a)?, require_number(b)?, i64::checked_sub, |x, y| x - y)
}

fn multiply(a: &Value, b: &Value) -> Result<Value> {
    binary_op(require_number(a)?, require_number(b)?, i64::checked_mul, |x, y| x * y)
}

fn divide(a: &Value, b: &Value) -> Result<Value> {
    match (require_number(a)?, require_number(b)?) {
        (Value::Int(_), Value::Int(0)) => Err(Error::DivisionByZero),
        (Value::Int(x), Value::Int(y)) => match (x.checked_rem(*y), x.checked_div(*y)) {
            (Some(0), Some(q)) => Ok(Value::Int(q)),
            _ => Ok(Value::Float(*x as f64 / *y as f64)),
        },
        (a, b) => Ok(Value::Float(a.as_float()? / b.as_float()?)),
    }
}

/// Integer-style division helpers share the zero check
fn integer_division(
    name: &str,
    a: &Value,
    b: &Value,
    int_op: fn(i64, i64) -> i64,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value> {
    match (require_number(a)?, require_number(b)?) {
        (Value::Int(_), Value::Int(0)) => Err(Error::DivisionByZero),
        (Value::Int(x), Value::Int(y)) => {
            if *x == i64::MIN && *y == -1 {
                return Err(Error::InvalidArguments {
                    tool: name.to_string(),
                    reason: "integer overflow".to_string(),
                });
            }
            Ok(Value::Int(int_op(*x, *y)))
        }
        (a, b) => {
            let divisor = b.as_float()?;
            if divisor == 0.0 {
                return Err(Error::DivisionByZero);
            }
            Ok(Value::Float(float_op(a.as_float()?, divisor)))
        }
    }
}

// Result takes the sign of the divisor
fn floor_mod_int(x: i64, y: i64) -> i64 {
    let r = x % y;
    if r != 0 && ((r < 0) != (y < 0)) {
        r + y
    } else {
        r
    }
}

fn floor_mod_float(x: f64, y: f64) -> f64 {
    let r = x % y;
    if r != 0.0 && ((r < 0.0) != (y < 0.0)) {
        r + y
    } else {
        r
    }
}

fn compare_numbers(a: &Value, b: &Value) -> Result<Ordering> {
    match (require_number(a)?, require_number(b)?) {
        (Value::Int(x), Value::Int(y)) => Ok(x.cmp(y)),
        (a, b) => a
            .as_float()?
            .partial_cmp(&b.as_float()?)
            .ok_or_else(|| Error::InvalidArguments {
                tool: "compare".to_string(),
                reason: "cannot order NaN".to_string(),
            }),
    }
}

/// True when every adjacent pair satisfies `accept`
fn chain_compare(name: &str, args: &[Value], accept: fn(Ordering) -> bool) -> Result<Value> {
    check_arity(name, args, 1, None)?;
    require_number(&args[0])?;
    for pair in args.windows(2) {
        if !accept(compare_numbers(&pair[0], &pair[1])?) {
            return Ok(Value::Bool(false));
        }
    }
    Ok(Value::Bool(true))
}

primitive!(AddTool, "+", "Sum of the arguments (0 with none)", |args, _ctx| {
    args.iter().try_fold(Value::Int(0), |acc, v| add(&acc, v))
});

primitive!(SubtractTool, "-", "Subtract the remaining arguments from the first, or negate a single argument", |args, _ctx| {
    check_arity("-", args, 1, None)?;
    if args.len() == 1 {
        return subtract(&Value::Int(0), &args[0]);
    }
    args[1..]
        .iter()
        .try_fold(args[0].clone(), |acc, v| subtract(&acc, v))
});

primitive!(MultiplyTool, "*", "Product of the arguments (1 with none)", |args, _ctx| {
    args.iter().try_fold(Value::Int(1), |acc, v| multiply(&acc, v))
});

primitive!(DivideTool, "/", "Divide the first argument by the rest, or take the reciprocal of one", |args, _ctx| {
    check_arity("/", args, 1, None)?;
    if args.len() == 1 {
        return divide(&Value::Int(1), &args[0]);
    }
    args[1..]
        .iter()
        .try_fold(args[0].clone(), |acc, v| divide(&acc, v))
});

primitive!(ModTool, "mod", "Modulus, with the sign of the divisor", arity = Some(2), |args, _ctx| {
    integer_division("mod", &args[0], &args[1], floor_mod_int, floor_mod_float)
});

primitive!(QuotTool, "quot", "Quotient of integer division, truncated toward zero", arity = Some(2), |args, _ctx| {
    integer_division("quot", &args[0], &args[1], |x, y| x / y, |x, y| (x / y).trunc())
});

primitive!(RemTool, "rem", "Remainder of integer division, with the sign of the dividend", arity = Some(2), |args, _ctx| {
    integer_division("rem", &args[0], &args[1], |x, y| x % y, |x, y| x % y)
});

primitive!(IncTool, "inc", "Add one", arity = Some(1), |args, _ctx| {
    add(&args[0], &Value::Int(1))
});

primitive!(DecTool, "dec", "Subtract one", arity = Some(1), |args, _ctx| {
    subtract(&args[0], &Value::Int(1))
});

primitive!(LessTool, "<", "Strictly increasing", |args, _ctx| {
    chain_compare("<", args, |o| o == Ordering::Less)
});

primitive!(LessEqualTool, "<=", "Non-decreasing", |args, _ctx| {
    chain_compare("<=", args, |o| o != Ordering::Greater)
});

primitive!(GreaterTool, ">", "Strictly decreasing", |args, _ctx| {
    chain_compare(">", args, |o| o == Ordering::Greater)
});

primitive!(GreaterEqualTool, ">=", "Non-increasing", |args, _ctx| {
    chain_compare(">=", args, |o| o != Ordering::Less)
});
