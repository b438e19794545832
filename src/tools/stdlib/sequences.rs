//! Sequence functions
//!
//! These walk a collection once, so they stay linear on large inputs.
//! Predicates and reducing functions are called back through the
//! interpreter. Results are lists, like the other seq functions.

use std::collections::{BTreeMap, BTreeSet};
use std::slice;

use crate::error::{Error, Result};
use crate::runtime::Value;
use crate::tools::stdlib::collections;
use crate::tools::{check_arity, Callback, ToolRegistry};

/// Register sequence tools
pub fn register(registry: &mut ToolRegistry) {
    registry.register(NextTool);
    registry.register(RangeTool);
    registry.register(ReduceTool);
    registry.register(IntoTool);
    registry.register(ReverseTool);

    // Predicate driven
    registry.register(FilterTool);
    registry.register(RemoveTool);
    registry.register(TakeWhileTool);
    registry.register(DropWhileTool);
    registry.register(EveryTool);
    registry.register(SomeTool);

    // Positional
    registry.register(TakeTool);
    registry.register(DropTool);
    registry.register(InterposeTool);
    registry.register(DistinctTool);
    registry.register(FrequenciesTool);
}

fn holds(pred: &Value, item: &Value, ctx: &mut dyn Callback) -> Result<bool> {
    Ok(ctx.apply(pred, slice::from_ref(item))?.is_truthy())
}

fn count_arg(value: &Value) -> Result<usize> {
    let n = value
        .as_int()
        .map_err(|_| Error::type_error("integer count", value))?;
    Ok(usize::try_from(n).unwrap_or(0))
}

/// Items from the first one failing `pred` onwards
fn skip_while(pred: &Value, coll: &Value, ctx: &mut dyn Callback) -> Result<Vec<Value>> {
    let mut items = coll.seq_items()?;
    let mut kept = 0;
    while kept < items.len() && holds(pred, &items[kept], ctx)? {
        kept += 1;
    }
    Ok(items.split_off(kept))
}

fn filter(pred: &Value, coll: &Value, keep: bool, ctx: &mut dyn Callback) -> Result<Value> {
    let mut kept = Vec::new();
    for item in coll.seq_items()? {
        if holds(pred, &item, ctx)? == keep {
            kept.push(item);
        }
    }
    Ok(Value::list(kept))
}

fn int_range(start: i64, end: i64, step: i64) -> Vec<Value> {
    let mut items = Vec::new();
    let mut i = start;
    while (step > 0 && i < end) || (step < 0 && i > end) {
        items.push(Value::Int(i));
        i = match i.checked_add(step) {
            Some(next) => next,
            None => break,
        };
    }
    items
}

fn float_range(start: f64, end: f64, step: f64) -> Vec<Value> {
    let mut items = Vec::new();
    let mut i = start;
    while (step > 0.0 && i < end) || (step < 0.0 && i > end) {
        items.push(Value::Float(i));
        i += step;
    }
    items
}

primitive!(NextTool, "next", "All but the first element, or nil when nothing is left", arity = Some(1), |args, _ctx| {
    let items = args[0].seq_items()?;
    if items.len() < 2 {
        return Ok(Value::Nil);
    }
    Ok(Value::list(items[1..].to_vec()))
});

primitive!(RangeTool, "range", "Numbers from start (default 0) up to, not including, end by step (default 1)", |args, _ctx| {
    check_arity("range", args, 1, Some(3))?;
    let zero = Value::Int(0);
    let one = Value::Int(1);
    let (start, end) = match args {
        [end] => (&zero, end),
        [start, end, ..] => (start, end),
        [] => return Err(Error::arity("range", "1 to 3", 0)),
    };
    let step = args.get(2).unwrap_or(&one);

    let items = match (start, end, step) {
        (_, _, Value::Int(0)) => None,
        (Value::Int(s), Value::Int(e), Value::Int(st)) => Some(int_range(*s, *e, *st)),
        _ => {
            let st = step.as_float()?;
            if st == 0.0 {
                None
            } else {
                Some(float_range(start.as_float()?, end.as_float()?, st))
            }
        }
    };
    match items {
        Some(items) => Ok(Value::list(items)),
        None => Err(Error::InvalidArguments {
            tool: "range".to_string(),
            reason: "step must not be zero".to_string(),
        }),
    }
});

primitive!(ReduceTool, "reduce", "Fold a sequence with a two-argument function, from an optional initial value", |args, ctx| {
    check_arity("reduce", args, 2, Some(3))?;
    let f = &args[0];
    let (init, coll) = match args {
        [_, init, coll] => (Some(init.clone()), coll),
        _ => (None, &args[1]),
    };

    let mut items = coll.seq_items()?.into_iter();
    let mut acc = match init.or_else(|| items.next()) {
        Some(acc) => acc,
        None => return ctx.apply(f, &[]),
    };
    for item in items {
        acc = ctx.apply(f, &[acc, item])?;
    }
    Ok(acc)
});

primitive!(IntoTool, "into", "Add every element of a sequence to a collection, as conj does", arity = Some(2), |args, _ctx| {
    collections::conj(&args[0], &args[1].seq_items()?)
});

primitive!(ReverseTool, "reverse", "Elements in reverse order, as a list", arity = Some(1), |args, _ctx| {
    let mut items = args[0].seq_items()?;
    items.reverse();
    Ok(Value::list(items))
});

primitive!(FilterTool, "filter", "Elements for which the predicate is truthy", arity = Some(2), |args, ctx| {
    filter(&args[0], &args[1], true, ctx)
});

primitive!(RemoveTool, "remove", "Elements for which the predicate is falsey", arity = Some(2), |args, ctx| {
    filter(&args[0], &args[1], false, ctx)
});

primitive!(TakeWhileTool, "take-while", "Leading elements for which the predicate is truthy", arity = Some(2), |args, ctx| {
    let mut taken = Vec::new();
    for item in args[1].seq_items()? {
        if !holds(&args[0], &item, ctx)? {
            break;
        }
        taken.push(item);
    }
    Ok(Value::list(taken))
});

primitive!(DropWhileTool, "drop-while", "Elements from the first one for which the predicate is falsey", arity = Some(2), |args, ctx| {
    Ok(Value::list(skip_while(&args[0], &args[1], ctx)?))
});

primitive!(EveryTool, "every?", "Check whether the predicate holds for every element", arity = Some(2), |args, ctx| {
    for item in args[1].seq_items()? {
        if !holds(&args[0], &item, ctx)? {
            return Ok(Value::Bool(false));
        }
    }
    Ok(Value::Bool(true))
});

primitive!(SomeTool, "some", "First truthy result of the predicate, or nil", arity = Some(2), |args, ctx| {
    for item in args[1].seq_items()? {
        let result = ctx.apply(&args[0], slice::from_ref(&item))?;
        if result.is_truthy() {
            return Ok(result);
        }
    }
    Ok(Value::Nil)
});

primitive!(TakeTool, "take", "The first n elements", arity = Some(2), |args, _ctx| {
    let mut items = args[1].seq_items()?;
    items.truncate(count_arg(&args[0])?);
    Ok(Value::list(items))
});

primitive!(DropTool, "drop", "All but the first n elements", arity = Some(2), |args, _ctx| {
    let mut items = args[1].seq_items()?;
    let n = count_arg(&args[0])?.min(items.len());
    Ok(Value::list(items.split_off(n)))
});

primitive!(InterposeTool, "interpose", "Elements separated by a separator value", arity = Some(2), |args, _ctx| {
    let items = args[1].seq_items()?;
    let mut out = Vec::with_capacity(items.len() * 2);
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            out.push(args[0].clone());
        }
        out.push(item);
    }
    Ok(Value::list(out))
});

primitive!(DistinctTool, "distinct", "Elements with later duplicates dropped", arity = Some(1), |args, _ctx| {
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    for item in args[0].seq_items()? {
        if seen.insert(item.clone()) {
            out.push(item);
        }
    }
    Ok(Value::list(out))
});

primitive!(FrequenciesTool, "frequencies", "Map from each distinct element to the number of times it occurs", arity = Some(1), |args, _ctx| {
    let mut counts: BTreeMap<Value, i64> = BTreeMap::new();
    for item in args[0].seq_items()? {
        *counts.entry(item).or_insert(0) += 1;
    }
    Ok(Value::map(
        counts.into_iter().map(|(k, n)| (k, Value::Int(n))).collect(),
    ))
});
