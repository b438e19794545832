//! Collection constructors and accessors
//!
//! Sequence functions accept anything seqable (`nil`, lists, vectors, maps
//! and strings) and return lists, the way Clojure's seq functions do.

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::runtime::Value;
use crate::tools::{check_arity, ToolRegistry};

/// Register collection tools
pub fn register(registry: &mut ToolRegistry) {
    // Constructors
    registry.register(ListTool);
    registry.register(VectorTool);
    registry.register(HashMapTool);
    registry.register(VecTool);

    // Maps
    registry.register(AssocTool);
    registry.register(DissocTool);
    registry.register(GetTool);
    registry.register(ContainsTool);
    registry.register(KeysTool);
    registry.register(ValsTool);

    // Sequences
    registry.register(ConsTool);
    registry.register(ConcatTool);
    registry.register(ConjTool);
    registry.register(NthTool);
    registry.register(FirstTool);
    registry.register(RestTool);
    registry.register(LastTool);
    registry.register(CountTool);
    registry.register(EmptypTool);
    registry.register(SeqTool);
}

/// `(get coll key)` with an optional default, shared with callable keywords,
/// maps and vectors
pub(crate) fn get(coll: &Value, key: &Value, default: Option<&Value>) -> Value {
    coll.lookup(key)
        .unwrap_or_else(|| default.cloned().unwrap_or(Value::Nil))
}

fn count(value: &Value) -> Result<usize> {
    match value {
        Value::Nil => Ok(0),
        Value::List(items) | Value::Vector(items) => Ok(items.len()),
        Value::Map(entries) => Ok(entries.len()),
        Value::String(s) => Ok(s.chars().count()),
        other => Err(Error::type_error("countable collection", other)),
    }
}

fn index_arg(value: &Value) -> Result<i64> {
    value
        .as_int()
        .map_err(|_| Error::type_error("integer index", value))
}

fn map_entries(value: &Value, tool: &str) -> Result<BTreeMap<Value, Value>> {
    match value {
        Value::Nil => Ok(BTreeMap::new()),
        Value::Map(entries) => Ok((**entries).clone()),
        other => Err(Error::InvalidArguments {
            tool: tool.to_string(),
            reason: format!("expected a map, got {}", other.type_name()),
        }),
    }
}

/// `conj` shared with `into`
pub(crate) fn conj(coll: &Value, extra: &[Value]) -> Result<Value> {
    match coll {
        Value::Nil | Value::List(_) => {
            let existing = coll.seq_items()?;
            let mut items = Vec::with_capacity(existing.len() + extra.len());
            items.extend(extra.iter().rev().cloned());
            items.extend(existing);
            Ok(Value::list(items))
        }
        Value::Vector(items) => {
            let mut items = (**items).clone();
            items.extend(extra.iter().cloned());
            Ok(Value::vector(items))
        }
        Value::Map(entries) => {
            let mut entries = (**entries).clone();
            for x in extra {
                match x {
                    Value::Vector(pair) if pair.len() == 2 => {
                        entries.insert(pair[0].clone(), pair[1].clone());
                    }
                    Value::Map(more) => {
                        entries.extend(more.iter().map(|(k, v)| (k.clone(), v.clone())));
                    }
                    other => return Err(Error::type_error("[key value] vector or map", other)),
                }
            }
            Ok(Value::map(entries))
        }
        other => Err(Error::type_error("collection", other)),
    }
}

primitive!(ListTool, "list", "Create a list of the arguments", |args, _ctx| {
    Ok(Value::list(args.to_vec()))
});

primitive!(VectorTool, "vector", "Create a vector of the arguments", |args, _ctx| {
    Ok(Value::vector(args.to_vec()))
});

primitive!(HashMapTool, "hash-map", "Create a map from alternating keys and values", |args, _ctx| {
    Value::map_from_pairs(args, "hash-map")
});

primitive!(VecTool, "vec", "Convert a collection to a vector", arity = Some(1), |args, _ctx| {
    match &args[0] {
        Value::Vector(_) => Ok(args[0].clone()),
        Value::List(items) => Ok(Value::Vector(Rc::clone(items))),
        other => Ok(Value::vector(other.seq_items()?)),
    }
});

primitive!(AssocTool, "assoc", "Associate keys with values in a map, or indices in a vector", |args, _ctx| {
    check_arity("assoc", args, 3, None)?;
    let pairs = &args[1..];
    if pairs.len() % 2 != 0 {
        return Err(Error::InvalidArguments {
            tool: "assoc".to_string(),
            reason: "expected an even number of key/value arguments".to_string(),
        });
    }

    if let Value::Vector(items) = &args[0] {
        let mut items = (**items).clone();
        for pair in pairs.chunks(2) {
            let index = index_arg(&pair[0])?;
            let length = items.len();
            match usize::try_from(index) {
                Ok(i) if i < length => items[i] = pair[1].clone(),
                Ok(i) if i == length => items.push(pair[1].clone()),
                _ => return Err(Error::IndexOutOfBounds { index, length }),
            }
        }
        return Ok(Value::vector(items));
    }

    let mut entries = map_entries(&args[0], "assoc")?;
    for pair in pairs.chunks(2) {
        entries.insert(pair[0].clone(), pair[1].clone());
    }
    Ok(Value::map(entries))
});

primitive!(DissocTool, "dissoc", "Remove keys from a map", |args, _ctx| {
    check_arity("dissoc", args, 1, None)?;
    if args[0] == Value::Nil {
        return Ok(Value::Nil);
    }
    let mut entries = map_entries(&args[0], "dissoc")?;
    for key in &args[1..] {
        entries.remove(key);
    }
    Ok(Value::map(entries))
});

primitive!(GetTool, "get", "Look up a key in a map, or an index in a vector or string", |args, _ctx| {
    check_arity("get", args, 2, Some(3))?;
    Ok(get(&args[0], &args[1], args.get(2)))
});

primitive!(ContainsTool, "contains?", "Check whether a map has a key or a vector has an index", arity = Some(2), |args, _ctx| {
    let key = &args[1];
    Ok(Value::Bool(match &args[0] {
        Value::Nil => false,
        Value::Map(entries) => entries.contains_key(key),
        Value::Vector(_) | Value::String(_) => args[0].lookup(key).is_some(),
        other => return Err(Error::type_error("map or vector", other)),
    }))
});

primitive!(KeysTool, "keys", "Keys of a map as a list (nil when empty)", arity = Some(1), |args, _ctx| {
    let entries = map_entries(&args[0], "keys")?;
    if entries.is_empty() {
        return Ok(Value::Nil);
    }
    Ok(Value::list(entries.into_keys().collect()))
});

primitive!(ValsTool, "vals", "Values of a map as a list (nil when empty)", arity = Some(1), |args, _ctx| {
    let entries = map_entries(&args[0], "vals")?;
    if entries.is_empty() {
        return Ok(Value::Nil);
    }
    Ok(Value::list(entries.into_values().collect()))
});

primitive!(ConsTool, "cons", "Prepend an element to a sequence", arity = Some(2), |args, _ctx| {
    let tail = args[1].seq_items()?;
    let mut items = Vec::with_capacity(tail.len() + 1);
    items.push(args[0].clone());
    items.extend(tail);
    Ok(Value::list(items))
});

primitive!(ConcatTool, "concat", "Concatenate sequences into a list", |args, _ctx| {
    let mut items = Vec::new();
    for seq in args {
        items.extend(seq.seq_items()?);
    }
    Ok(Value::list(items))
});

primitive!(ConjTool, "conj", "Add elements where the collection grows cheapest: front of lists, end of vectors", |args, _ctx| {
    check_arity("conj", args, 1, None)?;
    conj(&args[0], &args[1..])
});

primitive!(NthTool, "nth", "Element at an index, with an optional default", |args, _ctx| {
    check_arity("nth", args, 2, Some(3))?;
    let index = index_arg(&args[1])?;
    let found = match &args[0] {
        Value::List(items) | Value::Vector(items) => {
            usize::try_from(index).ok().and_then(|i| items.get(i).cloned())
        }
        other => {
            let items = other.seq_items()?;
            usize::try_from(index).ok().and_then(|i| items.into_iter().nth(i))
        }
    };
    match (found, args.get(2)) {
        (Some(item), _) => Ok(item),
        (None, Some(default)) => Ok(default.clone()),
        (None, None) => Err(Error::IndexOutOfBounds {
            index,
            length: count(&args[0]).unwrap_or(0),
        }),
    }
});

primitive!(FirstTool, "first", "First element, or nil", arity = Some(1), |args, _ctx| {
    match &args[0] {
        Value::List(items) | Value::Vector(items) => Ok(items.first().cloned().unwrap_or(Value::Nil)),
        other => Ok(other.seq_items()?.into_iter().next().unwrap_or(Value::Nil)),
    }
});

primitive!(RestTool, "rest", "All but the first element, as a list", arity = Some(1), |args, _ctx| {
    match &args[0] {
        Value::List(items) | Value::Vector(items) => {
            Ok(Value::list(items.iter().skip(1).cloned().collect()))
        }
        other => Ok(Value::list(other.seq_items()?.into_iter().skip(1).collect())),
    }
});

primitive!(LastTool, "last", "Last element, or nil", arity = Some(1), |args, _ctx| {
    Ok(args[0].seq_items()?.pop().unwrap_or(Value::Nil))
});

primitive!(CountTool, "count", "Number of elements", arity = Some(1), |args, _ctx| {
    Ok(Value::Int(count(&args[0])? as i64))
});

primitive!(EmptypTool, "empty?", "Check if a collection has no elements", arity = Some(1), |args, _ctx| {
    Ok(Value::Bool(count(&args[0])? == 0))
});

primitive!(SeqTool, "seq", "Elements as a list, or nil when empty", arity = Some(1), |args, _ctx| {
    // Lists and vectors share their storage with the result
    match &args[0] {
        Value::List(items) | Value::Vector(items) if items.is_empty() => return Ok(Value::Nil),
        Value::List(items) | Value::Vector(items) => return Ok(Value::List(Rc::clone(items))),
        _ => {}
    }
    let items = args[0].seq_items()?;
    if items.is_empty() {
        Ok(Value::Nil)
    } else {
        Ok(Value::list(items))
    }
});
