//! Tools that call back into the interpreter

use crate::error::{Error, Result};
use crate::runtime::Value;
use crate::tools::{check_arity, ToolRegistry};

/// Register interpreter-facing tools
pub fn register(registry: &mut ToolRegistry) {
    registry.register(ThrowTool);
    registry.register(EvalTool);
    registry.register(ApplyTool);
    registry.register(MapTool);
    registry.register(GensymTool);
}

primitive!(ThrowTool, "throw", "Raise a value as an error catchable by try/catch", arity = Some(1), |args, _ctx| {
    Err(Error::UserSignaled(Box::new(args[0].clone())))
});

primitive!(EvalTool, "eval", "Evaluate a form in the root environment", arity = Some(1), |args, ctx| {
    ctx.eval_root(&args[0])
});

primitive!(ApplyTool, "apply", "Call a function with leading arguments followed by the elements of a final sequence", |args, ctx| {
    check_arity("apply", args, 2, None)?;
    let (last, leading) = match args[1..].split_last() {
        Some(split) => split,
        None => return Err(Error::arity("apply", "at least 2", args.len())),
    };
    let mut call_args = leading.to_vec();
    call_args.extend(last.seq_items()?);
    ctx.apply(&args[0], &call_args)
});

primitive!(MapTool, "map", "Apply a function to successive elements of one or more sequences", |args, ctx| {
    check_arity("map", args, 2, None)?;
    let f = &args[0];
    let seqs = args[1..]
        .iter()
        .map(Value::seq_items)
        .collect::<Result<Vec<_>>>()?;
    let length = seqs.iter().map(Vec::len).min().unwrap_or(0);

    let mut results = Vec::with_capacity(length);
    for i in 0..length {
        let call_args: Vec<Value> = seqs.iter().map(|seq| seq[i].clone()).collect();
        results.push(ctx.apply(f, &call_args)?);
    }
    Ok(Value::list(results))
});

primitive!(GensymTool, "gensym", "Generate a unique symbol, with an optional prefix", |args, ctx| {
    check_arity("gensym", args, 0, Some(1))?;
    let prefix = match args.first() {
        Some(Value::Symbol(s)) | Some(Value::String(s)) => s.to_string(),
        Some(other) => return Err(Error::type_error("string", other)),
        None => "G__".to_string(),
    };
    Ok(ctx.gensym(&prefix))
});
