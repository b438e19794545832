//! String, symbol and printing tools

use crate::error::{Error, Result};
use crate::parser::read_str;
use crate::runtime::printer::{pr_seq, pr_str};
use crate::runtime::Value;
use crate::tools::{check_arity, ToolRegistry};

/// Register string tools
pub fn register(registry: &mut ToolRegistry) {
    registry.register(StrTool);
    registry.register(PrStrTool);
    registry.register(PrnTool);
    registry.register(PrintlnTool);
    registry.register(SubsTool);
    registry.register(UpperCaseTool);
    registry.register(LowerCaseTool);
    registry.register(JoinTool);
    registry.register(SplitTool);
    registry.register(ReadStringTool);
    registry.register(SymbolTool);
    registry.register(KeywordTool);
}

/// Display text of a value as `str` sees it (nil is the empty string)
fn display(value: &Value) -> String {
    match value {
        Value::Nil => String::new(),
        other => pr_str(other, false),
    }
}

fn char_index(value: &Value, length: usize) -> Result<usize> {
    let index = value.as_int()?;
    usize::try_from(index)
        .ok()
        .filter(|i| *i <= length)
        .ok_or(Error::IndexOutOfBounds { index, length })
}

primitive!(StrTool, "str", "Concatenate the display text of the arguments", |args, _ctx| {
    Ok(Value::string(args.iter().map(display).collect::<String>()))
});

primitive!(PrStrTool, "pr-str", "Readable text of the arguments, space separated", |args, _ctx| {
    Ok(Value::string(pr_seq(args, true, " ")))
});

primitive!(PrnTool, "prn", "Print the readable text of the arguments and a newline", |args, _ctx| {
    println!("{}", pr_seq(args, true, " "));
    Ok(Value::Nil)
});

primitive!(PrintlnTool, "println", "Print the display text of the arguments and a newline", |args, _ctx| {
    println!("{}", pr_seq(args, false, " "));
    Ok(Value::Nil)
});

primitive!(SubsTool, "subs", "Substring from start (inclusive) to end (exclusive), by character", |args, _ctx| {
    check_arity("subs", args, 2, Some(3))?;
    let s = args[0].as_str()?;
    let length = s.chars().count();
    let start = char_index(&args[1], length)?;
    let end = match args.get(2) {
        Some(end) => char_index(end, length)?,
        None => length,
    };
    if start > end {
        return Err(Error::InvalidArguments {
            tool: "subs".to_string(),
            reason: format!("start {} is past end {}", start, end),
        });
    }
    Ok(Value::string(
        s.chars().skip(start).take(end - start).collect::<String>(),
    ))
});

primitive!(UpperCaseTool, "upper-case", "Convert a string to upper case", arity = Some(1), |args, _ctx| {
    Ok(Value::string(args[0].as_str()?.to_uppercase()))
});

primitive!(LowerCaseTool, "lower-case", "Convert a string to lower case", arity = Some(1), |args, _ctx| {
    Ok(Value::string(args[0].as_str()?.to_lowercase()))
});

primitive!(JoinTool, "join", "Join the display text of a collection, with an optional separator first", |args, _ctx| {
    check_arity("join", args, 1, Some(2))?;
    let (sep, coll) = if args.len() == 2 {
        (args[0].as_str()?, &args[1])
    } else {
        ("", &args[0])
    };
    let parts: Vec<String> = coll.seq_items()?.iter().map(display).collect();
    Ok(Value::string(parts.join(sep)))
});

primitive!(SplitTool, "split", "Split a string on a regex or literal separator", arity = Some(2), |args, _ctx| {
    let s = args[0].as_str()?;
    let parts: Vec<Value> = match &args[1] {
        Value::Regex(re) => re.split(s).map(Value::string).collect(),
        Value::String(sep) if !sep.is_empty() => s.split(&**sep).map(Value::string).collect(),
        Value::String(_) => s.chars().map(|c| Value::string(c.to_string())).collect(),
        other => return Err(Error::type_error("regex or string", other)),
    };
    Ok(Value::vector(parts))
});

primitive!(ReadStringTool, "read-string", "Read one form from a string without evaluating it", arity = Some(1), |args, _ctx| {
    read_str(args[0].as_str()?)
});

primitive!(SymbolTool, "symbol", "Create a symbol from a string", arity = Some(1), |args, _ctx| {
    match &args[0] {
        Value::Symbol(_) => Ok(args[0].clone()),
        other => Ok(Value::symbol(other.as_str()?)),
    }
});

primitive!(KeywordTool, "keyword", "Create a keyword from a string", arity = Some(1), |args, _ctx| {
    match &args[0] {
        Value::Keyword(_) => Ok(args[0].clone()),
        Value::String(s) => Ok(Value::keyword(s.trim_start_matches(':'))),
        other => Err(Error::type_error("string", other)),
    }
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_of_nil_is_empty() {
        assert_eq!(display(&Value::Nil), "");
        assert_eq!(display(&Value::string("a\"b")), "a\"b");
        assert_eq!(display(&Value::keyword("k")), ":k");
    }

    #[test]
    fn test_char_index_bounds() {
        assert_eq!(char_index(&Value::Int(3), 3).unwrap(), 3);
        assert!(char_index(&Value::Int(4), 3).is_err());
        assert!(char_index(&Value::Int(-1), 3).is_err());
    }
}
