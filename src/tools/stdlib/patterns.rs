//! Regular expressions (`re-*` tools) backed by the `regex` crate

use std::rc::Rc;

use regex::{Captures, Regex};

use crate::error::{Error, Result};
use crate::runtime::Value;
use crate::tools::ToolRegistry;

/// Register regex tools
pub fn register(registry: &mut ToolRegistry) {
    registry.register(RePatternTool);
    registry.register(ReFindTool);
    registry.register(ReMatchesTool);
    registry.register(ReSeqTool);
}

pub(crate) fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::InvalidRegex {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

fn regex_arg(value: &Value) -> Result<Rc<Regex>> {
    match value {
        Value::Regex(re) => Ok(Rc::clone(re)),
        Value::String(s) => Ok(Rc::new(compile(s)?)),
        other => Err(Error::type_error("regex", other)),
    }
}

/// The whole match alone, or `[whole group1 ...]` when the pattern has groups
fn match_value(caps: &Captures) -> Value {
    if caps.len() == 1 {
        return Value::string(&caps[0]);
    }
    Value::vector(
        caps.iter()
            .map(|group| group.map_or(Value::Nil, |m| Value::string(m.as_str())))
            .collect(),
    )
}

primitive!(RePatternTool, "re-pattern", "Compile a string into a regex", arity = Some(1), |args, _ctx| {
    match &args[0] {
        Value::Regex(_) => Ok(args[0].clone()),
        other => Ok(Value::Regex(Rc::new(compile(other.as_str()?)?))),
    }
});

primitive!(ReFindTool, "re-find", "First match of a regex in a string, or nil", arity = Some(2), |args, _ctx| {
    let re = regex_arg(&args[0])?;
    let s = args[1].as_str()?;
    Ok(re.captures(s).map_or(Value::Nil, |caps| match_value(&caps)))
});

primitive!(ReMatchesTool, "re-matches", "Match of a regex against the entire string, or nil", arity = Some(2), |args, _ctx| {
    let re = regex_arg(&args[0])?;
    let s = args[1].as_str()?;
    let anchored = compile(&format!("^(?:{})$", re.as_str()))?;
    Ok(anchored.captures(s).map_or(Value::Nil, |caps| match_value(&caps)))
});

primitive!(ReSeqTool, "re-seq", "All successive matches of a regex as a list, or nil", arity = Some(2), |args, _ctx| {
    let re = regex_arg(&args[0])?;
    let s = args[1].as_str()?;
    let matches: Vec<Value> = re.captures_iter(s).map(|caps| match_value(&caps)).collect();
    if matches.is_empty() {
        Ok(Value::Nil)
    } else {
        Ok(Value::list(matches))
    }
});
