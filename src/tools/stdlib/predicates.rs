//! Equality and type predicates

use crate::runtime::{Function, Value};
use crate::tools::{check_arity, ToolRegistry};

/// Register predicate tools
pub fn register(registry: &mut ToolRegistry) {
    registry.register(EqualTool);
    registry.register(NotEqualTool);

    registry.register(NilpTool);
    registry.register(TruepTool);
    registry.register(FalsepTool);
    registry.register(NumberpTool);
    registry.register(StringpTool);
    registry.register(SymbolpTool);
    registry.register(KeywordpTool);
    registry.register(ListpTool);
    registry.register(VectorpTool);
    registry.register(MappTool);
    registry.register(SequentialpTool);
    registry.register(CollpTool);
    registry.register(AtompTool);
    registry.register(FnpTool);
    registry.register(MacropTool);
}

fn all_equal(args: &[Value]) -> bool {
    args.windows(2).all(|pair| pair[0].equals(&pair[1]))
}

primitive!(EqualTool, "=", "True when all arguments are equal; lists and vectors compare element-wise", |args, _ctx| {
    check_arity("=", args, 1, None)?;
    Ok(Value::Bool(all_equal(args)))
});

primitive!(NotEqualTool, "not=", "Negation of =", |args, _ctx| {
    check_arity("not=", args, 1, None)?;
    Ok(Value::Bool(!all_equal(args)))
});

macro_rules! type_predicate {
    ($tool:ident, $name:literal, $desc:literal, $pat:pat) => {
        primitive!($tool, $name, $desc, arity = Some(1), |args, _ctx| {
            Ok(Value::Bool(matches!(&args[0], $pat)))
        });
    };
}

type_predicate!(NilpTool, "nil?", "Check if value is nil", Value::Nil);
type_predicate!(TruepTool, "true?", "Check if value is exactly true", Value::Bool(true));
type_predicate!(FalsepTool, "false?", "Check if value is exactly false", Value::Bool(false));
type_predicate!(NumberpTool, "number?", "Check if value is a number", Value::Int(_) | Value::Float(_));
type_predicate!(StringpTool, "string?", "Check if value is a string", Value::String(_));
type_predicate!(SymbolpTool, "symbol?", "Check if value is a symbol", Value::Symbol(_));
type_predicate!(KeywordpTool, "keyword?", "Check if value is a keyword", Value::Keyword(_));
type_predicate!(ListpTool, "list?", "Check if value is a list", Value::List(_));
type_predicate!(VectorpTool, "vector?", "Check if value is a vector", Value::Vector(_));
type_predicate!(MappTool, "map?", "Check if value is a map", Value::Map(_));
type_predicate!(SequentialpTool, "sequential?", "Check if value is a list or vector", Value::List(_) | Value::Vector(_));
type_predicate!(CollpTool, "coll?", "Check if value is a collection", Value::List(_) | Value::Vector(_) | Value::Map(_));
type_predicate!(AtompTool, "atom?", "Check if value is an atom", Value::Atom(_));

primitive!(FnpTool, "fn?", "Check if value is a callable function (macros excluded)", arity = Some(1), |args, _ctx| {
    Ok(Value::Bool(match &args[0] {
        Value::Function(Function::Primitive(_)) => true,
        Value::Function(Function::Closure(c)) => !c.is_macro,
        _ => false,
    }))
});

primitive!(MacropTool, "macro?", "Check if value is a macro", arity = Some(1), |args, _ctx| {
    Ok(Value::Bool(args[0].is_macro()))
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_equal_uses_sequential_equality() {
        let list = Value::list(vec![Value::Int(1)]);
        let vector = Value::vector(vec![Value::Int(1)]);
        assert!(all_equal(&[list, vector]));
        assert!(!all_equal(&[Value::Int(1), Value::Float(1.0)]));
        assert!(all_equal(&[Value::Nil]));
    }
}
