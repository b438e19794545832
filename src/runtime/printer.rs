//! Value rendering
//!
//! Readable mode escapes strings so the output reads back to an equal value;
//! display mode writes their raw contents (what `str` and `println` use).
//!
//! An atom that (directly or through its contents) holds itself is printed
//! once; the inner occurrence renders as `#<atom>`.

use std::cell::RefCell;
use std::fmt::Write;
use std::rc::Rc;

use crate::runtime::value::{Function, Value};
use crate::runtime::with_stack;

struct Printer {
    out: String,
    readably: bool,
    /// Atoms currently being printed, innermost last
    open_atoms: Vec<*const RefCell<Value>>,
}

/// Renders a value as text
pub fn pr_str(value: &Value, readably: bool) -> String {
    let mut printer = Printer {
        out: String::new(),
        readably,
        open_atoms: Vec::new(),
    };
    printer.write_value(value);
    printer.out
}

/// Renders a sequence of values separated by `sep`
pub fn pr_seq(values: &[Value], readably: bool, sep: &str) -> String {
    values
        .iter()
        .map(|v| pr_str(v, readably))
        .collect::<Vec<_>>()
        .join(sep)
}

impl Printer {
    fn write_value(&mut self, value: &Value) {
        with_stack(|| self.write_nested(value));
    }

    fn write_nested(&mut self, value: &Value) {
        let out = &mut self.out;
        match value {
            Value::Nil => out.push_str("nil"),
            Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            Value::Int(n) => {
                let _ = write!(out, "{}", n);
            }
            Value::Float(f) => write_float(out, *f),
            Value::String(s) if self.readably => write_escaped(out, s),
            Value::String(s) => out.push_str(s),
            Value::Symbol(name) => out.push_str(name),
            Value::Keyword(name) => {
                out.push(':');
                out.push_str(name);
            }
            Value::List(items) => self.write_seq("(", items, ")"),
            Value::Vector(items) => self.write_seq("[", items, "]"),
            Value::Map(entries) => {
                out.push('{');
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        self.out.push(' ');
                    }
                    self.write_value(k);
                    self.out.push(' ');
                    self.write_value(v);
                }
                self.out.push('}');
            }
            Value::Function(Function::Primitive(tool)) => {
                let _ = write!(out, "#<function {}>", tool.name());
            }
            Value::Function(Function::Closure(closure)) => {
                let kind = if closure.is_macro { "macro" } else { "function" };
                match &closure.name {
                    Some(name) => {
                        let _ = write!(out, "#<{} {}>", kind, name);
                    }
                    None => {
                        let _ = write!(out, "#<{}>", kind);
                    }
                }
            }
            Value::Atom(cell) => {
                let id = Rc::as_ptr(cell);
                // A cell being updated right now cannot be read either
                let inner = match cell.try_borrow() {
                    Ok(inner) if !self.open_atoms.contains(&id) => inner,
                    _ => {
                        out.push_str("#<atom>");
                        return;
                    }
                };
                self.open_atoms.push(id);
                self.out.push_str("(atom ");
                self.write_value(&inner);
                self.out.push(')');
                self.open_atoms.pop();
            }
            Value::Regex(re) => {
                out.push_str("#\"");
                out.push_str(re.as_str());
                out.push('"');
            }
        }
    }

    fn write_seq(&mut self, open: &str, items: &[Value], close: &str) {
        self.out.push_str(open);
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.out.push(' ');
            }
            self.write_value(item);
        }
        self.out.push_str(close);
    }
}

// `{:?}` keeps the `.0` on integral floats and is the shortest text that
// parses back to the same bits.
fn write_float(out: &mut String, f: f64) {
    if f.is_nan() {
        out.push_str("##NaN");
    } else if f.is_infinite() {
        out.push_str(if f > 0.0 { "##Inf" } else { "##-Inf" });
    } else {
        let _ = write!(out, "{:?}", f);
    }
}

fn write_escaped(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\0"),
            c => out.push(c),
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atoms() {
        assert_eq!(pr_str(&Value::Nil, true), "nil");
        assert_eq!(pr_str(&Value::Bool(false), true), "false");
        assert_eq!(pr_str(&Value::Int(-42), true), "-42");
        assert_eq!(pr_str(&Value::keyword("a"), true), ":a");
        assert_eq!(pr_str(&Value::symbol("foo"), true), "foo");
    }

    #[test]
    fn test_floats_keep_their_kind() {
        assert_eq!(pr_str(&Value::Float(2.0), true), "2.0");
        assert_eq!(pr_str(&Value::Float(0.5), true), "0.5");
        assert_eq!(pr_str(&Value::Float(f64::INFINITY), true), "##Inf");
    }

    #[test]
    fn test_string_modes() {
        let s = Value::string("a \"q\"\n");
        assert_eq!(pr_str(&s, true), r#""a \"q\"\n""#);
        assert_eq!(pr_str(&s, false), "a \"q\"\n");
    }

    #[test]
    fn test_collections() {
        let list = Value::list(vec![
            Value::Int(1),
            Value::vector(vec![Value::Int(2), Value::string("x")]),
        ]);
        assert_eq!(pr_str(&list, true), r#"(1 [2 "x"])"#);
        assert_eq!(pr_str(&list, false), "(1 [2 x])");

        let map = Value::map_from_pairs(
            &[Value::keyword("b"), Value::Int(2), Value::keyword("a"), Value::Int(1)],
            "test",
        )
        .unwrap();
        assert_eq!(pr_str(&map, true), "{:a 1 :b 2}");
        assert_eq!(pr_str(&Value::list(vec![]), true), "()");
    }

    #[test]
    fn test_atom_shows_contents() {
        assert_eq!(pr_str(&Value::atom(Value::Int(3)), true), "(atom 3)");
    }

    #[test]
    fn test_atom_holding_itself() {
        let atom = Value::atom(Value::Nil);
        if let Value::Atom(cell) = &atom {
            *cell.borrow_mut() = Value::vector(vec![Value::Int(1), atom.clone()]);
        }
        assert_eq!(pr_str(&atom, true), "(atom [1 #<atom>])");

        if let Value::Atom(cell) = &atom {
            *cell.borrow_mut() = Value::Nil;
        }
    }

    #[test]
    fn test_same_atom_twice_is_not_a_cycle() {
        let inner = Value::atom(Value::Int(1));
        let pair = Value::vector(vec![inner.clone(), inner]);
        assert_eq!(pr_str(&pair, true), "[(atom 1) (atom 1)]");
    }

    #[test]
    fn test_deep_nesting() {
        let depth = 20_000;
        let mut value = Value::Nil;
        for _ in 0..depth {
            value = Value::list(vec![value]);
        }
        let printed = pr_str(&value, true);
        assert_eq!(printed.len(), 2 * depth + 3);
        assert!(printed.starts_with("((("));
        assert!(printed.ends_with("nil)))"));
    }

    #[test]
    fn test_pr_seq() {
        let values = [Value::string("a"), Value::Int(1)];
        assert_eq!(pr_seq(&values, true, " "), "\"a\" 1");
        assert_eq!(pr_seq(&values, false, ""), "a1");
    }
}
