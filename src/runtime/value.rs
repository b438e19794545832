use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::runtime::environment::{Env, Environment};
use crate::runtime::{printer, with_stack};
use crate::tools::Tool;

/// Runtime value representation
///
/// Forms read from source are values too: the evaluator walks `List`s as
/// code. Everything except `Atom` is immutable; "modifying" a collection
/// produces a new one.
#[derive(Clone)]
pub enum Value {
    // Primitives
    /// The `nil` value
    Nil,
    /// Boolean value
    Bool(bool),
    /// 64-bit integer value
    Int(i64),
    /// 64-bit floating-point value
    Float(f64),
    /// String value
    String(Rc<str>),
    /// Identifier, compared by name
    Symbol(Rc<str>),
    /// Self-evaluating keyword, stored without its leading `:`
    Keyword(Rc<str>),

    // Collections
    /// Ordered sequence; the shape of executable code
    List(Rc<Vec<Value>>),
    /// Ordered sequence distinguished from `List` only by its tag
    Vector(Rc<Vec<Value>>),
    /// Key/value mapping
    Map(Rc<BTreeMap<Value, Value>>),

    // Special
    /// Native primitive or user closure
    Function(Function),
    /// Mutable, shareable single-cell reference
    Atom(Rc<RefCell<Value>>),
    /// Compiled regular expression from a `#"..."` literal or `re-pattern`
    Regex(Rc<regex::Regex>),
}

/// Callable values
#[derive(Clone)]
pub enum Function {
    /// Natively implemented builtin
    Primitive(Arc<dyn Tool>),
    /// Function defined in the interpreted language
    Closure(Rc<Closure>),
}

/// A user function: parameters, body and the environment it was created in
pub struct Closure {
    /// Name from `(fn name [..] ..)` or `defmacro`; bound to the closure itself on every call
    pub name: Option<Rc<str>>,
    /// Parameter list
    pub params: Params,
    /// Body form (already wrapped in `do` when several forms were given)
    pub body: Value,
    /// Defining environment
    pub env: Env,
    /// Applying a macro rewrites code instead of producing a value
    pub is_macro: bool,
}

/// Parsed parameter vector: `[a b & more]`
#[derive(Debug, Clone, PartialEq)]
pub struct Params {
    /// Positional parameters
    pub required: Vec<Rc<str>>,
    /// Name bound to the remaining arguments after `&`
    pub rest: Option<Rc<str>>,
}

impl Params {
    /// Parses a parameter vector (or list) of symbols
    pub fn parse(form: &Value) -> Result<Self> {
        let items = match form {
            Value::Vector(items) | Value::List(items) => items,
            other => return Err(Error::type_error("parameter vector", other)),
        };

        let mut required: Vec<Rc<str>> = Vec::new();
        let mut rest: Option<Rc<str>> = None;
        let mut iter = items.iter();
        while let Some(item) = iter.next() {
            let name = item
                .as_symbol()
                .map_err(|_| Error::type_error("symbol in parameter vector", item))?;
            if name == "&" {
                let rest_name = iter.next().ok_or_else(|| Error::InvalidArguments {
                    tool: "fn".to_string(),
                    reason: "expected a symbol after &".to_string(),
                })?;
                rest = Some(Rc::from(rest_name.as_symbol()?));
                if iter.next().is_some() {
                    return Err(Error::InvalidArguments {
                        tool: "fn".to_string(),
                        reason: "only one parameter may follow &".to_string(),
                    });
                }
                break;
            }
            required.push(Rc::from(name));
        }

        Ok(Params { required, rest })
    }

    fn describe(&self) -> String {
        match self.rest {
            Some(_) => format!("at least {}", self.required.len()),
            None => self.required.len().to_string(),
        }
    }
}

impl Closure {
    /// Creates the call frame for an application: a child of the captured
    /// environment holding the parameter bindings.
    pub fn bind(self: &Rc<Self>, args: &[Value]) -> Result<Env> {
        let required = &self.params.required;
        let arity_ok = match self.params.rest {
            Some(_) => args.len() >= required.len(),
            None => args.len() == required.len(),
        };
        if !arity_ok {
            return Err(Error::arity(
                self.display_name(),
                self.params.describe(),
                args.len(),
            ));
        }

        let frame = Environment::child(&self.env);
        if let Some(name) = &self.name {
            frame.set(Rc::clone(name), Value::Function(Function::Closure(Rc::clone(self))));
        }
        for (name, value) in required.iter().zip(args) {
            frame.set(Rc::clone(name), value.clone());
        }
        if let Some(rest) = &self.params.rest {
            let extra = &args[required.len()..];
            let rest_value = if extra.is_empty() {
                Value::Nil
            } else {
                Value::list(extra.to_vec())
            };
            frame.set(Rc::clone(rest), rest_value);
        }
        Ok(frame)
    }

    /// Name used in error messages
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => name.to_string(),
            None if self.is_macro => "macro".to_string(),
            None => "fn".to_string(),
        }
    }
}

impl Value {
    /// Creates a string value
    pub fn string(s: impl AsRef<str>) -> Self {
        Value::String(Rc::from(s.as_ref()))
    }

    /// Creates a symbol value
    pub fn symbol(name: impl AsRef<str>) -> Self {
        Value::Symbol(Rc::from(name.as_ref()))
    }

    /// Creates a keyword value from its name (without the `:`)
    pub fn keyword(name: impl AsRef<str>) -> Self {
        Value::Keyword(Rc::from(name.as_ref()))
    }

    /// Creates a list value
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Rc::new(items))
    }

    /// Creates a vector value
    pub fn vector(items: Vec<Value>) -> Self {
        Value::Vector(Rc::new(items))
    }

    /// Creates a map value
    pub fn map(entries: BTreeMap<Value, Value>) -> Self {
        Value::Map(Rc::new(entries))
    }

    /// Creates a map from a flat `k1 v1 k2 v2 ...` sequence
    pub fn map_from_pairs(items: &[Value], context: &str) -> Result<Self> {
        if items.len() % 2 != 0 {
            return Err(Error::InvalidArguments {
                tool: context.to_string(),
                reason: "expected an even number of key/value forms".to_string(),
            });
        }
        let entries = items
            .chunks(2)
            .map(|pair| (pair[0].clone(), pair[1].clone()))
            .collect();
        Ok(Value::map(entries))
    }

    /// Creates a new atom holding `value`
    pub fn atom(value: Value) -> Self {
        Value::Atom(Rc::new(RefCell::new(value)))
    }

    /// Wraps a native tool as a callable value
    pub fn primitive(tool: Arc<dyn Tool>) -> Self {
        Value::Function(Function::Primitive(tool))
    }

    /// Wraps a closure as a callable value
    pub fn closure(closure: Closure) -> Self {
        Value::Function(Function::Closure(Rc::new(closure)))
    }

    /// Returns the type name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Keyword(_) => "keyword",
            Value::List(_) => "list",
            Value::Vector(_) => "vector",
            Value::Map(_) => "map",
            Value::Function(Function::Closure(c)) if c.is_macro => "macro",
            Value::Function(_) => "function",
            Value::Atom(_) => "atom",
            Value::Regex(_) => "regex",
        }
    }

    /// Only `nil` and `false` are falsey
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    /// True for lists
    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    /// True when this is a closure carrying the macro flag
    pub fn is_macro(&self) -> bool {
        matches!(self, Value::Function(Function::Closure(c)) if c.is_macro)
    }

    /// True when the value is a list whose head is the symbol `name`
    pub fn is_call_to(&self, name: &str) -> bool {
        match self {
            Value::List(items) => matches!(items.first(), Some(Value::Symbol(s)) if &**s == name),
            _ => false,
        }
    }

    // Type conversion methods

    /// Returns the integer value
    pub fn as_int(&self) -> Result<i64> {
        match self {
            Value::Int(n) => Ok(*n),
            _ => Err(Error::type_error("integer", self)),
        }
    }

    /// Converts a number to a 64-bit float
    pub fn as_float(&self) -> Result<f64> {
        match self {
            Value::Float(f) => Ok(*f),
            Value::Int(n) => Ok(*n as f64),
            _ => Err(Error::type_error("number", self)),
        }
    }

    /// Returns a reference to the string value
    pub fn as_str(&self) -> Result<&str> {
        match self {
            Value::String(s) => Ok(s),
            _ => Err(Error::type_error("string", self)),
        }
    }

    /// Returns the symbol name
    pub fn as_symbol(&self) -> Result<&str> {
        match self {
            Value::Symbol(s) => Ok(s),
            _ => Err(Error::type_error("symbol", self)),
        }
    }

    /// Returns the elements of a list or vector
    pub fn as_sequence(&self) -> Result<&[Value]> {
        match self {
            Value::List(items) | Value::Vector(items) => Ok(items),
            _ => Err(Error::type_error("list or vector", self)),
        }
    }

    /// Elements of anything seqable: nil, lists, vectors, strings (one
    /// string per character) and maps (`[k v]` entry vectors).
    pub fn seq_items(&self) -> Result<Vec<Value>> {
        match self {
            Value::Nil => Ok(Vec::new()),
            Value::List(items) | Value::Vector(items) => Ok(items.to_vec()),
            Value::String(s) => Ok(s.chars().map(|c| Value::string(c.to_string())).collect()),
            Value::Map(entries) => Ok(entries
                .iter()
                .map(|(k, v)| Value::vector(vec![k.clone(), v.clone()]))
                .collect()),
            _ => Err(Error::type_error("seqable collection", self)),
        }
    }

    /// Keyed lookup shared by `get` and the callable-collection forms.
    ///
    /// Maps look up by key, vectors and strings by integer index; anything
    /// else has no entries.
    pub fn lookup(&self, key: &Value) -> Option<Value> {
        match (self, key) {
            (Value::Map(entries), _) => entries.get(key).cloned(),
            (Value::Vector(items), Value::Int(i)) => {
                usize::try_from(*i).ok().and_then(|i| items.get(i).cloned())
            }
            (Value::String(s), Value::Int(i)) => usize::try_from(*i)
                .ok()
                .and_then(|i| s.chars().nth(i))
                .map(|c| Value::string(c.to_string())),
            _ => None,
        }
    }

    /// Clojure-style equality: like `==` but lists and vectors with equal
    /// elements are equal to each other, and floats compare as numbers
    /// (`0.0` equals `-0.0`, `NaN` equals nothing).
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Float(a), Value::Float(b)) => a == b,
            (
                Value::List(a) | Value::Vector(a),
                Value::List(b) | Value::Vector(b),
            ) => with_stack(|| {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.equals(y))
            }),
            (Value::Map(a), Value::Map(b)) => with_stack(|| {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).map(|w| v.equals(w)).unwrap_or(false))
            }),
            _ => self == other,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Nil => 0,
            Value::Bool(_) => 1,
            Value::Int(_) => 2,
            Value::Float(_) => 3,
            Value::String(_) => 4,
            Value::Symbol(_) => 5,
            Value::Keyword(_) => 6,
            Value::List(_) => 7,
            Value::Vector(_) => 8,
            Value::Map(_) => 9,
            Value::Function(_) => 10,
            Value::Atom(_) => 11,
            Value::Regex(_) => 12,
        }
    }
}

impl Function {
    fn address(&self) -> usize {
        match self {
            Function::Primitive(tool) => Arc::as_ptr(tool) as *const () as usize,
            Function::Closure(closure) => Rc::as_ptr(closure) as usize,
        }
    }
}

// Total order so values can key a BTreeMap. Structural for data, by
// identity for functions and atoms.
impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Nil, Value::Nil) => Ordering::Equal,
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            (Value::String(a), Value::String(b))
            | (Value::Symbol(a), Value::Symbol(b))
            | (Value::Keyword(a), Value::Keyword(b)) => a.cmp(b),
            (Value::List(a), Value::List(b)) | (Value::Vector(a), Value::Vector(b)) => {
                with_stack(|| a.cmp(b))
            }
            (Value::Map(a), Value::Map(b)) => with_stack(|| a.cmp(b)),
            (Value::Function(a), Value::Function(b)) => a.address().cmp(&b.address()),
            (Value::Atom(a), Value::Atom(b)) => (Rc::as_ptr(a) as usize).cmp(&(Rc::as_ptr(b) as usize)),
            (Value::Regex(a), Value::Regex(b)) => a.as_str().cmp(b.as_str()),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

// Nested collections are taken apart with an explicit work list, so dropping
// a deeply nested value does not recurse on the host stack. Shared
// collections are left to their other owners.
impl Drop for Value {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        detach_children(self, &mut pending);
        while let Some(mut value) = pending.pop() {
            detach_children(&mut value, &mut pending);
        }
    }
}

fn detach_children(value: &mut Value, pending: &mut Vec<Value>) {
    match value {
        Value::List(items) | Value::Vector(items) => {
            if let Some(items) = Rc::get_mut(items) {
                pending.append(items);
            }
        }
        Value::Map(entries) => {
            if let Some(entries) = Rc::get_mut(entries) {
                for (k, v) in std::mem::take(entries) {
                    pending.push(k);
                    pending.push(v);
                }
            }
        }
        Value::Atom(cell) => {
            if let Some(cell) = Rc::get_mut(cell) {
                pending.push(std::mem::replace(cell.get_mut(), Value::Nil));
            }
        }
        _ => {}
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&printer::pr_str(self, true))
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&printer::pr_str(self, true))
    }
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Closure")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("body", &self.body)
            .field("is_macro", &self.is_macro)
            .finish_non_exhaustive()
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Nil.type_name(), "nil");
        assert_eq!(Value::Bool(true).type_name(), "boolean");
        assert_eq!(Value::Int(42).type_name(), "integer");
        assert_eq!(Value::Float(2.71).type_name(), "float");
        assert_eq!(Value::string("test").type_name(), "string");
        assert_eq!(Value::keyword("k").type_name(), "keyword");
        assert_eq!(Value::atom(Value::Nil).type_name(), "atom");
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::Nil.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Bool(true).is_truthy());
        assert!(Value::Int(0).is_truthy());
        assert!(Value::string("").is_truthy());
        assert!(Value::list(vec![]).is_truthy());
    }

    #[test]
    fn test_symbols_compare_by_name() {
        assert_eq!(Value::symbol("abc"), Value::symbol(String::from("abc")));
        assert_ne!(Value::symbol("abc"), Value::keyword("abc"));
    }

    #[test]
    fn test_list_and_vector_are_distinct_values_but_equal_sequences() {
        let list = Value::list(vec![Value::Int(1), Value::Int(2)]);
        let vector = Value::vector(vec![Value::Int(1), Value::Int(2)]);
        assert_ne!(list, vector);
        assert!(list.equals(&vector));
    }

    #[test]
    fn test_float_equality_is_numeric() {
        assert!(Value::Float(0.0).equals(&Value::Float(-0.0)));
        assert!(!Value::Float(f64::NAN).equals(&Value::Float(f64::NAN)));
        assert!(!Value::Int(1).equals(&Value::Float(1.0)));
        // Map keys keep the total order
        assert_eq!(Value::Float(f64::NAN), Value::Float(f64::NAN));
        assert_ne!(Value::Float(0.0), Value::Float(-0.0));
    }

    #[test]
    fn test_dropping_deeply_nested_values() {
        let mut list = Value::Nil;
        let mut map = Value::Nil;
        for i in 0..500_000 {
            list = Value::list(vec![Value::Int(i), list]);
            map = Value::map_from_pairs(&[Value::keyword("next"), map], "t").unwrap();
        }
        drop(list);
        drop(map);
    }

    #[test]
    fn test_dropping_keeps_shared_parts() {
        let shared = Value::vector(vec![Value::Int(1)]);
        let outer = Value::list(vec![shared.clone(), shared.clone()]);
        drop(outer);
        assert_eq!(shared, Value::vector(vec![Value::Int(1)]));
    }

    #[test]
    fn test_lookup() {
        let map = Value::map_from_pairs(&[Value::keyword("a"), Value::Int(1)], "test").unwrap();
        assert_eq!(map.lookup(&Value::keyword("a")), Some(Value::Int(1)));
        assert_eq!(map.lookup(&Value::keyword("b")), None);

        let vector = Value::vector(vec![Value::Int(10), Value::Int(20)]);
        assert_eq!(vector.lookup(&Value::Int(1)), Some(Value::Int(20)));
        assert_eq!(vector.lookup(&Value::Int(5)), None);
        assert_eq!(vector.lookup(&Value::Int(-1)), None);
    }

    #[test]
    fn test_odd_map_literal_is_rejected() {
        assert!(Value::map_from_pairs(&[Value::Int(1)], "hash-map").is_err());
    }

    #[test]
    fn test_seq_items_of_string_and_map() {
        let chars = Value::string("ab").seq_items().unwrap();
        assert_eq!(chars, vec![Value::string("a"), Value::string("b")]);

        let map = Value::map_from_pairs(&[Value::keyword("a"), Value::Int(1)], "test").unwrap();
        assert_eq!(
            map.seq_items().unwrap(),
            vec![Value::vector(vec![Value::keyword("a"), Value::Int(1)])]
        );
        assert!(Value::Int(1).seq_items().is_err());
    }

    #[test]
    fn test_params_parse_rest() {
        let form = Value::vector(vec![
            Value::symbol("a"),
            Value::symbol("&"),
            Value::symbol("more"),
        ]);
        let params = Params::parse(&form).unwrap();
        assert_eq!(params.required, vec![Rc::<str>::from("a")]);
        assert_eq!(params.rest, Some(Rc::<str>::from("more")));
    }

    #[test]
    fn test_params_reject_non_symbols() {
        let form = Value::vector(vec![Value::Int(1)]);
        assert!(Params::parse(&form).is_err());
    }

    #[test]
    fn test_atoms_compare_by_identity() {
        let a = Value::atom(Value::Int(1));
        let b = Value::atom(Value::Int(1));
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }
}
