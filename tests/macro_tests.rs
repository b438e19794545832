//! Tests for the macro system: defmacro, macroexpand, quasiquote and gensym

use parens::{Error, Evaluator, Value};

fn eval_lisp(source: &str) -> Result<Value, Error> {
    let mut evaluator = Evaluator::new()?;
    evaluator.evaluate_all(source)
}

fn eval_printed(source: &str) -> String {
    let mut evaluator = Evaluator::new().unwrap();
    let value = evaluator.evaluate_all(source).unwrap();
    parens::pr_str(&value, true)
}

const UNLESS: &str = "(defmacro unless [c t e] (list 'if c e t))";

#[test]
fn test_defmacro_defines_macro() {
    let source = r#"
(defmacro test-macro [x] x)
(macro? test-macro)
"#;
    assert_eq!(eval_lisp(source).unwrap(), Value::Bool(true));
}

#[test]
fn test_macro_receives_unevaluated_arguments() {
    let source = format!("{}\n(unless false 1 2)", UNLESS);
    assert_eq!(eval_lisp(&source).unwrap(), Value::Int(1));

    // The untaken branch is never evaluated
    let source = format!("{}\n(unless true (undefined-call) :safe)", UNLESS);
    assert_eq!(eval_lisp(&source).unwrap(), Value::keyword("safe"));
}

#[test]
fn test_macroexpand_returns_expansion_unevaluated() {
    let source = format!("{}\n(macroexpand '(unless false 1 2))", UNLESS);
    assert_eq!(eval_printed(&source), "(if false 2 1)");
}

#[test]
fn test_macroexpand_without_macro_head_is_identity() {
    assert_eq!(eval_printed("(macroexpand '(+ 1 2))"), "(+ 1 2)");
    assert_eq!(eval_printed("(macroexpand 'just-a-symbol)"), "just-a-symbol");
    assert_eq!(eval_printed("(macroexpand '())"), "()");
}

#[test]
fn test_macroexpand_expands_repeatedly() {
    let source = r#"
(defmacro twice-wrapped [x] (list 'wrapped x))
(defmacro wrapped [x] (list 'do x))
(macroexpand '(twice-wrapped 5))
"#;
    assert_eq!(eval_printed(source), "(do 5)");
}

#[test]
fn test_macro_output_is_evaluated_in_caller_scope() {
    let source = r#"
(defmacro square-of [x] `(* ~x ~x))
(let [n 7] (square-of n))
"#;
    assert_eq!(eval_lisp(source).unwrap(), Value::Int(49));
}

// =============================================================================
// Quasiquote
// =============================================================================

#[test]
fn test_quasiquote_splicing() {
    assert_eq!(eval_printed("`(1 ~@(list 2 3) 4)"), "(1 2 3 4)");
}

#[test]
fn test_quasiquote_unquote() {
    assert_eq!(eval_printed("(def x 10) `(a ~x b)"), "(a 10 b)");
    assert_eq!(eval_printed("`sym"), "sym");
    assert_eq!(eval_printed("`42"), "42");
}

#[test]
fn test_quasiquote_keeps_vectors() {
    assert_eq!(eval_printed("(def xs [2 3]) `[1 ~@xs]"), "[1 2 3]");
    assert!(matches!(
        eval_lisp("`[1 ~(+ 1 1)]").unwrap(),
        Value::Vector(_)
    ));
}

#[test]
fn test_quasiquote_nested_lists() {
    assert_eq!(
        eval_printed("(def y 5) `(outer (inner ~y) ~@(list y y))"),
        "(outer (inner 5) 5 5)"
    );
}

#[test]
fn test_quasiquoteexpand_shows_generated_code() {
    assert_eq!(
        eval_printed("(quasiquoteexpand (a ~b))"),
        "(cons (quote a) (cons b ()))"
    );
}

// =============================================================================
// Hygiene
// =============================================================================

#[test]
fn test_gensym_generates_unique_symbols() {
    let source = r#"
(def a (gensym))
(def b (gensym "tmp__"))
[(symbol? a) (= a b) (str b)]
"#;
    let result = eval_lisp(source).unwrap();
    let items = match &result {
        Value::Vector(items) => items,
        other => panic!("expected vector, got {}", other),
    };
    assert_eq!(items[0], Value::Bool(true));
    assert_eq!(items[1], Value::Bool(false));
    match &items[2] {
        Value::String(s) => assert!(s.starts_with("tmp__")),
        other => panic!("expected string, got {}", other),
    }
}

#[test]
fn test_or_macro_evaluates_operand_once() {
    let source = r#"
(def calls (atom 0))
(or (do (swap! calls inc) :first) :second)
@calls
"#;
    assert_eq!(eval_lisp(source).unwrap(), Value::Int(1));
}

#[test]
fn test_or_macro_does_not_capture_user_symbols() {
    let source = r#"
(def g :outer)
(or false g)
"#;
    assert_eq!(eval_lisp(source).unwrap(), Value::keyword("outer"));
}
