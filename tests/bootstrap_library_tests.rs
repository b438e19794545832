//! Tests for the bootstrap library and the native primitives it builds on

use parens::{Error, Evaluator, EvaluatorConfig};

fn eval_lisp(source: &str) -> Result<String, Error> {
    let mut evaluator = Evaluator::new()?;
    let value = evaluator.evaluate_all(source)?;
    Ok(value.to_string())
}

fn check(source: &str, expected: &str) {
    match eval_lisp(source) {
        Ok(printed) => assert_eq!(printed, expected, "evaluating {}", source),
        Err(e) => panic!("evaluating {} failed: {}", source, e),
    }
}

// =============================================================================
// Definitions and conditionals
// =============================================================================

#[test]
fn test_defn_with_docstring() {
    check(
        "(defn greet \"Says hello\" [name] (str \"hello \" name)) (greet \"bob\")",
        "\"hello bob\"",
    );
}

#[test]
fn test_defn_body_has_implicit_do() {
    check(
        "(def a (atom 0)) (defn bump [] (swap! a inc) (swap! a inc)) (bump)",
        "2",
    );
}

#[test]
fn test_when_and_friends() {
    check("(when true 1 2)", "2");
    check("(when false 1)", "nil");
    check("(when-not false :ran)", ":ran");
    check("(if-not false :then :else)", ":then");
    check("(if-not true :then)", "nil");
}

#[test]
fn test_cond() {
    check("(cond false 1 nil 2 :else 3)", "3");
    check("(cond (= 1 1) :first (undefined) :never)", ":first");
    check("(cond false 1)", "nil");
    assert!(eval_lisp("(cond true)").is_err());
}

#[test]
fn test_and_or_return_values() {
    check("(and)", "true");
    check("(and 1 2 3)", "3");
    check("(and 1 nil 3)", "nil");
    check("(or)", "nil");
    check("(or nil false)", "false");
    check("(or nil :x (undefined))", ":x");
}

#[test]
fn test_not() {
    check("[(not nil) (not 0) (not false)]", "[true false true]");
}

// =============================================================================
// Threading and function combinators
// =============================================================================

#[test]
fn test_threading_macros() {
    check("(-> 5 (- 2) inc)", "4");
    check("(->> [1 2 3] (map inc) (reduce +))", "9");
    check("(-> {:a {:b 7}} :a :b)", "7");
}

#[test]
fn test_function_combinators() {
    check("((comp inc inc) 1)", "3");
    check("((comp) 7)", "7");
    check("((partial + 10) 1 2)", "13");
    check("((complement even?) 3)", "true");
    check("((constantly :k) 1 2 3)", ":k");
    check("(identity [1])", "[1]");
}

#[test]
fn test_anonymous_fn_literals() {
    check("(map #(* % %) [1 2 3])", "(1 4 9)");
    check("(#(vector %1 %2) :a :b)", "[:a :b]");
}

// =============================================================================
// Numbers
// =============================================================================

#[test]
fn test_number_predicates() {
    check(
        "[(zero? 0) (pos? 2) (neg? -1) (even? 4) (odd? 4) (zero? 0.0)]",
        "[true true true true false true]",
    );
}

#[test]
fn test_arithmetic_promotion() {
    check("(/ 6 3)", "2");
    check("(/ 1 2)", "0.5");
    check("(+ 1 2.5)", "3.5");
    check("(mod -7 3)", "2");
    check("(rem -7 3)", "-1");
    check("(max 3 9 2)", "9");
    check("(min 3 9 2)", "2");
}

// =============================================================================
// Sequences
// =============================================================================

#[test]
fn test_reduce() {
    check("(reduce + [1 2 3 4])", "10");
    check("(reduce + 10 [1 2])", "13");
    check("(reduce + [])", "0");
    check("(reduce conj [] '(1 2))", "[1 2]");
}

#[test]
fn test_filter_remove_range() {
    check("(filter even? (range 10))", "(0 2 4 6 8)");
    check("(remove even? (range 5))", "(1 3)");
    check("(range 2 5)", "(2 3 4)");
    check("(range 10 0 -3)", "(10 7 4 1)");
    check("(range 0)", "()");
    assert!(eval_lisp("(range 0 5 0)").is_err());
}

#[test]
fn test_take_and_drop() {
    check("(take 2 [1 2 3])", "(1 2)");
    check("(take 5 [1 2])", "(1 2)");
    check("(drop 2 [1 2 3])", "(3)");
    check("(take-while neg? [-1 -2 3 -4])", "(-1 -2)");
    check("(drop-while neg? [-1 -2 3 -4])", "(3 -4)");
}

#[test]
fn test_sequence_helpers() {
    check("(reverse [1 2 3])", "(3 2 1)");
    check("(second [1 2 3])", "2");
    check("(next [1])", "nil");
    check("(every? odd? [1 3])", "true");
    check("(every? odd? [1 2])", "false");
    check("(some even? [1 2 3])", "true");
    check("(some even? [1 3])", "nil");
    check("(into [0] (list 1 2))", "[0 1 2]");
    check("(mapcat (fn [x] [x x]) [1 2])", "(1 1 2 2)");
    check("(interpose :sep [1 2 3])", "(1 :sep 2 :sep 3)");
    check("(distinct [1 2 1 3 2])", "(1 2 3)");
    check("(frequencies [:a :b :a])", "{:a 2 :b 1}");
}

#[test]
fn test_large_sequences() {
    check("(reduce + (range 100000))", "4999950000");
    check("(count (filter even? (range 100000)))", "50000");
    check("(last (take 100000 (range 200000)))", "99999");
    check("(count (reverse (into [] (range 100000))))", "100000");
    check(
        "(def total (atom 0)) (doseq [x (range 100000)] (swap! total + x)) @total",
        "4999950000",
    );
}

#[test]
fn test_float_equality() {
    check("(= 0.0 -0.0)", "true");
    check("(let [nan (/ 0.0 0.0)] [(= nan nan) (not= nan nan)])", "[false true]");
    check("(= [1.5] (list 1.5))", "true");
}

#[test]
fn test_map_over_several_collections() {
    check("(map + [1 2 3] [10 20])", "(11 22)");
    check("(map inc [])", "()");
}

// =============================================================================
// Collections and strings
// =============================================================================

#[test]
fn test_collection_primitives() {
    check("(assoc {:a 1} :b 2)", "{:a 1 :b 2}");
    check("(dissoc {:a 1 :b 2} :a)", "{:b 2}");
    check("(conj '(2 3) 1)", "(1 2 3)");
    check("(conj [1 2] 3)", "[1 2 3]");
    check("(cons 0 [1 2])", "(0 1 2)");
    check("(concat [1] '(2) [])", "(1 2)");
    check("[(count {:a 1}) (count nil) (empty? [])]", "[1 0 true]");
    check("(= [1 2] '(1 2))", "true");
    check("(= 1 1.0)", "false");
    assert!(matches!(
        eval_lisp("(nth [1 2] 5)"),
        Err(Error::IndexOutOfBounds { .. })
    ));
}

#[test]
fn test_string_primitives() {
    check("(str \"a\" 1 nil :k)", "\"a1:k\"");
    check("(pr-str \"a\" [1])", "\"\\\"a\\\" [1]\"");
    check("(subs \"hello\" 1 3)", "\"el\"");
    check("(upper-case \"abc\")", "\"ABC\"");
    check("(join \", \" [1 2 3])", "\"1, 2, 3\"");
    check("(split \"a,b,c\" \",\")", "[\"a\" \"b\" \"c\"]");
    check("(read-string \"(+ 1 2)\")", "(+ 1 2)");
    check("(eval (read-string \"(+ 1 2)\"))", "3");
    check("(keyword \"k\")", ":k");
    check("(symbol \"s\")", "s");
}

#[test]
fn test_regex_primitives() {
    check("(re-find #\"\\d+\" \"ab123cd45\")", "\"123\"");
    check("(re-matches #\"\\d+\" \"123x\")", "nil");
    check("(re-matches #\"(\\w)(\\d)\" \"a1\")", "[\"a1\" \"a\" \"1\"]");
    check("(re-seq #\"\\d\" \"a1b2\")", "(\"1\" \"2\")");
    check("(re-find (re-pattern \"b+\") \"abbbc\")", "\"bbb\"");
    assert!(matches!(
        eval_lisp("(re-pattern \"(\")"),
        Err(Error::InvalidRegex { .. })
    ));
}

#[test]
fn test_atoms() {
    check(
        "(def a (atom 1)) (reset! a 5) (swap! a + 10) [@a (atom? a) (deref a)]",
        "[15 true 15]",
    );
}

#[test]
fn test_apply() {
    check("(apply + 1 2 [3 4])", "10");
    check("(apply list [])", "()");
}

#[test]
fn test_time_ms_is_positive() {
    check("(pos? (time-ms))", "true");
}

// =============================================================================
// Bootstrap lifecycle
// =============================================================================

#[test]
fn test_bare_evaluator_has_primitives_only() {
    let mut evaluator = Evaluator::with_config(EvaluatorConfig::bare()).unwrap();
    assert_eq!(evaluator.evaluate("(+ 1 2)").unwrap(), "3");
    assert!(matches!(
        evaluator.evaluate("(defn f [] 1)"),
        Err(Error::UnboundSymbol { .. })
    ));
}

#[test]
fn test_evaluators_are_independent() {
    let mut first = Evaluator::new().unwrap();
    let mut second = Evaluator::new().unwrap();
    first.evaluate("(def only-here 1)").unwrap();
    assert!(second.evaluate("only-here").is_err());
}
