//! Tests for loop/recur iteration

use parens::{Error, Evaluator, Value};

fn eval_lisp(source: &str) -> Result<Value, Error> {
    let mut evaluator = Evaluator::new()?;
    evaluator.evaluate_all(source)
}

#[test]
fn test_loop_without_recur() {
    assert_eq!(eval_lisp("(loop [x 1 y (+ x 1)] (* x y))").unwrap(), Value::Int(2));
}

#[test]
fn test_hundred_thousand_iterations() {
    let source = "(loop [i 0 acc 0] (if (= i 100000) acc (recur (inc i) (+ acc i))))";
    assert_eq!(eval_lisp(source).unwrap(), Value::Int(4_999_950_000));
}

#[test]
fn test_recur_in_nested_tail_positions() {
    let source = r#"
(loop [n 10 evens 0]
  (cond
    (= n 0) evens
    (even? n) (recur (dec n) (inc evens))
    :else (let [m (dec n)] (recur m evens))))
"#;
    assert_eq!(eval_lisp(source).unwrap(), Value::Int(5));
}

#[test]
fn test_recur_targets_innermost_loop() {
    let source = r#"
(loop [i 0 total 0]
  (if (= i 3)
    total
    (recur (inc i)
           (+ total (loop [j 0 acc 0]
                      (if (= j 4) acc (recur (inc j) (+ acc 1))))))))
"#;
    assert_eq!(eval_lisp(source).unwrap(), Value::Int(12));
}

#[test]
fn test_loop_in_function_called_from_another_loop() {
    let source = r#"
(defn count-to [n]
  (loop [i 0] (if (= i n) i (recur (inc i)))))
(loop [k 0 acc []]
  (if (= k 3) acc (recur (inc k) (conj acc (count-to k)))))
"#;
    let mut evaluator = Evaluator::new().unwrap();
    let value = evaluator.evaluate_all(source).unwrap();
    assert_eq!(value.to_string(), "[0 1 2]");
}

#[test]
fn test_closures_capture_their_iteration() {
    let source = r#"
(def fns
  (loop [i 0 acc []]
    (if (= i 3) acc (recur (inc i) (conj acc (fn [] i))))))
(map (fn [f] (f)) fns)
"#;
    let mut evaluator = Evaluator::new().unwrap();
    let value = evaluator.evaluate_all(source).unwrap();
    assert_eq!(value.to_string(), "(0 1 2)");
}

#[test]
fn test_recur_outside_loop() {
    assert!(matches!(eval_lisp("(recur 1)"), Err(Error::InvalidRecur)));
    assert!(matches!(
        eval_lisp("(defn f [x] (recur x)) (f 1)"),
        Err(Error::InvalidRecur)
    ));
}

#[test]
fn test_recur_with_wrong_argument_count() {
    match eval_lisp("(loop [a 1 b 2] (recur 1))") {
        Err(Error::ArityError { name, got, .. }) => {
            assert_eq!(name, "recur");
            assert_eq!(got, 1);
        }
        other => panic!("expected ArityError, got {:?}", other),
    }
}

#[test]
fn test_failed_loop_leaves_evaluator_usable() {
    let mut evaluator = Evaluator::new().unwrap();
    assert!(evaluator
        .evaluate("(loop [i 0] (if (= i 5) (throw :stop) (recur (inc i))))")
        .is_err());
    assert_eq!(
        evaluator
            .evaluate("(loop [i 0] (if (= i 5) i (recur (inc i))))")
            .unwrap(),
        "5"
    );
}

#[test]
fn test_dotimes_and_doseq() {
    let source = r#"
(def seen (atom []))
(dotimes [i 3] (swap! seen conj i))
(doseq [x [:a :b]] (swap! seen conj x))
@seen
"#;
    let value = eval_lisp(source).unwrap();
    assert_eq!(value.to_string(), "[0 1 2 :a :b]");
}
