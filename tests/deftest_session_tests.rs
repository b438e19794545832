//! Tests for deftest/testing and the per-evaluator test session

use parens::{Evaluator, Value};

const SUITE: &str = r#"
(ns math-test)

(deftest addition
  (testing "small numbers"
    (is (= 2 (+ 1 1))))
  (is (= 10 (* 2 5))))

(deftest failing
  (is (= 3 (+ 1 1))))
"#;

#[test]
fn test_deftest_records_body_results() {
    let mut evaluator = Evaluator::new().unwrap();
    evaluator.evaluate_all(SUITE).unwrap();

    let records = evaluator.tests();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].name, "addition");
    assert_eq!(
        records[0].result,
        Value::vector(vec![Value::Bool(true), Value::Bool(true)])
    );
    assert_eq!(records[1].name, "failing");
    assert_eq!(records[1].result, Value::vector(vec![Value::Bool(false)]));
}

#[test]
fn test_deftest_binds_its_name() {
    let mut evaluator = Evaluator::new().unwrap();
    evaluator.evaluate_all(SUITE).unwrap();
    assert_eq!(evaluator.evaluate("addition").unwrap(), "[true true]");
}

#[test]
fn test_testing_returns_last_value_without_recording() {
    let mut evaluator = Evaluator::new().unwrap();
    assert_eq!(evaluator.evaluate("(testing \"label\" 1 2)").unwrap(), "2");
    assert!(evaluator.session().is_empty());
}

#[test]
fn test_session_exports_json() {
    let mut evaluator = Evaluator::new().unwrap();
    evaluator.evaluate_all(SUITE).unwrap();

    let json: serde_json::Value = serde_json::from_str(&evaluator.session().to_json()).unwrap();
    assert_eq!(
        json,
        serde_json::json!([
            {"test": "addition", "result": "[true true]"},
            {"test": "failing", "result": "[false]"},
        ])
    );
}

#[test]
fn test_clear_tests() {
    let mut evaluator = Evaluator::new().unwrap();
    evaluator.evaluate_all(SUITE).unwrap();
    evaluator.clear_tests();
    assert!(evaluator.tests().is_empty());
    assert_eq!(evaluator.session().to_json(), "[]");

    evaluator.evaluate("(deftest again (is true))").unwrap();
    assert_eq!(evaluator.tests().len(), 1);
}

#[test]
fn test_sessions_are_per_evaluator() {
    let mut first = Evaluator::new().unwrap();
    let second = Evaluator::new().unwrap();
    first.evaluate_all(SUITE).unwrap();
    assert_eq!(first.tests().len(), 2);
    assert!(second.tests().is_empty());
}

#[test]
fn test_failure_inside_deftest_records_nothing() {
    let mut evaluator = Evaluator::new().unwrap();
    assert!(evaluator
        .evaluate("(deftest broken (is (undefined-fn)))")
        .is_err());
    assert!(evaluator.tests().is_empty());
}
