use indexmap::IndexMap;
use serde_json::{Value, json};

use crate::rules::{evaluate_condition, evaluate_rule, watched_fields};
use crate::schema::{Condition, ConditionOperator, Dependencies, DependencyRule};

fn values(entries: &[(&str, Value)]) -> IndexMap<String, Value> {
    entries
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

fn cond(field: &str, operator: &str, value: Value) -> Condition {
    Condition::new(field, ConditionOperator::parse(operator), value)
}

#[test]
fn empty_rule_is_vacuously_true() {
    let rule = DependencyRule::all(Vec::new());
    assert!(evaluate_rule(Some(&rule), &values(&[])));
    assert!(evaluate_rule(None, &values(&[("x", json!(1))])));
}

#[test]
fn and_logic_needs_every_condition() {
    let rule = DependencyRule::all(vec![
        cond("a", "equals", json!("yes")),
        cond("b", "equals", json!("yes")),
    ]);
    let vals = values(&[("a", json!("yes")), ("b", json!("no"))]);
    assert!(!evaluate_rule(Some(&rule), &vals));

    let vals = values(&[("a", json!("yes")), ("b", json!("yes"))]);
    assert!(evaluate_rule(Some(&rule), &vals));
}

#[test]
fn or_logic_needs_any_condition() {
    let rule = DependencyRule::any(vec![
        cond("a", "equals", json!("yes")),
        cond("b", "equals", json!("yes")),
    ]);
    let vals = values(&[("a", json!("no")), ("b", json!("yes"))]);
    assert!(evaluate_rule(Some(&rule), &vals));

    let vals = values(&[("a", json!("no")), ("b", json!("no"))]);
    assert!(!evaluate_rule(Some(&rule), &vals));
}

#[test]
fn equals_and_not_equals_are_complements() {
    for (field_value, expected) in [(json!("x"), true), (json!("y"), false), (json!(3), false)] {
        let vals = values(&[("f", field_value)]);
        let eq = cond("f", "equals", json!("x"));
        let ne = cond("f", "notEquals", json!("x"));
        assert_eq!(evaluate_condition(&eq, &vals), expected);
        assert_eq!(evaluate_condition(&ne, &vals), !expected);
    }
}

#[test]
fn missing_field_reads_as_null() {
    let vals = values(&[]);
    assert!(evaluate_condition(
        &cond("absent", "equals", Value::Null),
        &vals
    ));
    assert!(evaluate_condition(
        &cond("absent", "notEquals", json!("x")),
        &vals
    ));
}

#[test]
fn contains_requires_string_field_value() {
    let vals = values(&[("s", json!("hello world")), ("n", json!(42))]);
    assert!(evaluate_condition(&cond("s", "contains", json!("world")), &vals));
    assert!(!evaluate_condition(&cond("s", "contains", json!("mars")), &vals));
    assert!(!evaluate_condition(&cond("n", "contains", json!("4")), &vals));
    assert!(!evaluate_condition(&cond("s", "contains", json!(1)), &vals));
}

#[test]
fn numeric_comparisons_coerce_strings() {
    let vals = values(&[("age", json!("21")), ("count", json!(7))]);
    assert!(evaluate_condition(&cond("age", "greaterThan", json!(18)), &vals));
    assert!(evaluate_condition(&cond("count", "lessThan", json!("10")), &vals));
    assert!(!evaluate_condition(&cond("age", "lessThan", json!(18)), &vals));
}

#[test]
fn non_numeric_comparison_is_false_not_an_error() {
    let vals = values(&[("name", json!("alice")), ("list", json!([1, 2]))]);
    assert!(!evaluate_condition(&cond("name", "greaterThan", json!(1)), &vals));
    assert!(!evaluate_condition(&cond("name", "lessThan", json!(1)), &vals));
    assert!(!evaluate_condition(&cond("list", "greaterThan", json!(0)), &vals));
    assert!(!evaluate_condition(&cond("missing", "greaterThan", json!(0)), &vals));
}

#[test]
fn in_operator_requires_an_array() {
    let vals = values(&[("color", json!("red"))]);
    assert!(evaluate_condition(
        &cond("color", "in", json!(["red", "blue"])),
        &vals
    ));
    assert!(!evaluate_condition(
        &cond("color", "in", json!(["green", "blue"])),
        &vals
    ));
    assert!(!evaluate_condition(&cond("color", "in", json!("red")), &vals));
}

#[test]
fn unknown_operator_fails_closed() {
    let vals = values(&[("f", json!("x"))]);
    assert!(!evaluate_condition(&cond("f", "matches", json!("x")), &vals));
}

#[test]
fn watched_fields_deduplicate_across_rules() {
    let dependencies = Dependencies {
        visibility: Some(DependencyRule::all(vec![
            cond("a", "equals", json!(1)),
            cond("b", "equals", json!(2)),
        ])),
        required: Some(DependencyRule::all(vec![cond("a", "equals", json!(1))])),
        disabled: Some(DependencyRule::all(vec![cond("c", "equals", json!(3))])),
    };
    assert_eq!(watched_fields(&dependencies), vec!["a", "b", "c"]);
}
