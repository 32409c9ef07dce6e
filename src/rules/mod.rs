use indexmap::IndexMap;
use serde_json::Value;

use crate::schema::{Condition, ConditionOperator, Dependencies, DependencyRule, RuleLogic};

/// Evaluate a single condition against the current values. A field that has
/// no entry in the map reads as `Null`. Never panics: any shape mismatch
/// (non-string `contains`, non-numeric comparison, non-array `in`, unknown
/// operator) evaluates to false.
pub fn evaluate_condition(condition: &Condition, values: &IndexMap<String, Value>) -> bool {
    let field_value = values.get(&condition.field).unwrap_or(&Value::Null);

    match &condition.operator {
        ConditionOperator::Equals => field_value == &condition.value,
        ConditionOperator::NotEquals => field_value != &condition.value,
        ConditionOperator::Contains => match (field_value.as_str(), condition.value.as_str()) {
            (Some(haystack), Some(needle)) => haystack.contains(needle),
            _ => false,
        },
        ConditionOperator::GreaterThan => {
            match (coerce_number(field_value), coerce_number(&condition.value)) {
                (Some(lhs), Some(rhs)) => lhs > rhs,
                _ => false,
            }
        }
        ConditionOperator::LessThan => {
            match (coerce_number(field_value), coerce_number(&condition.value)) {
                (Some(lhs), Some(rhs)) => lhs < rhs,
                _ => false,
            }
        }
        ConditionOperator::In => condition
            .value
            .as_array()
            .is_some_and(|candidates| candidates.iter().any(|candidate| candidate == field_value)),
        ConditionOperator::Other(op) => {
            log::debug!("unknown condition operator '{op}', evaluating to false");
            false
        }
    }
}

/// Evaluate a dependency rule. No rule, or a rule without conditions, is
/// vacuously satisfied.
pub fn evaluate_rule(rule: Option<&DependencyRule>, values: &IndexMap<String, Value>) -> bool {
    let Some(rule) = rule else {
        return true;
    };
    if rule.conditions.is_empty() {
        return true;
    }

    match rule.logic {
        RuleLogic::Or => rule
            .conditions
            .iter()
            .any(|condition| evaluate_condition(condition, values)),
        RuleLogic::And => rule
            .conditions
            .iter()
            .all(|condition| evaluate_condition(condition, values)),
    }
}

/// The deduplicated set of upstream field names referenced across all three
/// rule kinds, in first-seen order. This is the minimal subscription set for
/// a component: its state can only change when one of these fields does.
pub fn watched_fields(dependencies: &Dependencies) -> Vec<String> {
    let mut fields = Vec::new();
    for rule in [
        dependencies.visibility.as_ref(),
        dependencies.required.as_ref(),
        dependencies.disabled.as_ref(),
    ]
    .into_iter()
    .flatten()
    {
        for condition in &rule.conditions {
            if !fields.contains(&condition.field) {
                fields.push(condition.field.clone());
            }
        }
    }
    fields
}

/// Numeric coercion for ordered comparisons: numbers pass through, numeric
/// strings parse, booleans count as 1 and 0. Everything else has no numeric
/// interpretation and makes the comparison false.
fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(true) => Some(1.0),
        Value::Bool(false) => Some(0.0),
        _ => None,
    }
}
