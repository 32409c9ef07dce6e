use anyhow::{Context, Result};
use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;

use crate::rules::evaluate_rule;
use crate::schema::{DependencyRule, FormComponent, flatten_fields};

/// Per-field validation callback: returns the failure message, or `None`
/// when the value passes.
pub type CustomCheck = Box<dyn Fn(&Value, &IndexMap<String, Value>) -> Option<String>>;

const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";

/// Compiled per-field rule chains, built once from the component tree and
/// evaluated against the live value map on demand.
pub struct ValidationSchema {
    fields: Vec<FieldRules>,
}

struct FieldRules {
    name: String,
    kind: ValueKind,
    rules: Vec<Rule>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueKind {
    Boolean,
    Text,
}

enum Rule {
    Required {
        message: String,
    },
    MustBeTrue {
        message: String,
    },
    MinLen {
        limit: usize,
        message: String,
    },
    MaxLen {
        limit: usize,
        message: String,
    },
    Pattern {
        regex: Regex,
        message: String,
    },
    /// Conditionally required: the dependency rule re-runs against the live
    /// values of exactly the fields its conditions reference.
    RequiredWhen {
        rule: DependencyRule,
        watch: Vec<String>,
        message: String,
        checkbox: bool,
    },
    Custom(CustomCheck),
}

/// Compile the component tree, plus any per-field custom callbacks, into a
/// validation schema. Checkbox fields get boolean semantics, everything else
/// string semantics; an invalid `validation.pattern` is a build error.
pub fn build_validation_schema(
    components: &[FormComponent],
    mut custom_validation: IndexMap<String, CustomCheck>,
) -> Result<ValidationSchema> {
    let mut fields = Vec::new();

    for field in flatten_fields(components) {
        let Some(core) = field.core() else {
            continue;
        };
        let is_checkbox = matches!(field, FormComponent::Checkbox(_));
        let kind = if is_checkbox {
            ValueKind::Boolean
        } else {
            ValueKind::Text
        };
        let required_message = format!("{} is required", core.display_label());
        let mut rules = Vec::new();

        if core.is_required {
            rules.push(if is_checkbox {
                Rule::MustBeTrue {
                    message: required_message.clone(),
                }
            } else {
                Rule::Required {
                    message: required_message.clone(),
                }
            });
        }

        if let Some(validation) = &core.validation {
            if !is_checkbox {
                if let Some(min) = validation.min {
                    rules.push(Rule::MinLen {
                        limit: min,
                        message: validation
                            .message
                            .clone()
                            .unwrap_or_else(|| format!("Minimum {min} characters")),
                    });
                }
                if let Some(max) = validation.max {
                    rules.push(Rule::MaxLen {
                        limit: max,
                        message: validation
                            .message
                            .clone()
                            .unwrap_or_else(|| format!("Maximum {max} characters")),
                    });
                }
                if let Some(pattern) = &validation.pattern {
                    let regex = Regex::new(pattern).with_context(|| {
                        format!("invalid validation pattern for field '{}'", core.name)
                    })?;
                    rules.push(Rule::Pattern {
                        regex,
                        message: validation
                            .message
                            .clone()
                            .unwrap_or_else(|| "Invalid format".to_string()),
                    });
                }
            }
        }

        if matches!(field, FormComponent::Email(_)) {
            rules.push(Rule::Pattern {
                regex: Regex::new(EMAIL_PATTERN).context("email pattern")?,
                message: "Invalid email address".to_string(),
            });
        }

        if let Some(rule) = core
            .dependencies
            .as_ref()
            .and_then(|dependencies| dependencies.required.as_ref())
        {
            let mut watch = Vec::new();
            for condition in &rule.conditions {
                if !watch.contains(&condition.field) {
                    watch.push(condition.field.clone());
                }
            }
            rules.push(Rule::RequiredWhen {
                rule: rule.clone(),
                watch,
                message: required_message,
                checkbox: is_checkbox,
            });
        }

        if let Some(check) = custom_validation.shift_remove(&core.name) {
            rules.push(Rule::Custom(check));
        }

        fields.push(FieldRules {
            name: core.name.clone(),
            kind,
            rules,
        });
    }

    Ok(ValidationSchema { fields })
}

/// Run every field's rule chain against the current values. The first
/// failing rule per field wins; the result maps field name to message in
/// schema order.
pub fn validate(
    schema: &ValidationSchema,
    values: &IndexMap<String, Value>,
) -> IndexMap<String, String> {
    let mut errors = IndexMap::new();

    for field in &schema.fields {
        let raw = values.get(&field.name).unwrap_or(&Value::Null);
        // Untouched text inputs hold the empty string; treat it as absent so
        // format rules only fire on actual input.
        let value = match field.kind {
            ValueKind::Text if raw.as_str() == Some("") => &Value::Null,
            _ => raw,
        };

        for rule in &field.rules {
            if let Some(message) = apply_rule(rule, value, values) {
                errors.insert(field.name.clone(), message);
                break;
            }
        }
    }

    errors
}

fn apply_rule(rule: &Rule, value: &Value, values: &IndexMap<String, Value>) -> Option<String> {
    match rule {
        Rule::Required { message } => value.is_null().then(|| message.clone()),
        Rule::MustBeTrue { message } => {
            (value.as_bool() != Some(true)).then(|| message.clone())
        }
        Rule::MinLen { limit, message } => value
            .as_str()
            .is_some_and(|s| s.chars().count() < *limit)
            .then(|| message.clone()),
        Rule::MaxLen { limit, message } => value
            .as_str()
            .is_some_and(|s| s.chars().count() > *limit)
            .then(|| message.clone()),
        Rule::Pattern { regex, message } => value
            .as_str()
            .is_some_and(|s| !regex.is_match(s))
            .then(|| message.clone()),
        Rule::RequiredWhen {
            rule,
            watch,
            message,
            checkbox,
        } => {
            let snapshot: IndexMap<String, Value> = watch
                .iter()
                .map(|field| {
                    (
                        field.clone(),
                        values.get(field).cloned().unwrap_or(Value::Null),
                    )
                })
                .collect();
            if !evaluate_rule(Some(rule), &snapshot) {
                return None;
            }
            let missing = if *checkbox {
                value.as_bool() != Some(true)
            } else {
                value.is_null()
            };
            missing.then(|| message.clone())
        }
        Rule::Custom(check) => check(value, values),
    }
}
