use std::collections::HashSet;

use anyhow::{Context, Result, bail};
use serde_json::Value;

use super::{
    ColumnSlot, Condition, ConditionOperator, Dependencies, DependencyRule, FieldCore,
    FormComponent, FormSchema, OptionEntry, OptionItem, RuleLogic, ValidationRules, flatten_fields,
};

/// Parse a schema JSON document into the internal `FormSchema`.
///
/// Unrecognized component types are preserved as `FormComponent::Unknown`
/// instead of failing the parse; structural defects (missing names, duplicate
/// field names, malformed conditions) are hard errors.
pub fn parse_form_schema(value: &Value) -> Result<FormSchema> {
    let root = value
        .as_object()
        .context("form schema must be a JSON object")?;

    let components = root
        .get("components")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    parse_component(item).with_context(|| format!("component at index {index}"))
                })
                .collect::<Result<Vec<_>>>()
        })
        .transpose()?
        .unwrap_or_default();

    ensure_unique_names(&components)?;

    Ok(FormSchema {
        title: read_string(value, "title").unwrap_or_default(),
        description: read_string(value, "description"),
        components,
    })
}

fn parse_component(value: &Value) -> Result<FormComponent> {
    let type_name = read_string(value, "type").context("component must declare a type")?;
    let name = read_string(value, "name").context("component must declare a name")?;

    let component = match type_name.as_str() {
        "text" => FormComponent::Text(parse_field_core(value, name)?),
        "email" => FormComponent::Email(parse_field_core(value, name)?),
        "textarea" => FormComponent::Textarea {
            core: parse_field_core(value, name)?,
            rows: value.get("rows").and_then(Value::as_u64).map(|n| n as u32),
        },
        "checkbox" => FormComponent::Checkbox(parse_field_core(value, name)?),
        "radio" => FormComponent::Radio {
            core: parse_field_core(value, name)?,
            options: parse_options(value)?,
        },
        "select" => FormComponent::Select {
            core: parse_field_core(value, name)?,
            options: parse_options(value)?,
            options_depends_on: read_string(value, "optionsDependsOn"),
        },
        "date" => FormComponent::Date(parse_field_core(value, name)?),
        "custom" => FormComponent::Custom {
            core: parse_field_core(value, name)?,
            component_key: read_string(value, "componentKey")
                .context("custom component must declare a componentKey")?,
        },
        "group" => FormComponent::Group {
            name,
            title: read_string(value, "title"),
            description: read_string(value, "description"),
            components: parse_children(value, "components")?,
            dependencies: parse_dependencies(value)?,
        },
        "column" => FormComponent::Columns {
            name,
            columns: parse_columns(value)?,
            dependencies: parse_dependencies(value)?,
        },
        other => {
            log::debug!("preserving component '{name}' with unknown type '{other}'");
            FormComponent::Unknown {
                name,
                raw: value.clone(),
            }
        }
    };

    Ok(component)
}

fn parse_field_core(value: &Value, name: String) -> Result<FieldCore> {
    let validation = match value.get("validation") {
        Some(v) => {
            let rules: ValidationRules = serde_json::from_value(v.clone())
                .with_context(|| format!("invalid validation rules on field '{name}'"))?;
            if rules.is_empty() { None } else { Some(rules) }
        }
        None => None,
    };

    Ok(FieldCore {
        label: read_string(value, "label"),
        placeholder: read_string(value, "placeholder"),
        help_text: read_string(value, "helpText"),
        is_required: read_bool(value, "isRequired"),
        is_disabled: read_bool(value, "isDisabled"),
        default_value: value.get("defaultValue").cloned(),
        validation,
        dependencies: parse_dependencies(value)
            .with_context(|| format!("invalid dependencies on field '{name}'"))?,
        name,
    })
}

fn parse_options(value: &Value) -> Result<Vec<OptionEntry>> {
    let Some(items) = value.get("options").and_then(Value::as_array) else {
        return Ok(Vec::new());
    };

    items
        .iter()
        .map(|item| match item {
            Value::String(s) => Ok(OptionEntry::Plain(s.clone())),
            Value::Object(_) => {
                let option: OptionItem = serde_json::from_value(item.clone())
                    .context("option object must have label and value")?;
                Ok(OptionEntry::Labeled(option))
            }
            other => bail!("option must be a string or an object, found {other}"),
        })
        .collect()
}

fn parse_children(value: &Value, key: &str) -> Result<Vec<FormComponent>> {
    let Some(items) = value.get(key).and_then(Value::as_array) else {
        return Ok(Vec::new());
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            parse_component(item).with_context(|| format!("child component at index {index}"))
        })
        .collect()
}

fn parse_columns(value: &Value) -> Result<Vec<ColumnSlot>> {
    let Some(items) = value.get("columns").and_then(Value::as_array) else {
        return Ok(Vec::new());
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let width = item.get("width").and_then(Value::as_u64).unwrap_or(6);
            if !(1..=12).contains(&width) {
                bail!("column {index} width must be between 1 and 12, found {width}");
            }
            Ok(ColumnSlot {
                width: width as u8,
                components: parse_children(item, "components")
                    .with_context(|| format!("column at index {index}"))?,
            })
        })
        .collect()
}

fn parse_dependencies(value: &Value) -> Result<Option<Dependencies>> {
    let Some(deps) = value.get("dependencies") else {
        return Ok(None);
    };
    if deps.is_null() {
        return Ok(None);
    }

    let dependencies = Dependencies {
        visibility: parse_rule(deps.get("visibility")).context("visibility rule")?,
        required: parse_rule(deps.get("required")).context("required rule")?,
        disabled: parse_rule(deps.get("disabled")).context("disabled rule")?,
    };

    Ok(if dependencies.is_empty() {
        None
    } else {
        Some(dependencies)
    })
}

fn parse_rule(value: Option<&Value>) -> Result<Option<DependencyRule>> {
    let Some(value) = value else {
        return Ok(None);
    };
    if value.is_null() {
        return Ok(None);
    }

    let conditions = value
        .get("conditions")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    parse_condition(item).with_context(|| format!("condition at index {index}"))
                })
                .collect::<Result<Vec<_>>>()
        })
        .transpose()?
        .unwrap_or_default();

    let logic = match read_string(value, "logic").as_deref() {
        Some("OR") => RuleLogic::Or,
        _ => RuleLogic::And,
    };

    Ok(Some(DependencyRule { conditions, logic }))
}

fn parse_condition(value: &Value) -> Result<Condition> {
    let field = read_string(value, "field").context("condition must name a field")?;
    let operator = read_string(value, "operator").context("condition must name an operator")?;

    Ok(Condition {
        field,
        operator: ConditionOperator::parse(&operator),
        value: value.get("value").cloned().unwrap_or(Value::Null),
    })
}

fn ensure_unique_names(components: &[FormComponent]) -> Result<()> {
    let mut seen = HashSet::new();
    for field in flatten_fields(components) {
        if !seen.insert(field.name().to_string()) {
            bail!("duplicate field name '{}'", field.name());
        }
    }
    Ok(())
}

fn read_string(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

fn read_bool(value: &Value, key: &str) -> bool {
    value.get(key).and_then(Value::as_bool).unwrap_or(false)
}
