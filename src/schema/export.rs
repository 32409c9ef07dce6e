use serde_json::{Map, Value, json};

use super::{
    ColumnSlot, Dependencies, DependencyRule, FieldCore, FormComponent, FormSchema, OptionEntry,
    RuleLogic,
};

/// Serialize a schema back to its JSON interchange form. Only attributes that
/// are actually set are emitted, so exported documents stay clean for
/// preview and storage.
pub fn schema_to_value(schema: &FormSchema) -> Value {
    let mut root = Map::new();
    root.insert("title".to_string(), Value::String(schema.title.clone()));
    if let Some(description) = &schema.description {
        root.insert(
            "description".to_string(),
            Value::String(description.clone()),
        );
    }
    root.insert(
        "components".to_string(),
        Value::Array(schema.components.iter().map(component_to_value).collect()),
    );
    Value::Object(root)
}

pub fn component_to_value(component: &FormComponent) -> Value {
    match component {
        FormComponent::Text(core) => field_to_value("text", core, |_| {}),
        FormComponent::Email(core) => field_to_value("email", core, |_| {}),
        FormComponent::Textarea { core, rows } => field_to_value("textarea", core, |map| {
            if let Some(rows) = rows {
                map.insert("rows".to_string(), json!(rows));
            }
        }),
        FormComponent::Checkbox(core) => field_to_value("checkbox", core, |_| {}),
        FormComponent::Radio { core, options } => field_to_value("radio", core, |map| {
            map.insert("options".to_string(), options_to_value(options));
        }),
        FormComponent::Select {
            core,
            options,
            options_depends_on,
        } => field_to_value("select", core, |map| {
            map.insert("options".to_string(), options_to_value(options));
            if let Some(upstream) = options_depends_on {
                map.insert(
                    "optionsDependsOn".to_string(),
                    Value::String(upstream.clone()),
                );
            }
        }),
        FormComponent::Date(core) => field_to_value("date", core, |_| {}),
        FormComponent::Custom {
            core,
            component_key,
        } => field_to_value("custom", core, |map| {
            map.insert(
                "componentKey".to_string(),
                Value::String(component_key.clone()),
            );
        }),
        FormComponent::Group {
            name,
            title,
            description,
            components,
            dependencies,
        } => {
            let mut map = Map::new();
            map.insert("type".to_string(), Value::String("group".to_string()));
            map.insert("name".to_string(), Value::String(name.clone()));
            if let Some(title) = title {
                map.insert("title".to_string(), Value::String(title.clone()));
            }
            if let Some(description) = description {
                map.insert(
                    "description".to_string(),
                    Value::String(description.clone()),
                );
            }
            map.insert(
                "components".to_string(),
                Value::Array(components.iter().map(component_to_value).collect()),
            );
            insert_dependencies(&mut map, dependencies.as_ref());
            Value::Object(map)
        }
        FormComponent::Columns {
            name,
            columns,
            dependencies,
        } => {
            let mut map = Map::new();
            map.insert("type".to_string(), Value::String("column".to_string()));
            map.insert("name".to_string(), Value::String(name.clone()));
            map.insert(
                "columns".to_string(),
                Value::Array(columns.iter().map(column_to_value).collect()),
            );
            insert_dependencies(&mut map, dependencies.as_ref());
            Value::Object(map)
        }
        FormComponent::Unknown { raw, .. } => raw.clone(),
    }
}

fn field_to_value(
    type_name: &str,
    core: &FieldCore,
    extend: impl FnOnce(&mut Map<String, Value>),
) -> Value {
    let mut map = Map::new();
    map.insert("type".to_string(), Value::String(type_name.to_string()));
    map.insert("name".to_string(), Value::String(core.name.clone()));
    if let Some(label) = &core.label {
        map.insert("label".to_string(), Value::String(label.clone()));
    }
    if let Some(placeholder) = &core.placeholder {
        map.insert(
            "placeholder".to_string(),
            Value::String(placeholder.clone()),
        );
    }
    if let Some(help_text) = &core.help_text {
        map.insert("helpText".to_string(), Value::String(help_text.clone()));
    }
    if core.is_required {
        map.insert("isRequired".to_string(), Value::Bool(true));
    }
    if core.is_disabled {
        map.insert("isDisabled".to_string(), Value::Bool(true));
    }
    if let Some(default_value) = &core.default_value {
        map.insert("defaultValue".to_string(), default_value.clone());
    }
    if let Some(validation) = &core.validation {
        // ValidationRules serializes through serde; empty rule sets are
        // dropped at parse time so this is always meaningful.
        if let Ok(value) = serde_json::to_value(validation) {
            map.insert("validation".to_string(), value);
        }
    }
    insert_dependencies(&mut map, core.dependencies.as_ref());
    extend(&mut map);
    Value::Object(map)
}

fn options_to_value(options: &[OptionEntry]) -> Value {
    Value::Array(
        options
            .iter()
            .map(|entry| match entry {
                OptionEntry::Plain(s) => Value::String(s.clone()),
                OptionEntry::Labeled(item) => json!({
                    "label": item.label,
                    "value": item.value,
                }),
            })
            .collect(),
    )
}

fn column_to_value(column: &ColumnSlot) -> Value {
    json!({
        "width": column.width,
        "components": column.components.iter().map(component_to_value).collect::<Vec<_>>(),
    })
}

fn insert_dependencies(map: &mut Map<String, Value>, dependencies: Option<&Dependencies>) {
    let Some(dependencies) = dependencies else {
        return;
    };

    let mut deps = Map::new();
    if let Some(rule) = &dependencies.visibility {
        deps.insert("visibility".to_string(), rule_to_value(rule));
    }
    if let Some(rule) = &dependencies.required {
        deps.insert("required".to_string(), rule_to_value(rule));
    }
    if let Some(rule) = &dependencies.disabled {
        deps.insert("disabled".to_string(), rule_to_value(rule));
    }
    if !deps.is_empty() {
        map.insert("dependencies".to_string(), Value::Object(deps));
    }
}

fn rule_to_value(rule: &DependencyRule) -> Value {
    let conditions: Vec<Value> = rule
        .conditions
        .iter()
        .map(|condition| {
            json!({
                "field": condition.field,
                "operator": condition.operator.as_str(),
                "value": condition.value,
            })
        })
        .collect();

    match rule.logic {
        RuleLogic::And => json!({ "conditions": conditions }),
        RuleLogic::Or => json!({ "conditions": conditions, "logic": "OR" }),
    }
}
