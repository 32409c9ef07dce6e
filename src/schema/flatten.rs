use std::collections::HashSet;

use indexmap::IndexMap;
use serde_json::Value;

use super::FormComponent;

/// Walk the component tree depth-first and collect the leaf fields that
/// actually carry data. Groups and columns are layout-only and transparent;
/// unknown components have no data semantics and are skipped.
pub fn flatten_fields(components: &[FormComponent]) -> Vec<&FormComponent> {
    let mut fields = Vec::new();
    collect_fields(components, &mut fields);
    fields
}

fn collect_fields<'a>(components: &'a [FormComponent], out: &mut Vec<&'a FormComponent>) {
    for component in components {
        match component {
            FormComponent::Group { components, .. } => collect_fields(components, out),
            FormComponent::Columns { columns, .. } => {
                for column in columns {
                    collect_fields(&column.components, out);
                }
            }
            FormComponent::Unknown { .. } => {}
            leaf => out.push(leaf),
        }
    }
}

/// Every name in use across the tree, layout nodes included. Used by the
/// builder to keep generated names unique.
pub fn collect_component_names(components: &[FormComponent]) -> HashSet<String> {
    let mut names = HashSet::new();
    collect_names(components, &mut names);
    names
}

fn collect_names(components: &[FormComponent], out: &mut HashSet<String>) {
    for component in components {
        out.insert(component.name().to_string());
        match component {
            FormComponent::Group { components, .. } => collect_names(components, out),
            FormComponent::Columns { columns, .. } => {
                for column in columns {
                    collect_names(&column.components, out);
                }
            }
            _ => {}
        }
    }
}

/// Initial value for every flattened field: its declared default, else
/// `false` for checkboxes, else the empty string.
pub fn build_default_values(components: &[FormComponent]) -> IndexMap<String, Value> {
    let mut defaults = IndexMap::new();
    for field in flatten_fields(components) {
        let value = match field.core().and_then(|core| core.default_value.clone()) {
            Some(value) => value,
            None if matches!(field, FormComponent::Checkbox(_)) => Value::Bool(false),
            None => Value::String(String::new()),
        };
        defaults.insert(field.name().to_string(), value);
    }
    defaults
}
