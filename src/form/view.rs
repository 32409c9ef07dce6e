use serde_json::Value;

use crate::schema::{FormComponent, OptionItem};

use super::engine::FormEngine;

/// One node of the visibility-filtered tree handed to a renderer. Hidden
/// components are absent entirely; components the renderer cannot know how
/// to draw become local [`RenderNode::Error`] markers without affecting
/// their siblings.
#[derive(Debug, Clone)]
pub enum RenderNode {
    Field(FieldView),
    Group {
        name: String,
        title: Option<String>,
        description: Option<String>,
        children: Vec<RenderNode>,
    },
    Columns {
        name: String,
        columns: Vec<ColumnView>,
    },
    Error {
        name: String,
        message: String,
    },
}

#[derive(Debug, Clone)]
pub struct ColumnView {
    pub width: u8,
    pub children: Vec<RenderNode>,
}

/// Everything a widget needs to draw one field: effective flags (dependency
/// rules OR-ed with the static attributes), current value, normalized
/// options with their load state, and the current validation error.
#[derive(Debug, Clone)]
pub struct FieldView {
    pub name: String,
    pub control: ControlKind,
    pub label: Option<String>,
    pub placeholder: Option<String>,
    pub help_text: Option<String>,
    pub required: bool,
    pub disabled: bool,
    pub value: Value,
    pub options: Vec<OptionItem>,
    pub loading: bool,
    pub load_error: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlKind {
    Text,
    Email,
    Textarea { rows: Option<u32> },
    Checkbox,
    Radio,
    Select,
    Date,
    Custom { component_key: String },
}

impl FormEngine {
    /// Snapshot the renderable tree for the current values.
    pub fn render_tree(&self) -> Vec<RenderNode> {
        self.render_children(&self.schema.components)
    }

    fn render_children(&self, components: &[FormComponent]) -> Vec<RenderNode> {
        components
            .iter()
            .filter_map(|component| self.render_component(component))
            .collect()
    }

    fn render_component(&self, component: &FormComponent) -> Option<RenderNode> {
        let flags = self.flags(component.name());
        if !flags.visible {
            return None;
        }

        let node = match component {
            FormComponent::Group {
                name,
                title,
                description,
                components,
                ..
            } => RenderNode::Group {
                name: name.clone(),
                title: title.clone(),
                description: description.clone(),
                children: self.render_children(components),
            },
            FormComponent::Columns { name, columns, .. } => RenderNode::Columns {
                name: name.clone(),
                columns: columns
                    .iter()
                    .map(|column| ColumnView {
                        width: column.width,
                        children: self.render_children(&column.components),
                    })
                    .collect(),
            },
            FormComponent::Unknown { name, raw } => RenderNode::Error {
                name: name.clone(),
                message: format!(
                    "Unknown component type: {}",
                    raw.get("type").and_then(Value::as_str).unwrap_or("?")
                ),
            },
            FormComponent::Custom {
                core,
                component_key,
            } if !self.custom_components.contains(component_key) => RenderNode::Error {
                name: core.name.clone(),
                message: format!("Unknown custom component: {component_key}"),
            },
            leaf => {
                let core = leaf.core()?;
                let control = match leaf {
                    FormComponent::Text(_) => ControlKind::Text,
                    FormComponent::Email(_) => ControlKind::Email,
                    FormComponent::Textarea { rows, .. } => ControlKind::Textarea { rows: *rows },
                    FormComponent::Checkbox(_) => ControlKind::Checkbox,
                    FormComponent::Radio { .. } => ControlKind::Radio,
                    FormComponent::Select { .. } => ControlKind::Select,
                    FormComponent::Date(_) => ControlKind::Date,
                    FormComponent::Custom { component_key, .. } => ControlKind::Custom {
                        component_key: component_key.clone(),
                    },
                    _ => return None,
                };

                let options = self.options_view(&core.name);
                RenderNode::Field(FieldView {
                    name: core.name.clone(),
                    control,
                    label: core.label.clone(),
                    placeholder: core.placeholder.clone(),
                    help_text: core.help_text.clone(),
                    required: flags.required || core.is_required,
                    disabled: flags.disabled || core.is_disabled,
                    value: self.value(&core.name).clone(),
                    options: options.options,
                    loading: options.loading,
                    load_error: options.error,
                    error: self.field_error(&core.name).map(str::to_string),
                })
            }
        };

        Some(node)
    }
}
