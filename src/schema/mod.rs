mod export;
mod flatten;
mod parser;

pub use export::{component_to_value, schema_to_value};
pub use flatten::{build_default_values, collect_component_names, flatten_fields};
pub use parser::parse_form_schema;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct FormSchema {
    pub title: String,
    pub description: Option<String>,
    pub components: Vec<FormComponent>,
}

impl FormSchema {
    pub fn empty() -> Self {
        Self {
            title: "Untitled Form".to_string(),
            description: None,
            components: Vec::new(),
        }
    }
}

/// Attributes shared by every data-bearing field.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldCore {
    pub name: String,
    pub label: Option<String>,
    pub placeholder: Option<String>,
    pub help_text: Option<String>,
    pub is_required: bool,
    pub is_disabled: bool,
    pub default_value: Option<Value>,
    pub validation: Option<ValidationRules>,
    pub dependencies: Option<Dependencies>,
}

impl FieldCore {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// The label shown in generated messages, falling back to the name.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormComponent {
    Text(FieldCore),
    Email(FieldCore),
    Textarea {
        core: FieldCore,
        rows: Option<u32>,
    },
    Checkbox(FieldCore),
    Radio {
        core: FieldCore,
        options: Vec<OptionEntry>,
    },
    Select {
        core: FieldCore,
        options: Vec<OptionEntry>,
        options_depends_on: Option<String>,
    },
    Date(FieldCore),
    Custom {
        core: FieldCore,
        component_key: String,
    },
    Group {
        name: String,
        title: Option<String>,
        description: Option<String>,
        components: Vec<FormComponent>,
        dependencies: Option<Dependencies>,
    },
    Columns {
        name: String,
        columns: Vec<ColumnSlot>,
        dependencies: Option<Dependencies>,
    },
    /// A component whose `type` tag was not recognized. Preserved verbatim so
    /// the rest of the form still parses and renders; surfaces as an inline
    /// error marker in the view tree.
    Unknown {
        name: String,
        raw: Value,
    },
}

impl FormComponent {
    pub fn name(&self) -> &str {
        match self {
            FormComponent::Text(core)
            | FormComponent::Email(core)
            | FormComponent::Checkbox(core)
            | FormComponent::Date(core) => &core.name,
            FormComponent::Textarea { core, .. }
            | FormComponent::Radio { core, .. }
            | FormComponent::Select { core, .. }
            | FormComponent::Custom { core, .. } => &core.name,
            FormComponent::Group { name, .. }
            | FormComponent::Columns { name, .. }
            | FormComponent::Unknown { name, .. } => name,
        }
    }

    pub fn set_name(&mut self, new_name: String) {
        match self {
            FormComponent::Text(core)
            | FormComponent::Email(core)
            | FormComponent::Checkbox(core)
            | FormComponent::Date(core) => core.name = new_name,
            FormComponent::Textarea { core, .. }
            | FormComponent::Radio { core, .. }
            | FormComponent::Select { core, .. }
            | FormComponent::Custom { core, .. } => core.name = new_name,
            FormComponent::Group { name, .. }
            | FormComponent::Columns { name, .. }
            | FormComponent::Unknown { name, .. } => *name = new_name,
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            FormComponent::Text(_) => "text",
            FormComponent::Email(_) => "email",
            FormComponent::Textarea { .. } => "textarea",
            FormComponent::Checkbox(_) => "checkbox",
            FormComponent::Radio { .. } => "radio",
            FormComponent::Select { .. } => "select",
            FormComponent::Date(_) => "date",
            FormComponent::Custom { .. } => "custom",
            FormComponent::Group { .. } => "group",
            FormComponent::Columns { .. } => "column",
            FormComponent::Unknown { raw, .. } => {
                raw.get("type").and_then(Value::as_str).unwrap_or("unknown")
            }
        }
    }

    pub fn is_layout(&self) -> bool {
        matches!(
            self,
            FormComponent::Group { .. } | FormComponent::Columns { .. }
        )
    }

    pub fn core(&self) -> Option<&FieldCore> {
        match self {
            FormComponent::Text(core)
            | FormComponent::Email(core)
            | FormComponent::Checkbox(core)
            | FormComponent::Date(core) => Some(core),
            FormComponent::Textarea { core, .. }
            | FormComponent::Radio { core, .. }
            | FormComponent::Select { core, .. }
            | FormComponent::Custom { core, .. } => Some(core),
            _ => None,
        }
    }

    pub fn core_mut(&mut self) -> Option<&mut FieldCore> {
        match self {
            FormComponent::Text(core)
            | FormComponent::Email(core)
            | FormComponent::Checkbox(core)
            | FormComponent::Date(core) => Some(core),
            FormComponent::Textarea { core, .. }
            | FormComponent::Radio { core, .. }
            | FormComponent::Select { core, .. }
            | FormComponent::Custom { core, .. } => Some(core),
            _ => None,
        }
    }

    /// Dependency rules attached to this node, whether field or layout.
    pub fn dependencies(&self) -> Option<&Dependencies> {
        match self {
            FormComponent::Group { dependencies, .. }
            | FormComponent::Columns { dependencies, .. } => dependencies.as_ref(),
            other => other.core().and_then(|core| core.dependencies.as_ref()),
        }
    }

    pub fn dependencies_mut(&mut self) -> Option<&mut Option<Dependencies>> {
        match self {
            FormComponent::Group { dependencies, .. }
            | FormComponent::Columns { dependencies, .. } => Some(dependencies),
            FormComponent::Unknown { .. } => None,
            other => other.core_mut().map(|core| &mut core.dependencies),
        }
    }

    pub fn options(&self) -> Option<&Vec<OptionEntry>> {
        match self {
            FormComponent::Radio { options, .. } | FormComponent::Select { options, .. } => {
                Some(options)
            }
            _ => None,
        }
    }

    pub fn options_mut(&mut self) -> Option<&mut Vec<OptionEntry>> {
        match self {
            FormComponent::Radio { options, .. } | FormComponent::Select { options, .. } => {
                Some(options)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSlot {
    pub width: u8,
    pub components: Vec<FormComponent>,
}

/// An option as authored: either a bare string or an explicit label/value
/// pair. Normalized to [`OptionItem`] wherever options are consumed.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionEntry {
    Plain(String),
    Labeled(OptionItem),
}

impl OptionEntry {
    pub fn normalized(&self) -> OptionItem {
        match self {
            OptionEntry::Plain(s) => OptionItem {
                label: s.clone(),
                value: s.clone(),
            },
            OptionEntry::Labeled(item) => item.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionItem {
    pub label: String,
    pub value: String,
}

impl OptionItem {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

pub fn normalize_options(entries: &[OptionEntry]) -> Vec<OptionItem> {
    entries.iter().map(OptionEntry::normalized).collect()
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidationRules {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ValidationRules {
    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none() && self.pattern.is_none() && self.message.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyKind {
    Visibility,
    Required,
    Disabled,
}

impl DependencyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DependencyKind::Visibility => "visibility",
            DependencyKind::Required => "required",
            DependencyKind::Disabled => "disabled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dependencies {
    pub visibility: Option<DependencyRule>,
    pub required: Option<DependencyRule>,
    pub disabled: Option<DependencyRule>,
}

impl Dependencies {
    pub fn is_empty(&self) -> bool {
        self.visibility.is_none() && self.required.is_none() && self.disabled.is_none()
    }

    pub fn rule(&self, kind: DependencyKind) -> Option<&DependencyRule> {
        match kind {
            DependencyKind::Visibility => self.visibility.as_ref(),
            DependencyKind::Required => self.required.as_ref(),
            DependencyKind::Disabled => self.disabled.as_ref(),
        }
    }

    pub fn set_rule(&mut self, kind: DependencyKind, rule: DependencyRule) {
        match kind {
            DependencyKind::Visibility => self.visibility = Some(rule),
            DependencyKind::Required => self.required = Some(rule),
            DependencyKind::Disabled => self.disabled = Some(rule),
        }
    }

    pub fn remove_rule(&mut self, kind: DependencyKind) {
        match kind {
            DependencyKind::Visibility => self.visibility = None,
            DependencyKind::Required => self.required = None,
            DependencyKind::Disabled => self.disabled = None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DependencyRule {
    pub conditions: Vec<Condition>,
    pub logic: RuleLogic,
}

impl DependencyRule {
    pub fn all(conditions: Vec<Condition>) -> Self {
        Self {
            conditions,
            logic: RuleLogic::And,
        }
    }

    pub fn any(conditions: Vec<Condition>) -> Self {
        Self {
            conditions,
            logic: RuleLogic::Or,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuleLogic {
    #[default]
    And,
    Or,
}

impl RuleLogic {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleLogic::And => "AND",
            RuleLogic::Or => "OR",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: String,
    pub operator: ConditionOperator,
    pub value: Value,
}

impl Condition {
    pub fn new(field: impl Into<String>, operator: ConditionOperator, value: Value) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }
}

/// Comparison operators for dependency conditions. Unrecognized operator
/// strings are kept as [`ConditionOperator::Other`] and evaluate to false
/// rather than failing the parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionOperator {
    Equals,
    NotEquals,
    Contains,
    GreaterThan,
    LessThan,
    In,
    Other(String),
}

impl ConditionOperator {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "equals" => ConditionOperator::Equals,
            "notEquals" => ConditionOperator::NotEquals,
            "contains" => ConditionOperator::Contains,
            "greaterThan" => ConditionOperator::GreaterThan,
            "lessThan" => ConditionOperator::LessThan,
            "in" => ConditionOperator::In,
            other => ConditionOperator::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ConditionOperator::Equals => "equals",
            ConditionOperator::NotEquals => "notEquals",
            ConditionOperator::Contains => "contains",
            ConditionOperator::GreaterThan => "greaterThan",
            ConditionOperator::LessThan => "lessThan",
            ConditionOperator::In => "in",
            ConditionOperator::Other(raw) => raw,
        }
    }
}
