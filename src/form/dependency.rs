use indexmap::IndexMap;
use serde_json::Value;

use crate::rules::{evaluate_rule, watched_fields};
use crate::schema::{Dependencies, FormComponent};

/// Rule-derived state for one component. Absent rules default to a visible,
/// optional, enabled field; the component's own static `isRequired` /
/// `isDisabled` flags are OR-ed in by consumers, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldFlags {
    pub visible: bool,
    pub required: bool,
    pub disabled: bool,
}

impl Default for FieldFlags {
    fn default() -> Self {
        Self {
            visible: true,
            required: false,
            disabled: false,
        }
    }
}

/// Watches the upstream fields referenced by one component's dependency
/// rules. The engine re-evaluates a probe only when a watched field's value
/// actually changes; components without dependencies get no probe at all.
#[derive(Debug, Clone)]
pub struct DependencyProbe {
    pub target: String,
    /// Leaf fields have their value cleared on a hide transition; layout
    /// nodes hide their subtree without touching descendant values.
    pub clears_value: bool,
    pub dependencies: Dependencies,
    pub watch: Vec<String>,
    pub last: FieldFlags,
}

impl DependencyProbe {
    /// Build a probe for a component, or `None` when it carries no
    /// dependency rules and therefore never needs re-evaluation.
    pub fn for_component(component: &FormComponent) -> Option<Self> {
        let dependencies = component.dependencies()?.clone();
        let watch = watched_fields(&dependencies);
        Some(Self {
            target: component.name().to_string(),
            clears_value: !component.is_layout(),
            dependencies,
            watch,
            last: FieldFlags::default(),
        })
    }

    pub fn watches(&self, field: &str) -> bool {
        self.watch.iter().any(|watched| watched == field)
    }

    pub fn evaluate(&self, values: &IndexMap<String, Value>) -> FieldFlags {
        FieldFlags {
            visible: evaluate_rule(self.dependencies.visibility.as_ref(), values),
            required: self
                .dependencies
                .required
                .as_ref()
                .map(|rule| evaluate_rule(Some(rule), values))
                .unwrap_or(false),
            disabled: self
                .dependencies
                .disabled
                .as_ref()
                .map(|rule| evaluate_rule(Some(rule), values))
                .unwrap_or(false),
        }
    }
}
