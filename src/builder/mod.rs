mod composer;
mod palette;
mod path;

pub use composer::{Composer, SchemaChangeHandler};
pub use palette::{ComponentKind, default_component, generate_field_name};
pub use path::{ComponentPath, ParentSlot, resolve, resolve_mut, slot_components};

use serde_json::Value;

use crate::schema::{
    ColumnSlot, DependencyKind, DependencyRule, FormComponent, FormSchema, OptionEntry,
    OptionItem, ValidationRules, collect_component_names,
};

/// Editor state: the schema under construction, the component selected in
/// the side panel, and the in-flight drag, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct BuilderState {
    pub schema: FormSchema,
    pub selected: Option<ComponentPath>,
    pub drag: Option<DragState>,
}

impl BuilderState {
    pub fn new(initial: Option<FormSchema>) -> Self {
        Self {
            schema: initial.unwrap_or_else(FormSchema::empty),
            selected: None,
            drag: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragState {
    pub source: ComponentPath,
}

/// Partial attribute update for `UpdateComponent`. Unset fields leave the
/// component untouched; for clearable text attributes an empty string
/// clears, and a `Null` default value removes the default.
#[derive(Debug, Clone, Default)]
pub struct ComponentPatch {
    pub name: Option<String>,
    pub label: Option<String>,
    pub placeholder: Option<String>,
    pub help_text: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_required: Option<bool>,
    pub is_disabled: Option<bool>,
    pub default_value: Option<Value>,
    pub validation: Option<ValidationRules>,
    pub rows: Option<u32>,
    pub component_key: Option<String>,
    pub options_depends_on: Option<String>,
}

#[derive(Debug, Clone)]
pub enum BuilderAction {
    SetTitle(String),
    SetDescription(String),
    AddComponent {
        kind: ComponentKind,
        parent: ParentSlot,
    },
    RemoveComponent(ComponentPath),
    MoveComponentUp(ComponentPath),
    MoveComponentDown(ComponentPath),
    DuplicateComponent(ComponentPath),
    UpdateComponent {
        path: ComponentPath,
        patch: ComponentPatch,
    },
    SelectComponent(ComponentPath),
    DeselectComponent,
    AddOption(ComponentPath),
    UpdateOption {
        path: ComponentPath,
        index: usize,
        label: Option<String>,
        value: Option<String>,
    },
    RemoveOption {
        path: ComponentPath,
        index: usize,
    },
    MoveOptionUp {
        path: ComponentPath,
        index: usize,
    },
    MoveOptionDown {
        path: ComponentPath,
        index: usize,
    },
    AddColumn(ComponentPath),
    RemoveColumn {
        path: ComponentPath,
        index: usize,
    },
    SetColumnWidth {
        path: ComponentPath,
        index: usize,
        width: u8,
    },
    SetDependencyRule {
        path: ComponentPath,
        kind: DependencyKind,
        rule: DependencyRule,
    },
    RemoveDependencyRule {
        path: ComponentPath,
        kind: DependencyKind,
    },
    SetDrag(DragState),
    ClearDrag,
    MoveComponentTo {
        from: ComponentPath,
        to: ComponentPath,
    },
    LoadSchema(FormSchema),
    ResetSchema,
}

/// Pure reducer over the builder state. Every mutation rebuilds the tree;
/// the input state is never modified. Actions whose path does not resolve
/// against the current tree leave the state unchanged.
pub fn reduce(state: &BuilderState, action: BuilderAction) -> BuilderState {
    let mut next = state.clone();

    match action {
        BuilderAction::SetTitle(title) => next.schema.title = title,
        BuilderAction::SetDescription(description) => {
            next.schema.description = non_empty(description);
        }

        BuilderAction::AddComponent { kind, parent } => {
            let names = collect_component_names(&next.schema.components);
            let name = generate_field_name(kind.as_str(), &names);
            let component = default_component(kind, name);
            if let Some(list) = slot_components(&mut next.schema, parent) {
                list.push(component);
            }
        }

        BuilderAction::RemoveComponent(target) => {
            let index = target.index();
            if let Some(list) = slot_components(&mut next.schema, target.parent()) {
                if index < list.len() {
                    list.remove(index);
                    if next.selected == Some(target) {
                        next.selected = None;
                    }
                }
            }
        }

        BuilderAction::MoveComponentUp(target) => {
            let index = target.index();
            if index > 0 {
                if let Some(list) = slot_components(&mut next.schema, target.parent()) {
                    if index < list.len() {
                        list.swap(index, index - 1);
                        if next.selected == Some(target) {
                            next.selected = Some(target.with_index(index - 1));
                        }
                    }
                }
            }
        }

        BuilderAction::MoveComponentDown(target) => {
            let index = target.index();
            if let Some(list) = slot_components(&mut next.schema, target.parent()) {
                if index + 1 < list.len() {
                    list.swap(index, index + 1);
                    if next.selected == Some(target) {
                        next.selected = Some(target.with_index(index + 1));
                    }
                }
            }
        }

        BuilderAction::DuplicateComponent(target) => {
            if let Some(original) = resolve(&next.schema, target) {
                let mut clone = original.clone();
                let mut names = collect_component_names(&next.schema.components);
                assign_fresh_names(&mut clone, &mut names);
                if let Some(core) = clone.core_mut() {
                    if let Some(label) = &core.label {
                        core.label = Some(format!("{label} (copy)"));
                    }
                }
                let index = target.index();
                if let Some(list) = slot_components(&mut next.schema, target.parent()) {
                    list.insert(index + 1, clone);
                }
            }
        }

        BuilderAction::UpdateComponent { path, patch } => {
            if let Some(component) = resolve_mut(&mut next.schema, path) {
                apply_patch(component, &patch);
            }
        }

        BuilderAction::SelectComponent(path) => next.selected = Some(path),
        BuilderAction::DeselectComponent => next.selected = None,

        BuilderAction::AddOption(path) => {
            if let Some(options) = component_options(&mut next.schema, path) {
                options.push(OptionEntry::Labeled(OptionItem::new("", "")));
            }
        }

        BuilderAction::UpdateOption {
            path,
            index,
            label,
            value,
        } => {
            if let Some(options) = component_options(&mut next.schema, path) {
                if let Some(entry) = options.get_mut(index) {
                    let mut item = entry.normalized();
                    if let Some(label) = label {
                        item.label = label;
                    }
                    if let Some(value) = value {
                        item.value = value;
                    }
                    *entry = OptionEntry::Labeled(item);
                }
            }
        }

        BuilderAction::RemoveOption { path, index } => {
            if let Some(options) = component_options(&mut next.schema, path) {
                if index < options.len() {
                    options.remove(index);
                }
            }
        }

        BuilderAction::MoveOptionUp { path, index } => {
            if index > 0 {
                if let Some(options) = component_options(&mut next.schema, path) {
                    if index < options.len() {
                        options.swap(index, index - 1);
                    }
                }
            }
        }

        BuilderAction::MoveOptionDown { path, index } => {
            if let Some(options) = component_options(&mut next.schema, path) {
                if index + 1 < options.len() {
                    options.swap(index, index + 1);
                }
            }
        }

        BuilderAction::AddColumn(path) => {
            if let Some(columns) = component_columns(&mut next.schema, path) {
                columns.push(ColumnSlot {
                    width: 6,
                    components: Vec::new(),
                });
            }
        }

        BuilderAction::RemoveColumn { path, index } => {
            if let Some(columns) = component_columns(&mut next.schema, path) {
                if index < columns.len() {
                    columns.remove(index);
                }
            }
        }

        BuilderAction::SetColumnWidth { path, index, width } => {
            if let Some(columns) = component_columns(&mut next.schema, path) {
                if let Some(column) = columns.get_mut(index) {
                    column.width = width.clamp(1, 12);
                }
            }
        }

        BuilderAction::SetDependencyRule { path, kind, rule } => {
            if let Some(component) = resolve_mut(&mut next.schema, path) {
                if let Some(slot) = component.dependencies_mut() {
                    slot.get_or_insert_with(Default::default).set_rule(kind, rule);
                }
            }
        }

        BuilderAction::RemoveDependencyRule { path, kind } => {
            if let Some(component) = resolve_mut(&mut next.schema, path) {
                if let Some(slot) = component.dependencies_mut() {
                    if let Some(dependencies) = slot.as_mut() {
                        dependencies.remove_rule(kind);
                    }
                    if slot.as_ref().is_some_and(|deps| deps.is_empty()) {
                        *slot = None;
                    }
                }
            }
        }

        BuilderAction::SetDrag(drag) => next.drag = Some(drag),
        BuilderAction::ClearDrag => next.drag = None,

        BuilderAction::MoveComponentTo { from, to } => {
            next.drag = None;
            // Moves are only supported within one parent container.
            if from != to && from.parent() == to.parent() {
                let from_index = from.index();
                let to_index = to.index();
                if let Some(list) = slot_components(&mut next.schema, from.parent()) {
                    if from_index < list.len() && to_index < list.len() {
                        let moved = list.remove(from_index);
                        list.insert(to_index, moved);
                    }
                }
            }
        }

        BuilderAction::LoadSchema(schema) => {
            next.schema = schema;
            next.selected = None;
        }

        BuilderAction::ResetSchema => {
            next.schema = FormSchema::empty();
            next.selected = None;
        }
    }

    next
}

fn component_options(
    schema: &mut FormSchema,
    path: ComponentPath,
) -> Option<&mut Vec<OptionEntry>> {
    resolve_mut(schema, path)?.options_mut()
}

fn component_columns(schema: &mut FormSchema, path: ComponentPath) -> Option<&mut Vec<ColumnSlot>> {
    match resolve_mut(schema, path)? {
        FormComponent::Columns { columns, .. } => Some(columns),
        _ => None,
    }
}

/// Give a duplicated component (and every nested component) a fresh unique
/// name so the copy never collides with the original subtree.
fn assign_fresh_names(
    component: &mut FormComponent,
    names: &mut std::collections::HashSet<String>,
) {
    let fresh = generate_field_name(component.type_name(), names);
    names.insert(fresh.clone());
    component.set_name(fresh);

    match component {
        FormComponent::Group { components, .. } => {
            for child in components {
                assign_fresh_names(child, names);
            }
        }
        FormComponent::Columns { columns, .. } => {
            for column in columns {
                for child in &mut column.components {
                    assign_fresh_names(child, names);
                }
            }
        }
        _ => {}
    }
}

fn apply_patch(component: &mut FormComponent, patch: &ComponentPatch) {
    match component {
        FormComponent::Group {
            name,
            title,
            description,
            ..
        } => {
            if let Some(new_name) = &patch.name {
                *name = new_name.clone();
            }
            if let Some(new_title) = &patch.title {
                *title = non_empty(new_title.clone());
            }
            if let Some(new_description) = &patch.description {
                *description = non_empty(new_description.clone());
            }
        }
        FormComponent::Columns { name, .. } => {
            if let Some(new_name) = &patch.name {
                *name = new_name.clone();
            }
        }
        FormComponent::Unknown { .. } => {}
        leaf => {
            if let FormComponent::Textarea { rows, .. } = leaf {
                if let Some(new_rows) = patch.rows {
                    *rows = Some(new_rows);
                }
            }
            if let FormComponent::Custom { component_key, .. } = leaf {
                if let Some(key) = &patch.component_key {
                    *component_key = key.clone();
                }
            }
            if let FormComponent::Select {
                options_depends_on, ..
            } = leaf
            {
                if let Some(upstream) = &patch.options_depends_on {
                    *options_depends_on = non_empty(upstream.clone());
                }
            }

            if let Some(core) = leaf.core_mut() {
                if let Some(new_name) = &patch.name {
                    core.name = new_name.clone();
                }
                if let Some(label) = &patch.label {
                    core.label = non_empty(label.clone());
                }
                if let Some(placeholder) = &patch.placeholder {
                    core.placeholder = non_empty(placeholder.clone());
                }
                if let Some(help_text) = &patch.help_text {
                    core.help_text = non_empty(help_text.clone());
                }
                if let Some(is_required) = patch.is_required {
                    core.is_required = is_required;
                }
                if let Some(is_disabled) = patch.is_disabled {
                    core.is_disabled = is_disabled;
                }
                if let Some(default_value) = &patch.default_value {
                    core.default_value = if default_value.is_null() {
                        None
                    } else {
                        Some(default_value.clone())
                    };
                }
                if let Some(validation) = &patch.validation {
                    core.validation = if validation.is_empty() {
                        None
                    } else {
                        Some(validation.clone())
                    };
                }
            }
        }
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}
