use crate::schema::{FormComponent, FormSchema};

/// Address of a component in the builder's tree. Nesting is capped at one
/// layout level: top-level entries, children of a top-level group, or
/// children of one column of a top-level column layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentPath {
    Top(usize),
    InGroup { group: usize, child: usize },
    InColumn { layout: usize, column: usize, child: usize },
}

impl ComponentPath {
    /// The container this path points into.
    pub fn parent(&self) -> ParentSlot {
        match *self {
            ComponentPath::Top(_) => ParentSlot::Root,
            ComponentPath::InGroup { group, .. } => ParentSlot::Group(group),
            ComponentPath::InColumn { layout, column, .. } => {
                ParentSlot::Column { layout, column }
            }
        }
    }

    /// Position within the parent container.
    pub fn index(&self) -> usize {
        match *self {
            ComponentPath::Top(index) => index,
            ComponentPath::InGroup { child, .. } => child,
            ComponentPath::InColumn { child, .. } => child,
        }
    }

    pub fn with_index(self, index: usize) -> Self {
        match self {
            ComponentPath::Top(_) => ComponentPath::Top(index),
            ComponentPath::InGroup { group, .. } => ComponentPath::InGroup {
                group,
                child: index,
            },
            ComponentPath::InColumn { layout, column, .. } => ComponentPath::InColumn {
                layout,
                column,
                child: index,
            },
        }
    }
}

/// A container components can be added to or moved within.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentSlot {
    Root,
    Group(usize),
    Column { layout: usize, column: usize },
}

/// Resolve a path to the component it addresses. A path whose shape does
/// not match the tree (wrong variant, out of range) resolves to `None`,
/// which makes the corresponding builder action a no-op.
pub fn resolve<'a>(schema: &'a FormSchema, path: ComponentPath) -> Option<&'a FormComponent> {
    match path {
        ComponentPath::Top(index) => schema.components.get(index),
        ComponentPath::InGroup { group, child } => match schema.components.get(group)? {
            FormComponent::Group { components, .. } => components.get(child),
            _ => None,
        },
        ComponentPath::InColumn {
            layout,
            column,
            child,
        } => match schema.components.get(layout)? {
            FormComponent::Columns { columns, .. } => columns.get(column)?.components.get(child),
            _ => None,
        },
    }
}

/// Mutable access to the component array a slot denotes.
pub fn slot_components<'a>(
    schema: &'a mut FormSchema,
    slot: ParentSlot,
) -> Option<&'a mut Vec<FormComponent>> {
    match slot {
        ParentSlot::Root => Some(&mut schema.components),
        ParentSlot::Group(index) => match schema.components.get_mut(index)? {
            FormComponent::Group { components, .. } => Some(components),
            _ => None,
        },
        ParentSlot::Column { layout, column } => match schema.components.get_mut(layout)? {
            FormComponent::Columns { columns, .. } => {
                Some(&mut columns.get_mut(column)?.components)
            }
            _ => None,
        },
    }
}

/// Mutable access to the component a path addresses.
pub fn resolve_mut<'a>(
    schema: &'a mut FormSchema,
    path: ComponentPath,
) -> Option<&'a mut FormComponent> {
    let index = path.index();
    slot_components(schema, path.parent())?.get_mut(index)
}
