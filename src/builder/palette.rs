use std::collections::HashSet;

use crate::schema::{
    ColumnSlot, FieldCore, FormComponent, OptionEntry, OptionItem,
};

/// The component kinds the builder can add. `custom` components exist in
/// the data model but are authored by hand, not from the palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    Text,
    Email,
    Textarea,
    Checkbox,
    Radio,
    Select,
    Date,
    Group,
    Column,
}

impl ComponentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Text => "text",
            ComponentKind::Email => "email",
            ComponentKind::Textarea => "textarea",
            ComponentKind::Checkbox => "checkbox",
            ComponentKind::Radio => "radio",
            ComponentKind::Select => "select",
            ComponentKind::Date => "date",
            ComponentKind::Group => "group",
            ComponentKind::Column => "column",
        }
    }
}

/// Fresh component for a palette kind, with the template defaults a new
/// field starts from in the editor.
pub fn default_component(kind: ComponentKind, name: String) -> FormComponent {
    fn labeled(name: String, label: &str) -> FieldCore {
        FieldCore {
            label: Some(label.to_string()),
            ..FieldCore::named(name)
        }
    }

    fn starter_options() -> Vec<OptionEntry> {
        vec![
            OptionEntry::Labeled(OptionItem::new("Option 1", "option1")),
            OptionEntry::Labeled(OptionItem::new("Option 2", "option2")),
        ]
    }

    match kind {
        ComponentKind::Text => FormComponent::Text(labeled(name, "Text Field")),
        ComponentKind::Email => FormComponent::Email(labeled(name, "Email")),
        ComponentKind::Textarea => FormComponent::Textarea {
            core: labeled(name, "Textarea"),
            rows: Some(4),
        },
        ComponentKind::Checkbox => FormComponent::Checkbox(labeled(name, "Checkbox")),
        ComponentKind::Radio => FormComponent::Radio {
            core: labeled(name, "Radio Group"),
            options: starter_options(),
        },
        ComponentKind::Select => FormComponent::Select {
            core: labeled(name, "Select"),
            options: starter_options(),
            options_depends_on: None,
        },
        ComponentKind::Date => FormComponent::Date(labeled(name, "Date")),
        ComponentKind::Group => FormComponent::Group {
            name,
            title: Some("Group".to_string()),
            description: None,
            components: Vec::new(),
            dependencies: None,
        },
        ComponentKind::Column => FormComponent::Columns {
            name,
            columns: vec![
                ColumnSlot {
                    width: 6,
                    components: Vec::new(),
                },
                ColumnSlot {
                    width: 6,
                    components: Vec::new(),
                },
            ],
            dependencies: None,
        },
    }
}

/// Generate a unique name from a type-derived base: `textField`,
/// `textField1`, `textField2`, ... against the names currently in use.
pub fn generate_field_name(type_name: &str, existing: &HashSet<String>) -> String {
    let base = format!("{type_name}Field");
    if !existing.contains(&base) {
        return base;
    }
    let mut counter = 1;
    loop {
        let candidate = format!("{base}{counter}");
        if !existing.contains(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}
