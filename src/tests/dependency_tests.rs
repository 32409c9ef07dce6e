use serde_json::{Value, json};

use crate::form::{FormConfig, FormEngine};
use crate::schema::{
    Condition, ConditionOperator, Dependencies, DependencyRule, FieldCore, FormComponent,
    FormSchema,
};

fn schema_of(components: Vec<FormComponent>) -> FormSchema {
    FormSchema {
        title: "Test".to_string(),
        description: None,
        components,
    }
}

fn text(name: &str) -> FormComponent {
    FormComponent::Text(FieldCore::named(name))
}

fn text_with_default(name: &str, default: Value) -> FormComponent {
    FormComponent::Text(FieldCore {
        default_value: Some(default),
        ..FieldCore::named(name)
    })
}

fn visible_when_equals(field: &str, value: Value) -> Dependencies {
    Dependencies {
        visibility: Some(DependencyRule::all(vec![Condition::new(
            field,
            ConditionOperator::Equals,
            value,
        )])),
        ..Dependencies::default()
    }
}

fn engine(components: Vec<FormComponent>) -> FormEngine {
    FormEngine::new(schema_of(components), FormConfig::new()).expect("engine builds")
}

#[test]
fn field_without_dependencies_is_visible_and_optional() {
    let engine = engine(vec![text("plain")]);
    let flags = engine.flags("plain");
    assert!(flags.visible);
    assert!(!flags.required);
    assert!(!flags.disabled);
}

#[test]
fn hide_transition_clears_the_value_exactly_once() {
    let dependent = FormComponent::Text(FieldCore {
        dependencies: Some(visible_when_equals("mode", json!("x"))),
        ..FieldCore::named("detail")
    });
    let mut engine = engine(vec![text_with_default("mode", json!("x")), dependent]);

    engine.set_value("detail", json!("kept while visible"));
    assert!(engine.flags("detail").visible);

    engine.set_value("mode", json!("y"));
    assert!(!engine.flags("detail").visible);
    assert_eq!(engine.value("detail"), &Value::Null);

    // Still hidden: a further upstream change must not touch the field again.
    engine.set_value("detail", json!("written while hidden"));
    engine.set_value("mode", json!("z"));
    assert_eq!(engine.value("detail"), &json!("written while hidden"));
}

#[test]
fn reappearing_field_stays_cleared() {
    let dependent = FormComponent::Text(FieldCore {
        dependencies: Some(visible_when_equals("mode", json!("x"))),
        ..FieldCore::named("detail")
    });
    let mut engine = engine(vec![text_with_default("mode", json!("x")), dependent]);

    engine.set_value("detail", json!("typed"));
    engine.set_value("mode", json!("y"));
    engine.set_value("mode", json!("x"));
    assert!(engine.flags("detail").visible);
    assert_eq!(engine.value("detail"), &Value::Null);
}

#[test]
fn hide_cascades_through_chained_rules() {
    let middle = FormComponent::Text(FieldCore {
        default_value: Some(json!("on")),
        dependencies: Some(visible_when_equals("root", json!("keep"))),
        ..FieldCore::named("middle")
    });
    let tail = FormComponent::Text(FieldCore {
        default_value: Some(json!("tail value")),
        dependencies: Some(visible_when_equals("middle", json!("on"))),
        ..FieldCore::named("tail")
    });
    let mut engine = engine(vec![text_with_default("root", json!("keep")), middle, tail]);

    assert!(engine.flags("middle").visible);
    assert!(engine.flags("tail").visible);

    engine.set_value("root", json!("drop"));
    assert!(!engine.flags("middle").visible);
    assert!(!engine.flags("tail").visible);
    assert_eq!(engine.value("middle"), &Value::Null);
    assert_eq!(engine.value("tail"), &Value::Null);
}

#[test]
fn layout_hide_keeps_descendant_values() {
    let group = FormComponent::Group {
        name: "section".to_string(),
        title: None,
        description: None,
        components: vec![text_with_default("inner", json!("stays"))],
        dependencies: Some(visible_when_equals("toggle", json!("show"))),
    };
    let mut engine = engine(vec![text_with_default("toggle", json!("show")), group]);

    engine.set_value("toggle", json!("hide"));
    assert!(!engine.flags("section").visible);
    assert_eq!(engine.value("inner"), &json!("stays"));
}

#[test]
fn required_and_disabled_rules_evaluate_independently() {
    let field = FormComponent::Text(FieldCore {
        dependencies: Some(Dependencies {
            required: Some(DependencyRule::all(vec![Condition::new(
                "kind",
                ConditionOperator::Equals,
                json!("strict"),
            )])),
            disabled: Some(DependencyRule::all(vec![Condition::new(
                "kind",
                ConditionOperator::Equals,
                json!("frozen"),
            )])),
            ..Dependencies::default()
        }),
        ..FieldCore::named("notes")
    });
    let mut engine = engine(vec![text("kind"), field]);

    engine.set_value("kind", json!("strict"));
    let flags = engine.flags("notes");
    assert!(flags.visible && flags.required && !flags.disabled);

    engine.set_value("kind", json!("frozen"));
    let flags = engine.flags("notes");
    assert!(flags.visible && !flags.required && flags.disabled);
}

#[test]
fn unrelated_changes_leave_hidden_state_alone() {
    let dependent = FormComponent::Text(FieldCore {
        dependencies: Some(visible_when_equals("watched", json!("go"))),
        ..FieldCore::named("dep")
    });
    let mut engine = engine(vec![
        text_with_default("watched", json!("go")),
        text("unrelated"),
        dependent,
    ]);

    engine.set_value("dep", json!("hello"));
    engine.set_value("unrelated", json!("noise"));
    assert!(engine.flags("dep").visible);
    assert_eq!(engine.value("dep"), &json!("hello"));
}
