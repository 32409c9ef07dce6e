use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use serde_json::{Value, json};

use formgen::form::{FIELD_CHANGE, Form, RenderNode, SubmitOutcome};
use formgen::{FormConfig, FormEngine, parse_form_schema};

fn signup_schema() -> formgen::FormSchema {
    parse_form_schema(&json!({
        "title": "Signup",
        "components": [
            {
                "type": "text",
                "name": "firstName",
                "label": "First name",
                "isRequired": true
            },
            {
                "type": "email",
                "name": "email",
                "label": "Email",
                "isRequired": true
            }
        ]
    }))
    .expect("schema parses")
}

#[test]
fn submission_blocks_until_every_field_validates() {
    let submitted: Rc<RefCell<Option<IndexMap<String, Value>>>> = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&submitted);
    let mut form = Form::new(signup_schema(), FormConfig::new(), move |values| {
        *sink.borrow_mut() = Some(values.clone());
    })
    .expect("form builds");

    form.set_value("firstName", json!(""));
    form.set_value("email", json!("not-an-email"));
    assert!(!form.submit());
    assert!(submitted.borrow().is_none());
    assert_eq!(
        form.field_error("firstName"),
        Some("First name is required")
    );
    assert_eq!(form.field_error("email"), Some("Invalid email address"));

    form.set_value("firstName", json!("Jo"));
    form.set_value("email", json!("jo@x.com"));
    assert!(form.submit());

    let values = submitted.borrow().clone().expect("handler ran");
    assert_eq!(values["firstName"], json!("Jo"));
    assert_eq!(values["email"], json!("jo@x.com"));
}

#[test]
fn conditional_required_gates_on_the_sibling_value() {
    let schema = parse_form_schema(&json!({
        "title": "Event",
        "components": [
            {
                "type": "select",
                "name": "eventFormat",
                "options": ["virtual", "in-person"]
            },
            {
                "type": "select",
                "name": "shirtSize",
                "label": "Shirt size",
                "options": ["S", "M", "L"],
                "dependencies": {
                    "required": {
                        "conditions": [
                            {"field": "eventFormat", "operator": "equals", "value": "in-person"}
                        ]
                    }
                }
            }
        ]
    }))
    .expect("schema parses");

    let mut engine = FormEngine::new(schema, FormConfig::new()).expect("engine builds");

    engine.set_value("eventFormat", json!("virtual"));
    assert!(matches!(engine.submit(), SubmitOutcome::Accepted(_)));

    engine.set_value("eventFormat", json!("in-person"));
    match engine.submit() {
        SubmitOutcome::Rejected(errors) => {
            assert_eq!(errors["shirtSize"], "Shirt size is required");
        }
        SubmitOutcome::Accepted(_) => panic!("submission should be blocked"),
    }

    engine.set_value("shirtSize", json!("M"));
    assert!(matches!(engine.submit(), SubmitOutcome::Accepted(_)));
}

#[test]
fn field_change_events_cover_user_edits_only() {
    let schema = parse_form_schema(&json!({
        "title": "Deps",
        "components": [
            {"type": "text", "name": "trigger", "defaultValue": "show"},
            {
                "type": "text",
                "name": "dependent",
                "dependencies": {
                    "visibility": {
                        "conditions": [
                            {"field": "trigger", "operator": "equals", "value": "show"}
                        ]
                    }
                }
            }
        ]
    }))
    .expect("schema parses");

    let mut engine = FormEngine::new(schema, FormConfig::new()).expect("engine builds");
    let events: Rc<RefCell<Vec<(String, Value)>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    let subscription = engine.on(FIELD_CHANGE, move |field, value| {
        sink.borrow_mut().push((field.to_string(), value.clone()));
    });

    engine.set_value("dependent", json!("typed"));
    engine.set_value("trigger", json!("hide"));

    // The dependency-driven clear of `dependent` is not announced.
    let seen = events.borrow().clone();
    assert_eq!(
        seen,
        vec![
            ("dependent".to_string(), json!("typed")),
            ("trigger".to_string(), json!("hide")),
        ]
    );
    assert_eq!(engine.value("dependent"), &Value::Null);

    engine.off(FIELD_CHANGE, subscription);
    engine.set_value("trigger", json!("show"));
    assert_eq!(events.borrow().len(), 2, "unsubscribed listener is silent");
}

#[test]
fn reset_field_restores_the_declared_default() {
    let schema = parse_form_schema(&json!({
        "title": "Defaults",
        "components": [
            {"type": "text", "name": "city", "defaultValue": "Berlin"}
        ]
    }))
    .expect("schema parses");

    let mut engine = FormEngine::new(schema, FormConfig::new()).expect("engine builds");
    engine.set_value("city", json!("Madrid"));
    engine.reset_field("city");
    assert_eq!(engine.value("city"), &json!("Berlin"));
}

#[test]
fn hidden_fields_are_absent_from_the_view_tree() {
    let schema = parse_form_schema(&json!({
        "title": "View",
        "components": [
            {"type": "text", "name": "always"},
            {
                "type": "text",
                "name": "sometimes",
                "dependencies": {
                    "visibility": {
                        "conditions": [
                            {"field": "always", "operator": "equals", "value": "yes"}
                        ]
                    }
                }
            }
        ]
    }))
    .expect("schema parses");

    let mut engine = FormEngine::new(schema, FormConfig::new()).expect("engine builds");

    let names: Vec<String> = engine
        .render_tree()
        .iter()
        .filter_map(|node| match node {
            RenderNode::Field(field) => Some(field.name.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(names, vec!["always"]);

    engine.set_value("always", json!("yes"));
    let names: Vec<String> = engine
        .render_tree()
        .iter()
        .filter_map(|node| match node {
            RenderNode::Field(field) => Some(field.name.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(names, vec!["always", "sometimes"]);
}

#[test]
fn unknown_types_render_local_error_markers() {
    let schema = parse_form_schema(&json!({
        "title": "Robust",
        "components": [
            {"type": "slider", "name": "volume"},
            {"type": "text", "name": "ok"},
            {"type": "custom", "name": "rating", "componentKey": "starRating"}
        ]
    }))
    .expect("schema parses");

    let engine = FormEngine::new(schema, FormConfig::new()).expect("engine builds");
    let tree = engine.render_tree();
    assert_eq!(tree.len(), 3);

    match &tree[0] {
        RenderNode::Error { name, message } => {
            assert_eq!(name, "volume");
            assert!(message.contains("slider"));
        }
        other => panic!("expected an error marker, got {other:?}"),
    }
    assert!(matches!(&tree[1], RenderNode::Field(field) if field.name == "ok"));
    // componentKey not registered in the config: local error, sibling intact.
    assert!(matches!(&tree[2], RenderNode::Error { name, .. } if name == "rating"));
}

#[test]
fn registered_custom_components_render_as_fields() {
    let schema = parse_form_schema(&json!({
        "title": "Custom",
        "components": [
            {"type": "custom", "name": "rating", "componentKey": "starRating"}
        ]
    }))
    .expect("schema parses");

    let engine = FormEngine::new(
        schema,
        FormConfig::new().with_custom_component("starRating"),
    )
    .expect("engine builds");
    let tree = engine.render_tree();
    assert!(matches!(&tree[0], RenderNode::Field(field) if field.name == "rating"));
}

#[test]
fn effective_flags_combine_rules_with_static_attributes() {
    let schema = parse_form_schema(&json!({
        "title": "Flags",
        "components": [
            {"type": "checkbox", "name": "lock"},
            {
                "type": "text",
                "name": "target",
                "isRequired": true,
                "dependencies": {
                    "disabled": {
                        "conditions": [
                            {"field": "lock", "operator": "equals", "value": true}
                        ]
                    }
                }
            }
        ]
    }))
    .expect("schema parses");

    let mut engine = FormEngine::new(schema, FormConfig::new()).expect("engine builds");
    engine.set_value("lock", json!(true));

    let tree = engine.render_tree();
    let RenderNode::Field(field) = &tree[1] else {
        panic!("expected a field");
    };
    assert!(field.required, "static isRequired survives");
    assert!(field.disabled, "rule-driven disabled applies");
}
