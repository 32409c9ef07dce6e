use serde_json::json;

use formgen::schema::{ConditionOperator, FormComponent, RuleLogic};
use formgen::{parse_form_schema, schema_to_value};

#[test]
fn parses_nested_layout_and_dependency_rules() {
    let schema = parse_form_schema(&json!({
        "title": "Profile",
        "description": "Tell us about yourself",
        "components": [
            {
                "type": "group",
                "name": "identity",
                "title": "Identity",
                "components": [
                    {"type": "text", "name": "firstName", "label": "First name"},
                    {"type": "text", "name": "lastName"}
                ]
            },
            {
                "type": "column",
                "name": "split",
                "columns": [
                    {"width": 4, "components": [{"type": "date", "name": "born"}]},
                    {"width": 8, "components": [
                        {
                            "type": "select",
                            "name": "city",
                            "options": [
                                "Berlin",
                                {"label": "New York", "value": "nyc"}
                            ],
                            "optionsDependsOn": "country"
                        }
                    ]}
                ]
            },
            {
                "type": "textarea",
                "name": "bio",
                "rows": 6,
                "validation": {"max": 200},
                "dependencies": {
                    "visibility": {
                        "logic": "OR",
                        "conditions": [
                            {"field": "firstName", "operator": "notEquals", "value": ""},
                            {"field": "lastName", "operator": "notEquals", "value": ""}
                        ]
                    }
                }
            }
        ]
    }))
    .expect("schema parses");

    assert_eq!(schema.title, "Profile");
    assert_eq!(schema.components.len(), 3);

    let FormComponent::Columns { columns, .. } = &schema.components[1] else {
        panic!("expected a column layout");
    };
    assert_eq!(columns[0].width, 4);
    let FormComponent::Select {
        options,
        options_depends_on,
        ..
    } = &columns[1].components[0]
    else {
        panic!("expected a select");
    };
    assert_eq!(options.len(), 2);
    assert_eq!(options_depends_on.as_deref(), Some("country"));

    let FormComponent::Textarea { core, rows } = &schema.components[2] else {
        panic!("expected a textarea");
    };
    assert_eq!(*rows, Some(6));
    let dependencies = core.dependencies.as_ref().expect("has dependencies");
    let rule = dependencies.visibility.as_ref().expect("visibility rule");
    assert_eq!(rule.logic, RuleLogic::Or);
    assert_eq!(rule.conditions.len(), 2);
    assert_eq!(rule.conditions[0].operator, ConditionOperator::NotEquals);
}

#[test]
fn duplicate_leaf_names_are_rejected() {
    let result = parse_form_schema(&json!({
        "title": "Broken",
        "components": [
            {"type": "text", "name": "twin"},
            {
                "type": "group",
                "name": "grp",
                "components": [{"type": "email", "name": "twin"}]
            }
        ]
    }));
    let error = result.expect_err("duplicate names must not parse");
    assert!(format!("{error:#}").contains("twin"));
}

#[test]
fn component_without_a_name_is_rejected() {
    let result = parse_form_schema(&json!({
        "title": "Broken",
        "components": [{"type": "text"}]
    }));
    assert!(result.is_err());
}

#[test]
fn export_round_trips_through_the_parser() {
    let document = json!({
        "title": "Round trip",
        "components": [
            {
                "type": "text",
                "name": "firstName",
                "label": "First name",
                "isRequired": true,
                "validation": {"min": 2, "message": "Too short"}
            },
            {
                "type": "radio",
                "name": "size",
                "options": ["S", {"label": "Medium", "value": "M"}]
            },
            {
                "type": "group",
                "name": "extra",
                "components": [
                    {
                        "type": "checkbox",
                        "name": "subscribe",
                        "dependencies": {
                            "visibility": {
                                "conditions": [
                                    {"field": "firstName", "operator": "contains", "value": "a"}
                                ]
                            }
                        }
                    }
                ]
            }
        ]
    });

    let parsed = parse_form_schema(&document).expect("schema parses");
    let exported = schema_to_value(&parsed);
    let reparsed = parse_form_schema(&exported).expect("exported schema parses");
    assert_eq!(parsed, reparsed);
}

#[test]
fn unknown_component_types_round_trip_verbatim() {
    let document = json!({
        "title": "Forward compat",
        "components": [
            {"type": "signature", "name": "sig", "pens": ["fine", "broad"]}
        ]
    });

    let parsed = parse_form_schema(&document).expect("schema parses");
    let FormComponent::Unknown { raw, name } = &parsed.components[0] else {
        panic!("expected the unknown component to be preserved");
    };
    assert_eq!(name, "sig");
    assert_eq!(raw["pens"], json!(["fine", "broad"]));

    let exported = schema_to_value(&parsed);
    assert_eq!(exported["components"][0], document["components"][0]);
}

#[test]
fn empty_components_default_cleanly() {
    let schema = parse_form_schema(&json!({"title": "Empty"})).expect("schema parses");
    assert!(schema.components.is_empty());
    assert!(schema.description.is_none());
}
