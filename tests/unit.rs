//! Unit tests for core armnorm types.
mod common;
use armnorm::prelude::*;
use serde_json::json;

#[test]
fn test_node_path_display() {
    let path = NodePath::root().key("resources").index(2).key("properties");
    assert_eq!(path.to_string(), "$.resources[2].properties");
    assert_eq!(NodePath::root().to_string(), "$");
}

#[test]
fn test_path_query_over_template() {
    let template = Template::from_value(json!({
        "parameters": {},
        "resources": [
            { "type": "a", "properties": { "definition": { "actions": { "x": { "inputs": { "uri": "u1" } } } } } },
            { "type": "b", "properties": { "inputs": { "uri": "u2" } } }
        ]
    }))
    .unwrap();
    let paths = PathQuery::new("$.resources..inputs.uri").select(template.root());
    assert_eq!(paths.len(), 2);
    assert_eq!(
        paths[1].to_string(),
        "$.resources[1].properties.inputs.uri"
    );
}

#[test]
fn test_parameter_match_owner() {
    let template = Template::from_value(json!({
        "parameters": { "site": { "defaultValue": "https://contoso", "type": "string" } },
        "resources": []
    }))
    .unwrap();
    let found = template
        .find_parameter(|default| "https://contoso/x".starts_with(default))
        .unwrap();
    assert_eq!(
        found,
        Some(ParameterMatch {
            name: "site".to_string(),
            default_value: "https://contoso".to_string(),
        })
    );
}

#[test]
fn test_error_display() {
    let err = TransformError::MissingField {
        path: "$.resources[0]".to_string(),
        field: "type".to_string(),
    };
    assert!(err.to_string().contains("type"));
    assert!(err.to_string().contains("$.resources[0]"));

    let err = TransformError::UnexpectedType {
        path: "$.resources".to_string(),
        expected: "array",
    };
    assert!(err.to_string().contains("expected array"));

    let err = TransformError::UnterminatedComment { offset: 7 };
    assert!(err.to_string().contains("byte 7"));
}

#[test]
fn test_default_normalizer_handles_three_types() {
    assert_eq!(
        Normalizer::default().handled_types(),
        vec![
            "Microsoft.Logic/workflows",
            "Microsoft.ServiceBus/namespaces",
            "Microsoft.ServiceBus/namespaces/topics"
        ]
    );
    assert_eq!(Normalizer::default().substitutions().len(), 8);
}
