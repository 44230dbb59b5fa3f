use crate::document::{NodePath, Object, Template, tree};
use crate::error::TransformError;
use crate::expression;
use serde_json::Value;
use tracing::debug;

const CONNECTIONS_POINTER: &str = "/parameters/$connections/value";
const CONNECTION_RESOURCE_TYPE: &str = "Microsoft.Web/connections";

/// The template variable shared by every workflow using `connector`.
pub fn connection_variable(connector: &str) -> String {
    format!("{}_Connection", connector)
}

/// Points every `$connections` entry at a shared `<connector>_Connection`
/// variable and fixes up the workflow's dependencies to match.
pub fn rewire_connections(
    template: &mut Template,
    resource: &mut Object,
    path: &NodePath,
) -> Result<Vec<String>, TransformError> {
    let connections_path = path
        .key("properties")
        .key("parameters")
        .key("$connections")
        .key("value");
    let Some(connections) = resource
        .get_mut("properties")
        .and_then(|properties| properties.pointer_mut(CONNECTIONS_POINTER))
    else {
        return Ok(Vec::new());
    };
    let connections = tree::as_object_mut(connections, &connections_path)?;

    let mut connectors = Vec::with_capacity(connections.len());
    for (connector, connection) in connections.iter_mut() {
        let connection = tree::as_object_mut(connection, &connections_path.key(connector))?;
        let variable = connection_variable(connector);
        let variable_call = expression::variable_call(&variable);

        connection.insert(
            "connectionName".to_string(),
            Value::String(expression::variable_ref(&variable)),
        );
        connection.insert(
            "connectionId".to_string(),
            Value::String(expression::resource_id(CONNECTION_RESOURCE_TYPE, &variable_call)),
        );

        let api_type = connection
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| !expression::is_expression(id))
            .map(|id| id.rsplit('/').next().unwrap_or(id).to_string());
        if let Some(api_type) = api_type {
            debug!(connector = %connector, api = %api_type, "Making managed API id location independent");
            connection.insert(
                "id".to_string(),
                Value::String(expression::managed_api_id(&api_type)),
            );
        }

        connectors.push(connector.clone());
    }

    for connector in &connectors {
        let variable = connection_variable(connector);
        template.ensure_variable(&variable, connector)?;

        if let Some(depends_on) = tree::array_mut(resource, "dependsOn", path)? {
            let exported = expression::resource_id(
                CONNECTION_RESOURCE_TYPE,
                &expression::parameter_call(&format!("connections_{}_name", connector)),
            );
            let shared = expression::resource_id(
                CONNECTION_RESOURCE_TYPE,
                &expression::variable_call(&variable),
            );
            for dependency in depends_on.iter_mut() {
                if dependency.as_str() == Some(exported.as_str()) {
                    *dependency = Value::String(shared.clone());
                }
            }
        }
    }

    Ok(connectors)
}
