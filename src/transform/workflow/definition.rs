//! Rewrites inside a Logic App `definition`: trigger intervals, endpoint URLs
//! and SharePoint dataset paths.

use crate::document::{NodePath, PathQuery, Template};
use crate::error::TransformError;
use crate::expression;
use serde_json::Value;
use tracing::{debug, trace};

pub const TRIGGER_INTERVAL_PARAMETER: &str = "LogicAppTriggerInterVal";

pub const SHAREPOINT_CONNECTION: &str =
    "@parameters('$connections')['sharepointonline']['connectionId']";

/// Only this exact interval is parameterized. Other intervals are deliberate
/// and left alone.
const PARAMETERIZED_INTERVAL: &str = "3";

/// Replaces an interval of 3 on the first trigger recurrence with a parameter.
pub fn parameterize_trigger_interval(definition: &mut Value) -> bool {
    let Some(path) = PathQuery::new("$.triggers..recurrence").select_first(definition) else {
        return false;
    };
    let Some(recurrence) = path.resolve_mut(definition).and_then(Value::as_object_mut) else {
        return false;
    };
    let matches = match recurrence.get("interval") {
        Some(Value::String(interval)) => interval == PARAMETERIZED_INTERVAL,
        Some(Value::Number(interval)) => interval.to_string() == PARAMETERIZED_INTERVAL,
        _ => false,
    };
    if matches {
        debug!(recurrence = %path, "Parameterizing trigger interval");
        recurrence.insert(
            "interval".to_string(),
            Value::String(expression::parameter_ref(TRIGGER_INTERVAL_PARAMETER)),
        );
    }
    matches
}

/// Rewrites `inputs.uri` and `metadata.apiDefinitionUrl` values that start with a
/// parameter's default into `concat(parameters(...), '<rest>')`.
pub fn parameterize_urls(
    template: &Template,
    definition: &mut Value,
) -> Result<usize, TransformError> {
    let mut rewritten = 0;
    for pattern in ["$..inputs.uri", "$..metadata.apiDefinitionUrl"] {
        for path in PathQuery::new(pattern).select(definition) {
            let Some(url) = path.resolve(definition).and_then(Value::as_str) else {
                continue;
            };
            let Some(found) = template.find_parameter(|default| url.starts_with(default))? else {
                continue;
            };
            // A blank default prefixes everything; it wins the search but never rewrites.
            if found.default_value.trim().is_empty() {
                continue;
            }
            let suffix = &url[found.default_value.len()..];
            let replacement = expression::concat_parameter_suffix(&found.name, suffix);
            trace!(at = %path, parameter = %found.name, "Parameterizing URL");
            set_string(definition, &path, replacement);
            rewritten += 1;
        }
    }
    Ok(rewritten)
}

/// Rewrites the site part of SharePoint action paths into a parameter reference.
pub fn parameterize_sharepoint_paths(
    template: &Template,
    definition: &mut Value,
) -> Result<usize, TransformError> {
    let mut rewritten = 0;
    for path in PathQuery::new("$.actions.*.inputs.path").select(definition) {
        if !uses_sharepoint_connection(definition, &path) {
            continue;
        }
        let Some(dataset_path) = path.resolve(definition).and_then(Value::as_str) else {
            continue;
        };
        let Some(found) = template.find_parameter(|default| {
            dataset_path.starts_with(&expression::sharepoint_dataset_prefix(default))
        })?
        else {
            continue;
        };
        let replacement = expression::concat_literal_with_parameter(
            dataset_path,
            &found.default_value,
            &found.name,
        );
        trace!(at = %path, parameter = %found.name, "Parameterizing SharePoint path");
        set_string(definition, &path, replacement);
        rewritten += 1;
    }
    Ok(rewritten)
}

fn uses_sharepoint_connection(definition: &Value, input_path: &NodePath) -> bool {
    input_path
        .parent()
        .and_then(|inputs| inputs.resolve(definition))
        .and_then(|inputs| inputs.pointer("/host/connection/name"))
        .and_then(Value::as_str)
        == Some(SHAREPOINT_CONNECTION)
}

fn set_string(root: &mut Value, path: &NodePath, value: String) {
    if let Some(slot) = path.resolve_mut(root) {
        *slot = Value::String(value);
    }
}
