//! Builders for ARM template expression strings.
//!
//! Everything in here is pure string work: the transformers decide *what* to
//! rewrite, this module decides how the resulting template expression is spelled.

/// Expression that resolves to the deploying resource group's location.
pub const RESOURCE_GROUP_LOCATION: &str = "[resourceGroup().location]";

/// The sequence that splices a literal single quote into a `concat(...)` argument.
/// Templates are expected to declare a `quote` variable holding `'`.
pub const QUOTE_ESCAPE: &str = "', variables('quote'), '";

/// Returns `true` if the value is a template expression (`[...]`) rather than a literal.
pub fn is_expression(value: &str) -> bool {
    value.starts_with('[')
}

/// `parameters('name')`, without the surrounding brackets.
pub fn parameter_call(name: &str) -> String {
    format!("parameters('{}')", name)
}

/// `variables('name')`, without the surrounding brackets.
pub fn variable_call(name: &str) -> String {
    format!("variables('{}')", name)
}

/// `[parameters('name')]`
pub fn parameter_ref(name: &str) -> String {
    format!("[{}]", parameter_call(name))
}

/// `[variables('name')]`
pub fn variable_ref(name: &str) -> String {
    format!("[{}]", variable_call(name))
}

/// `[resourceId('type', <name_expr>)]` where `name_expr` is already an expression fragment.
pub fn resource_id(resource_type: &str, name_expr: &str) -> String {
    format!("[resourceId('{}', {})]", resource_type, name_expr)
}

/// Escapes single quotes so `literal` can sit inside a quoted `concat` argument.
pub fn escape_quotes(literal: &str) -> String {
    literal.replace('\'', QUOTE_ESCAPE)
}

/// `[concat(parameters('param'), '<suffix>')]` with `suffix` quote-escaped.
pub fn concat_parameter_suffix(param: &str, suffix: &str) -> String {
    format!(
        "[concat({}, '{}')]",
        parameter_call(param),
        escape_quotes(suffix)
    )
}

/// `https://<namespace>.servicebus.windows.net:443/` built from a namespace parameter.
pub fn service_bus_endpoint(namespace_param: &str) -> String {
    format!(
        "[concat('https://', {},'.servicebus.windows.net:443/')]",
        parameter_call(namespace_param)
    )
}

/// Metric id of a namespace: `<subscriptionId>:<namespace>`.
pub fn namespace_metric_id(namespace_param: &str) -> String {
    format!(
        "[concat(subscription().subscriptionId, ':', {})]",
        parameter_call(namespace_param)
    )
}

/// Location-independent id of a managed API connector.
pub fn managed_api_id(api_type: &str) -> String {
    format!(
        "[concat('/subscriptions/', subscription().subscriptionId, '/providers/Microsoft.Web/locations/', resourceGroup().location,'/managedApis/{}')]",
        api_type
    )
}

/// How a Logic App SharePoint action addresses a site inside its `path` input.
pub fn sharepoint_dataset_prefix(site_url: &str) -> String {
    format!(
        "/datasets/@{{encodeURIComponent(encodeURIComponent('{}'))}}",
        site_url
    )
}

/// Turns a whole literal into `[concat('...')]`, splicing in `parameters('param')`
/// wherever the quoted `value` appeared. Other quotes are escaped.
pub fn concat_literal_with_parameter(literal: &str, value: &str, param: &str) -> String {
    let quoted_value = format!("'{}'", value);
    format!(
        "[concat('{}')]",
        escape_quotes(literal).replace(&quoted_value, &parameter_call(param))
    )
}

/// Recovers the logical name from an exported resource name.
///
/// Exports name resources `[parameters('<kind>_<name>_name')]`. The expression
/// prefix and suffix are stripped independently, so partially wrapped names
/// still lose what they have. The bare form `<kind>_<name>_name` is only
/// recognised when both ends are present, which keeps the result stable when
/// fed back in.
pub fn strip_name_wrapper(name: &str, kind: &str) -> String {
    let expr_prefix = format!("[parameters('{}_", kind);
    let expr_suffix = "_name')]";

    if name.starts_with(&expr_prefix) || name.ends_with(expr_suffix) {
        let stripped = name.strip_prefix(expr_prefix.as_str()).unwrap_or(name);
        let stripped = stripped.strip_suffix(expr_suffix).unwrap_or(stripped);
        return stripped.to_string();
    }

    let bare_prefix = format!("{}_", kind);
    match name
        .strip_prefix(bare_prefix.as_str())
        .and_then(|rest| rest.strip_suffix("_name"))
    {
        Some(inner) if !inner.is_empty() => inner.to_string(),
        _ => name.to_string(),
    }
}
