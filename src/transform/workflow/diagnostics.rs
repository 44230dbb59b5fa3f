use serde_json::{Value, json};

pub const DIAGNOSTIC_SETTINGS_TYPE: &str = "providers/diagnosticSettings";

/// Log Analytics workspace every workflow reports to.
pub const WORKSPACE_PARAMETER: &str = "omsWorkspaceName";

/// The diagnostic settings child resource for the workflow named `workflow_name`.
pub fn diagnostic_settings(workflow_name: &str) -> Value {
    json!({
        "type": DIAGNOSTIC_SETTINGS_TYPE,
        "name": "Microsoft.Insights/service",
        "dependsOn": [
            format!("[resourceId('Microsoft.Logic/workflows', '{}')]", workflow_name)
        ],
        "apiVersion": "2015-07-01",
        "properties": {
            "workspaceId": format!(
                "[resourceId('Microsoft.OperationalInsights/workspaces/', parameters('{}'))]",
                WORKSPACE_PARAMETER
            ),
            "logs": [{
                "category": "WorkflowRuntime",
                "enabled": true,
                "retentionPolicy": { "days": 0, "enabled": false }
            }],
            "metrics": [{
                "timeGrain": "PT1M",
                "enabled": true,
                "retentionPolicy": { "enabled": false, "days": 0 }
            }]
        }
    })
}

/// Drops any diagnostic settings already present and appends a fresh one.
pub fn replace_diagnostic_settings(resources: &mut Vec<Value>, workflow_name: &str) {
    resources.retain(|child| {
        child.get("type").and_then(Value::as_str) != Some(DIAGNOSTIC_SETTINGS_TYPE)
    });
    resources.push(diagnostic_settings(workflow_name));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replaces_instead_of_duplicating() {
        let mut resources = vec![
            json!({ "type": "providers/diagnosticSettings", "name": "old" }),
            json!({ "type": "other" }),
            json!("not an object"),
        ];
        replace_diagnostic_settings(&mut resources, "bar");
        replace_diagnostic_settings(&mut resources, "bar");

        let settings: Vec<_> = resources
            .iter()
            .filter(|r| r["type"] == DIAGNOSTIC_SETTINGS_TYPE)
            .collect();
        assert_eq!(settings.len(), 1);
        assert_eq!(
            settings[0]["dependsOn"][0],
            "[resourceId('Microsoft.Logic/workflows', 'bar')]"
        );
        assert_eq!(resources.len(), 3);
    }

    #[test]
    fn test_fixed_shape() {
        let settings = diagnostic_settings("bar");
        assert_eq!(settings["properties"]["logs"][0]["category"], "WorkflowRuntime");
        assert_eq!(settings["properties"]["metrics"][0]["timeGrain"], "PT1M");
        assert_eq!(settings["properties"]["metrics"][0]["retentionPolicy"]["enabled"], false);
    }
}
