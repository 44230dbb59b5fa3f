use super::{ResourceTransformer, set_location, upsert_display_name};
use crate::document::{NodePath, Object, Template, tree};
use crate::error::TransformError;
use crate::expression;
use serde_json::Value;
use tracing::debug;

mod connections;
mod definition;
mod diagnostics;

pub use connections::connection_variable;
pub use definition::{SHAREPOINT_CONNECTION, TRIGGER_INTERVAL_PARAMETER};
pub use diagnostics::{DIAGNOSTIC_SETTINGS_TYPE, WORKSPACE_PARAMETER, diagnostic_settings};

/// Website dependencies are deployed separately and must not be referenced.
const SITE_DEPENDENCY_PREFIX: &str = "[resourceId('Microsoft.Web/sites'";

/// Rewrites `Microsoft.Logic/workflows`: literal name, pruned dependencies,
/// diagnostic settings, parameterized endpoints and shared connections.
pub struct WorkflowTransformer;

impl WorkflowTransformer {
    pub const RESOURCE_TYPE: &'static str = "Microsoft.Logic/workflows";
}

impl ResourceTransformer for WorkflowTransformer {
    fn resource_type(&self) -> &str {
        Self::RESOURCE_TYPE
    }

    fn transform(
        &self,
        template: &mut Template,
        resource: &mut Object,
        path: &NodePath,
    ) -> Result<(), TransformError> {
        let properties_path = path.key("properties");
        let properties =
            tree::as_object(tree::child(resource, "properties", path)?, &properties_path)?;
        tree::child(properties, "definition", &properties_path)?;

        let exported_name = tree::child_str(resource, "name", path)?;
        let name = expression::strip_name_wrapper(exported_name, "workflows");
        debug!(resource = %path, name = %name, "Normalizing workflow");

        if let Some(depends_on) = tree::array_mut(resource, "dependsOn", path)? {
            let before = depends_on.len();
            depends_on.retain(|dependency| {
                !dependency
                    .as_str()
                    .is_some_and(|d| d.starts_with(SITE_DEPENDENCY_PREFIX))
            });
            if depends_on.len() != before {
                let pruned = before - depends_on.len();
                debug!(resource = %path, pruned, "Pruned website dependencies");
            }
        }

        let children = tree::array_or_insert_after(resource, "resources", "properties", path)?;
        diagnostics::replace_diagnostic_settings(children, &name);

        resource.insert("name".to_string(), Value::String(name.clone()));
        set_location(resource);
        upsert_display_name(resource, &name, path)?;

        let workflow_definition = resource
            .get_mut("properties")
            .and_then(|properties| properties.get_mut("definition"))
            .ok_or_else(|| tree::missing(&properties_path, "definition"))?;
        definition::parameterize_trigger_interval(workflow_definition);
        definition::parameterize_urls(template, workflow_definition)?;
        definition::parameterize_sharepoint_paths(template, workflow_definition)?;

        connections::rewire_connections(template, resource, path)?;

        Ok(())
    }
}
