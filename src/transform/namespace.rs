use super::{NAMESPACE_PARAMETER, ResourceTransformer, set_location, upsert_display_name};
use crate::document::{NodePath, Object, Template, tree};
use crate::error::TransformError;
use crate::expression;
use serde_json::Value;
use tracing::debug;

/// Rewrites `Microsoft.ServiceBus/namespaces` so the namespace name comes from
/// the shared `namespace_name` parameter.
pub struct NamespaceTransformer;

impl NamespaceTransformer {
    pub const RESOURCE_TYPE: &'static str = "Microsoft.ServiceBus/namespaces";

    fn display_name(
        template: &Template,
        current_name: &str,
        canonical_name: &str,
    ) -> Result<String, TransformError> {
        if current_name == canonical_name {
            if let Some(existing) = template.parameter_default(NAMESPACE_PARAMETER)? {
                return Ok(existing);
            }
        }
        Ok(expression::strip_name_wrapper(current_name, "namespaces"))
    }
}

impl ResourceTransformer for NamespaceTransformer {
    fn resource_type(&self) -> &str {
        Self::RESOURCE_TYPE
    }

    fn transform(
        &self,
        template: &mut Template,
        resource: &mut Object,
        path: &NodePath,
    ) -> Result<(), TransformError> {
        let canonical_name = expression::parameter_ref(NAMESPACE_PARAMETER);
        let current_name = tree::child_str(resource, "name", path)?.to_string();
        let display_name = Self::display_name(template, &current_name, &canonical_name)?;
        debug!(resource = %path, name = %display_name, "Normalizing service bus namespace");

        template.ensure_parameter(NAMESPACE_PARAMETER, &display_name)?;

        resource.insert("name".to_string(), Value::String(canonical_name));
        set_location(resource);
        upsert_display_name(resource, &display_name, path)?;

        if let Some(properties) = resource.get_mut("properties") {
            let properties = tree::as_object_mut(properties, &path.key("properties"))?;
            for (key, value) in properties.iter_mut() {
                match key.as_str() {
                    "serviceBusEndpoint" => {
                        *value =
                            Value::String(expression::service_bus_endpoint(NAMESPACE_PARAMETER));
                    }
                    "metricId" => {
                        *value =
                            Value::String(expression::namespace_metric_id(NAMESPACE_PARAMETER));
                    }
                    _ => {}
                }
            }
        }

        Ok(())
    }
}
