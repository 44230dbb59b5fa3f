use super::{NAMESPACE_PARAMETER, ResourceTransformer, set_location, upsert_display_name};
use crate::document::{NodePath, Object, Template, tree};
use crate::error::TransformError;
use crate::expression;
use serde_json::Value;
use tracing::debug;

/// Topics share the namespace's display tag.
pub const TOPIC_DISPLAY_NAME: &str = "servicebus_namespace";

/// Rewrites `Microsoft.ServiceBus/namespaces/topics` to hang off the shared
/// `namespace_name` parameter.
pub struct TopicTransformer;

impl TopicTransformer {
    pub const RESOURCE_TYPE: &'static str = "Microsoft.ServiceBus/namespaces/topics";

    /// Splits an exported topic name into the composite name expression and the
    /// namespace literal it was exported with.
    fn split_name(name: &str, path: &NodePath) -> Result<(String, String), TransformError> {
        let (namespace_segment, topic_segment) =
            name.split_once('/').ok_or_else(|| TransformError::InvalidName {
                path: path.to_string(),
                name: name.to_string(),
                message: "expected '<namespace>/<topic>'".to_string(),
            })?;
        let namespace_call = expression::parameter_call(NAMESPACE_PARAMETER);

        if !expression::is_expression(name) {
            return Ok((
                format!("[concat({}, '/{}')]", namespace_call, topic_segment),
                namespace_segment.to_string(),
            ));
        }

        let topic = topic_segment
            .replace("parameters('topics_", "'")
            .replace("_name')", "'");
        let namespace_literal = namespace_segment
            .replace("[concat(parameters('namespaces_", "")
            .replace("_name'), '", "");
        Ok((format!("[concat({}, '/{}", namespace_call, topic), namespace_literal))
    }
}

impl ResourceTransformer for TopicTransformer {
    fn resource_type(&self) -> &str {
        Self::RESOURCE_TYPE
    }

    fn transform(
        &self,
        template: &mut Template,
        resource: &mut Object,
        path: &NodePath,
    ) -> Result<(), TransformError> {
        let name = tree::child_str(resource, "name", path)?;
        let (composite_name, namespace_literal) = Self::split_name(name, path)?;
        debug!(resource = %path, name = %composite_name, "Normalizing service bus topic");

        template.ensure_parameter(NAMESPACE_PARAMETER, &namespace_literal)?;

        resource.insert("name".to_string(), Value::String(composite_name));
        set_location(resource);
        upsert_display_name(resource, TOPIC_DISPLAY_NAME, path)?;
        resource.insert("dependsOn".to_string(), Value::Array(Vec::new()));

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path() -> NodePath {
        NodePath::root().key("resources").index(1)
    }

    #[test]
    fn test_split_exported_literal_topic() {
        let exported = "[concat(parameters('namespaces_bus_name'), '/orders')]";
        let (name, namespace) = TopicTransformer::split_name(exported, &path()).unwrap();
        assert_eq!(name, "[concat(parameters('namespace_name'), '/orders')]");
        assert_eq!(namespace, "bus");
    }

    #[test]
    fn test_split_exported_parameterized_topic() {
        let (name, namespace) = TopicTransformer::split_name(
            "[concat(parameters('namespaces_bus_name'), '/', parameters('topics_orders_name'))]",
            &path(),
        )
        .unwrap();
        assert_eq!(name, "[concat(parameters('namespace_name'), '/', 'orders')]");
        assert_eq!(namespace, "bus");
    }

    #[test]
    fn test_split_is_stable_on_its_output() {
        let once = "[concat(parameters('namespace_name'), '/orders')]";
        let (again, _) = TopicTransformer::split_name(once, &path()).unwrap();
        assert_eq!(again, once);
    }

    #[test]
    fn test_split_plain_literal() {
        let (name, namespace) = TopicTransformer::split_name("bus/orders", &path()).unwrap();
        assert_eq!(name, "[concat(parameters('namespace_name'), '/orders')]");
        assert_eq!(namespace, "bus");
    }

    #[test]
    fn test_name_without_separator_is_rejected() {
        let err = TopicTransformer::split_name("orders", &path()).unwrap_err();
        assert!(matches!(err, TransformError::InvalidName { .. }));
    }
}
