use crate::document::{NodePath, Object, RESOURCES, Template, tree};
use crate::error::TransformError;
use crate::expression;
use crate::substitution::SubstitutionTable;
use ahash::AHashMap;
use serde_json::{Value, json};
use tracing::{debug, trace};

mod namespace;
mod topic;
pub mod workflow;

pub use namespace::NamespaceTransformer;
pub use topic::{TOPIC_DISPLAY_NAME, TopicTransformer};
pub use workflow::WorkflowTransformer;

/// The parameter every service bus resource takes its namespace name from.
pub const NAMESPACE_PARAMETER: &str = "namespace_name";

/// Defines the contract for rewriting one resource type in place.
pub trait ResourceTransformer: Send + Sync {
    /// The exact `type` string this transformer handles by default.
    fn resource_type(&self) -> &str;

    /// Rewrites `resource`, which has been detached from `template.resources`.
    /// `path` locates the resource for error messages.
    fn transform(
        &self,
        template: &mut Template,
        resource: &mut Object,
        path: &NodePath,
    ) -> Result<(), TransformError>;
}

/// Master macro to define the built-in transformers, their registration and lookup.
macro_rules! define_transformers {
    ( $( $transformer:ident ),* $(,)? ) => {
        pub(crate) fn register_default_transformers(
            registry: &mut AHashMap<String, Box<dyn ResourceTransformer>>,
        ) {
            $( registry.insert($transformer::RESOURCE_TYPE.to_string(), Box::new($transformer)); )*
        }

        /// Creates a built-in transformer by the resource type it handles.
        pub fn create_transformer_by_type(
            resource_type: &str,
        ) -> Option<Box<dyn ResourceTransformer>> {
            $( if resource_type == $transformer::RESOURCE_TYPE {
                return Some(Box::new($transformer));
            } )*
            None
        }
    };
}

define_transformers! {
    NamespaceTransformer,
    TopicTransformer,
    WorkflowTransformer,
}

/// Counts from one normalization run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    /// Resources handed to a transformer.
    pub transformed: usize,
    /// Object resources with an unrecognised type.
    pub untouched: usize,
    /// Entries of `resources` that were not objects.
    pub skipped: usize,
}

/// Rewrites templates: dispatches each resource to its transformer, then runs
/// the literal substitution pass over the serialized text.
pub struct Normalizer {
    registry: AHashMap<String, Box<dyn ResourceTransformer>>,
    substitutions: SubstitutionTable,
}

pub struct NormalizerBuilder {
    registry: AHashMap<String, Box<dyn ResourceTransformer>>,
    substitutions: SubstitutionTable,
}

impl Default for NormalizerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NormalizerBuilder {
    pub fn new() -> Self {
        let mut registry: AHashMap<String, Box<dyn ResourceTransformer>> = AHashMap::new();
        register_default_transformers(&mut registry);
        Self {
            registry,
            substitutions: SubstitutionTable::default(),
        }
    }

    /// Routes resources of `alias_type` to the built-in transformer for `builtin_type`.
    pub fn with_type_mapping(mut self, alias_type: &str, builtin_type: &str) -> Self {
        if let Some(transformer) = create_transformer_by_type(builtin_type) {
            self.registry.insert(alias_type.to_string(), transformer);
        }
        self
    }

    /// Registers a transformer under its own resource type, replacing any existing one.
    pub fn with_transformer(mut self, transformer: Box<dyn ResourceTransformer>) -> Self {
        self.registry
            .insert(transformer.resource_type().to_string(), transformer);
        self
    }

    /// Stops handling `resource_type`; such resources are left untouched.
    pub fn without_type(mut self, resource_type: &str) -> Self {
        self.registry.remove(resource_type);
        self
    }

    /// Replaces the substitution table.
    pub fn with_substitutions(mut self, substitutions: SubstitutionTable) -> Self {
        self.substitutions = substitutions;
        self
    }

    /// Appends rules after the current substitution table.
    pub fn with_extra_substitutions(mut self, substitutions: SubstitutionTable) -> Self {
        self.substitutions.extend(substitutions);
        self
    }

    pub fn build(self) -> Normalizer {
        Normalizer {
            registry: self.registry,
            substitutions: self.substitutions,
        }
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Normalizer {
    pub fn builder() -> NormalizerBuilder {
        NormalizerBuilder::new()
    }

    pub fn substitutions(&self) -> &SubstitutionTable {
        &self.substitutions
    }

    /// Resource types this normalizer rewrites, sorted.
    pub fn handled_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.registry.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    /// Full text-to-text run: parse, rewrite resources, serialize, substitute.
    pub fn transform(&self, text: &str) -> Result<String, TransformError> {
        let mut template = Template::parse(text)?;
        let report = self.normalize(&mut template)?;
        debug!(
            transformed = report.transformed,
            untouched = report.untouched,
            skipped = report.skipped,
            "Template normalized"
        );
        let serialized = template.to_text()?;
        Ok(self.substitutions.apply(&serialized))
    }

    /// Rewrites every recognised resource of `template` in place.
    pub fn normalize(&self, template: &mut Template) -> Result<NormalizeReport, TransformError> {
        let mut resources = template.take_resources()?;
        let result = self.dispatch(template, &mut resources);
        template.restore_resources(resources);
        result
    }

    fn dispatch(
        &self,
        template: &mut Template,
        resources: &mut [Value],
    ) -> Result<NormalizeReport, TransformError> {
        let mut report = NormalizeReport::default();
        let resources_path = NodePath::root().key(RESOURCES);

        for (index, resource) in resources.iter_mut().enumerate() {
            let path = resources_path.index(index);
            let Some(resource) = resource.as_object_mut() else {
                trace!(resource = %path, "Skipping non-object resource entry");
                report.skipped += 1;
                continue;
            };

            let resource_type = tree::child_str(resource, "type", &path)?;
            match self.registry.get(resource_type) {
                Some(transformer) => {
                    debug!(resource = %path, resource_type, "Dispatching resource");
                    transformer.transform(template, resource, &path)?;
                    report.transformed += 1;
                }
                None => {
                    trace!(resource = %path, resource_type, "No transformer for resource type");
                    report.untouched += 1;
                }
            }
        }

        Ok(report)
    }
}

/// Points `location` at the resource group's location.
pub(crate) fn set_location(resource: &mut Object) {
    resource.insert(
        "location".to_string(),
        Value::String(expression::RESOURCE_GROUP_LOCATION.to_string()),
    );
}

/// Sets `tags.displayName`, creating `tags` right after `location` if needed.
pub(crate) fn upsert_display_name(
    resource: &mut Object,
    display_name: &str,
    path: &NodePath,
) -> Result<(), TransformError> {
    match resource.get_mut("tags") {
        Some(Value::Object(tags)) => {
            tags.insert(
                "displayName".to_string(),
                Value::String(display_name.to_string()),
            );
            Ok(())
        }
        None | Some(Value::Null) => {
            tree::insert_after(resource, "location", "tags", json!({ "displayName": display_name }));
            Ok(())
        }
        Some(_) => Err(TransformError::UnexpectedType {
            path: path.key("tags").to_string(),
            expected: "object",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Renamer;

    impl ResourceTransformer for Renamer {
        fn resource_type(&self) -> &str {
            "Microsoft.Web/connections"
        }

        fn transform(
            &self,
            _template: &mut Template,
            resource: &mut Object,
            _path: &NodePath,
        ) -> Result<(), TransformError> {
            resource.insert("name".to_string(), json!("renamed"));
            Ok(())
        }
    }

    fn template() -> Template {
        Template::from_value(json!({
            "parameters": {},
            "resources": [
                "[if(condition, 'a', 'b')]",
                { "type": "Microsoft.Web/connections", "name": "office365" },
                { "type": "Custom/workflows", "name": "workflows_x_name", "properties": { "definition": {} } }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_dispatch_counts_and_skips() {
        let mut t = template();
        let report = Normalizer::default().normalize(&mut t).unwrap();
        assert_eq!(
            report,
            NormalizeReport { transformed: 0, untouched: 2, skipped: 1 }
        );
        assert_eq!(t.root()["resources"][1]["name"], "office365");
    }

    #[test]
    fn test_custom_transformer_and_type_mapping() {
        let mut t = template();
        let normalizer = Normalizer::builder()
            .with_transformer(Box::new(Renamer))
            .with_type_mapping("Custom/workflows", WorkflowTransformer::RESOURCE_TYPE)
            .build();
        let report = normalizer.normalize(&mut t).unwrap();
        assert_eq!(report.transformed, 2);
        assert_eq!(t.root()["resources"][1]["name"], "renamed");
        assert_eq!(t.root()["resources"][2]["name"], "x");
    }

    #[test]
    fn test_without_type() {
        let normalizer = Normalizer::builder()
            .without_type(TopicTransformer::RESOURCE_TYPE)
            .build();
        assert_eq!(
            normalizer.handled_types(),
            vec!["Microsoft.Logic/workflows", "Microsoft.ServiceBus/namespaces"]
        );
    }

    #[test]
    fn test_missing_type_is_a_shape_error() {
        let mut t = Template::from_value(json!({
            "parameters": {},
            "resources": [{ "name": "untyped" }]
        }))
        .unwrap();
        let err = Normalizer::default().normalize(&mut t).unwrap_err();
        assert!(matches!(err, TransformError::MissingField { ref path, .. } if path == "$.resources[0]"));
        // The resource list is put back even when a resource fails.
        assert_eq!(t.root()["resources"][0]["name"], "untyped");
    }

    #[test]
    fn test_tags_of_wrong_type() {
        let mut resource = json!({ "location": "x", "tags": [] });
        let err = upsert_display_name(resource.as_object_mut().unwrap(), "n", &NodePath::root())
            .unwrap_err();
        assert!(matches!(err, TransformError::UnexpectedType { .. }));
    }
}
