//! The template document and typed access to its sections.

pub mod path;
mod registry;
pub mod tree;

pub use path::{NodePath, PathQuery, Segment};
pub use registry::ParameterMatch;
pub use tree::Object;

use crate::error::TransformError;
use crate::source::{self, Comments};
use serde_json::Value;

pub const PARAMETERS: &str = "parameters";
pub const VARIABLES: &str = "variables";
pub const RESOURCES: &str = "resources";

/// A parsed template, owned by a single normalization run.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    root: Value,
    comments: Comments,
}

impl Template {
    /// Parses template text. Comments are kept and written back by [`Template::to_text`].
    pub fn parse(text: &str) -> Result<Self, TransformError> {
        let (root, comments) = source::parse(text)?;
        tree::as_object(&root, &NodePath::root())?;
        Ok(Self { root, comments })
    }

    pub fn from_value(root: Value) -> Result<Self, TransformError> {
        tree::as_object(&root, &NodePath::root())?;
        Ok(Self {
            root,
            comments: Comments::default(),
        })
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    pub fn comments(&self) -> &Comments {
        &self.comments
    }

    /// Indented text of the current tree, comments included.
    pub fn to_text(&self) -> Result<String, TransformError> {
        source::serialize(&self.root, &self.comments)
    }

    fn root_object_mut(&mut self) -> Result<&mut Object, TransformError> {
        tree::as_object_mut(&mut self.root, &NodePath::root())
    }

    /// Detaches the `resources` array so each entry can be rewritten while the
    /// rest of the template stays mutable. Pair with [`Template::restore_resources`].
    pub(crate) fn take_resources(&mut self) -> Result<Vec<Value>, TransformError> {
        let root = self.root_object_mut()?;
        let slot = tree::child_mut(root, RESOURCES, &NodePath::root())?;
        match slot.take() {
            Value::Array(items) => Ok(items),
            other => {
                *slot = other;
                Err(TransformError::UnexpectedType {
                    path: NodePath::root().key(RESOURCES).to_string(),
                    expected: "array",
                })
            }
        }
    }

    pub(crate) fn restore_resources(&mut self, resources: Vec<Value>) {
        if let Some(slot) = self.root.get_mut(RESOURCES) {
            *slot = Value::Array(resources);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rejects_non_object_root() {
        assert!(matches!(
            Template::parse("[1, 2]"),
            Err(TransformError::UnexpectedType { expected: "object", .. })
        ));
    }

    #[test]
    fn test_take_and_restore_resources_keeps_key_order() {
        let mut template = Template::from_value(json!({
            "parameters": {},
            "resources": [{"type": "a"}],
            "outputs": {}
        }))
        .unwrap();
        let resources = template.take_resources().unwrap();
        assert_eq!(resources.len(), 1);
        template.restore_resources(resources);
        let keys: Vec<_> = template.root().as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["parameters", "resources", "outputs"]);
    }

    #[test]
    fn test_comments_survive_to_text() {
        let template = Template::parse(
            "{\n  // exported\n  \"parameters\": {},\n  \"resources\": [] /* none */\n}",
        )
        .unwrap();
        assert_eq!(template.comments().len(), 2);
        let text = template.to_text().unwrap();
        assert!(text.contains("  // exported\n  \"parameters\": {},"));
        assert!(text.contains("\"resources\": [] /* none */"));
    }

    #[test]
    fn test_missing_resources_section() {
        let mut template = Template::from_value(json!({"parameters": {}})).unwrap();
        let err = template.take_resources().unwrap_err();
        assert!(matches!(err, TransformError::MissingField { ref field, .. } if field == "resources"));
    }
}
