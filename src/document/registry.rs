//! Parameter and variable bookkeeping on a [`Template`].
//!
//! Every insert here is first-writer-wins, so any number of resources can ask
//! for the same entry and a second normalization pass changes nothing.

use super::path::{NodePath, PathQuery};
use super::tree::{self, Object};
use super::{PARAMETERS, Template, VARIABLES};
use crate::error::TransformError;
use serde_json::{Value, json};
use tracing::debug;

/// A parameter whose default value satisfied a search, with the name that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterMatch {
    pub name: String,
    pub default_value: String,
}

impl Template {
    pub fn parameters(&self) -> Result<&Object, TransformError> {
        let root = tree::as_object(&self.root, &NodePath::root())?;
        let section = tree::child(root, PARAMETERS, &NodePath::root())?;
        tree::as_object(section, &NodePath::root().key(PARAMETERS))
    }

    pub fn parameters_mut(&mut self) -> Result<&mut Object, TransformError> {
        let root = self.root_object_mut()?;
        let section = tree::child_mut(root, PARAMETERS, &NodePath::root())?;
        tree::as_object_mut(section, &NodePath::root().key(PARAMETERS))
    }

    /// The `variables` section, created empty if the template has none.
    pub fn variables_mut(&mut self) -> Result<&mut Object, TransformError> {
        let root = self.root_object_mut()?;
        if !root.contains_key(VARIABLES) {
            tree::insert_after(root, PARAMETERS, VARIABLES, Value::Object(Object::new()));
        }
        let section = tree::child_mut(root, VARIABLES, &NodePath::root())?;
        tree::as_object_mut(section, &NodePath::root().key(VARIABLES))
    }

    /// The string default of parameter `name`, found the way an export tool
    /// would query it: the first `defaultValue` anywhere under the parameter.
    pub fn parameter_default(&self, name: &str) -> Result<Option<String>, TransformError> {
        self.parameters()?;
        let query = PathQuery::new(&format!("$.{}..defaultValue", name));
        let first = query
            .select_from(&self.root, &NodePath::root().key(PARAMETERS))
            .into_iter()
            .next();
        Ok(first
            .and_then(|path| path.resolve(&self.root))
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    /// Declares a string parameter with `default_value` unless it already exists.
    /// Returns `true` if the parameter was added.
    pub fn ensure_parameter(
        &mut self,
        name: &str,
        default_value: &str,
    ) -> Result<bool, TransformError> {
        let parameters = self.parameters_mut()?;
        if parameters.contains_key(name) {
            return Ok(false);
        }
        debug!(parameter = name, default_value, "Declaring missing parameter");
        parameters.insert(
            name.to_string(),
            json!({ "defaultValue": default_value, "type": "string" }),
        );
        Ok(true)
    }

    /// Declares a variable unless it already exists. Returns `true` if it was added.
    pub fn ensure_variable(&mut self, name: &str, value: &str) -> Result<bool, TransformError> {
        let variables = self.variables_mut()?;
        if variables.contains_key(name) {
            return Ok(false);
        }
        debug!(variable = name, value, "Declaring missing variable");
        variables.insert(name.to_string(), Value::String(value.to_string()));
        Ok(true)
    }

    /// The first parameter, in declaration order, whose string default satisfies
    /// `predicate`. Parameters without a string default are never candidates.
    pub fn find_parameter<F>(&self, predicate: F) -> Result<Option<ParameterMatch>, TransformError>
    where
        F: Fn(&str) -> bool,
    {
        Ok(self.parameters()?.iter().find_map(|(name, parameter)| {
            parameter
                .get("defaultValue")
                .and_then(Value::as_str)
                .filter(|default| predicate(default))
                .map(|default| ParameterMatch {
                    name: name.clone(),
                    default_value: default.to_string(),
                })
        }))
    }
}
