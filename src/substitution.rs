//! The final find/replace pass over serialized template text.

use crate::error::TransformError;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Replace every occurrence of `find` with `replace`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstitutionRule {
    pub find: String,
    pub replace: String,
}

impl SubstitutionRule {
    pub fn new(find: impl Into<String>, replace: impl Into<String>) -> Self {
        Self {
            find: find.into(),
            replace: replace.into(),
        }
    }
}

/// An ordered list of rules. Each rule sees the output of the ones before it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubstitutionTable {
    rules: Vec<SubstitutionRule>,
}

impl Default for SubstitutionTable {
    /// Known environment literals from exported templates.
    fn default() -> Self {
        Self::from_rules(vec![
            // Functions
            SubstitutionRule::new("sites_DevBaasFunctions_name", "functionAppName"),
            // GMF API credentials
            SubstitutionRule::new(
                r#""password": "B@ss4T%st""#,
                r#""password": "[parameters('gmf_api_Pass')]""#,
            ),
            SubstitutionRule::new(
                r#""password": "7Jt7*R""#,
                r#""password": "[parameters('gmf_api_Pass')]""#,
            ),
            SubstitutionRule::new(
                r#""username": "baas.stage.api""#,
                r#""username": "[parameters('gmf_api_user')]""#,
            ),
            SubstitutionRule::new(
                r#""username": "baas.prod.api""#,
                r#""username": "[parameters('gmf_api_user')]""#,
            ),
            SubstitutionRule::new(
                r#""PlatformUser": "baas.stage.api""#,
                r#""PlatformUser": "[parameters('gmf_api_user')]""#,
            ),
            SubstitutionRule::new(
                r#""PlatformUser": "baas.prod.api""#,
                r#""PlatformUser": "[parameters('gmf_api_user')]""#,
            ),
            // SharePoint
            SubstitutionRule::new(
                r#""relativeWebUrl": "sites/DSP-Test""#,
                r#""relativeWebUrl": "[parameters('sharepointSiteRelativeWebUrl')]""#,
            ),
        ])
    }
}

impl SubstitutionTable {
    pub fn from_rules(rules: Vec<SubstitutionRule>) -> Self {
        Self { rules }
    }

    /// Reads a JSON array of `{"find": ..., "replace": ...}` objects.
    pub fn from_json(text: &str) -> Result<Self, TransformError> {
        let table: Self =
            serde_json::from_str(text).map_err(|e| TransformError::Rules(e.to_string()))?;
        if let Some(index) = table.rules.iter().position(|rule| rule.find.is_empty()) {
            return Err(TransformError::Rules(format!(
                "rule {} has an empty 'find' string",
                index
            )));
        }
        Ok(table)
    }

    /// Appends rules after the existing ones.
    pub fn extend(&mut self, other: SubstitutionTable) {
        self.rules.extend(other.rules);
    }

    pub fn rules(&self) -> &[SubstitutionRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn apply(&self, text: &str) -> String {
        self.rules.iter().fold(text.to_string(), |acc, rule| {
            if rule.find.is_empty() || !acc.contains(&rule.find) {
                return acc;
            }
            trace!(find = %rule.find, "Applying substitution");
            acc.replace(&rule.find, &rule.replace)
        })
    }
}
