//! # armnorm - ARM Template Normalizer
//!
//! **armnorm** rewrites Azure Resource Manager templates exported from a live
//! environment into templates that can be deployed to any environment. It strips
//! environment-specific literals, replaces them with template parameters and
//! variables, injects diagnostic settings for Logic Apps, and prunes
//! dependencies that do not belong in the deployment unit.
//!
//! ## Core Workflow
//!
//! Normalization is a pure, single-pass text transformation:
//!
//! 1.  **Parse**: The template text is parsed into a tree. `//` and `/* */` comments are accepted.
//! 2.  **Dispatch**: Every object in `resources` is routed by its `type` to a [`transform::ResourceTransformer`].
//!     Service bus namespaces, service bus topics and Logic App workflows are handled out of the box;
//!     everything else is left as it is.
//! 3.  **Serialize**: The tree is written back with two-space indentation.
//! 4.  **Substitute**: An ordered table of literal replacements ([`substitution::SubstitutionTable`])
//!     swaps known secrets and environment names for parameter references.
//!
//! Running the normalizer on its own output changes nothing, so "the text did not
//! change" reliably means "the template was already normalized".
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use armnorm::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let exported = std::fs::read_to_string("template.json")?;
//!
//!     // The default normalizer knows the three built-in resource types and the
//!     // built-in substitution table.
//!     let normalized = armnorm::transform(&exported)?;
//!     assert_eq!(armnorm::transform(&normalized)?, normalized);
//!
//!     // Or customise it: alias a resource type and add substitution rules.
//!     let normalizer = Normalizer::builder()
//!         .with_type_mapping("Contoso.Logic/workflows", WorkflowTransformer::RESOURCE_TYPE)
//!         .with_extra_substitutions(SubstitutionTable::from_rules(vec![
//!             SubstitutionRule::new("contoso-dev", "[parameters('environment')]"),
//!         ]))
//!         .build();
//!
//!     match normalizer.transform_file("template.json")? {
//!         FileOutcome::Changed => println!("template.json rewritten"),
//!         FileOutcome::Unchanged => println!("No changes!"),
//!     }
//!     Ok(())
//! }
//! ```

pub mod document;
pub mod error;
pub mod expression;
pub mod file;
pub mod prelude;
pub mod source;
pub mod substitution;
pub mod transform;

pub use file::{FileOutcome, transform_file};

use crate::error::TransformError;
use crate::transform::Normalizer;

/// Normalizes template text with the default [`Normalizer`].
///
/// Invalid JSON is reported as [`TransformError::Parse`]; no partial output is produced.
pub fn transform(text: &str) -> Result<String, TransformError> {
    Normalizer::default().transform(text)
}
