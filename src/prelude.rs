//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the armnorm crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use armnorm::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let text = std::fs::read_to_string("path/to/template.json")?;
//! let normalizer = Normalizer::default();
//!
//! let mut template = Template::parse(&text)?;
//! let report = normalizer.normalize(&mut template)?;
//! println!("Rewrote {} resources", report.transformed);
//! # Ok(())
//! # }
//! ```

// Normalization
pub use crate::file::FileOutcome;
pub use crate::transform::{
    NamespaceTransformer, NormalizeReport, Normalizer, NormalizerBuilder, ResourceTransformer,
    TopicTransformer, WorkflowTransformer,
};

// Template model
pub use crate::document::{NodePath, Object, ParameterMatch, PathQuery, Template};

// Source text
pub use crate::source::{Comments, Trivia};

// Substitution
pub use crate::substitution::{SubstitutionRule, SubstitutionTable};

// Error types
pub use crate::error::TransformError;

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
