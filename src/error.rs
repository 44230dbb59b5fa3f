use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while normalizing a template.
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("Failed to parse template JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unterminated block comment starting at byte {offset}")]
    UnterminatedComment { offset: usize },

    #[error("Field '{field}' is missing at '{path}'")]
    MissingField { path: String, field: String },

    #[error("Value at '{path}' has an unexpected type: expected {expected}")]
    UnexpectedType { path: String, expected: &'static str },

    #[error("Resource name '{name}' at '{path}' cannot be normalized: {message}")]
    InvalidName {
        path: String,
        name: String,
        message: String,
    },

    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid substitution rules: {0}")]
    Rules(String),
}
