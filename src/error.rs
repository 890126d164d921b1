//! Error types for context operations.

use thiserror::Error;

/// Main error type for context operations.
///
/// Every failure is raised synchronously at the point of violation; no
/// operation partially applies before failing.
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("source must be an object-like value, got {0}")]
    InvalidSource(String),

    #[error("state must be an object-like value, got {0}")]
    InvalidState(String),

    #[error("the property \"{0}\" cannot be modified by a setter operation")]
    InvalidSetter(String),

    #[error("decorator \"{0}\" already present")]
    DecoratorAlreadyPresent(String),

    #[error("decorator \"{0}\" would overwrite a property of the root context")]
    OverwritesContextProperty(String),

    #[error("property \"{0}\" not found")]
    NotFound(String),

    #[error("property \"{0}\" is not callable")]
    NotCallable(String),
}

impl ContextError {
    /// The dotted access path carried by an `InvalidSetter` failure.
    pub fn setter_path(&self) -> Option<&str> {
        match self {
            ContextError::InvalidSetter(path) => Some(path),
            _ => None,
        }
    }
}

/// Result type for context operations.
pub type Result<T> = std::result::Result<T, ContextError>;

/// Short description of a JSON value's kind, used in error messages.
pub(crate) fn kind_of(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
