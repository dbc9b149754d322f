//! Errors raised while decoding or narrowing wire values.

use thiserror::Error;

/// A wire payload could not be decoded into a model value.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("{entity} must be a JSON object, got {found}")]
    NotAnObject { entity: &'static str, found: &'static str },

    #[error("field type in {entity}: required")]
    MissingDiscriminant { entity: &'static str },

    #[error("field type in {entity}: expected a string, got {found}")]
    InvalidDiscriminant { entity: &'static str, found: &'static str },

    #[error("invalid {entity} type {found:?}, expected one of {expected:?}")]
    UnknownVariant {
        entity: &'static str,
        found: String,
        expected: Vec<&'static str>,
    },

    #[error("field {field} in {entity} is required for {variant} type")]
    MissingField {
        entity: &'static str,
        variant: &'static str,
        field: &'static str,
    },

    #[error("field {field} in {entity}: {message}")]
    InvalidField {
        entity: &'static str,
        field: &'static str,
        message: String,
    },

    #[error("malformed JSON: {0}")]
    Syntax(#[from] serde_json::Error),
}

impl DecodeError {
    /// Name of the missing or invalid key, when the error is tied to one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            DecodeError::MissingField { field, .. } | DecodeError::InvalidField { field, .. } => {
                Some(field)
            }
            DecodeError::MissingDiscriminant { .. } | DecodeError::InvalidDiscriminant { .. } => {
                Some("type")
            }
            _ => None,
        }
    }
}

/// A narrowing accessor was called on a value holding a different variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {entity} type; expected: {expected}, got: {found}")]
pub struct NarrowingError {
    pub entity: &'static str,
    pub expected: &'static str,
    pub found: &'static str,
}

pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
