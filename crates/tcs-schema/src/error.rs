//! Error types for parameter form editing.

use thiserror::Error;

/// Errors raised while editing a parameter form.
///
/// Synthesis itself never fails; these only come from form edits that
/// address something the schema does not describe.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    /// The form has no field with this name.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// The edit does not apply to this kind of field.
    #[error("field {field} is not a {expected} field")]
    WrongFieldKind {
        field: String,
        expected: &'static str,
    },

    /// Validation rules and output bindings live on response trees only.
    #[error("field {0} is not a response tree")]
    NotResponseTree(String),

    /// The path does not name a leaf inside the field.
    #[error("no leaf at {path} in field {field}")]
    UnknownPath { field: String, path: String },
}

/// Result type for form editing.
pub type Result<T> = std::result::Result<T, SchemaError>;
