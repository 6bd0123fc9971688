//! Error types for editing.

use thiserror::Error;

use tcs_model::{ComponentPosition, NodeId, StepPosition};
use tcs_schema::SchemaError;

/// Errors raised while editing a case.
///
/// None of them closes the session; the rejected edit simply has no effect.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("case {0} already has an open edit session")]
    AlreadyOpen(NodeId),

    #[error("case {0} has no open edit session")]
    NotOpen(NodeId),

    #[error("no template is being edited")]
    NoOpenTemplate,

    #[error("unknown case: {0}")]
    UnknownCase(NodeId),

    #[error("no historical case at index {0}")]
    NoHistoricalCase(usize),

    /// A required draft field is empty.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Operator-supplied JSON did not parse.
    #[error("malformed parameters: {0}")]
    MalformedParameters(String),

    #[error("no step at {0}")]
    NoStep(StepPosition),

    #[error("no component at {0}")]
    NoComponent(ComponentPosition),

    #[error(transparent)]
    Form(#[from] SchemaError),
}

impl EditError {
    pub fn malformed(source: &serde_json::Error) -> Self {
        EditError::MalformedParameters(source.to_string())
    }

    /// Message for the editing UI.
    pub fn user_message(&self) -> String {
        match self {
            EditError::AlreadyOpen(id) => format!("Case {id} is already being edited"),
            EditError::NotOpen(id) => format!("Case {id} is not being edited"),
            EditError::NoOpenTemplate => "No template is being edited".to_string(),
            EditError::UnknownCase(id) => format!("Case {id} does not exist"),
            EditError::NoHistoricalCase(index) => {
                format!("There is no historical case number {}", index + 1)
            }
            EditError::MissingField(field) => format!("Please fill in the {field}"),
            EditError::MalformedParameters(reason) => {
                format!("Parameters are not valid JSON: {reason}")
            }
            EditError::NoStep(position) => format!("Step {position} no longer exists"),
            EditError::NoComponent(position) => format!("Component {position} no longer exists"),
            EditError::Form(error) => error.to_string(),
        }
    }

    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            EditError::AlreadyOpen(_) => Some("Save or cancel the open session first"),
            EditError::MissingField(_) => Some("Required fields cannot be blank"),
            EditError::MalformedParameters(_) => {
                Some("Fix the JSON text; the previous parameters were kept")
            }
            _ => None,
        }
    }
}

/// Result type for editing.
pub type Result<T> = std::result::Result<T, EditError>;
