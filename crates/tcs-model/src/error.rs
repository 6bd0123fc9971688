use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("invalid path: {0:?}")]
    InvalidPath(String),
    #[error("invalid identifier: {0:?}")]
    InvalidId(String),
    #[error("unknown leaf type: {0}")]
    UnknownLeafType(String),
    #[error("unknown validation rule: {0}")]
    UnknownValidationRule(String),
    #[error("unknown section: {0}")]
    UnknownSection(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
