//! Error types for collaborator calls.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the case library and its fixtures.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A history search was requested with blank text; nothing was sent.
    #[error("search text is empty")]
    EmptySearchText,

    /// A collaborator call failed.
    #[error("{operation} failed: {reason}")]
    Unavailable {
        operation: &'static str,
        reason: String,
    },

    /// The fixture file could not be read.
    #[error("failed to read case library fixture {path}: {source}")]
    FixtureRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The fixture file is not valid case library JSON.
    #[error("invalid case library fixture {path}: {source}")]
    FixtureFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl CatalogError {
    pub fn unavailable(operation: &'static str, reason: impl Into<String>) -> Self {
        CatalogError::Unavailable {
            operation,
            reason: reason.into(),
        }
    }

    /// Message for the editing UI.
    pub fn user_message(&self) -> String {
        match self {
            CatalogError::EmptySearchText => "Please enter search text".to_string(),
            CatalogError::Unavailable { operation, .. } => {
                format!("The case library could not complete {operation}")
            }
            CatalogError::FixtureRead { path, .. } => {
                format!("Could not read {}", path.display())
            }
            CatalogError::FixtureFormat { path, source } => {
                format!(
                    "{} is not a valid case library (line {}, column {})",
                    path.display(),
                    source.line(),
                    source.column()
                )
            }
        }
    }

    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            CatalogError::EmptySearchText => Some("Type part of a case name and search again"),
            CatalogError::Unavailable { .. } => Some("Retry once the case library is reachable"),
            CatalogError::FixtureRead { .. } => Some("Check the catalog path in your settings"),
            CatalogError::FixtureFormat { .. } => None,
        }
    }
}

/// Result type for collaborator calls.
pub type Result<T> = std::result::Result<T, CatalogError>;
