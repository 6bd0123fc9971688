//! Case library collaborator interface, the catalog built from it at startup
//! and the fallbacks used when it is unreachable.

pub mod catalog;
pub mod error;
pub mod fallback;
pub mod generation;
pub mod service;
pub mod types;

pub use catalog::{Catalog, search_history};
pub use error::{CatalogError, Result};
pub use generation::GenerationRun;
pub use service::{CaseLibraryService, StaticCaseLibrary};
pub use types::{
    CaseLibraryOption, ComponentTemplate, PresetData, SearchMethod, SearchRequest, StepTemplate,
};
