//! Edit sessions over test cases: ordering, drafts, commit and rollback,
//! and templates derived from historical cases.

pub mod book;
pub mod draft;
pub mod error;
pub mod ordering;
pub mod session;
pub mod template;

pub use book::{CaseBook, SessionState};
pub use draft::{ComponentDraft, StepDraft, import_component_json, import_step_json};
pub use error::{EditError, Result};
pub use ordering::{IgnoreReason, MoveOutcome};
pub use session::{EditSession, SessionEnd};
pub use template::{SavedTemplate, TemplateDesk};
