//! Component parameter schemas and the engine that turns a schema plus prior
//! parameters into an editable tree.

pub mod error;
pub mod field;
pub mod form;
pub mod synthesis;
pub mod variables;

pub use error::{Result, SchemaError};
pub use field::{DefaultParams, FieldKind, FieldSchema, SchemaSet, TemplateOption};
pub use form::{ParamForm, SaveAsChange, TemplateChoice};
pub use synthesis::{PriorForm, synthesize, synthesize_annotated, synthesize_fields};
pub use variables::{VARIABLE_PREFIX, VariableEntry};
