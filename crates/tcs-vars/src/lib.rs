//! Variable registry for a case: which `${name}` bindings exist, where they
//! come from, and completion while typing them.

pub mod complete;
pub mod registry;

pub use complete::{Completion, CompletionQuery, query};
pub use registry::{
    BindingContext, ResponderStyle, VariableRegistry, VariableSymbol, rescan,
};
