pub mod case;
pub mod error;
pub mod ids;
pub mod path;
pub mod value;

pub use case::{
    CaseDocument, ComponentNode, ComponentPosition, Section, Sections, StepNode, StepPosition,
};
pub use error::{ModelError, Result};
pub use ids::{COMPONENT_ID_PREFIX, NodeId, STEP_ID_PREFIX, TEMPLATE_ID_PREFIX};
pub use path::Path;
pub use value::{Branch, Leaf, LeafType, MetaUpdate, Scalar, ValidationRule, ValueNode};
