#![deny(unsafe_code)]

use std::fmt;

use ulid::Ulid;

use crate::ModelError;

/// Prefix for steps created or duplicated while editing.
pub const STEP_ID_PREFIX: &str = "item_";
/// Prefix for components created or duplicated while editing.
pub const COMPONENT_ID_PREFIX: &str = "c_";
/// Prefix for case documents derived from a historical case.
pub const TEMPLATE_ID_PREFIX: &str = "TEMPLATE_";

/// Identity of a case, step or component.
///
/// Ids coming from the case library are kept verbatim; ids minted locally are
/// a short prefix followed by a ULID, so two fresh ids never collide.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ModelError::InvalidId(value));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn fresh(prefix: &str) -> Self {
        Self(format!("{prefix}{}", Ulid::new()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_trims_and_rejects_blank() {
        assert_eq!(NodeId::new("  s1 ").unwrap().as_str(), "s1");
        assert_eq!(
            NodeId::new("   "),
            Err(ModelError::InvalidId("   ".to_string()))
        );
    }

    #[test]
    fn fresh_ids_are_prefixed_and_distinct() {
        let a = NodeId::fresh(STEP_ID_PREFIX);
        let b = NodeId::fresh(STEP_ID_PREFIX);
        assert!(a.as_str().starts_with("item_"));
        assert_ne!(a, b);
    }
}
