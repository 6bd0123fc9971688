//! Operator-entered step and component data, validated before it touches a
//! case.

use serde_json::Value;

use tcs_catalog::{ComponentTemplate, StepTemplate};
use tcs_model::{ComponentNode, StepNode};

use crate::error::{EditError, Result};

/// A step being added or edited.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepDraft {
    pub name: String,
    pub description: String,
    /// Components of this preset are copied into the new step.
    pub preset: Option<StepTemplate>,
}

impl StepDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn from_preset(preset: &StepTemplate) -> Self {
        Self {
            name: preset.name.clone(),
            description: preset.description.clone(),
            preset: Some(preset.clone()),
        }
    }

    pub fn from_step(step: &StepNode) -> Self {
        Self::new(&step.name).with_description(&step.description)
    }

    pub(crate) fn validated_name(&self) -> Result<&str> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(EditError::MissingField("name"));
        }
        Ok(name)
    }
}

/// A component being added or edited. Parameters are raw JSON text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentDraft {
    pub display_name: String,
    pub kind: String,
    pub parameters_text: String,
}

/// A draft that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ValidComponent {
    pub(crate) display_name: String,
    pub(crate) kind: String,
    pub(crate) parameters: Value,
}

impl ComponentDraft {
    pub fn new(kind: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            kind: kind.into(),
            parameters_text: String::new(),
        }
    }

    #[must_use]
    pub fn with_parameters_text(mut self, text: impl Into<String>) -> Self {
        self.parameters_text = text.into();
        self
    }

    pub fn from_preset(preset: &ComponentTemplate) -> Self {
        let text = match &preset.params {
            Value::Null => String::new(),
            params => params.to_string(),
        };
        Self::new(&preset.kind, &preset.name).with_parameters_text(text)
    }

    /// Draft for editing `component`; keeps output bindings in the text.
    pub fn from_component(component: &ComponentNode) -> Self {
        Self::new(&component.kind, &component.display_name)
            .with_parameters_text(component.parameters.to_annotated().to_string())
    }

    /// Checks display name, then kind, then parameter text. Blank text means
    /// no prior parameters.
    pub(crate) fn validate(&self) -> Result<ValidComponent> {
        let display_name = self.display_name.trim();
        if display_name.is_empty() {
            return Err(EditError::MissingField("name"));
        }
        let kind = self.kind.trim();
        if kind.is_empty() {
            return Err(EditError::MissingField("type"));
        }
        let parameters = if self.parameters_text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&self.parameters_text).map_err(|e| EditError::malformed(&e))?
        };
        Ok(ValidComponent {
            display_name: display_name.to_string(),
            kind: kind.to_string(),
            parameters,
        })
    }
}

/// Reads a pasted step (`{name, description, components}`).
pub fn import_step_json(text: &str) -> Result<StepDraft> {
    let template: StepTemplate =
        serde_json::from_str(text).map_err(|e| EditError::malformed(&e))?;
    Ok(StepDraft::from_preset(&template))
}

/// Reads a pasted component (`{type, name, params}`).
pub fn import_component_json(text: &str) -> Result<ComponentDraft> {
    let template: ComponentTemplate =
        serde_json::from_str(text).map_err(|e| EditError::malformed(&e))?;
    Ok(ComponentDraft::from_preset(&template))
}
