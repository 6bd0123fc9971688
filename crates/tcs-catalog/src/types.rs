//! Wire types exchanged with the case library.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use tcs_schema::DefaultParams;

use crate::error::{CatalogError, Result};

/// A selectable case library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseLibraryOption {
    pub value: String,
    pub label: String,
}

impl CaseLibraryOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// How the library matches search text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMethod {
    #[default]
    Keyword,
    Semantic,
}

impl SearchMethod {
    pub const ALL: [SearchMethod; 2] = [SearchMethod::Keyword, SearchMethod::Semantic];

    pub fn as_str(self) -> &'static str {
        match self {
            SearchMethod::Keyword => "keyword",
            SearchMethod::Semantic => "semantic",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SearchMethod::Keyword => "By keyword",
            SearchMethod::Semantic => "By meaning",
        }
    }
}

impl fmt::Display for SearchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        SearchMethod::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown search method: {s}"))
    }
}

/// A validated history search. The text is never blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub library: String,
    pub method: SearchMethod,
    text: String,
}

impl SearchRequest {
    pub fn new(
        library: impl Into<String>,
        method: SearchMethod,
        text: impl AsRef<str>,
    ) -> Result<Self> {
        let text = text.as_ref().trim();
        if text.is_empty() {
            return Err(CatalogError::EmptySearchText);
        }
        Ok(Self {
            library: library.into(),
            method,
            text: text.to_string(),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// A component offered by the palette, or one inside a preset step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentTemplate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub params: Value,
}

impl ComponentTemplate {
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: None,
            kind: kind.into(),
            name: name.into(),
            alias: None,
            icon: None,
            description: String::new(),
            params: Value::Null,
        }
    }

    #[must_use]
    pub fn with_params(mut self, params: Value) -> Self {
        self.params = params;
        self
    }
}

/// A ready-made step the operator can drop into a section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepTemplate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub components: Vec<ComponentTemplate>,
}

/// Presets returned by the library in one call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetData {
    #[serde(default)]
    pub steps: Vec<StepTemplate>,
    #[serde(default)]
    pub components: Vec<ComponentTemplate>,
    #[serde(default)]
    pub component_default_params: DefaultParams,
}
