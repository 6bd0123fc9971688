//! The case library collaborator and an in-memory implementation of it.

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use tcs_model::CaseDocument;

use crate::error::{CatalogError, Result};
use crate::types::{CaseLibraryOption, PresetData, SearchRequest};

/// Remote source of library options, historical cases, presets and
/// parameter schemas. Transport is up to the implementor.
#[async_trait]
pub trait CaseLibraryService: Send + Sync {
    async fn fetch_case_library_options(&self) -> Result<Vec<CaseLibraryOption>>;

    async fn fetch_search_history_cases(&self, request: &SearchRequest)
    -> Result<Vec<CaseDocument>>;

    async fn fetch_preset_data(&self) -> Result<PresetData>;

    /// Raw `kind -> [field]` mapping; parsed leniently by the catalog.
    async fn fetch_param_schemas(&self) -> Result<Value>;
}

/// Case library served from a JSON document.
///
/// Sections missing from the document behave like a failing collaborator,
/// which lets fixtures exercise every fallback.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticCaseLibrary {
    #[serde(default)]
    case_library_options: Option<Vec<CaseLibraryOption>>,
    #[serde(default)]
    history_cases: Option<Vec<CaseDocument>>,
    #[serde(default)]
    preset_data: Option<PresetData>,
    #[serde(default)]
    param_schemas: Option<Value>,
}

impl StaticCaseLibrary {
    /// A library on which every call fails.
    pub fn offline() -> Self {
        Self::default()
    }

    pub fn from_json(value: Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::FixtureRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| CatalogError::FixtureFormat {
            path: path.to_path_buf(),
            source,
        })
    }

    #[must_use]
    pub fn with_history_cases(mut self, cases: Vec<CaseDocument>) -> Self {
        self.history_cases = Some(cases);
        self
    }

    #[must_use]
    pub fn with_param_schemas(mut self, schemas: Value) -> Self {
        self.param_schemas = Some(schemas);
        self
    }

    #[must_use]
    pub fn with_preset_data(mut self, presets: PresetData) -> Self {
        self.preset_data = Some(presets);
        self
    }

    /// Every historical case, unfiltered.
    pub fn history_cases(&self) -> &[CaseDocument] {
        self.history_cases.as_deref().unwrap_or_default()
    }
}

fn missing(operation: &'static str) -> CatalogError {
    CatalogError::unavailable(operation, "not present in the fixture")
}

#[async_trait]
impl CaseLibraryService for StaticCaseLibrary {
    async fn fetch_case_library_options(&self) -> Result<Vec<CaseLibraryOption>> {
        self.case_library_options
            .clone()
            .ok_or_else(|| missing("fetchCaseLibraryOptions"))
    }

    async fn fetch_search_history_cases(
        &self,
        request: &SearchRequest,
    ) -> Result<Vec<CaseDocument>> {
        let cases = self
            .history_cases
            .as_ref()
            .ok_or_else(|| missing("fetchSearchHistoryCases"))?;
        let needle = request.text().to_lowercase();
        let hits: Vec<CaseDocument> = cases
            .iter()
            .filter(|case| case.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        debug!(
            library = %request.library,
            method = %request.method,
            text = request.text(),
            hits = hits.len(),
            "searched history cases"
        );
        Ok(hits)
    }

    async fn fetch_preset_data(&self) -> Result<PresetData> {
        self.preset_data
            .clone()
            .ok_or_else(|| missing("fetchPresetData"))
    }

    async fn fetch_param_schemas(&self) -> Result<Value> {
        self.param_schemas
            .clone()
            .ok_or_else(|| missing("fetchParamSchemas"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SearchMethod;
    use serde_json::json;

    fn library() -> StaticCaseLibrary {
        StaticCaseLibrary::from_json(json!({
            "historyCases": [
                { "id": "HTC001", "name": "Monthly bill generation" },
                { "id": "HTC002", "name": "Offering change" }
            ]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn search_matches_name_ignoring_case() {
        let request = SearchRequest::new("all", SearchMethod::Keyword, "BILL").unwrap();
        let hits = library().fetch_search_history_cases(&request).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id.as_str(), "HTC001");
    }

    #[tokio::test]
    async fn missing_sections_fail() {
        let library = library();
        assert!(matches!(
            library.fetch_preset_data().await,
            Err(CatalogError::Unavailable { operation: "fetchPresetData", .. })
        ));
        assert!(library.fetch_case_library_options().await.is_err());
        assert!(StaticCaseLibrary::offline().history_cases().is_empty());
    }

    #[test]
    fn from_path_reports_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("library.json");
        std::fs::write(&path, "{ not json").unwrap();
        let error = StaticCaseLibrary::from_path(&path).unwrap_err();
        assert!(matches!(error, CatalogError::FixtureFormat { .. }));
        assert!(error.user_message().contains("library.json"));
    }
}
