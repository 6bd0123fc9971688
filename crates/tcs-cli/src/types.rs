use std::path::PathBuf;

use tcs_model::CaseDocument;

/// Per-case counts shown after an export.
#[derive(Debug, Clone)]
pub struct CaseSummary {
    pub id: String,
    pub name: String,
    pub steps: usize,
    pub components: usize,
    pub variables: usize,
}

impl CaseSummary {
    pub fn new(case: &CaseDocument, variables: usize) -> Self {
        Self {
            id: case.id.to_string(),
            name: case.name.clone(),
            steps: case.step_count(),
            components: case.components().count(),
            variables,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExportResult {
    pub output: PathBuf,
    pub cases: Vec<CaseSummary>,
}
