//! Process-scoped bundle of collaborator data.

use serde_json::Value;
use tracing::{info, warn};

use tcs_model::{
    COMPONENT_ID_PREFIX, CaseDocument, ComponentNode, NodeId, STEP_ID_PREFIX, StepNode, ValueNode,
};
use tcs_schema::{DefaultParams, ParamForm, SchemaSet, synthesize, synthesize_annotated};

use crate::error::Result;
use crate::fallback;
use crate::service::CaseLibraryService;
use crate::types::{CaseLibraryOption, ComponentTemplate, PresetData, SearchRequest, StepTemplate};

/// Library options, presets, default parameters and parameter schemas.
///
/// Built once at startup and passed by reference to whatever needs it.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    library_options: Vec<CaseLibraryOption>,
    step_presets: Vec<StepTemplate>,
    component_presets: Vec<ComponentTemplate>,
    default_params: DefaultParams,
    schemas: SchemaSet,
    schemas_loaded: bool,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    /// Built-in content only, with no parameter schemas.
    pub fn builtin() -> Self {
        Self {
            library_options: fallback::case_library_options(),
            step_presets: fallback::step_presets(),
            component_presets: fallback::component_presets(),
            default_params: DefaultParams::new(),
            schemas: SchemaSet::new(),
            schemas_loaded: false,
        }
    }

    /// Fetches everything from `service`, substituting built-in content
    /// for whatever fails. Never fails itself.
    pub async fn load(service: &dyn CaseLibraryService) -> Self {
        let (options, presets, schemas) = tokio::join!(
            service.fetch_case_library_options(),
            service.fetch_preset_data(),
            service.fetch_param_schemas(),
        );

        let mut catalog = Self::builtin();
        match options {
            Ok(options) if !options.is_empty() => catalog.library_options = options,
            Ok(_) => warn!("case library returned no options; using built-in options"),
            Err(error) => warn!(%error, "using built-in case library options"),
        }
        match presets {
            Ok(presets) => catalog.apply_presets(presets),
            Err(error) => warn!(%error, "using built-in presets"),
        }
        catalog.apply_schemas(schemas);

        info!(
            libraries = catalog.library_options.len(),
            step_presets = catalog.step_presets.len(),
            component_presets = catalog.component_presets.len(),
            schemas = catalog.schemas.len(),
            "catalog loaded"
        );
        catalog
    }

    /// Fetches parameter schemas again after an earlier failure. Returns
    /// whether schemas are now available.
    pub async fn retry_schemas(&mut self, service: &dyn CaseLibraryService) -> bool {
        let schemas = service.fetch_param_schemas().await;
        self.apply_schemas(schemas);
        self.schemas_loaded
    }

    fn apply_presets(&mut self, presets: PresetData) {
        if presets.steps.is_empty() {
            warn!("case library returned no step presets; using built-in steps");
        } else {
            self.step_presets = presets.steps;
        }
        if presets.components.is_empty() {
            warn!("case library returned no component presets; using built-in components");
        } else {
            self.component_presets = presets.components;
        }
        self.default_params = presets.component_default_params;
    }

    fn apply_schemas(&mut self, schemas: Result<Value>) {
        match schemas {
            Ok(raw) => {
                self.schemas = SchemaSet::from_json(&raw);
                self.schemas_loaded = true;
            }
            Err(error) => {
                warn!(%error, "parameter schemas unavailable; components have no configurable fields");
            }
        }
    }

    #[must_use]
    pub fn with_schemas(mut self, schemas: SchemaSet) -> Self {
        self.schemas = schemas;
        self.schemas_loaded = true;
        self
    }

    #[must_use]
    pub fn with_default_params(mut self, defaults: DefaultParams) -> Self {
        self.default_params = defaults;
        self
    }

    pub fn library_options(&self) -> &[CaseLibraryOption] {
        &self.library_options
    }

    pub fn step_presets(&self) -> &[StepTemplate] {
        &self.step_presets
    }

    pub fn component_presets(&self) -> &[ComponentTemplate] {
        &self.component_presets
    }

    pub fn component_preset(&self, kind: &str) -> Option<&ComponentTemplate> {
        self.component_presets
            .iter()
            .find(|preset| preset.kind == kind)
    }

    pub fn default_params(&self) -> &DefaultParams {
        &self.default_params
    }

    pub fn schemas(&self) -> &SchemaSet {
        &self.schemas
    }

    pub fn schemas_loaded(&self) -> bool {
        self.schemas_loaded
    }

    /// Parameter tree for `kind`. An empty `prior` is replaced by the
    /// kind's default parameters first.
    pub fn synthesize(&self, kind: &str, prior: &Value) -> ValueNode {
        synthesize(&self.schemas, kind, self.default_params.prior_for(kind, prior))
    }

    /// Editable form for `kind`, seeded like [`synthesize`](Self::synthesize).
    pub fn param_form(&self, kind: &str, prior: &Value) -> ParamForm {
        ParamForm::open(&self.schemas, kind, self.default_params.prior_for(kind, prior))
    }

    /// A new component from a palette entry or preset step entry.
    ///
    /// Template parameters may carry annotated leaves, as drafts edited from
    /// an existing component do. Kinds without a schema keep the template's
    /// parameters as they are.
    pub fn instantiate_component(&self, template: &ComponentTemplate) -> ComponentNode {
        let parameters = if self.schemas.fields(&template.kind).is_some() {
            synthesize_annotated(
                &self.schemas,
                &template.kind,
                self.default_params.prior_for(&template.kind, &template.params),
            )
        } else {
            raw_parameters(self.default_params.prior_for(&template.kind, &template.params))
        };
        ComponentNode::new(
            NodeId::fresh(COMPONENT_ID_PREFIX),
            &template.kind,
            &template.name,
            parameters,
        )
    }

    /// A new step from a preset, every node under a fresh id.
    pub fn instantiate_step(&self, template: &StepTemplate) -> StepNode {
        let mut step = StepNode::new(NodeId::fresh(STEP_ID_PREFIX), &template.name)
            .with_description(&template.description);
        step.components = template
            .components
            .iter()
            .map(|component| self.instantiate_component(component))
            .collect();
        step
    }
}

fn raw_parameters(params: &Value) -> ValueNode {
    match params {
        Value::Object(_) => {
            ValueNode::from_json(params).unwrap_or_else(|_| ValueNode::from_plain(params))
        }
        _ => ValueNode::empty_branch(),
    }
}

/// Searches the history library. Blank text is rejected by
/// [`SearchRequest::new`] before anything is sent.
pub async fn search_history(
    service: &dyn CaseLibraryService,
    request: &SearchRequest,
) -> Result<Vec<CaseDocument>> {
    let cases = service.fetch_search_history_cases(request).await?;
    info!(text = request.text(), hits = cases.len(), "history search finished");
    Ok(cases)
}
