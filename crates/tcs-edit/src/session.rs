//! One period of mutation on a case: backup on open, commit or rollback on
//! close.

use tracing::{debug, info};

use tcs_catalog::{Catalog, ComponentTemplate};
use tcs_model::{
    CaseDocument, ComponentNode, ComponentPosition, NodeId, STEP_ID_PREFIX, Section, StepNode,
    StepPosition, ValueNode,
};
use tcs_schema::{ParamForm, SaveAsChange};
use tcs_vars::{ResponderStyle, VariableRegistry, VariableSymbol};

use crate::draft::{ComponentDraft, StepDraft, ValidComponent};
use crate::error::{EditError, Result};
use crate::ordering::{self, MoveOutcome};

/// How a session ended, with the document that is now visible.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEnd {
    Committed(CaseDocument),
    RolledBack(CaseDocument),
}

impl SessionEnd {
    pub fn into_document(self) -> CaseDocument {
        match self {
            SessionEnd::Committed(document) | SessionEnd::RolledBack(document) => document,
        }
    }
}

/// Working copy plus the untouched snapshot taken on open.
///
/// Every structural change rescans the variable registry before returning,
/// so suggestions never come from a stale table.
#[derive(Debug, Clone)]
pub struct EditSession {
    working: CaseDocument,
    snapshot: CaseDocument,
    registry: VariableRegistry,
}

impl EditSession {
    pub fn open(document: &CaseDocument) -> Self {
        info!(case = %document.id, "opened edit session");
        Self {
            working: document.clone(),
            snapshot: document.clone(),
            registry: VariableRegistry::scan(document),
        }
    }

    pub fn case_id(&self) -> &NodeId {
        &self.snapshot.id
    }

    pub fn working(&self) -> &CaseDocument {
        &self.working
    }

    pub fn snapshot(&self) -> &CaseDocument {
        &self.snapshot
    }

    pub fn registry(&self) -> &VariableRegistry {
        &self.registry
    }

    pub fn is_modified(&self) -> bool {
        self.working != self.snapshot
    }

    /// Variable suggestions for free text being typed at `cursor`.
    pub fn suggest(&self, text: &str, cursor: usize) -> Vec<&VariableSymbol> {
        self.registry.suggest(text, cursor)
    }

    pub fn commit(self) -> SessionEnd {
        info!(case = %self.working.id, "committed edit session");
        SessionEnd::Committed(self.working)
    }

    pub fn rollback(self) -> SessionEnd {
        info!(case = %self.snapshot.id, "rolled back edit session");
        SessionEnd::RolledBack(self.snapshot)
    }

    fn rescan(&mut self) {
        self.registry.rescan(&self.working);
    }

    fn rescan_if(&mut self, outcome: MoveOutcome) -> MoveOutcome {
        if outcome.is_applied() {
            self.rescan();
        }
        outcome
    }

    pub fn rename_case(&mut self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EditError::MissingField("name"));
        }
        self.working.name = name.to_string();
        Ok(())
    }

    // Ordering

    pub fn move_step(&mut self, from: StepPosition, to: StepPosition) -> MoveOutcome {
        let outcome = ordering::move_step(&mut self.working, from, to);
        self.rescan_if(outcome)
    }

    pub fn move_component(&mut self, from: ComponentPosition, to: ComponentPosition) -> MoveOutcome {
        let outcome = ordering::move_component(&mut self.working, from, to);
        self.rescan_if(outcome)
    }

    pub fn duplicate_step(&mut self, at: StepPosition) -> MoveOutcome {
        let outcome = ordering::duplicate_step(&mut self.working, at);
        self.rescan_if(outcome)
    }

    pub fn duplicate_component(&mut self, at: ComponentPosition) -> MoveOutcome {
        let outcome = ordering::duplicate_component(&mut self.working, at);
        self.rescan_if(outcome)
    }

    pub fn remove_step(&mut self, at: StepPosition) -> Result<()> {
        ordering::remove_step(&mut self.working, at).ok_or(EditError::NoStep(at))?;
        self.rescan();
        Ok(())
    }

    pub fn remove_component(&mut self, at: ComponentPosition) -> Result<()> {
        ordering::remove_component(&mut self.working, at).ok_or(EditError::NoComponent(at))?;
        self.rescan();
        Ok(())
    }

    pub fn toggle_expanded(&mut self, at: StepPosition) -> Result<bool> {
        ordering::toggle_expanded(&mut self.working, at).ok_or(EditError::NoStep(at))
    }

    // Steps

    /// Appends a step to `section`. A preset's components are copied under
    /// fresh ids.
    pub fn add_step(
        &mut self,
        section: Section,
        draft: &StepDraft,
        catalog: &Catalog,
    ) -> Result<StepPosition> {
        let name = draft.validated_name()?;
        let mut step = match &draft.preset {
            Some(preset) => catalog.instantiate_step(preset),
            None => StepNode::new(NodeId::fresh(STEP_ID_PREFIX), name),
        };
        step.name = name.to_string();
        step.description = draft.description.trim().to_string();
        debug!(%section, id = %step.id, components = step.components.len(), "added step");

        let steps = self.working.section_mut(section);
        steps.push(step);
        let position = StepPosition::new(section, steps.len() - 1);
        self.rescan();
        Ok(position)
    }

    /// Changes a step's name and description; components are untouched.
    pub fn update_step(&mut self, at: StepPosition, draft: &StepDraft) -> Result<()> {
        let name = draft.validated_name()?.to_string();
        let step = self.working.step_mut(at).ok_or(EditError::NoStep(at))?;
        step.name = name;
        step.description = draft.description.trim().to_string();
        Ok(())
    }

    // Components

    pub fn add_component(
        &mut self,
        at: StepPosition,
        draft: &ComponentDraft,
        catalog: &Catalog,
    ) -> Result<ComponentPosition> {
        let valid = draft.validate()?;
        if self.working.step(at).is_none() {
            return Err(EditError::NoStep(at));
        }
        let component = build_component(catalog, valid);
        debug!(step = %at, id = %component.id, kind = %component.kind, "added component");
        let step = self.working.step_mut(at).ok_or(EditError::NoStep(at))?;
        step.components.push(component);
        let position = ComponentPosition::new(at, step.components.len() - 1);
        self.rescan();
        Ok(position)
    }

    /// Replaces a component from a draft, keeping its id. A malformed draft
    /// leaves the component as it was.
    pub fn update_component(
        &mut self,
        at: ComponentPosition,
        draft: &ComponentDraft,
        catalog: &Catalog,
    ) -> Result<()> {
        let valid = draft.validate()?;
        let current = self
            .working
            .component_mut(at)
            .ok_or(EditError::NoComponent(at))?;
        let mut component = build_component(catalog, valid);
        component.id = current.id.clone();
        *current = component;
        self.rescan();
        Ok(())
    }

    /// Form over a component's current parameters.
    pub fn param_form(&self, at: ComponentPosition, catalog: &Catalog) -> Result<ParamForm> {
        let component = self
            .working
            .component(at)
            .ok_or(EditError::NoComponent(at))?;
        Ok(catalog.param_form(&component.kind, &component.parameters.to_annotated()))
    }

    /// Stores an edited form on the component it was opened for.
    pub fn apply_form(&mut self, at: ComponentPosition, form: ParamForm) -> Result<()> {
        let component = self
            .working
            .component_mut(at)
            .ok_or(EditError::NoComponent(at))?;
        component.parameters = form.into_parameters();
        self.rescan();
        Ok(())
    }

    /// Edits a component's parameter tree directly.
    pub fn update_parameters<R>(
        &mut self,
        at: ComponentPosition,
        edit: impl FnOnce(&mut ValueNode) -> R,
    ) -> Result<R> {
        let component = self
            .working
            .component_mut(at)
            .ok_or(EditError::NoComponent(at))?;
        let result = edit(&mut component.parameters);
        self.rescan();
        Ok(result)
    }

    /// Renames the output binding of one response leaf in place.
    ///
    /// A binding that only appears is patched into the registry without
    /// walking the case. Replacing or clearing one rescans, since another
    /// leaf may still bind the old name.
    pub fn set_save_as(
        &mut self,
        at: ComponentPosition,
        catalog: &Catalog,
        field: &str,
        path: &str,
        name: Option<&str>,
    ) -> Result<SaveAsChange> {
        let mut form = self.param_form(at, catalog)?;
        let change = form.set_save_as(field, path, name)?;
        let component = self
            .working
            .component_mut(at)
            .ok_or(EditError::NoComponent(at))?;
        let style = ResponderStyle::of(component);
        component.parameters = form.into_parameters();
        if change.is_noop() {
            return Ok(change);
        }
        if change.old.is_some() {
            self.rescan();
        } else {
            self.registry.apply(&change, style);
        }
        Ok(change)
    }
}

fn build_component(catalog: &Catalog, valid: ValidComponent) -> ComponentNode {
    let template =
        ComponentTemplate::new(valid.kind, valid.display_name).with_params(valid.parameters);
    catalog.instantiate_component(&template)
}
