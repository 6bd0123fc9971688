//! Reordering, duplication and removal of steps and components.
//!
//! Sections are isolation boundaries for steps, steps for components. A
//! request that crosses one is ignored, never an error.

use std::fmt;

use tracing::debug;

use tcs_model::{CaseDocument, ComponentNode, ComponentPosition, StepNode, StepPosition};

/// Why a structural request changed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    CrossSection,
    CrossStep,
    SourceOutOfRange,
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IgnoreReason::CrossSection => "moves between sections are not allowed",
            IgnoreReason::CrossStep => "moves between steps are not allowed",
            IgnoreReason::SourceOutOfRange => "source index out of range",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Applied,
    Ignored(IgnoreReason),
}

impl MoveOutcome {
    pub fn is_applied(self) -> bool {
        self == MoveOutcome::Applied
    }

    fn ignored(reason: IgnoreReason, request: &str) -> Self {
        debug!(%reason, request, "ignored structural request");
        MoveOutcome::Ignored(reason)
    }
}

/// Remove-then-insert. The destination is clamped to the shortened list, so
/// a target past the end places the item last.
fn relocate<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from >= items.len() {
        return false;
    }
    let item = items.remove(from);
    let to = to.min(items.len());
    items.insert(to, item);
    true
}

pub fn move_step(case: &mut CaseDocument, from: StepPosition, to: StepPosition) -> MoveOutcome {
    if from.section != to.section {
        return MoveOutcome::ignored(IgnoreReason::CrossSection, "move step");
    }
    if !relocate(case.section_mut(from.section), from.index, to.index) {
        return MoveOutcome::ignored(IgnoreReason::SourceOutOfRange, "move step");
    }
    debug!(%from, to = to.index, "moved step");
    MoveOutcome::Applied
}

pub fn move_component(
    case: &mut CaseDocument,
    from: ComponentPosition,
    to: ComponentPosition,
) -> MoveOutcome {
    if from.step.section != to.step.section {
        return MoveOutcome::ignored(IgnoreReason::CrossSection, "move component");
    }
    if from.step.index != to.step.index {
        return MoveOutcome::ignored(IgnoreReason::CrossStep, "move component");
    }
    let Some(step) = case.step_mut(from.step) else {
        return MoveOutcome::ignored(IgnoreReason::SourceOutOfRange, "move component");
    };
    if !relocate(&mut step.components, from.index, to.index) {
        return MoveOutcome::ignored(IgnoreReason::SourceOutOfRange, "move component");
    }
    debug!(%from, to = to.index, "moved component");
    MoveOutcome::Applied
}

/// Inserts a fresh-id copy right after the step. Output bindings are copied
/// as they are.
pub fn duplicate_step(case: &mut CaseDocument, at: StepPosition) -> MoveOutcome {
    let Some(copy) = case.step(at).map(StepNode::duplicate) else {
        return MoveOutcome::ignored(IgnoreReason::SourceOutOfRange, "duplicate step");
    };
    debug!(%at, id = %copy.id, "duplicated step");
    case.section_mut(at.section).insert(at.index + 1, copy);
    MoveOutcome::Applied
}

pub fn duplicate_component(case: &mut CaseDocument, at: ComponentPosition) -> MoveOutcome {
    let Some(copy) = case.component(at).map(ComponentNode::duplicate) else {
        return MoveOutcome::ignored(IgnoreReason::SourceOutOfRange, "duplicate component");
    };
    debug!(%at, id = %copy.id, "duplicated component");
    if let Some(step) = case.step_mut(at.step) {
        step.components.insert(at.index + 1, copy);
    }
    MoveOutcome::Applied
}

pub fn remove_step(case: &mut CaseDocument, at: StepPosition) -> Option<StepNode> {
    let steps = case.section_mut(at.section);
    (at.index < steps.len()).then(|| steps.remove(at.index))
}

pub fn remove_component(case: &mut CaseDocument, at: ComponentPosition) -> Option<ComponentNode> {
    let step = case.step_mut(at.step)?;
    (at.index < step.components.len()).then(|| step.components.remove(at.index))
}

/// Flips a step's expanded flag and returns the new value.
pub fn toggle_expanded(case: &mut CaseDocument, at: StepPosition) -> Option<bool> {
    let step = case.step_mut(at)?;
    step.expanded = !step.expanded;
    Some(step.expanded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tcs_model::{NodeId, Section, ValueNode};

    fn id(value: &str) -> NodeId {
        NodeId::new(value).unwrap()
    }

    fn step(name: &str, components: &[&str]) -> StepNode {
        components.iter().fold(StepNode::new(id(name), name), |step, component| {
            step.with_component(ComponentNode::new(
                id(component),
                "comment",
                *component,
                ValueNode::empty_branch(),
            ))
        })
    }

    fn case() -> CaseDocument {
        let mut case = CaseDocument::new(id("TC1"), "Login");
        case.sections.preconditions = vec![step("p1", &["pc1"])];
        case.sections.steps = vec![
            step("s1", &["c1", "c2", "c3"]),
            step("s2", &["c4"]),
            step("s3", &[]),
        ];
        case
    }

    fn step_ids(case: &CaseDocument, section: Section) -> Vec<&str> {
        case.section(section).iter().map(|s| s.id.as_str()).collect()
    }

    fn component_ids(case: &CaseDocument, step: StepPosition) -> Vec<&str> {
        case.step(step)
            .map(|s| s.components.iter().map(|c| c.id.as_str()).collect())
            .unwrap_or_default()
    }

    const S0: StepPosition = StepPosition::new(Section::Steps, 0);
    const S1: StepPosition = StepPosition::new(Section::Steps, 1);

    #[test]
    fn move_step_is_stable_relocation() {
        let mut case = case();
        let outcome = move_step(&mut case, S0, StepPosition::new(Section::Steps, 2));
        assert_eq!(outcome, MoveOutcome::Applied);
        assert_eq!(step_ids(&case, Section::Steps), ["s2", "s3", "s1"]);
    }

    #[test]
    fn move_past_end_places_last() {
        let mut case = case();
        move_step(&mut case, S0, StepPosition::new(Section::Steps, 99));
        assert_eq!(step_ids(&case, Section::Steps), ["s2", "s3", "s1"]);
    }

    #[test]
    fn cross_section_move_is_ignored() {
        let mut case = case();
        let before = case.clone();
        let outcome = move_step(&mut case, S0, StepPosition::new(Section::Preconditions, 0));
        assert_eq!(outcome, MoveOutcome::Ignored(IgnoreReason::CrossSection));
        assert_eq!(case, before);
    }

    #[test]
    fn out_of_range_source_is_ignored() {
        let mut case = case();
        let before = case.clone();
        let outcome = move_step(&mut case, StepPosition::new(Section::Steps, 3), S0);
        assert_eq!(outcome, MoveOutcome::Ignored(IgnoreReason::SourceOutOfRange));
        assert_eq!(case, before);
    }

    #[test]
    fn move_component_within_step() {
        let mut case = case();
        let outcome = move_component(
            &mut case,
            ComponentPosition::new(S0, 2),
            ComponentPosition::new(S0, 0),
        );
        assert!(outcome.is_applied());
        assert_eq!(component_ids(&case, S0), ["c3", "c1", "c2"]);
    }

    #[test]
    fn cross_step_component_move_is_ignored() {
        let mut case = case();
        let outcome = move_component(
            &mut case,
            ComponentPosition::new(S0, 0),
            ComponentPosition::new(S1, 0),
        );
        assert_eq!(outcome, MoveOutcome::Ignored(IgnoreReason::CrossStep));
        assert_eq!(component_ids(&case, S0), ["c1", "c2", "c3"]);
        assert_eq!(component_ids(&case, S1), ["c4"]);
    }

    #[test]
    fn duplicate_step_inserts_after_source_with_fresh_ids() {
        let mut case = case();
        assert!(duplicate_step(&mut case, S0).is_applied());
        let steps = case.section(Section::Steps);
        assert_eq!(steps.len(), 4);
        assert_ne!(steps[1].id, steps[0].id);
        assert_eq!(steps[1].name, "s1");
        assert_eq!(steps[2].id.as_str(), "s2");
        assert!(
            steps[1]
                .components
                .iter()
                .zip(&steps[0].components)
                .all(|(copy, source)| copy.id != source.id && copy.display_name == source.display_name)
        );
    }

    #[test]
    fn duplicate_component_inserts_after_source() {
        let mut case = case();
        assert!(duplicate_component(&mut case, ComponentPosition::new(S0, 0)).is_applied());
        let ids = component_ids(&case, S0);
        assert_eq!(ids.len(), 4);
        assert_eq!(ids[0], "c1");
        assert_ne!(ids[1], "c1");
        assert_eq!(ids[2], "c2");
        assert_eq!(
            duplicate_component(&mut case, ComponentPosition::new(S1, 5)),
            MoveOutcome::Ignored(IgnoreReason::SourceOutOfRange)
        );
    }

    #[test]
    fn remove_and_toggle() {
        let mut case = case();
        assert_eq!(remove_component(&mut case, ComponentPosition::new(S1, 0)).unwrap().id.as_str(), "c4");
        assert!(remove_component(&mut case, ComponentPosition::new(S1, 0)).is_none());
        assert_eq!(remove_step(&mut case, S1).unwrap().id.as_str(), "s2");
        assert_eq!(toggle_expanded(&mut case, S0), Some(true));
        assert_eq!(toggle_expanded(&mut case, S0), Some(false));
        assert_eq!(toggle_expanded(&mut case, StepPosition::new(Section::ExpectedResults, 0)), None);
    }
}
