//! Case documents: sections of steps, steps of components.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ModelError;
use crate::ids::{COMPONENT_ID_PREFIX, NodeId, STEP_ID_PREFIX};
use crate::value::ValueNode;

/// The three ordered sections of a case, in traversal order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Section {
    Preconditions,
    Steps,
    ExpectedResults,
}

impl Section {
    /// Rescan and output order.
    pub const ALL: [Section; 3] = [
        Section::Preconditions,
        Section::Steps,
        Section::ExpectedResults,
    ];

    /// Wire name, also the XML container element.
    pub fn as_str(self) -> &'static str {
        match self {
            Section::Preconditions => "preconditions",
            Section::Steps => "steps",
            Section::ExpectedResults => "expectedResults",
        }
    }

    /// XML element of one step in this section.
    pub fn item_tag(self) -> &'static str {
        match self {
            Section::Preconditions => "precondition",
            Section::Steps => "step",
            Section::ExpectedResults => "expectedResult",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Section::Preconditions => "Preconditions",
            Section::Steps => "Steps",
            Section::ExpectedResults => "Expected results",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Section::ALL
            .into_iter()
            .find(|section| section.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ModelError::UnknownSection(s.to_string()))
    }
}

/// One executable unit inside a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentNode {
    pub id: NodeId,
    /// Selects the parameter schema. Collaborator-defined, so kept open.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "name")]
    pub display_name: String,
    #[serde(rename = "params", default)]
    pub parameters: ValueNode,
}

impl ComponentNode {
    pub fn new(
        id: NodeId,
        kind: impl Into<String>,
        display_name: impl Into<String>,
        parameters: ValueNode,
    ) -> Self {
        Self {
            id,
            kind: kind.into(),
            display_name: display_name.into(),
            parameters,
        }
    }

    /// Deep copy under a fresh id.
    pub fn duplicate(&self) -> Self {
        Self {
            id: NodeId::fresh(COMPONENT_ID_PREFIX),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepNode {
    pub id: NodeId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Presentation state only.
    #[serde(default)]
    pub expanded: bool,
    #[serde(default)]
    pub components: Vec<ComponentNode>,
}

impl StepNode {
    pub fn new(id: NodeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            expanded: false,
            components: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_component(mut self, component: ComponentNode) -> Self {
        self.components.push(component);
        self
    }

    /// Deep copy under a fresh id; every component is re-identified too.
    pub fn duplicate(&self) -> Self {
        Self {
            id: NodeId::fresh(STEP_ID_PREFIX),
            name: self.name.clone(),
            description: self.description.clone(),
            expanded: self.expanded,
            components: self.components.iter().map(ComponentNode::duplicate).collect(),
        }
    }
}

/// Steps of the three sections.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sections {
    #[serde(default)]
    pub preconditions: Vec<StepNode>,
    #[serde(default)]
    pub steps: Vec<StepNode>,
    #[serde(default)]
    pub expected_results: Vec<StepNode>,
}

impl Sections {
    pub fn get(&self, section: Section) -> &[StepNode] {
        match section {
            Section::Preconditions => &self.preconditions,
            Section::Steps => &self.steps,
            Section::ExpectedResults => &self.expected_results,
        }
    }

    pub fn get_mut(&mut self, section: Section) -> &mut Vec<StepNode> {
        match section {
            Section::Preconditions => &mut self.preconditions,
            Section::Steps => &mut self.steps,
            Section::ExpectedResults => &mut self.expected_results,
        }
    }

    /// Sections paired with their steps, in traversal order.
    pub fn iter(&self) -> impl Iterator<Item = (Section, &[StepNode])> {
        Section::ALL
            .into_iter()
            .map(move |section| (section, self.get(section)))
    }
}

/// A whole test case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseDocument {
    pub id: NodeId,
    pub name: String,
    #[serde(flatten)]
    pub sections: Sections,
}

impl CaseDocument {
    pub fn new(id: NodeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            sections: Sections::default(),
        }
    }

    pub fn section(&self, section: Section) -> &[StepNode] {
        self.sections.get(section)
    }

    pub fn section_mut(&mut self, section: Section) -> &mut Vec<StepNode> {
        self.sections.get_mut(section)
    }

    pub fn step(&self, position: StepPosition) -> Option<&StepNode> {
        self.section(position.section).get(position.index)
    }

    pub fn step_mut(&mut self, position: StepPosition) -> Option<&mut StepNode> {
        self.section_mut(position.section).get_mut(position.index)
    }

    pub fn component(&self, position: ComponentPosition) -> Option<&ComponentNode> {
        self.step(position.step)?.components.get(position.index)
    }

    pub fn component_mut(&mut self, position: ComponentPosition) -> Option<&mut ComponentNode> {
        self.step_mut(position.step)?.components.get_mut(position.index)
    }

    /// Every component with its position, in traversal order.
    pub fn components(&self) -> impl Iterator<Item = (ComponentPosition, &ComponentNode)> {
        self.sections.iter().flat_map(|(section, steps)| {
            steps.iter().enumerate().flat_map(move |(step_index, step)| {
                step.components
                    .iter()
                    .enumerate()
                    .map(move |(index, component)| {
                        (
                            ComponentPosition::new(StepPosition::new(section, step_index), index),
                            component,
                        )
                    })
            })
        })
    }

    pub fn step_count(&self) -> usize {
        Section::ALL
            .into_iter()
            .map(|section| self.section(section).len())
            .sum()
    }
}

/// Address of a step: section plus index within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StepPosition {
    pub section: Section,
    pub index: usize,
}

impl StepPosition {
    pub const fn new(section: Section, index: usize) -> Self {
        Self { section, index }
    }
}

impl fmt::Display for StepPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.section, self.index)
    }
}

/// Address of a component: owning step plus index within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentPosition {
    pub step: StepPosition,
    pub index: usize,
}

impl ComponentPosition {
    pub const fn new(step: StepPosition, index: usize) -> Self {
        Self { step, index }
    }
}

impl fmt::Display for ComponentPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.components[{}]", self.step, self.index)
    }
}
