//! Path-addressed parameter trees.
//!
//! A component's parameters are a [`ValueNode`] rooted at a Branch. Branches
//! group named children in insertion order; Leaves carry a typed scalar plus
//! the metadata the response editor attaches to it (validation rule and
//! `saveAs` binding).
//!
//! Lookups and writes never fail loudly: an unknown or malformed path reads
//! as absent and writes through it are ignored.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value};
use tracing::debug;

use crate::ModelError;
use crate::path::Path;

/// Declared type of a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeafType {
    #[default]
    String,
    Number,
    Boolean,
    Date,
}

impl LeafType {
    pub const ALL: [LeafType; 4] = [
        LeafType::String,
        LeafType::Number,
        LeafType::Boolean,
        LeafType::Date,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LeafType::String => "string",
            LeafType::Number => "number",
            LeafType::Boolean => "boolean",
            LeafType::Date => "date",
        }
    }

    /// Converts a scalar into the representation this type stores.
    ///
    /// Text that does not parse (for example a `${My_Count}` binding in a
    /// number leaf) is kept as text.
    pub fn coerce(self, value: Scalar) -> Scalar {
        match (self, value) {
            (LeafType::String | LeafType::Date, Scalar::Text(text)) => Scalar::Text(text),
            (LeafType::String | LeafType::Date, other) => Scalar::Text(other.to_string()),
            (LeafType::Number, Scalar::Text(text)) => {
                parse_number(text.trim()).map_or(Scalar::Text(text), Scalar::Number)
            }
            (LeafType::Number, Scalar::Bool(flag)) => Scalar::Bool(flag),
            (LeafType::Number, number @ Scalar::Number(_)) => number,
            (LeafType::Boolean, Scalar::Text(text)) => match text.trim() {
                "true" => Scalar::Bool(true),
                "false" => Scalar::Bool(false),
                _ => Scalar::Text(text),
            },
            (LeafType::Boolean, other) => other,
        }
    }
}

impl fmt::Display for LeafType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeafType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LeafType::ALL
            .into_iter()
            .find(|ty| ty.as_str() == s)
            .ok_or_else(|| ModelError::UnknownLeafType(s.to_string()))
    }
}

fn parse_number(text: &str) -> Option<Number> {
    if let Ok(int) = text.parse::<i64>() {
        return Some(Number::from(int));
    }
    text.parse::<f64>().ok().and_then(Number::from_f64)
}

/// Check applied to a response leaf when the case runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidationRule {
    #[default]
    NoCare,
    NotEmpty,
    Equals,
    Contains,
    Regex,
}

impl ValidationRule {
    pub const ALL: [ValidationRule; 5] = [
        ValidationRule::NoCare,
        ValidationRule::NotEmpty,
        ValidationRule::Equals,
        ValidationRule::Contains,
        ValidationRule::Regex,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ValidationRule::NoCare => "noCare",
            ValidationRule::NotEmpty => "notEmpty",
            ValidationRule::Equals => "equals",
            ValidationRule::Contains => "contains",
            ValidationRule::Regex => "regex",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ValidationRule::NoCare => "no check",
            ValidationRule::NotEmpty => "not empty",
            ValidationRule::Equals => "equals",
            ValidationRule::Contains => "contains",
            ValidationRule::Regex => "regex",
        }
    }
}

impl FromStr for ValidationRule {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ValidationRule::ALL
            .into_iter()
            .find(|rule| rule.as_str() == s)
            .ok_or_else(|| ModelError::UnknownValidationRule(s.to_string()))
    }
}

/// The value held by a leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Number(Number),
    Bool(bool),
}

impl Scalar {
    /// Leaf type used when a leaf is created from this value alone.
    pub fn inferred_type(&self) -> LeafType {
        match self {
            Scalar::Text(_) => LeafType::String,
            Scalar::Number(_) => LeafType::Number,
            Scalar::Bool(_) => LeafType::Boolean,
        }
    }

    /// `None` for arrays and objects; `null` reads as empty text.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(Scalar::Text(String::new())),
            Value::Bool(flag) => Some(Scalar::Bool(*flag)),
            Value::Number(number) => Some(Scalar::Number(number.clone())),
            Value::String(text) => Some(Scalar::Text(text.clone())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Scalar::Text(text) => Value::String(text.clone()),
            Scalar::Number(number) => Value::Number(number.clone()),
            Scalar::Bool(flag) => Value::Bool(*flag),
        }
    }

    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Scalar::Text(text) => Cow::Borrowed(text),
            other => Cow::Owned(other.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Scalar::Text(text) if text.trim().is_empty())
    }
}

impl Default for Scalar {
    fn default() -> Self {
        Scalar::Text(String::new())
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(text) => f.write_str(text),
            Scalar::Number(number) => write!(f, "{number}"),
            Scalar::Bool(flag) => write!(f, "{flag}"),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Number(Number::from(value))
    }
}

/// A typed value plus its response-editing metadata.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Leaf {
    pub leaf_type: LeafType,
    pub value: Scalar,
    pub validation: ValidationRule,
    /// Variable that captures this leaf's runtime value. Never empty.
    save_as: Option<String>,
    /// Leaf was instantiated from a schema default rather than entered.
    pub is_default: bool,
}

impl Leaf {
    /// Leaf whose type is inferred from `value`.
    pub fn new(value: impl Into<Scalar>) -> Self {
        let value = value.into();
        Self {
            leaf_type: value.inferred_type(),
            value,
            ..Self::default()
        }
    }

    pub fn typed(leaf_type: LeafType, value: impl Into<Scalar>) -> Self {
        Self {
            leaf_type,
            value: value.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_validation(mut self, validation: ValidationRule) -> Self {
        self.validation = validation;
        self
    }

    #[must_use]
    pub fn with_save_as(mut self, name: impl Into<String>) -> Self {
        self.set_save_as(Some(name.into()));
        self
    }

    #[must_use]
    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }

    pub fn save_as(&self) -> Option<&str> {
        self.save_as.as_deref()
    }

    /// Blank names clear the binding.
    pub fn set_save_as(&mut self, name: Option<String>) {
        self.save_as = name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());
    }

    /// Whether validation or a binding has been set.
    pub fn has_meta(&self) -> bool {
        self.validation != ValidationRule::NoCare || self.save_as.is_some()
    }
}

/// Ordered, uniquely keyed children of a branch.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Branch {
    children: IndexMap<String, ValueNode>,
}

impl Branch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&ValueNode> {
        self.children.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut ValueNode> {
        self.children.get_mut(key)
    }

    /// Replaces an existing child in place, keeping its position.
    pub fn insert(&mut self, key: impl Into<String>, node: ValueNode) -> Option<ValueNode> {
        self.children.insert(key.into(), node)
    }

    pub fn remove(&mut self, key: &str) -> Option<ValueNode> {
        self.children.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.children.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ValueNode)> {
        self.children.iter().map(|(key, node)| (key.as_str(), node))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.children.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl FromIterator<(String, ValueNode)> for Branch {
    fn from_iter<T: IntoIterator<Item = (String, ValueNode)>>(iter: T) -> Self {
        Self {
            children: iter.into_iter().collect(),
        }
    }
}

/// Metadata write for [`ValueNode::set_meta`]. `None` deletes the field.
#[derive(Debug, Clone, PartialEq)]
pub enum MetaUpdate {
    Validation(Option<ValidationRule>),
    SaveAs(Option<String>),
}

/// A node of a parameter tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueNode {
    Branch(Branch),
    Leaf(Leaf),
}

impl Default for ValueNode {
    fn default() -> Self {
        ValueNode::empty_branch()
    }
}

impl From<Leaf> for ValueNode {
    fn from(leaf: Leaf) -> Self {
        ValueNode::Leaf(leaf)
    }
}

impl From<Branch> for ValueNode {
    fn from(branch: Branch) -> Self {
        ValueNode::Branch(branch)
    }
}

impl ValueNode {
    pub fn empty_branch() -> Self {
        ValueNode::Branch(Branch::new())
    }

    pub fn is_branch(&self) -> bool {
        matches!(self, ValueNode::Branch(_))
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, ValueNode::Leaf(_))
    }

    pub fn as_branch(&self) -> Option<&Branch> {
        match self {
            ValueNode::Branch(branch) => Some(branch),
            ValueNode::Leaf(_) => None,
        }
    }

    pub fn as_branch_mut(&mut self) -> Option<&mut Branch> {
        match self {
            ValueNode::Branch(branch) => Some(branch),
            ValueNode::Leaf(_) => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            ValueNode::Leaf(leaf) => Some(leaf),
            ValueNode::Branch(_) => None,
        }
    }

    pub fn as_leaf_mut(&mut self) -> Option<&mut Leaf> {
        match self {
            ValueNode::Leaf(leaf) => Some(leaf),
            ValueNode::Branch(_) => None,
        }
    }

    /// Node at `path`, or `None` for malformed, missing or leaf-crossing paths.
    pub fn get(&self, path: &str) -> Option<&ValueNode> {
        self.get_at(&Path::parse(path)?)
    }

    pub fn get_at(&self, path: &Path) -> Option<&ValueNode> {
        path.segments()
            .iter()
            .try_fold(self, |node, key| node.as_branch()?.get(key))
    }

    pub fn get_mut_at(&mut self, path: &Path) -> Option<&mut ValueNode> {
        path.segments()
            .iter()
            .try_fold(self, |node, key| node.as_branch_mut()?.get_mut(key))
    }

    pub fn leaf(&self, path: &str) -> Option<&Leaf> {
        self.get(path)?.as_leaf()
    }

    pub fn leaf_at(&self, path: &Path) -> Option<&Leaf> {
        self.get_at(path)?.as_leaf()
    }

    /// Writes `value` into the leaf at `path`, creating missing branches and
    /// the leaf itself. Returns `false` when nothing changed: malformed path,
    /// a Branch at `path`, or an existing Leaf on the way.
    pub fn set_value(&mut self, path: &str, value: impl Into<Scalar>) -> bool {
        match Path::parse(path) {
            Some(path) => self.set_value_at(&path, value.into()),
            None => false,
        }
    }

    pub fn set_value_at(&mut self, path: &Path, value: Scalar) -> bool {
        let Some(parent) = self.branch_for_write(path.parent_segments()) else {
            return false;
        };
        match parent.get_mut(path.key()) {
            Some(ValueNode::Leaf(leaf)) => {
                leaf.value = value;
                true
            }
            Some(ValueNode::Branch(_)) => false,
            None => {
                parent.insert(path.key(), ValueNode::Leaf(Leaf::new(value)));
                true
            }
        }
    }

    /// Places `node` at `path`, replacing whatever was there.
    pub fn insert_at(&mut self, path: &Path, node: ValueNode) -> bool {
        match self.branch_for_write(path.parent_segments()) {
            Some(parent) => {
                parent.insert(path.key(), node);
                true
            }
            None => false,
        }
    }

    /// Sets or clears leaf metadata. No-op unless `path` names a Leaf.
    pub fn set_meta(&mut self, path: &str, update: MetaUpdate) -> bool {
        match Path::parse(path) {
            Some(path) => self.set_meta_at(&path, update),
            None => false,
        }
    }

    pub fn set_meta_at(&mut self, path: &Path, update: MetaUpdate) -> bool {
        let Some(leaf) = self.get_mut_at(path).and_then(ValueNode::as_leaf_mut) else {
            return false;
        };
        match update {
            MetaUpdate::Validation(rule) => leaf.validation = rule.unwrap_or_default(),
            MetaUpdate::SaveAs(name) => leaf.set_save_as(name),
        }
        true
    }

    pub fn remove(&mut self, path: &str) -> Option<ValueNode> {
        let path = Path::parse(path)?;
        let parent_path = path.parent_segments();
        let parent = parent_path
            .iter()
            .try_fold(&mut *self, |node, key| node.as_branch_mut()?.get_mut(key))?;
        parent.as_branch_mut()?.remove(path.key())
    }

    /// Walks to the branch holding the final segment, creating missing
    /// branches. Fails without mutating when an existing Leaf is crossed:
    /// once a branch has been created every later segment is new as well.
    fn branch_for_write(&mut self, segments: &[String]) -> Option<&mut Branch> {
        let mut current = self.as_branch_mut()?;
        for key in segments {
            if !current.contains_key(key) {
                current.insert(key.clone(), ValueNode::empty_branch());
            }
            current = current.get_mut(key)?.as_branch_mut()?;
        }
        Some(current)
    }

    /// Plain nested value: Branches become objects, Leaves their bare value.
    /// This is the persisted form of a component's parameters.
    pub fn to_plain(&self) -> Value {
        match self {
            ValueNode::Leaf(leaf) => leaf.value.to_json(),
            ValueNode::Branch(branch) => Value::Object(
                branch
                    .iter()
                    .map(|(key, node)| (key.to_string(), node.to_plain()))
                    .collect::<Map<String, Value>>(),
            ),
        }
    }

    /// JSON with annotated leaves, the form [`from_json`](Self::from_json)
    /// reads back. Same shape as the `Serialize` output.
    pub fn to_annotated(&self) -> Value {
        match self {
            ValueNode::Leaf(leaf) => {
                let mut map = Map::new();
                map.insert("type".to_string(), Value::from(leaf.leaf_type.as_str()));
                map.insert("value".to_string(), leaf.value.to_json());
                if leaf.validation != ValidationRule::NoCare {
                    map.insert("validation".to_string(), Value::from(leaf.validation.as_str()));
                }
                if let Some(name) = &leaf.save_as {
                    map.insert("saveAs".to_string(), Value::from(name.as_str()));
                }
                if leaf.is_default {
                    map.insert("isDefault".to_string(), Value::Bool(true));
                }
                Value::Object(map)
            }
            ValueNode::Branch(branch) => Value::Object(
                branch
                    .iter()
                    .map(|(key, node)| (key.to_string(), node.to_annotated()))
                    .collect(),
            ),
        }
    }

    /// Builds a tree from plain JSON without interpreting annotations.
    ///
    /// Objects become Branches, arrays Branches keyed by index, and scalars
    /// Leaves with an inferred type.
    pub fn from_plain(value: &Value) -> Self {
        match value {
            Value::Object(map) => ValueNode::Branch(
                map.iter()
                    .map(|(key, child)| (key.clone(), ValueNode::from_plain(child)))
                    .collect(),
            ),
            Value::Array(items) => ValueNode::Branch(
                items
                    .iter()
                    .enumerate()
                    .map(|(idx, child)| (idx.to_string(), ValueNode::from_plain(child)))
                    .collect(),
            ),
            scalar => ValueNode::Leaf(Leaf::new(Scalar::from_json(scalar).unwrap_or_default())),
        }
    }

    /// Builds a tree from JSON that may contain annotated leaves
    /// (`{"type": "string", "value": ..., "saveAs": ...}`).
    pub fn from_json(value: &Value) -> Result<Self, ModelError> {
        match value {
            Value::Object(map) => match annotated_leaf(map)? {
                Some(leaf) => Ok(ValueNode::Leaf(leaf)),
                None => map
                    .iter()
                    .map(|(key, child)| Ok((key.clone(), ValueNode::from_json(child)?)))
                    .collect::<Result<Branch, ModelError>>()
                    .map(ValueNode::Branch),
            },
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(idx, child)| Ok((idx.to_string(), ValueNode::from_json(child)?)))
                .collect::<Result<Branch, ModelError>>()
                .map(ValueNode::Branch),
            scalar => Ok(ValueNode::Leaf(Leaf::new(
                Scalar::from_json(scalar).unwrap_or_default(),
            ))),
        }
    }

    /// All leaves, depth-first in insertion order, with their paths.
    ///
    /// Leaves under a key that cannot appear in a path (empty or containing
    /// `.`) have no address and are left out.
    pub fn leaves(&self) -> Vec<(Path, &Leaf)> {
        let mut out = Vec::new();
        if let ValueNode::Branch(branch) = self {
            collect_leaves(branch, &[], &mut out);
        }
        out
    }

    /// Number of leaves below this node (1 for a leaf).
    pub fn leaf_count(&self) -> usize {
        match self {
            ValueNode::Leaf(_) => 1,
            ValueNode::Branch(branch) => branch.iter().map(|(_, node)| node.leaf_count()).sum(),
        }
    }
}

fn collect_leaves<'a>(branch: &'a Branch, prefix: &[String], out: &mut Vec<(Path, &'a Leaf)>) {
    for (key, node) in branch.iter() {
        let mut segments = prefix.to_vec();
        segments.push(key.to_string());
        match node {
            ValueNode::Leaf(leaf) => match Path::from_segments(segments) {
                Some(path) => out.push((path, leaf)),
                None => debug!(
                    key,
                    save_as = leaf.save_as(),
                    "skipped leaf without a path address"
                ),
            },
            ValueNode::Branch(child) => collect_leaves(child, &segments, out),
        }
    }
}

const LEAF_KEYS: [&str; 5] = ["type", "value", "validation", "saveAs", "isDefault"];

/// An object is an annotated leaf when its `type` names a leaf type and every
/// key belongs to the leaf annotation set.
fn annotated_leaf(map: &Map<String, Value>) -> Result<Option<Leaf>, ModelError> {
    let Some(Value::String(type_name)) = map.get("type") else {
        return Ok(None);
    };
    let Ok(leaf_type) = type_name.parse::<LeafType>() else {
        return Ok(None);
    };
    if !map.keys().all(|key| LEAF_KEYS.contains(&key.as_str())) {
        return Ok(None);
    }
    let value = match map.get("value") {
        Some(value) => Scalar::from_json(value).unwrap_or_else(|| Scalar::Text(value.to_string())),
        None => Scalar::default(),
    };
    let validation = match map.get("validation") {
        Some(Value::String(rule)) => rule.parse()?,
        _ => ValidationRule::NoCare,
    };
    let mut leaf = Leaf::typed(leaf_type, value).with_validation(validation);
    if let Some(Value::String(name)) = map.get("saveAs") {
        leaf.set_save_as(Some(name.clone()));
    }
    leaf.is_default = matches!(map.get("isDefault"), Some(Value::Bool(true)));
    Ok(Some(leaf))
}

impl Serialize for Leaf {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", &self.leaf_type)?;
        map.serialize_entry("value", &self.value.to_json())?;
        if self.validation != ValidationRule::NoCare {
            map.serialize_entry("validation", &self.validation)?;
        }
        if let Some(name) = &self.save_as {
            map.serialize_entry("saveAs", name)?;
        }
        if self.is_default {
            map.serialize_entry("isDefault", &true)?;
        }
        map.end()
    }
}

impl Serialize for ValueNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ValueNode::Leaf(leaf) => leaf.serialize(serializer),
            ValueNode::Branch(branch) => {
                let mut map = serializer.serialize_map(Some(branch.len()))?;
                for (key, node) in branch.iter() {
                    map.serialize_entry(key, node)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for ValueNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        ValueNode::from_json(&value).map_err(D::Error::custom)
    }
}
