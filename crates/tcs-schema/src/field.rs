//! Field schemas describing a component kind's parameters.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use tcs_model::ValueNode;

/// One entry of a template-select field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateOption {
    pub value: String,
    #[serde(default)]
    pub label: String,
}

/// How a field is edited and stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum FieldKind {
    /// Single-line text.
    Input,
    /// Multi-line text.
    Textarea,
    /// Free text with suggested options.
    Combo {
        #[serde(default)]
        options: Vec<String>,
    },
    /// Reference to a request template file, preset or custom.
    TemplateSelect {
        #[serde(default)]
        options: Vec<TemplateOption>,
    },
    /// `Name=Value;...` list with a sibling `varDescriptions` leaf.
    VariableList,
    /// Nested typed tree built over an annotated default.
    JsonTree {
        #[serde(rename = "defaultValue", default)]
        default_value: ValueNode,
        /// Leaves accept validation rules and output bindings.
        #[serde(rename = "isResponse", default)]
        is_response: bool,
        #[serde(rename = "isRequest", default)]
        is_request: bool,
    },
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Input => "input",
            FieldKind::Textarea => "textarea",
            FieldKind::Combo { .. } => "combo",
            FieldKind::TemplateSelect { .. } => "template-select",
            FieldKind::VariableList => "variable-list",
            FieldKind::JsonTree { .. } => "json-tree",
        }
    }

    /// Whether the field stores a single text leaf under its name.
    pub fn is_text(&self) -> bool {
        matches!(
            self,
            FieldKind::Input
                | FieldKind::Textarea
                | FieldKind::Combo { .. }
                | FieldKind::TemplateSelect { .. }
        )
    }

    pub fn is_response_tree(&self) -> bool {
        matches!(
            self,
            FieldKind::JsonTree {
                is_response: true,
                ..
            }
        )
    }
}

/// A declared parameter of a component kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    /// Key of the field in the component's parameters.
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(flatten)]
    pub kind: FieldKind,
}

impl FieldSchema {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            required: false,
            placeholder: None,
            hint: None,
            kind,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Field schemas keyed by component kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaSet(IndexMap<String, Vec<FieldSchema>>);

impl SchemaSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a `{kind: [field, ...]}` document, skipping entries that do not
    /// describe a known field type.
    pub fn from_json(value: &Value) -> Self {
        let mut set = Self::new();
        let Some(kinds) = value.as_object() else {
            warn!("parameter schema document is not an object; ignoring it");
            return set;
        };
        for (kind, fields) in kinds {
            let Some(fields) = fields.as_array() else {
                warn!(kind = %kind, "parameter schema is not a list; skipping kind");
                continue;
            };
            let parsed = fields
                .iter()
                .filter_map(|field| match FieldSchema::deserialize(field) {
                    Ok(field) => Some(field),
                    Err(error) => {
                        warn!(kind = %kind, %error, "skipping malformed field schema");
                        None
                    }
                })
                .collect();
            set.insert(kind.clone(), parsed);
        }
        set
    }

    pub fn insert(&mut self, kind: impl Into<String>, fields: Vec<FieldSchema>) {
        self.0.insert(kind.into(), fields);
    }

    pub fn fields(&self, kind: &str) -> Option<&[FieldSchema]> {
        self.0.get(kind).map(Vec::as_slice)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Parameters a freshly added component of each kind starts from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DefaultParams(IndexMap<String, Value>);

impl DefaultParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: impl Into<String>, params: Value) {
        self.0.insert(kind.into(), params);
    }

    pub fn get(&self, kind: &str) -> Option<&Value> {
        self.0.get(kind)
    }

    /// `prior` unless it is empty, in which case the kind's defaults.
    pub fn prior_for<'a>(&'a self, kind: &str, prior: &'a Value) -> &'a Value {
        let is_empty = match prior {
            Value::Null => true,
            Value::Object(map) => map.is_empty(),
            _ => false,
        };
        if is_empty {
            self.get(kind).unwrap_or(prior)
        } else {
            prior
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_collaborator_field_types() {
        let set = SchemaSet::from_json(&json!({
            "api": [
                { "name": "rTpl", "label": "Template", "type": "template-select", "required": true,
                  "options": [{ "value": "@\\soap\\Payment.xml", "label": "Payment" }] },
                { "name": "url", "label": "URL", "type": "input", "placeholder": "${Env.Url}" },
                { "name": "rRsp", "label": "Response", "type": "json-tree", "isResponse": true,
                  "defaultValue": { "resultCode": { "type": "string", "value": "0", "validation": "equals" } } }
            ],
            "variable": [{ "name": "vars", "label": "Variables", "type": "variable-list" }]
        }));

        let api = set.fields("api").unwrap();
        assert_eq!(api.len(), 3);
        assert!(api[0].required);
        assert_eq!(api[1].placeholder.as_deref(), Some("${Env.Url}"));
        assert!(api[2].kind.is_response_tree());
        assert_eq!(set.fields("variable").unwrap()[0].kind, FieldKind::VariableList);
    }

    #[test]
    fn skips_unknown_field_types() {
        let set = SchemaSet::from_json(&json!({
            "phone": [
                { "name": "callingId", "type": "combo", "options": ["A", "B"] },
                { "name": "dial", "type": "keypad" }
            ],
            "broken": "not a list"
        }));
        assert_eq!(set.fields("phone").unwrap().len(), 1);
        assert!(set.fields("broken").is_none());
    }

    #[test]
    fn prior_for_falls_back_to_kind_defaults() {
        let mut defaults = DefaultParams::new();
        defaults.insert("delayTime", json!({ "delaytimes": "60" }));
        let empty = json!({});
        let given = json!({ "delaytimes": "5" });
        assert_eq!(defaults.prior_for("delayTime", &empty), &json!({ "delaytimes": "60" }));
        assert_eq!(defaults.prior_for("delayTime", &given), &given);
        assert_eq!(defaults.prior_for("shell", &empty), &empty);
    }
}
