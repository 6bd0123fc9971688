//! Editing state of one component's parameters.

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use tcs_model::{Leaf, MetaUpdate, Path, Scalar, ValidationRule, ValueNode};

use crate::error::{Result, SchemaError};
use crate::field::{FieldKind, FieldSchema, SchemaSet, TemplateOption};
use crate::synthesis::{PriorForm, synthesize_fields};
use crate::variables::{self, DEFAULT_DESCRIPTIONS_FIELD, VariableEntry};

/// Selection state of a template-select field. Preset and custom text are
/// mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TemplateChoice {
    #[default]
    None,
    Preset(String),
    Custom(String),
}

impl TemplateChoice {
    /// Classifies a stored value against the field's options.
    pub fn resolve(options: &[TemplateOption], value: &str) -> Self {
        if value.is_empty() {
            TemplateChoice::None
        } else if options.iter().any(|option| option.value == value) {
            TemplateChoice::Preset(value.to_string())
        } else {
            TemplateChoice::Custom(value.to_string())
        }
    }

    /// The value written to the parameter leaf.
    pub fn value(&self) -> &str {
        match self {
            TemplateChoice::None => "",
            TemplateChoice::Preset(value) | TemplateChoice::Custom(value) => value,
        }
    }
}

/// A `saveAs` edit, reported so the variable registry can update in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveAsChange {
    pub old: Option<String>,
    pub new: Option<String>,
    /// Path of the leaf inside its response tree, e.g. `data.subscriberId`.
    pub field_key: String,
}

impl SaveAsChange {
    pub fn is_noop(&self) -> bool {
        self.old == self.new
    }
}

/// Schema-backed form over a component's parameter tree.
#[derive(Debug, Clone)]
pub struct ParamForm {
    kind: String,
    fields: Vec<FieldSchema>,
    tree: ValueNode,
    templates: HashMap<String, TemplateChoice>,
}

impl ParamForm {
    /// Synthesizes the tree for `kind` from `prior`, which may hold annotated
    /// leaves, and derives form state.
    pub fn open(schemas: &SchemaSet, kind: &str, prior: &Value) -> Self {
        let fields = schemas.fields(kind).map(<[_]>::to_vec).unwrap_or_default();
        let tree = if fields.is_empty() {
            ValueNode::empty_branch()
        } else {
            synthesize_fields(&fields, prior, PriorForm::Annotated)
        };
        let templates = fields
            .iter()
            .filter_map(|field| match &field.kind {
                FieldKind::TemplateSelect { options } => {
                    let stored = tree
                        .leaf(&field.name)
                        .map(|leaf| leaf.value.as_text().into_owned())
                        .unwrap_or_default();
                    Some((field.name.clone(), TemplateChoice::resolve(options, &stored)))
                }
                _ => None,
            })
            .collect();
        debug!(kind, fields = fields.len(), "opened parameter form");
        Self {
            kind: kind.to_string(),
            fields,
            tree,
            templates,
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn tree(&self) -> &ValueNode {
        &self.tree
    }

    pub fn has_response_tree(&self) -> bool {
        self.fields.iter().any(|field| field.kind.is_response_tree())
    }

    /// Writes operator text into a field. Json-tree leaves need a `path` and
    /// get the text coerced to their declared type.
    pub fn set_text(&mut self, field: &str, path: Option<&str>, text: &str) -> Result<()> {
        let schema = lookup(&self.fields, field)?;
        match (&schema.kind, path) {
            (FieldKind::TemplateSelect { .. }, None) => {
                let choice = if text.is_empty() {
                    TemplateChoice::None
                } else {
                    TemplateChoice::Custom(text.to_string())
                };
                self.tree.set_value(field, Scalar::Text(text.to_string()));
                self.templates.insert(field.to_string(), choice);
                Ok(())
            }
            (FieldKind::Input | FieldKind::Textarea | FieldKind::Combo { .. }, None) => {
                self.tree.set_value(field, Scalar::Text(text.to_string()));
                Ok(())
            }
            (FieldKind::JsonTree { .. }, Some(path)) => {
                let full = leaf_path(&self.tree, field, path)?;
                let value = self
                    .tree
                    .leaf_at(&full)
                    .map(|leaf| leaf.leaf_type.coerce(Scalar::Text(text.to_string())))
                    .unwrap_or_default();
                self.tree.set_value_at(&full, value);
                Ok(())
            }
            (FieldKind::JsonTree { .. }, None) => Err(SchemaError::UnknownPath {
                field: field.to_string(),
                path: String::new(),
            }),
            (FieldKind::VariableList, _) => Err(SchemaError::WrongFieldKind {
                field: field.to_string(),
                expected: "text",
            }),
            (_, Some(path)) => Err(SchemaError::UnknownPath {
                field: field.to_string(),
                path: path.to_string(),
            }),
        }
    }

    /// Sets or clears the validation rule of a response leaf.
    pub fn set_validation(
        &mut self,
        field: &str,
        path: &str,
        rule: Option<ValidationRule>,
    ) -> Result<()> {
        let full = self.response_leaf(field, path)?;
        self.tree.set_meta_at(&full, MetaUpdate::Validation(rule));
        Ok(())
    }

    /// Sets or clears the output binding of a response leaf.
    pub fn set_save_as(
        &mut self,
        field: &str,
        path: &str,
        name: Option<&str>,
    ) -> Result<SaveAsChange> {
        let full = self.response_leaf(field, path)?;
        let old = self
            .tree
            .leaf_at(&full)
            .and_then(Leaf::save_as)
            .map(str::to_string);
        self.tree
            .set_meta_at(&full, MetaUpdate::SaveAs(name.map(str::to_string)));
        let new = self
            .tree
            .leaf_at(&full)
            .and_then(Leaf::save_as)
            .map(str::to_string);
        Ok(SaveAsChange {
            old,
            new,
            field_key: path.to_string(),
        })
    }

    /// Rows currently stored in a variable-list field.
    pub fn variables(&self, field: &str) -> Result<Vec<VariableEntry>> {
        let descriptions_field = variable_list(&self.fields, field)?;
        let text = |key: &str| {
            self.tree
                .leaf(key)
                .map(|leaf| leaf.value.as_text().into_owned())
                .unwrap_or_default()
        };
        Ok(variables::entries(&text(field), &text(descriptions_field)))
    }

    /// Replaces a variable-list field's rows.
    pub fn set_variables(&mut self, field: &str, rows: &[VariableEntry]) -> Result<()> {
        let descriptions_field = variable_list(&self.fields, field)?;
        let (vars, descriptions) = variables::encode(rows);
        self.tree.set_value(field, vars);
        self.tree.set_value(descriptions_field, descriptions);
        Ok(())
    }

    pub fn template_choice(&self, field: &str) -> Result<TemplateChoice> {
        template_options(&self.fields, field)?;
        Ok(self.templates.get(field).cloned().unwrap_or_default())
    }

    /// Selects a preset or custom template, replacing the other.
    pub fn choose_template(&mut self, field: &str, choice: TemplateChoice) -> Result<()> {
        template_options(&self.fields, field)?;
        self.tree
            .set_value(field, Scalar::Text(choice.value().to_string()));
        self.templates.insert(field.to_string(), choice);
        Ok(())
    }

    /// Combo options containing `filter`, case-insensitively.
    pub fn combo_options(&self, field: &str, filter: &str) -> Result<Vec<&str>> {
        let schema = lookup(&self.fields, field)?;
        let FieldKind::Combo { options } = &schema.kind else {
            return Err(SchemaError::WrongFieldKind {
                field: field.to_string(),
                expected: "combo",
            });
        };
        let needle = filter.to_lowercase();
        Ok(options
            .iter()
            .filter(|option| option.to_lowercase().contains(&needle))
            .map(String::as_str)
            .collect())
    }

    /// Leaves of a json-tree field with paths relative to the field. Unless
    /// `show_all`, default leaves that are still empty are hidden.
    pub fn visible_leaves(&self, field: &str, show_all: bool) -> Result<Vec<(Path, &Leaf)>> {
        let schema = lookup(&self.fields, field)?;
        if !matches!(schema.kind, FieldKind::JsonTree { .. }) {
            return Err(SchemaError::WrongFieldKind {
                field: field.to_string(),
                expected: "json-tree",
            });
        }
        let Some(node) = self.tree.get(field) else {
            return Ok(Vec::new());
        };
        Ok(node
            .leaves()
            .into_iter()
            .filter(|(_, leaf)| show_all || !(leaf.is_default && leaf.value.is_empty()))
            .collect())
    }

    /// Names of required fields that are still empty.
    pub fn missing_required(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|field| field.required)
            .filter(|field| match self.tree.get(&field.name) {
                Some(ValueNode::Leaf(leaf)) => leaf.value.is_empty(),
                Some(ValueNode::Branch(branch)) => branch.is_empty(),
                None => true,
            })
            .map(|field| field.name.as_str())
            .collect()
    }

    /// The edited tree, ready to store on the component.
    pub fn into_parameters(self) -> ValueNode {
        self.tree
    }

    fn response_leaf(&self, field: &str, path: &str) -> Result<Path> {
        let schema = lookup(&self.fields, field)?;
        if !schema.kind.is_response_tree() {
            return Err(SchemaError::NotResponseTree(field.to_string()));
        }
        leaf_path(&self.tree, field, path)
    }
}

fn lookup<'a>(fields: &'a [FieldSchema], name: &str) -> Result<&'a FieldSchema> {
    fields
        .iter()
        .find(|field| field.name == name)
        .ok_or_else(|| SchemaError::UnknownField(name.to_string()))
}

fn variable_list(fields: &[FieldSchema], name: &str) -> Result<&'static str> {
    match &lookup(fields, name)?.kind {
        FieldKind::VariableList => Ok(DEFAULT_DESCRIPTIONS_FIELD),
        _ => Err(SchemaError::WrongFieldKind {
            field: name.to_string(),
            expected: "variable-list",
        }),
    }
}

fn template_options<'a>(fields: &'a [FieldSchema], name: &str) -> Result<&'a [TemplateOption]> {
    match &lookup(fields, name)?.kind {
        FieldKind::TemplateSelect { options } => Ok(options),
        _ => Err(SchemaError::WrongFieldKind {
            field: name.to_string(),
            expected: "template-select",
        }),
    }
}

/// Absolute path of an existing leaf inside a tree field.
fn leaf_path(tree: &ValueNode, field: &str, path: &str) -> Result<Path> {
    let unknown = || SchemaError::UnknownPath {
        field: field.to_string(),
        path: path.to_string(),
    };
    let full: Path = format!("{field}.{path}").parse().map_err(|_| unknown())?;
    match tree.get_at(&full) {
        Some(ValueNode::Leaf(_)) => Ok(full),
        _ => Err(unknown()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tcs_model::LeafType;

    fn schemas() -> SchemaSet {
        SchemaSet::from_json(&json!({
            "api": [
                { "name": "rTpl", "type": "template-select", "required": true, "options": [
                    { "value": "@\\soap\\CreateSubscriber.xml", "label": "Create subscriber" }
                ]},
                { "name": "url", "type": "input", "required": true },
                { "name": "rReq", "type": "json-tree", "isRequest": true, "defaultValue": {
                    "status": { "type": "number", "value": 1, "isDefault": true }
                }},
                { "name": "rRsp", "type": "json-tree", "isResponse": true, "defaultValue": {
                    "resultCode": { "type": "string", "value": "0", "validation": "equals", "isDefault": true },
                    "resultMsg": { "type": "string", "value": "", "isDefault": true },
                    "data": { "subscriberId": { "type": "string", "value": "" } }
                }}
            ],
            "phone": [
                { "name": "callingId", "type": "combo", "options": ["Native_HD_C1A1_Onnet", "Roaming_HD_V1_Onnet"] }
            ],
            "variable": [{ "name": "vars", "type": "variable-list", "required": true }]
        }))
    }

    #[test]
    fn prior_template_value_resolves_choice() {
        let form = ParamForm::open(&schemas(), "api", &json!({ "rTpl": "@\\soap\\CreateSubscriber.xml" }));
        assert_eq!(
            form.template_choice("rTpl").unwrap(),
            TemplateChoice::Preset("@\\soap\\CreateSubscriber.xml".into())
        );
        let form = ParamForm::open(&schemas(), "api", &json!({ "rTpl": "@\\custom.xml" }));
        assert_eq!(
            form.template_choice("rTpl").unwrap(),
            TemplateChoice::Custom("@\\custom.xml".into())
        );
    }

    #[test]
    fn custom_text_replaces_preset() {
        let mut form = ParamForm::open(&schemas(), "api", &json!({}));
        form.choose_template("rTpl", TemplateChoice::Preset("@\\soap\\CreateSubscriber.xml".into()))
            .unwrap();
        form.set_text("rTpl", None, "@\\mine.xml").unwrap();
        assert_eq!(
            form.template_choice("rTpl").unwrap(),
            TemplateChoice::Custom("@\\mine.xml".into())
        );
        assert_eq!(form.tree().leaf("rTpl").unwrap().value, Scalar::from("@\\mine.xml"));
    }

    #[test]
    fn set_text_coerces_tree_leaves() {
        let mut form = ParamForm::open(&schemas(), "api", &json!({}));
        form.set_text("rReq", Some("status"), "3").unwrap();
        let leaf = form.tree().leaf("rReq.status").unwrap();
        assert_eq!(leaf.leaf_type, LeafType::Number);
        assert_eq!(leaf.value, Scalar::from(3_i64));

        assert_eq!(
            form.set_text("rReq", Some("missing"), "x"),
            Err(SchemaError::UnknownPath {
                field: "rReq".into(),
                path: "missing".into()
            })
        );
    }

    #[test]
    fn bindings_need_a_response_tree() {
        let mut form = ParamForm::open(&schemas(), "api", &json!({}));
        assert_eq!(
            form.set_save_as("rReq", "status", Some("My_Status")),
            Err(SchemaError::NotResponseTree("rReq".into()))
        );

        let change = form
            .set_save_as("rRsp", "data.subscriberId", Some("My_SubId"))
            .unwrap();
        assert_eq!(
            change,
            SaveAsChange {
                old: None,
                new: Some("My_SubId".into()),
                field_key: "data.subscriberId".into(),
            }
        );
        let change = form.set_save_as("rRsp", "data.subscriberId", Some("  ")).unwrap();
        assert_eq!(change.old.as_deref(), Some("My_SubId"));
        assert_eq!(change.new, None);
    }

    #[test]
    fn validation_can_be_cleared() {
        let mut form = ParamForm::open(&schemas(), "api", &json!({}));
        form.set_validation("rRsp", "resultCode", None).unwrap();
        assert_eq!(
            form.tree().leaf("rRsp.resultCode").unwrap().validation,
            ValidationRule::NoCare
        );
    }

    #[test]
    fn filled_only_view_hides_empty_defaults() {
        let form = ParamForm::open(&schemas(), "api", &json!({}));
        let all: Vec<String> = form
            .visible_leaves("rRsp", true)
            .unwrap()
            .iter()
            .map(|(path, _)| path.to_string())
            .collect();
        assert_eq!(all, ["resultCode", "resultMsg", "data.subscriberId"]);
        let filled: Vec<String> = form
            .visible_leaves("rRsp", false)
            .unwrap()
            .iter()
            .map(|(path, _)| path.to_string())
            .collect();
        assert_eq!(filled, ["resultCode", "data.subscriberId"]);
    }

    #[test]
    fn combo_filter_is_case_insensitive() {
        let form = ParamForm::open(&schemas(), "phone", &json!({}));
        assert_eq!(
            form.combo_options("callingId", "roaming").unwrap(),
            ["Roaming_HD_V1_Onnet"]
        );
        assert_eq!(form.combo_options("callingId", "").unwrap().len(), 2);
    }

    #[test]
    fn variable_rows_round_trip_through_the_form() {
        let mut form = ParamForm::open(&schemas(), "variable", &json!({}));
        assert_eq!(form.missing_required(), ["vars"]);
        form.set_variables(
            "vars",
            &[
                VariableEntry::new("AcctId", "123456").with_description("account"),
                VariableEntry::new("", "dropped"),
            ],
        )
        .unwrap();
        let rows = form.variables("vars").unwrap();
        assert_eq!(
            rows,
            [VariableEntry::new("My_AcctId", "123456").with_description("account")]
        );
        assert!(form.missing_required().is_empty());
        let params = form.into_parameters().to_plain();
        assert_eq!(
            params,
            json!({ "vars": "My_AcctId=123456", "varDescriptions": "My_AcctId:account" })
        );
    }

    #[test]
    fn unknown_kind_has_no_fields() {
        let form = ParamForm::open(&SchemaSet::new(), "api", &json!({ "url": "/x" }));
        assert!(form.fields().is_empty());
        assert_eq!(form.into_parameters(), ValueNode::empty_branch());
    }
}
