//! Builds a component's editable parameter tree from its schema and a prior
//! serialized value.
//!
//! Synthesis is total: a missing schema yields an empty Branch, and prior
//! values of the wrong shape are replaced by the field's default. Output fed
//! back through [`ValueNode::to_plain`] synthesizes to the same tree.
//!
//! Priors come in two forms. Persisted parameters are plain JSON and are read
//! with [`synthesize`]. The form editor and pasted drafts carry annotated
//! leaves (`{"type", "value", "saveAs", ...}`), read with
//! [`synthesize_annotated`], which keeps their validation and bindings.

use std::collections::HashSet;

use serde_json::{Map, Value};
use tracing::debug;

use tcs_model::{Branch, Leaf, LeafType, Scalar, ValueNode};

use crate::field::{FieldKind, FieldSchema, SchemaSet};
use crate::variables::{self, DEFAULT_DESCRIPTIONS_FIELD};

/// How prior objects shaped like leaves are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorForm {
    /// Every object is a Branch.
    Plain,
    /// Objects that parse as annotated leaves are leaves.
    Annotated,
}

/// Parameter tree for `kind`, merging a plain `prior` over the schema's
/// defaults.
pub fn synthesize(schemas: &SchemaSet, kind: &str, prior: &Value) -> ValueNode {
    synthesize_with(schemas, kind, prior, PriorForm::Plain)
}

/// [`synthesize`] for a prior that may hold annotated leaves.
pub fn synthesize_annotated(schemas: &SchemaSet, kind: &str, prior: &Value) -> ValueNode {
    synthesize_with(schemas, kind, prior, PriorForm::Annotated)
}

fn synthesize_with(schemas: &SchemaSet, kind: &str, prior: &Value, form: PriorForm) -> ValueNode {
    match schemas.fields(kind) {
        Some(fields) => synthesize_fields(fields, prior, form),
        None => {
            debug!(kind, "no parameter schema for component kind");
            ValueNode::empty_branch()
        }
    }
}

/// Same as [`synthesize`] for an already resolved field list.
pub fn synthesize_fields(fields: &[FieldSchema], prior: &Value, form: PriorForm) -> ValueNode {
    let empty = Map::new();
    let prior = match prior {
        Value::Object(map) => map,
        Value::Null => &empty,
        _ => {
            debug!("prior parameters are not an object; using defaults");
            &empty
        }
    };

    let mut branch = Branch::new();
    let mut consumed: HashSet<&str> = HashSet::new();
    for field in fields {
        consumed.insert(field.name.as_str());
        let value = prior.get(&field.name);
        match &field.kind {
            FieldKind::Input
            | FieldKind::Textarea
            | FieldKind::Combo { .. }
            | FieldKind::TemplateSelect { .. } => {
                branch.insert(field.name.clone(), text_leaf(&field.name, value, form).into());
            }
            FieldKind::VariableList => {
                consumed.insert(DEFAULT_DESCRIPTIONS_FIELD);
                let (vars, descriptions) = variables::normalize(
                    &prior_text(value, form),
                    &prior_text(prior.get(DEFAULT_DESCRIPTIONS_FIELD), form),
                );
                branch.insert(
                    field.name.clone(),
                    Leaf::typed(LeafType::String, vars).into(),
                );
                branch.insert(
                    DEFAULT_DESCRIPTIONS_FIELD.to_string(),
                    Leaf::typed(LeafType::String, descriptions).into(),
                );
            }
            FieldKind::JsonTree { default_value, .. } => {
                branch.insert(field.name.clone(), merge_node(default_value, value, form));
            }
        }
    }

    for (key, value) in prior {
        if !consumed.contains(key.as_str()) && !branch.contains_key(key) {
            branch.insert(key.clone(), node_from_prior(value, form));
        }
    }
    ValueNode::Branch(branch)
}

/// Scalar held by a prior leaf; annotated leaves count only when `form`
/// allows them.
fn prior_scalar(value: &Value, form: PriorForm) -> Option<Scalar> {
    Scalar::from_json(value).or_else(|| match annotated(value, form)? {
        ValueNode::Leaf(leaf) => Some(leaf.value),
        ValueNode::Branch(_) => None,
    })
}

fn annotated(value: &Value, form: PriorForm) -> Option<ValueNode> {
    match form {
        PriorForm::Plain => None,
        PriorForm::Annotated => ValueNode::from_json(value).ok(),
    }
}

fn prior_text(value: Option<&Value>, form: PriorForm) -> String {
    value
        .and_then(|value| prior_scalar(value, form))
        .map(|scalar| scalar.as_text().into_owned())
        .unwrap_or_default()
}

fn text_leaf(name: &str, value: Option<&Value>, form: PriorForm) -> Leaf {
    let scalar = match value.map(|value| (value, prior_scalar(value, form))) {
        Some((_, Some(scalar))) => LeafType::String.coerce(scalar),
        Some((value, None)) => {
            debug!(field = name, %value, "structured value in text field; using default");
            Scalar::default()
        }
        None => Scalar::default(),
    };
    Leaf::typed(LeafType::String, scalar)
}

/// Overlays a prior value onto an annotated default.
///
/// Leaves take the prior value coerced to their declared type and keep the
/// default's metadata unless the prior itself is an annotated leaf. Branches
/// merge key by key; prior keys the default lacks are appended.
fn merge_node(default: &ValueNode, prior: Option<&Value>, form: PriorForm) -> ValueNode {
    match (default, prior) {
        (ValueNode::Leaf(leaf), None) => ValueNode::Leaf(coerced(leaf)),
        (ValueNode::Leaf(leaf), Some(value)) => ValueNode::Leaf(merge_leaf(leaf, value, form)),
        (ValueNode::Branch(branch), Some(Value::Object(map))) => {
            ValueNode::Branch(merge_branch(branch, map, form))
        }
        (ValueNode::Branch(branch), _) => {
            ValueNode::Branch(merge_branch(branch, &Map::new(), form))
        }
    }
}

fn merge_branch(default: &Branch, prior: &Map<String, Value>, form: PriorForm) -> Branch {
    let mut merged: Branch = default
        .iter()
        .map(|(key, node)| (key.to_string(), merge_node(node, prior.get(key), form)))
        .collect();
    for (key, value) in prior {
        if !default.contains_key(key) {
            merged.insert(key.clone(), node_from_prior(value, form));
        }
    }
    merged
}

fn merge_leaf(default: &Leaf, value: &Value, form: PriorForm) -> Leaf {
    let mut leaf = default.clone();
    if let Some(scalar) = Scalar::from_json(value) {
        leaf.value = default.leaf_type.coerce(scalar);
        return leaf;
    }
    match annotated(value, form) {
        Some(ValueNode::Leaf(annotated)) => {
            leaf.value = default.leaf_type.coerce(annotated.value.clone());
            leaf.validation = annotated.validation;
            leaf.set_save_as(annotated.save_as().map(str::to_string));
        }
        _ => {
            debug!(%value, "structured value in typed leaf; using default");
            leaf.value = default.leaf_type.coerce(default.value.clone());
        }
    }
    leaf
}

fn coerced(leaf: &Leaf) -> Leaf {
    let mut leaf = leaf.clone();
    leaf.value = leaf.leaf_type.coerce(leaf.value.clone());
    leaf
}

fn node_from_prior(value: &Value, form: PriorForm) -> ValueNode {
    annotated(value, form).unwrap_or_else(|| ValueNode::from_plain(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tcs_model::ValidationRule;

    fn rest_schema() -> SchemaSet {
        SchemaSet::from_json(&json!({
            "restful": [
                { "name": "url", "type": "input", "required": true },
                { "name": "method", "type": "combo", "options": ["GET", "POST"] },
                { "name": "rRsp", "type": "json-tree", "isResponse": true, "defaultValue": {
                    "code": { "type": "number", "value": 200, "validation": "equals", "isDefault": true },
                    "data": {
                        "id": { "type": "string", "value": "", "validation": "notEmpty", "saveAs": "" }
                    }
                }}
            ],
            "variable": [{ "name": "vars", "type": "variable-list" }]
        }))
    }

    #[test]
    fn missing_schema_yields_empty_branch() {
        let tree = synthesize(&SchemaSet::new(), "restful", &json!({ "url": "/x" }));
        assert_eq!(tree, ValueNode::empty_branch());
    }

    #[test]
    fn defaults_fill_absent_fields() {
        let tree = synthesize(&rest_schema(), "restful", &json!({}));
        assert_eq!(tree.leaf("url").unwrap().value, Scalar::from(""));
        let code = tree.leaf("rRsp.code").unwrap();
        assert_eq!(code.value, Scalar::from(200_i64));
        assert_eq!(code.validation, ValidationRule::Equals);
        assert!(code.is_default);
        assert_eq!(tree.leaf("rRsp.data.id").unwrap().save_as(), None);
    }

    #[test]
    fn prior_values_are_coerced_and_keep_default_meta() {
        let tree = synthesize(
            &rest_schema(),
            "restful",
            &json!({ "url": 42, "rRsp": { "code": "201", "data": { "id": "abc", "extra": true } } }),
        );
        assert_eq!(tree.leaf("url").unwrap().value, Scalar::from("42"));
        let code = tree.leaf("rRsp.code").unwrap();
        assert_eq!(code.value, Scalar::from(201_i64));
        assert_eq!(code.validation, ValidationRule::Equals);
        assert_eq!(
            tree.leaf("rRsp.data.extra").unwrap().leaf_type,
            LeafType::Boolean
        );
        let keys: Vec<&str> = tree
            .get("rRsp.data")
            .and_then(ValueNode::as_branch)
            .unwrap()
            .keys()
            .collect();
        assert_eq!(keys, ["id", "extra"]);
    }

    #[test]
    fn annotated_prior_leaf_keeps_its_binding() {
        let tree = synthesize_annotated(
            &rest_schema(),
            "restful",
            &json!({ "rRsp": { "data": { "id": { "type": "string", "value": "", "saveAs": "My_Id" } } } }),
        );
        assert_eq!(tree.leaf("rRsp.data.id").unwrap().save_as(), Some("My_Id"));
    }

    #[test]
    fn wrongly_shaped_prior_falls_back_to_defaults() {
        let tree = synthesize(
            &rest_schema(),
            "restful",
            &json!({ "url": { "nested": 1 }, "rRsp": "flat" }),
        );
        assert_eq!(tree.leaf("url").unwrap().value, Scalar::from(""));
        assert!(tree.leaf("rRsp.code").is_some());

        let tree = synthesize(&rest_schema(), "restful", &json!(["not", "an", "object"]));
        assert!(tree.leaf("rRsp.data.id").is_some());
    }

    #[test]
    fn variable_list_writes_sibling_descriptions() {
        let tree = synthesize(
            &rest_schema(),
            "variable",
            &json!({ "vars": "Acct=1;My_Cycle=202501", "varDescriptions": "Acct:account" }),
        );
        assert_eq!(
            tree.leaf("vars").unwrap().value,
            Scalar::from("My_Acct=1;My_Cycle=202501")
        );
        assert_eq!(
            tree.leaf("varDescriptions").unwrap().value,
            Scalar::from("My_Acct:account")
        );
        assert_eq!(tree.as_branch().unwrap().len(), 2);
    }

    #[test]
    fn annotated_prior_fills_text_fields() {
        let tree = synthesize_annotated(
            &rest_schema(),
            "restful",
            &json!({ "url": { "type": "string", "value": "/users" } }),
        );
        assert_eq!(tree.leaf("url").unwrap().value, Scalar::from("/users"));

        let tree = synthesize_annotated(
            &rest_schema(),
            "variable",
            &json!({ "vars": { "type": "string", "value": "A=1" } }),
        );
        assert_eq!(tree.leaf("vars").unwrap().value, Scalar::from("My_A=1"));
    }

    #[test]
    fn plain_prior_ignores_leaf_annotations() {
        let prior = json!({
            "url": { "type": "string", "value": "/users" },
            "rRsp": { "data": { "id": { "type": "string", "value": "", "saveAs": "My_Id" } } },
            "extra": { "type": "number", "value": 3 }
        });
        let tree = synthesize(&rest_schema(), "restful", &prior);
        assert_eq!(tree.leaf("url").unwrap().value, Scalar::from(""));
        assert_eq!(tree.leaf("rRsp.data.id").unwrap().save_as(), None);
        assert_eq!(tree.leaf("extra.value").unwrap().value, Scalar::from(3_i64));

        let twice = synthesize(&rest_schema(), "restful", &tree.to_plain());
        assert_eq!(twice, tree);
    }

    #[test]
    fn undeclared_prior_keys_are_kept() {
        let tree = synthesize(&rest_schema(), "restful", &json!({ "timeout": "30" }));
        assert_eq!(tree.leaf("timeout").unwrap().value, Scalar::from("30"));
    }

    #[test]
    fn resynthesis_is_stable() {
        let schemas = rest_schema();
        let once = synthesize(
            &schemas,
            "restful",
            &json!({ "method": "POST", "rRsp": { "code": "oops", "data": { "id": null } } }),
        );
        let twice = synthesize(&schemas, "restful", &once.to_plain());
        assert_eq!(twice, once);
    }
}
