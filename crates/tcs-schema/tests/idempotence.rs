//! Re-synthesizing a synthesized tree from its plain form changes nothing.

use proptest::prelude::*;
use serde_json::{Value, json};
use tcs_schema::{SchemaSet, synthesize};

fn schemas() -> SchemaSet {
    SchemaSet::from_json(&json!({
        "api": [
            { "name": "rTpl", "type": "template-select", "options": [
                { "value": "@\\soap\\Payment.xml", "label": "Payment" }
            ]},
            { "name": "url", "type": "input", "required": true },
            { "name": "method", "type": "combo", "options": ["GET", "POST"] },
            { "name": "rReq", "type": "json-tree", "isRequest": true, "defaultValue": {
                "header": { "version": { "type": "string", "value": "1.0", "isDefault": true } },
                "status": { "type": "number", "value": 1, "isDefault": true },
                "active": { "type": "boolean", "value": "true" }
            }},
            { "name": "rRsp", "type": "json-tree", "isResponse": true, "defaultValue": {
                "resultCode": { "type": "string", "value": 0, "validation": "equals", "isDefault": true },
                "data": {
                    "subscriberId": { "type": "string", "value": "", "validation": "notEmpty" },
                    "createdAt": { "type": "date", "value": "" }
                }
            }}
        ],
        "variable": [{ "name": "vars", "type": "variable-list" }],
        "comment": [{ "name": "content", "type": "textarea" }]
    }))
}

fn key_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec![
        "rTpl", "url", "rReq", "rRsp", "vars", "varDescriptions", "header", "status",
        "active", "resultCode", "data", "subscriberId", "timeout", "0", "type", "value",
        "saveAs", "validation",
    ])
    .prop_map(str::to_string)
}

fn json_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|n| json!(n)),
        (-1.0e6..1.0e6f64).prop_map(|n| json!(n)),
        "[a-zA-Z0-9=;:_ ${}.]{0,12}".prop_map(Value::String),
        prop::sample::select(vec!["string", "number", "boolean", "equals", "My_Id"])
            .prop_map(|text| Value::String(text.to_string())),
    ];
    leaf.prop_recursive(3, 24, 5, |inner| {
        prop_oneof![
            prop::collection::vec((key_strategy(), inner.clone()), 0..5)
                .prop_map(|pairs| Value::Object(pairs.into_iter().collect())),
            prop::collection::vec(inner, 0..3).prop_map(Value::Array),
        ]
    })
}

fn kind_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["api", "variable", "comment", "unknown"])
}

proptest! {
    #[test]
    fn synthesis_is_idempotent(kind in kind_strategy(), prior in json_strategy()) {
        let schemas = schemas();
        let once = synthesize(&schemas, kind, &prior);
        let twice = synthesize(&schemas, kind, &once.to_plain());
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn synthesis_yields_a_branch(kind in kind_strategy(), prior in json_strategy()) {
        prop_assert!(synthesize(&schemas(), kind, &prior).is_branch());
    }
}

#[test]
fn leaf_shaped_prior_resynthesizes_the_same() {
    let prior = json!({
        "rRsp": { "data": { "subscriberId": {
            "type": "string", "value": "", "validation": "equals", "saveAs": "My_Id"
        } } }
    });
    let once = synthesize(&schemas(), "api", &prior);
    let twice = synthesize(&schemas(), "api", &once.to_plain());
    assert_eq!(twice, once);
    assert_eq!(once.leaf("rRsp.data.subscriberId").unwrap().save_as(), None);
}

#[test]
fn failed_schema_fetch_leaves_every_kind_unconfigured() {
    let empty = SchemaSet::new();
    for kind in ["api", "variable", "restful", ""] {
        let tree = synthesize(&empty, kind, &json!({ "url": "/x" }));
        assert!(tree.as_branch().is_some_and(|branch| branch.is_empty()));
    }
}
