//! Rescanning whole cases.

use proptest::prelude::*;
use serde_json::json;
use tcs_model::{CaseDocument, ComponentNode, MetaUpdate, NodeId, StepNode};
use tcs_schema::{ParamForm, SchemaSet, VariableEntry};
use tcs_vars::{VariableRegistry, rescan};

fn billing_case() -> CaseDocument {
    serde_json::from_value(json!({
        "id": "hist-1",
        "name": "Monthly bill",
        "preconditions": [{
            "id": "hp1",
            "name": "Prepare account",
            "components": [
                { "id": "hpc2", "type": "variable", "name": "Set variables",
                  "params": { "vars": "My_AcctId=123456;My_BillCycle=202501",
                              "varDescriptions": "My_AcctId:Account under test" } },
                { "id": "hpc4", "type": "api", "name": "Create subscriber",
                  "params": { "url": "${Env.SoapUrl}", "rRsp": {
                      "resultCode": { "type": "string", "value": "0", "validation": "equals" },
                      "data": { "subscriberId": { "type": "string", "value": "", "saveAs": "My_SubId" } }
                  } } }
            ]
        }],
        "steps": [{
            "id": "hs1",
            "name": "Query",
            "components": [
                { "id": "hc1", "type": "restful", "name": "Get user",
                  "params": { "rRsp": { "data": { "id": { "type": "string", "value": "", "saveAs": "My_UserId" } } } } },
                { "id": "hc2", "type": "database", "name": "Check",
                  "params": { "sql": "select * from T where ID=${My_AcctId}" } }
            ]
        }],
        "expectedResults": [{
            "id": "he1",
            "name": "Verify",
            "components": [
                { "id": "hec1", "type": "api", "name": "Query subscriber",
                  "params": { "rRsp": { "data": { "subscriberId": { "type": "string", "value": "", "saveAs": "My_SubId" } } } } }
            ]
        }]
    }))
    .unwrap()
}

#[test]
fn form_edited_variables_keep_descriptions() {
    let schemas = SchemaSet::from_json(&json!({
        "variable": [{ "name": "vars", "type": "variable-list", "descriptionsField": "notes" }]
    }));
    let mut form = ParamForm::open(&schemas, "variable", &json!({}));
    form.set_variables(
        "vars",
        &[VariableEntry::new("Tenant", "0").with_description("tenant under test")],
    )
    .unwrap();
    let component = ComponentNode::new(
        NodeId::new("c1").unwrap(),
        "variable",
        "Set variables",
        form.into_parameters(),
    );
    let mut case = CaseDocument::new(NodeId::new("TC1").unwrap(), "Tenant");
    case.sections.steps = vec![StepNode::new(NodeId::new("s1").unwrap(), "Seed").with_component(component)];

    let symbols = rescan(&case);
    assert_eq!(symbols.len(), 1);
    assert_eq!(symbols[0].name, "My_Tenant");
    assert_eq!(symbols[0].description, "tenant under test");
}

#[test]
fn walks_sections_in_order_with_descriptions() {
    let symbols = rescan(&billing_case());
    let rows: Vec<(&str, &str)> = symbols
        .iter()
        .map(|symbol| (symbol.name.as_str(), symbol.description.as_str()))
        .collect();
    assert_eq!(
        rows,
        [
            ("My_AcctId", "Account under test"),
            ("My_BillCycle", ""),
            ("My_SubId", "SOAP response field data.subscriberId"),
            ("My_UserId", "REST response field data.id"),
        ]
    );
}

#[test]
fn cleared_binding_disappears_on_rescan() {
    let mut case = billing_case();
    let mut registry = VariableRegistry::scan(&case);
    assert!(registry.contains("My_UserId"));

    case.sections.steps[0].components[0]
        .parameters
        .set_meta("rRsp.data.id", MetaUpdate::SaveAs(None));
    registry.rescan(&case);
    assert!(!registry.contains("My_UserId"));
    assert_eq!(registry.len(), 3);
}

#[test]
fn suggestions_follow_the_open_binding() {
    let registry = VariableRegistry::scan(&billing_case());
    let text = "ACCT_ID|${my_ac";
    let names: Vec<&str> = registry
        .suggest(text, text.len())
        .iter()
        .map(|symbol| symbol.name.as_str())
        .collect();
    assert_eq!(names, ["My_AcctId"]);
    assert!(registry.suggest("${My_AcctId}", 12).is_empty());
}

proptest! {
    #[test]
    fn duplicate_bindings_yield_one_symbol(names in prop::collection::vec("My_[A-C]", 1..8)) {
        let components: Vec<_> = names
            .iter()
            .enumerate()
            .map(|(idx, name)| json!({
                "id": format!("c{idx}"),
                "type": "restful",
                "name": "Call",
                "params": { "rRsp": { "v": { "type": "string", "value": "", "saveAs": name } } }
            }))
            .collect();
        let case: CaseDocument = serde_json::from_value(json!({
            "id": "p",
            "name": "prop",
            "steps": [{ "id": "s", "name": "s", "components": components }]
        }))
        .unwrap();

        let symbols = rescan(&case);
        let mut expected: Vec<&str> = Vec::new();
        for name in &names {
            if !expected.contains(&name.as_str()) {
                expected.push(name);
            }
        }
        let got: Vec<&str> = symbols.iter().map(|symbol| symbol.name.as_str()).collect();
        prop_assert_eq!(got, expected);
    }
}
