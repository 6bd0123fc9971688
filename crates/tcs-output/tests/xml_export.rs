//! XML export of case sets.

use chrono::NaiveDate;
use serde_json::json;

use tcs_model::{CaseDocument, ComponentNode, Leaf, LeafType, NodeId, StepNode, ValueNode};
use tcs_output::{default_file_name, testcases_xml, write_testcases_file};

fn id(value: &str) -> NodeId {
    NodeId::new(value).unwrap()
}

fn login_case() -> CaseDocument {
    let mut params = ValueNode::from_plain(&json!({ "method": "GET", "url": "/login" }));
    params.insert_at(
        &"rRsp.code".parse().unwrap(),
        Leaf::typed(LeafType::Number, 200_i64)
            .with_save_as("My_Code")
            .into(),
    );
    let mut case = CaseDocument::new(id("TC001"), "User login");
    case.sections.steps = vec![
        StepNode::new(id("s1"), "Open login page").with_component(ComponentNode::new(
            id("c1"),
            "api",
            "Fetch page",
            params,
        )),
        StepNode::new(id("s2"), "Idle"),
    ];
    case
}

#[test]
fn writes_sections_steps_and_params() {
    let xml = testcases_xml(&[login_case()]).unwrap();
    insta::assert_snapshot!(xml, @r#"
    <?xml version="1.0" encoding="UTF-8"?>
    <testcases>
      <testcase id="TC001" name="User login">
        <preconditions/>
        <steps>
          <step index="1" name="Open login page">
            <component type="api" name="Fetch page">
              <params>{"method":"GET","url":"/login","rRsp":{"code":200}}</params>
            </component>
          </step>
          <step index="2" name="Idle"/>
        </steps>
        <expectedResults/>
      </testcase>
    </testcases>
    "#);
}

#[test]
fn escapes_markup_in_names_and_params() {
    let mut case = CaseDocument::new(id("TC002"), "A & \"B\"");
    case.sections.expected_results = vec![StepNode::new(id("e1"), "Check <total>").with_component(
        ComponentNode::new(
            id("c1"),
            "database",
            "Query",
            ValueNode::from_plain(&json!({ "sql": "select * from T where a < 1 & b > 2" })),
        ),
    )];
    let xml = testcases_xml(&[case]).unwrap();
    assert!(xml.contains(r#"<testcase id="TC002" name="A &amp; &quot;B&quot;">"#));
    assert!(xml.contains(r#"<expectedResult index="1" name="Check &lt;total&gt;">"#));
    assert!(xml.contains(r#"<params>{"sql":"select * from T where a &lt; 1 &amp; b &gt; 2"}</params>"#));
}

#[test]
fn empty_case_set_has_empty_root() {
    let xml = testcases_xml(&[]).unwrap();
    assert!(xml.ends_with("<testcases>\n</testcases>"));
}

#[test]
fn writes_file_into_new_directory() {
    let dir = tempfile::tempdir().unwrap();
    let date = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
    let path = dir.path().join("out").join(default_file_name(date));
    write_testcases_file(&path, &[login_case()]).unwrap();
    assert!(path.ends_with("test_cases_2025-01-31.xml"));
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
}
