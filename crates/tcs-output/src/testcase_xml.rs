//! `<testcases>` XML export.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use quick_xml::Writer;
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use tracing::info;

use tcs_model::{CaseDocument, ComponentNode, Section, StepNode};

pub const ROOT_ELEMENT: &str = "testcases";

/// `test_cases_<date>.xml`.
pub fn default_file_name(date: NaiveDate) -> String {
    format!("test_cases_{}.xml", date.format("%Y-%m-%d"))
}

/// Writes every case to `writer` and hands the writer back.
pub fn write_testcases<W: Write>(writer: W, cases: &[CaseDocument]) -> Result<W> {
    let mut xml = Writer::new_with_indent(writer, b' ', 2);
    xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    xml.write_event(Event::Start(BytesStart::new(ROOT_ELEMENT)))?;
    for case in cases {
        write_case(&mut xml, case).with_context(|| format!("write case {}", case.id))?;
    }
    xml.write_event(Event::End(BytesEnd::new(ROOT_ELEMENT)))?;
    Ok(xml.into_inner())
}

pub fn testcases_xml(cases: &[CaseDocument]) -> Result<String> {
    let bytes = write_testcases(Vec::new(), cases)?;
    String::from_utf8(bytes).context("XML output is not UTF-8")
}

/// Writes the export file, creating parent directories as needed.
pub fn write_testcases_file(path: &Path, cases: &[CaseDocument]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut writer = write_testcases(BufWriter::new(file), cases)?;
    writer
        .flush()
        .with_context(|| format!("write {}", path.display()))?;
    info!(path = %path.display(), cases = cases.len(), "wrote test case XML");
    Ok(())
}

fn write_case<W: Write>(xml: &mut Writer<W>, case: &CaseDocument) -> Result<()> {
    let mut element = BytesStart::new("testcase");
    element.push_attribute(("id", case.id.as_str()));
    element.push_attribute(("name", case.name.as_str()));
    xml.write_event(Event::Start(element))?;
    for section in Section::ALL {
        write_section(xml, section, case.section(section))?;
    }
    xml.write_event(Event::End(BytesEnd::new("testcase")))?;
    Ok(())
}

fn write_section<W: Write>(xml: &mut Writer<W>, section: Section, steps: &[StepNode]) -> Result<()> {
    let container = section.as_str();
    if steps.is_empty() {
        xml.write_event(Event::Empty(BytesStart::new(container)))?;
        return Ok(());
    }
    xml.write_event(Event::Start(BytesStart::new(container)))?;
    for (idx, step) in steps.iter().enumerate() {
        let index = format!("{}", idx + 1);
        let mut item = BytesStart::new(section.item_tag());
        item.push_attribute(("index", index.as_str()));
        item.push_attribute(("name", step.name.as_str()));
        if step.components.is_empty() {
            xml.write_event(Event::Empty(item))?;
            continue;
        }
        xml.write_event(Event::Start(item))?;
        for component in &step.components {
            write_component(xml, component)?;
        }
        xml.write_event(Event::End(BytesEnd::new(section.item_tag())))?;
    }
    xml.write_event(Event::End(BytesEnd::new(container)))?;
    Ok(())
}

fn write_component<W: Write>(xml: &mut Writer<W>, component: &ComponentNode) -> Result<()> {
    let params = serde_json::to_string(&component.parameters.to_plain())
        .with_context(|| format!("serialize parameters of {}", component.id))?;
    let mut element = BytesStart::new("component");
    element.push_attribute(("type", component.kind.as_str()));
    element.push_attribute(("name", component.display_name.as_str()));
    xml.write_event(Event::Start(element))?;
    xml.write_event(Event::Start(BytesStart::new("params")))?;
    xml.write_event(Event::Text(BytesText::from_escaped(partial_escape(&params))))?;
    xml.write_event(Event::End(BytesEnd::new("params")))?;
    xml.write_event(Event::End(BytesEnd::new("component")))?;
    Ok(())
}
