//! Case files on disk: one case or an array of cases, in interchange JSON.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use tcs_model::CaseDocument;

#[derive(Deserialize)]
#[serde(untagged)]
enum CaseFile {
    Many(Vec<CaseDocument>),
    One(Box<CaseDocument>),
}

pub fn parse_cases(text: &str) -> Result<Vec<CaseDocument>> {
    let file: CaseFile = serde_json::from_str(text).context("parse case JSON")?;
    Ok(match file {
        CaseFile::Many(cases) => cases,
        CaseFile::One(case) => vec![*case],
    })
}

pub fn load_cases(path: &Path) -> Result<Vec<CaseDocument>> {
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    parse_cases(&text).with_context(|| format!("load {}", path.display()))
}

/// Cases from every file, in argument order.
pub fn load_all(paths: &[impl AsRef<Path>]) -> Result<Vec<CaseDocument>> {
    let mut cases = Vec::new();
    for path in paths {
        cases.extend(load_cases(path.as_ref())?);
    }
    Ok(cases)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_single_case_or_array() {
        let one = parse_cases(r#"{ "id": "TC1", "name": "Login" }"#).unwrap();
        assert_eq!(one.len(), 1);
        let many = parse_cases(r#"[{ "id": "TC1", "name": "A" }, { "id": "TC2", "name": "B" }]"#)
            .unwrap();
        assert_eq!(many[1].id.as_str(), "TC2");
        assert!(parse_cases(r#"{ "name": "no id" }"#).is_err());
    }
}
