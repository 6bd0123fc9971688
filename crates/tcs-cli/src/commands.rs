use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use chrono::Local;
use serde_json::Value;
use tracing::{Instrument, info, info_span, warn};

use tcs_catalog::{Catalog, GenerationRun, SearchRequest, search_history};
use tcs_edit::TemplateDesk;
use tcs_model::CaseDocument;
use tcs_output::{default_file_name, write_testcases_file};
use tcs_schema::ParamForm;
use tcs_vars::VariableRegistry;

use tcs_cli::cases::{load_all, load_cases};
use tcs_cli::library::Library;
use tcs_cli::settings::Settings;

use crate::cli::{
    ExportArgs, GenerateArgs, SchemaArgs, SearchArgs, SearchFilter, TemplateArgs, VarsArgs,
};
use crate::summary::{print_cases, print_variables};
use crate::types::{CaseSummary, ExportResult};

pub fn run_export(args: &ExportArgs, settings: &Settings) -> Result<ExportResult> {
    let cases = load_all(&args.cases)?;
    export(&cases, args.output.as_deref(), settings)
}

pub fn run_vars(args: &VarsArgs) -> Result<()> {
    let cases = load_cases(&args.case)?;
    let filter = args.filter.as_deref().unwrap_or_default();
    for case in &cases {
        let registry = VariableRegistry::scan(case);
        print_variables(case, &registry.lookup(filter));
    }
    Ok(())
}

pub fn run_schema(args: &SchemaArgs, catalog: &Catalog) -> Result<ParamForm> {
    let prior = match &args.params {
        Some(text) => serde_json::from_str(text).context("parse --params JSON")?,
        None => Value::Null,
    };
    if catalog.schemas_loaded() && catalog.schemas().fields(&args.kind).is_none() {
        warn!(kind = %args.kind, "no parameter schema for component kind");
    }
    Ok(catalog.param_form(&args.kind, &prior))
}

pub async fn run_search(
    args: &SearchArgs,
    settings: &Settings,
    library: &Library,
) -> Result<Vec<CaseDocument>> {
    let cases = search(&args.filter, settings, library).await?;
    print_cases(&cases);
    if let Some(path) = &args.output {
        write_json(path, &cases)?;
        info!(path = %path.display(), cases = cases.len(), "wrote search results");
    }
    Ok(cases)
}

pub async fn run_template(
    args: &TemplateArgs,
    settings: &Settings,
    library: &Library,
) -> Result<CaseDocument> {
    let hits = search(&args.filter, settings, library).await?;
    let Some(index) = args.index.checked_sub(1) else {
        bail!("--index counts from 1");
    };
    let mut desk = TemplateDesk::new(hits);
    let session = desk.derive_template(index)?;
    if let Some(name) = &args.name {
        session.rename_case(name)?;
    }
    let template = desk.save()?.document.clone();
    print_cases(std::slice::from_ref(&template));
    if let Some(path) = &args.output {
        write_json(path, &template)?;
        info!(path = %path.display(), template = %template.id, "wrote template");
    }
    Ok(template)
}

pub async fn run_generate(
    args: &GenerateArgs,
    settings: &Settings,
    library: &Library,
) -> Result<ExportResult> {
    let seeds = search(&args.filter, settings, library).await?;
    if seeds.is_empty() {
        bail!("no historical cases match \"{}\"", args.filter.text.trim());
    }
    let run = GenerationRun::new(seeds)
        .with_step(args.step)
        .with_delay(Duration::from_millis(args.delay_ms));
    let generated = run
        .run(|percent| eprint!("\rGenerating cases... {percent:>3}%"))
        .await;
    eprintln!();
    export(&generated, args.output.as_deref(), settings)
}

async fn search(
    filter: &SearchFilter,
    settings: &Settings,
    library: &Library,
) -> Result<Vec<CaseDocument>> {
    let library_name = settings.case_library(filter.library.as_deref());
    if !library
        .catalog
        .library_options()
        .iter()
        .any(|option| option.value == library_name)
    {
        warn!(library = %library_name, "case library is not one of the known options");
    }
    let method = settings.search_method(filter.method.map(Into::into));
    let request = SearchRequest::new(library_name, method, &filter.text)?;
    let span = info_span!("search", library = %request.library, method = %method);
    Ok(search_history(&library.service, &request)
        .instrument(span)
        .await?)
}

fn export(
    cases: &[CaseDocument],
    output: Option<&Path>,
    settings: &Settings,
) -> Result<ExportResult> {
    let file_name = default_file_name(Local::now().date_naive());
    let output = settings.output_path(output, &file_name);
    write_testcases_file(&output, cases)?;
    let cases = cases
        .iter()
        .map(|case| CaseSummary::new(case, VariableRegistry::scan(case).len()))
        .collect();
    Ok(ExportResult { output, cases })
}

fn write_json<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create output directory {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(value).context("serialize cases")?;
    fs::write(path, json).with_context(|| format!("write {}", path.display()))
}
