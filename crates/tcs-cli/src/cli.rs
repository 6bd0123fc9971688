//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use tcs_catalog::SearchMethod;

#[derive(Parser)]
#[command(
    name = "tcs",
    version,
    about = "Test Case Studio - inspect, search and export test cases",
    long_about = "Work with schema-described test cases.\n\n\
                  Reads cases as JSON, resolves component parameter schemas and\n\
                  output variables, and exports case sets as <testcases> XML."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Settings file (TOML). Flags override its values.
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Case library fixture (JSON) serving options, presets and schemas.
    #[arg(long = "catalog", value_name = "PATH", global = true)]
    pub catalog: Option<PathBuf>,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Export case files as one <testcases> XML document.
    Export(ExportArgs),

    /// List the output variables each case defines.
    Vars(VarsArgs),

    /// Show the parameter form a component kind synthesizes.
    Schema(SchemaArgs),

    /// Search the historical case library by name.
    Search(SearchArgs),

    /// Generate cases from search results and export them.
    Generate(GenerateArgs),

    /// Derive an editable template from a historical case.
    Template(TemplateArgs),

    /// List case libraries, step presets and component presets.
    Presets,
}

#[derive(Parser)]
pub struct ExportArgs {
    /// Case files, each holding one case or an array of cases.
    #[arg(value_name = "CASE_FILE", required = true)]
    pub cases: Vec<PathBuf>,

    /// Output file (default: test_cases_<date>.xml in the output directory).
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Parser)]
pub struct VarsArgs {
    #[arg(value_name = "CASE_FILE")]
    pub case: PathBuf,

    /// Only variables whose name contains this text, ignoring case.
    #[arg(long = "filter", value_name = "TEXT")]
    pub filter: Option<String>,
}

#[derive(Parser)]
pub struct SchemaArgs {
    /// Component kind, e.g. `api` or `delayTime`.
    #[arg(value_name = "KIND")]
    pub kind: String,

    /// Prior parameters as JSON (default: the kind's default parameters).
    #[arg(long = "params", value_name = "JSON")]
    pub params: Option<String>,

    /// Include default leaves that are still empty.
    #[arg(long = "all")]
    pub all: bool,
}

/// Filters shared by library searches.
#[derive(Args)]
pub struct SearchFilter {
    /// Search text (required, matched against case names).
    #[arg(value_name = "TEXT")]
    pub text: String,

    /// Case library to search.
    #[arg(long = "library", value_name = "NAME")]
    pub library: Option<String>,

    /// Matching method.
    #[arg(long = "method", value_enum)]
    pub method: Option<SearchMethodArg>,
}

#[derive(Parser)]
pub struct SearchArgs {
    #[command(flatten)]
    pub filter: SearchFilter,

    /// Also write the matching cases as JSON.
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Parser)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub filter: SearchFilter,

    /// Output file (default: test_cases_<date>.xml in the output directory).
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Progress increment per tick, in percent.
    #[arg(long = "step", default_value_t = 10)]
    pub step: u8,

    /// Delay before each progress tick, in milliseconds.
    #[arg(long = "delay-ms", default_value_t = 300)]
    pub delay_ms: u64,
}

#[derive(Parser)]
pub struct TemplateArgs {
    #[command(flatten)]
    pub filter: SearchFilter,

    /// Which search hit to derive from, counting from 1.
    #[arg(long = "index", default_value_t = 1)]
    pub index: usize,

    /// Name for the template (default: the case name plus " (template)").
    #[arg(long = "name", value_name = "NAME")]
    pub name: Option<String>,

    /// Write the template case as JSON.
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SearchMethodArg {
    Keyword,
    Semantic,
}

impl From<SearchMethodArg> for SearchMethod {
    fn from(arg: SearchMethodArg) -> Self {
        match arg {
            SearchMethodArg::Keyword => SearchMethod::Keyword,
            SearchMethodArg::Semantic => SearchMethod::Semantic,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
