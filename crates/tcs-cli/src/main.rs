//! Test Case Studio CLI.

use clap::{ColorChoice, Parser};
use std::io::{self, IsTerminal};
use tcs_catalog::CatalogError;
use tcs_cli::library::Library;
use tcs_cli::logging::{LogConfig, LogFormat, init_logging};
use tcs_cli::settings::Settings;
use tcs_edit::EditError;
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;
mod summary;
mod types;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{
    run_export, run_generate, run_schema, run_search, run_template, run_vars,
};
use crate::summary::{print_catalog, print_export, print_form};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match run(&cli).await {
        Ok(()) => 0,
        Err(error) => {
            report(&error);
            1
        }
    };
    std::process::exit(exit_code);
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let settings = Settings::load(cli.config.as_deref())?;
    match &cli.command {
        Command::Export(args) => print_export(&run_export(args, &settings)?),
        Command::Vars(args) => run_vars(args)?,
        Command::Schema(args) => {
            let library = Library::open(&settings, cli.catalog.as_deref()).await?;
            print_form(&run_schema(args, &library.catalog)?, args.all);
        }
        Command::Search(args) => {
            let library = Library::open(&settings, cli.catalog.as_deref()).await?;
            run_search(args, &settings, &library).await?;
        }
        Command::Generate(args) => {
            let library = Library::open(&settings, cli.catalog.as_deref()).await?;
            print_export(&run_generate(args, &settings, &library).await?);
        }
        Command::Template(args) => {
            let library = Library::open(&settings, cli.catalog.as_deref()).await?;
            run_template(args, &settings, &library).await?;
        }
        Command::Presets => {
            let library = Library::open(&settings, cli.catalog.as_deref()).await?;
            print_catalog(&library.catalog);
        }
    }
    Ok(())
}

fn report(error: &anyhow::Error) {
    eprintln!("error: {error:#}");
    let hint = error
        .downcast_ref::<CatalogError>()
        .and_then(CatalogError::suggestion)
        .or_else(|| error.downcast_ref::<EditError>().and_then(EditError::suggestion));
    if let Some(hint) = hint {
        eprintln!("hint: {hint}");
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
