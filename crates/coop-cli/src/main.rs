//! Cooperative consolidation CLI.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use tracing::level_filters::LevelFilter;

use coop_cli::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use coop_cli::commands::{
    run_append, run_clean, run_create, run_edit, run_finalize, run_inspect, run_label, run_merge,
    run_plan, run_rating,
};
use coop_cli::logging::{LogConfig, LogFormat, init_logging};
use coop_cli::summary::print_summary;
use coop_cli::types::CommandOutcome;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match &cli.command {
        Command::Merge(args) => report(run_merge(args)),
        Command::Create(args) => report(run_create(args)),
        Command::Append(args) => report(run_append(args)),
        Command::Label(args) => report(run_label(args)),
        Command::Clean(args) => report(run_clean(args)),
        Command::Finalize(args) => report(run_finalize(args)),
        Command::Edit(args) => report(run_edit(args)),
        Command::Run(args) => report(run_plan(args)),
        Command::Rating(args) => {
            run_rating(args);
            0
        }
        Command::Inspect(args) => match run_inspect(args) {
            Ok(()) => 0,
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
    };
    std::process::exit(exit_code);
}

fn report(result: anyhow::Result<CommandOutcome>) -> i32 {
    match result {
        Ok(outcome) => {
            print_summary(&outcome);
            if outcome.has_errors() { 1 } else { 0 }
        }
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
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
