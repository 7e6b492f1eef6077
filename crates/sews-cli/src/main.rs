//! SEWS command-line interface.

use clap::{ColorChoice, Parser};
use sews_cli::config::{OptionOverrides, resolve_options};
use sews_cli::logging::{LogConfig, LogFormat, init_logging};
use sews_model::ShortfallPolicy;
use std::io::{self, IsTerminal};
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;
mod summary;
mod types;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg, PipelineArgs, ShortfallArg};
use crate::commands::{run_etl, run_features, run_predict, run_train, run_validate_external};
use crate::summary::{
    print_assessment, print_etl_summary, print_external_summary, print_train_summary,
};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let options = match resolve_options(cli.pipeline.config.as_deref(), &overrides(&cli.pipeline))
    {
        Ok(options) => options,
        Err(error) => {
            eprintln!("error: {error:#}");
            std::process::exit(1);
        }
    };
    let outcome = match &cli.command {
        Command::Etl(args) => run_etl(args, &options).map(|result| print_etl_summary(&result)),
        Command::Train(args) => {
            run_train(args, &options).map(|result| print_train_summary(&result))
        }
        Command::ValidateExternal(args) => {
            run_validate_external(args, &options).map(|result| print_external_summary(&result))
        }
        Command::Predict(args) => {
            run_predict(args, &options).map(|result| print_assessment(&result))
        }
        Command::Features => run_features(),
    };
    let exit_code = match outcome {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn overrides(args: &PipelineArgs) -> OptionOverrides {
    OptionOverrides {
        seed: args.seed,
        horizon_hours: args.horizon_hours,
        test_fraction: args.test_fraction,
        negative_ratio: args.negative_ratio,
        shortfall: args.shortfall.map(|policy| match policy {
            ShortfallArg::Clamp => ShortfallPolicy::Clamp,
            ShortfallArg::Fail => ShortfallPolicy::Fail,
        }),
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
    config.log_data = cli.log_data;
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
