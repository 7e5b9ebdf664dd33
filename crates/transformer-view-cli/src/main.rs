//! Transformer View CLI - render view documents through transformers
//!
//! This is the main entry point for the `transformer-view` binary, providing
//! commands for rendering view documents, explaining transformer resolution
//! and managing configuration files.

mod cli;
mod config;
mod document;
mod error;
mod handlers;
mod logging;
mod output;

use cli::{Cli, Commands, OutputFormat};
use colored::control;
use config::Config;
use error::Result;
use logging::{timing::Timer, LoggingConfig};
use output::OutputWriter;
use std::process;
use tracing::instrument;

fn main() {
    // Parse command-line arguments
    let cli = Cli::parse_args();

    // Load configuration first so its logging and output settings apply
    let config = match Config::load_with_file(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => exit_with(&e, cli.use_color()),
    };

    let use_color = cli.use_color() && config.output.color;
    control::set_override(use_color);

    if let Err(e) = init_logging(&cli, &config) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match run(cli, &config) {
        Ok(()) => process::exit(0),
        Err(e) => exit_with(&e, use_color),
    }
}

fn exit_with(e: &error::Error, use_color: bool) -> ! {
    eprintln!("{}", error::format_error(e, use_color));

    if e.should_show_help() {
        eprintln!("\nFor more information, try '--help'");
    }

    process::exit(e.exit_code());
}

/// Main application logic
#[instrument(skip(cli, config), fields(command = ?cli.command))]
fn run(cli: Cli, config: &Config) -> Result<()> {
    let _timer = Timer::new("cli_execution");

    let format = cli
        .output
        .or_else(|| config.output_format())
        .unwrap_or(OutputFormat::Human);
    let mut output = OutputWriter::new(
        format,
        control::SHOULD_COLORIZE.should_colorize(),
        cli.quiet,
        cli.verbosity_level(),
    );

    tracing::info!(
        command = ?cli.command,
        verbosity = cli.verbosity_level(),
        "Executing command"
    );

    match cli.command {
        Commands::Render(args) => handlers::handle_render(args, config, &mut output),
        Commands::Resolve(args) => handlers::handle_resolve(args, config, &mut output),
        Commands::Config(args) => handlers::handle_config(args, config, &mut output),
    }
}

/// Initialize the logging system
fn init_logging(cli: &Cli, config: &Config) -> Result<()> {
    let verbosity = cli.verbosity_level();
    let mut logging_config = LoggingConfig::from_verbosity(verbosity);

    // File settings first, then environment overrides
    logging_config.merge_with_settings(&config.logging, verbosity);
    logging_config.merge_with_env();

    // If quiet mode, only log errors
    if cli.quiet {
        logging_config.level = "error".to_string();
        logging_config.console = false;
    }

    logging::init_logging(logging_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["transformer-view", "-vv", "resolve", "view.json"]);
        assert_eq!(cli.verbosity_level(), 2);

        let cli = Cli::parse_from(["transformer-view", "--quiet", "render", "view.json"]);
        assert_eq!(cli.verbosity_level(), 0);

        let cli = Cli::parse_from(["transformer-view", "-o", "yaml", "config", "show"]);
        assert_eq!(cli.output, Some(OutputFormat::Yaml));
    }
}
