//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API,
//! providing a type-safe and well-documented command interface.

use clap::{Parser, Subcommand, ValueEnum};
use is_terminal::IsTerminal;
use std::path::PathBuf;
use transformer_view_core::{SerializerKind, TransformerRef};

/// Transformer View CLI - render view documents through transformers
///
/// Loads a view document (JSON or YAML), resolves a transformer for every
/// variable, and prints the transformed output.
#[derive(Parser, Debug)]
#[command(
    name = "transformer-view",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "TRANSFORMER_VIEW_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results (defaults to the configured format)
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Transform a view document and print the result
    Render(RenderArgs),

    /// Show which transformer each variable of a document resolves to
    Resolve(ResolveArgs),

    /// Manage configuration files and settings
    Config(ConfigArgs),
}

/// Arguments for the render command
#[derive(Parser, Debug)]
pub struct RenderArgs {
    /// Path to the view document (JSON or YAML)
    #[arg(value_name = "DOCUMENT")]
    pub document: PathBuf,

    /// Transformer applied to every variable
    #[arg(long, value_name = "ID", conflicts_with = "no_transform")]
    pub transform: Option<String>,

    /// Disable transformation for every variable
    #[arg(long)]
    pub no_transform: bool,

    /// Transformer for one variable: NAME=ID, or NAME=false to disable.
    ///
    /// Entries are merged into the document's per-variable `_transform` map and
    /// win over it; variables missing from the map are inferred. Rejected when
    /// the document sets a global `_transform`.
    #[arg(
        long = "transform-var",
        value_name = "NAME=ID",
        value_parser = parse_transform_var,
        conflicts_with_all = ["transform", "no_transform"]
    )]
    pub transform_vars: Vec<(String, TransformerRef)>,

    /// Resource key passed to every transformation
    #[arg(long)]
    pub resource_key: Option<String>,

    /// Relations to include, comma separated (may be repeated)
    #[arg(short, long = "include", value_name = "LIST")]
    pub includes: Vec<String>,

    /// Serializer for this render: array, data or keyed
    #[arg(short, long)]
    pub serializer: Option<SerializerKind>,

    /// Output file path (stdout if not specified)
    #[arg(long = "save-to", value_name = "OUTPUT_FILE")]
    pub save_to: Option<PathBuf>,
}

impl RenderArgs {
    /// The global transformer reference requested on the command line
    pub fn global_reference(&self) -> Option<TransformerRef> {
        if self.no_transform {
            Some(TransformerRef::Disabled)
        } else {
            self.transform.clone().map(TransformerRef::Named)
        }
    }
}

/// Arguments for the resolve command
#[derive(Parser, Debug)]
pub struct ResolveArgs {
    /// Path to the view document (JSON or YAML)
    #[arg(value_name = "DOCUMENT")]
    pub document: PathBuf,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write a default configuration file
    Init(ConfigInitArgs),

    /// Show the effective configuration
    Show(ConfigShowArgs),
}

/// Arguments for config init
#[derive(Parser, Debug)]
pub struct ConfigInitArgs {
    /// Where to write the file (.transformer-view.yaml if not specified)
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Force overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

/// Arguments for config show
#[derive(Parser, Debug)]
pub struct ConfigShowArgs {
    /// Show configuration in specified format
    #[arg(short, long, value_enum, default_value = "yaml")]
    pub format: ConfigFormat,
}

/// Configuration file formats
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    /// TOML format
    Toml,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Human,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Pretty-printed JSON output
    JsonPretty,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}

/// Parse `NAME=ID`, `NAME=false` or `NAME=` (infer)
pub fn parse_transform_var(raw: &str) -> Result<(String, TransformerRef), String> {
    let (name, reference) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=ID, got '{}'", raw))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing variable name in '{}'", raw));
    }

    let reference = match reference.trim() {
        "false" => TransformerRef::Disabled,
        "" | "null" => TransformerRef::Infer,
        id => TransformerRef::named(id),
    };
    Ok((name.to_string(), reference))
}
