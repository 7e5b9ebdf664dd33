//! Configuration command handlers

use crate::cli::{ConfigAction, ConfigArgs, ConfigFormat, ConfigInitArgs, ConfigShowArgs};
use crate::config::{Config, DEFAULT_CONFIG_FILE};
use crate::error::Result;
use crate::output::OutputWriter;
use std::path::PathBuf;

/// Handle the config command
pub fn handle_config(args: ConfigArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    match args.action {
        ConfigAction::Init(init_args) => handle_config_init(init_args, output),
        ConfigAction::Show(show_args) => handle_config_show(show_args, config, output),
    }
}

/// Handle config init subcommand
fn handle_config_init(args: ConfigInitArgs, output: &mut OutputWriter) -> Result<()> {
    let path = args.path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    if path.exists() && !args.force {
        output.warning(&format!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        ))?;
        return Ok(());
    }

    Config::default().save(&path)?;
    output.success(&format!("✓ Created config at {}", path.display()))?;
    output.info("Declare transformers under `transformers` to start rendering.")?;
    Ok(())
}

/// Handle config show subcommand
fn handle_config_show(args: ConfigShowArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let format = match args.format {
        ConfigFormat::Toml => "toml",
        ConfigFormat::Json => "json",
        ConfigFormat::Yaml => "yaml",
    };
    let content = config.to_string_as(format)?;
    output.writeln(content.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use tempfile::TempDir;
    use transformer_view_core::SerializerKind;

    fn quiet_output() -> OutputWriter {
        OutputWriter::with_writer(OutputFormat::Human, false, true, 0, Box::new(std::io::sink()))
    }

    #[test]
    fn test_init_writes_default_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tv.yaml");

        handle_config_init(
            ConfigInitArgs {
                path: Some(path.clone()),
                force: false,
            },
            &mut quiet_output(),
        )
        .unwrap();

        assert_eq!(Config::from_file(&path).unwrap(), Config::default());
    }

    #[test]
    fn test_init_keeps_existing_without_force() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tv.json");
        std::fs::write(&path, r#"{"serializer": "data"}"#).unwrap();

        let init = |force| ConfigInitArgs {
            path: Some(path.clone()),
            force,
        };

        handle_config_init(init(false), &mut quiet_output()).unwrap();
        assert_eq!(Config::from_file(&path).unwrap().serializer, SerializerKind::Data);

        handle_config_init(init(true), &mut quiet_output()).unwrap();
        assert_eq!(Config::from_file(&path).unwrap().serializer, SerializerKind::Array);
    }

    #[test]
    fn test_show_every_format() {
        for format in [ConfigFormat::Toml, ConfigFormat::Json, ConfigFormat::Yaml] {
            handle_config_show(ConfigShowArgs { format }, &Config::default(), &mut quiet_output())
                .unwrap();
        }
    }
}
