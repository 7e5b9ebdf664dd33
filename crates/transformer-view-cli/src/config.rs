//! Configuration management for the CLI
//!
//! This module handles loading configuration from:
//! - Default values
//! - Configuration files (YAML/JSON/TOML)
//! - Environment variables (logging only, see [`crate::logging`])
//!
//! Besides output and logging settings, the file declares the transformer
//! registry the pipeline renders with.

use crate::cli::OutputFormat;
use crate::error::{Error, Result};
use clap::ValueEnum;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use transformer_view_core::engine::DEFAULT_RECURSION_LIMIT;
use transformer_view_core::resolution::build_registry;
use transformer_view_core::{
    NamespaceConvention, PipelineConfig, SerializerKind, TransformPipeline, TransformerDefinition,
};

/// File name written by `config init` when no path is given
pub const DEFAULT_CONFIG_FILE: &str = ".transformer-view.yaml";

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Serializer used when a render does not pick one
    pub serializer: SerializerKind,

    /// Maximum include depth
    pub recursion_limit: usize,

    /// Entity type to transformer naming convention
    pub naming: NamespaceConvention,

    /// Declarative transformers keyed by identifier
    pub transformers: IndexMap<String, TransformerDefinition>,

    /// Known identifiers that are not transformers (entity classes and the like)
    pub opaque_types: Vec<String>,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LogSettings,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format (human, json, json-pretty, yaml)
    pub format: String,

    /// Use colored output by default
    pub color: bool,

    /// Pretty-print files written with `--save-to`
    pub pretty: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Log level used when no -v flag is given (trace, debug, info, warn, error)
    pub level: Option<String>,

    /// Log format (compact, full, json)
    pub format: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            serializer: SerializerKind::default(),
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            naming: NamespaceConvention::default(),
            transformers: IndexMap::new(),
            opaque_types: Vec::new(),
            output: OutputConfig::default(),
            logging: LogSettings::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "human".to_string(),
            color: true,
            pretty: true,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;

        let config = match extension(path).as_deref() {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
            Some("toml") => toml::from_str(&content)?,
            _ => serde_json::from_str(&content)?,
        };

        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        for path in Self::default_config_paths() {
            if path.exists() {
                match Self::from_file(&path) {
                    Ok(config) => {
                        tracing::debug!(path = %path.display(), "Loaded configuration");
                        return Ok(config);
                    }
                    Err(e) => {
                        eprintln!("Warning: Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        // Return default config if no config file found
        Ok(Self::default())
    }

    /// Load configuration from a specific file or default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        let config = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::load()?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Get default configuration file paths to check
    fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from(DEFAULT_CONFIG_FILE),
            PathBuf::from(".transformer-view.yml"),
            PathBuf::from(".transformer-view.json"),
            PathBuf::from(".transformer-view.toml"),
        ];

        if let Some(dir) = Self::user_config_dir() {
            paths.push(dir.join("config.yaml"));
            paths.push(dir.join("config.json"));
            paths.push(dir.join("config.toml"));
        }

        paths
    }

    /// Per-user configuration directory
    pub fn user_config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("transformer-view"))
    }

    /// Check settings that serde cannot check on its own
    pub fn validate(&self) -> Result<()> {
        if self.recursion_limit == 0 {
            return Err(Error::config("recursion_limit must be at least 1"));
        }
        if self.output_format().is_none() {
            return Err(Error::config(format!(
                "unknown output format '{}', expected human, json, json-pretty or yaml",
                self.output.format
            )));
        }
        for id in &self.opaque_types {
            if self.transformers.contains_key(id) {
                return Err(Error::config(format!(
                    "'{}' is declared both as a transformer and as an opaque type",
                    id
                )));
            }
        }
        Ok(())
    }

    /// The configured default output format
    pub fn output_format(&self) -> Option<OutputFormat> {
        <OutputFormat as ValueEnum>::from_str(&self.output.format, true).ok()
    }

    /// Build the render pipeline this configuration describes
    pub fn build_pipeline(&self) -> Result<TransformPipeline> {
        let registry = build_registry(
            self.transformers
                .iter()
                .map(|(id, definition)| (id.clone(), definition.clone())),
            self.opaque_types.iter().cloned(),
        )?;

        let pipeline_config = PipelineConfig::new()
            .with_serializer_kind(self.serializer)
            .with_naming(self.naming.clone())
            .with_recursion_limit(self.recursion_limit);

        Ok(TransformPipeline::new(Arc::new(registry), pipeline_config))
    }

    /// Serialize to YAML, JSON or TOML text
    pub fn to_string_as(&self, format: &str) -> Result<String> {
        match format {
            "yaml" | "yml" => Ok(serde_yaml::to_string(self)?),
            "toml" => Ok(toml::to_string_pretty(self)?),
            "json" => Ok(serde_json::to_string_pretty(self)?),
            other => Err(Error::InvalidFormat {
                path: PathBuf::from(format!("<{}>", other)),
                expected: "yaml, json or toml".to_string(),
            }),
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let format = match extension(path).as_deref() {
            Some("yaml") | Some("yml") => "yaml",
            Some("toml") => "toml",
            _ => "json",
        };
        let content = self.to_string_as(format)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;
    use transformer_view_core::{Record, RenderOptions, ViewData, ViewValue};

    const YAML_CONFIG: &str = r#"
serializer: data
recursion_limit: 3
transformers:
  App\Model\Transformer\PostTransformer:
    fields: [id, title]
opaque_types:
  - App\Model\Entity\Post
output:
  format: json
"#;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.serializer, SerializerKind::Array);
        assert_eq!(config.recursion_limit, DEFAULT_RECURSION_LIMIT);
        assert_eq!(config.output_format(), Some(OutputFormat::Human));
    }

    #[test]
    fn test_from_yaml_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, YAML_CONFIG).unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.serializer, SerializerKind::Data);
        assert_eq!(config.recursion_limit, 3);
        assert_eq!(config.transformers.len(), 1);
        assert_eq!(config.output_format(), Some(OutputFormat::Json));
        // Unset sections keep their defaults
        assert_eq!(config.naming, NamespaceConvention::default());
        assert!(config.output.color);
    }

    #[test]
    fn test_missing_file() {
        let err = Config::from_file(Path::new("/nonexistent/config.yaml")).unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_save_and_reload_each_format() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.serializer = SerializerKind::Keyed;
        config.opaque_types.push("App\\Model\\Entity\\Post".to_string());

        for name in ["nested/config.yaml", "config.json", "config.toml"] {
            let path = dir.path().join(name);
            config.save(&path).unwrap();
            assert_eq!(Config::from_file(&path).unwrap(), config, "format of {}", name);
        }
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        let mut config = Config::default();
        config.recursion_limit = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = Config::default();
        config.output.format = "xml".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config
            .transformers
            .insert("X".to_string(), TransformerDefinition::default());
        config.opaque_types.push("X".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_build_pipeline_renders_with_declared_transformers() {
        let config: Config = serde_yaml::from_str(YAML_CONFIG).unwrap();
        let pipeline = config.build_pipeline().unwrap();

        let post = Record::new("App\\Model\\Entity\\Post")
            .with_field("id", 1)
            .with_field("title", "Hello")
            .with_field("draft", true);
        let output = pipeline
            .render(&RenderOptions::new(), ViewData::named([("post", ViewValue::from(post))]))
            .unwrap();

        assert_eq!(output.to_json(), json!({"post": {"data": {"id": 1, "title": "Hello"}}}));
    }

    #[test]
    fn test_unknown_extension_reads_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.conf");
        std::fs::write(&path, r#"{"serializer": "keyed"}"#).unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.serializer, SerializerKind::Keyed);
    }
}
