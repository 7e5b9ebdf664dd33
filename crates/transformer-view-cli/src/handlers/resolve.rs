//! Resolve command handler

use super::load_view_data;
use crate::cli::ResolveArgs;
use crate::config::Config;
use crate::error::Result;
use crate::logging::timing::Timer;
use crate::output::{OutputWriter, ResolutionRow};
use transformer_view_core::resolution::classify;
use transformer_view_core::{Shape, ViewData};

/// Handle the resolve command
///
/// Reports, per variable, the shape of the value and the transformer a
/// render would apply, without running any transformation.
pub fn handle_resolve(args: ResolveArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::with_details("resolve", &args.document.display().to_string());
    output.info(&format!("Resolving transformers for {}", args.document.display()))?;

    let (data, options) = load_view_data(&args.document)?;
    let pipeline = config.build_pipeline()?;
    let resolutions = pipeline.resolve_all(&options, &data)?;

    let rows: Vec<ResolutionRow> = resolutions
        .into_iter()
        .map(|(variable, resolution)| {
            let value = match (&data, variable.as_deref()) {
                (ViewData::Single(value), _) => Some(value),
                (_, Some(name)) => data.get(name),
                (_, None) => None,
            };
            ResolutionRow {
                shape: value.map(classify).unwrap_or(Shape::Unsupported),
                variable,
                resolution,
            }
        })
        .collect();

    tracing::debug!(variables = rows.len(), "Resolved view variables");
    output.section("Transformer resolution")?;
    output.resolution_report(&rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_reports_invalid_reference() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("view.json");
        std::fs::write(
            &path,
            r#"{"post": {"@type": "App\\Model\\Entity\\Post", "id": 1}, "_transform": "App\\Foo"}"#,
        )
        .unwrap();

        let mut output = OutputWriter::with_writer(
            OutputFormat::Json,
            false,
            true,
            0,
            Box::new(std::io::sink()),
        );
        let err = handle_resolve(ResolveArgs { document: path }, &Config::default(), &mut output)
            .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_resolve_missing_document() {
        let mut output = OutputWriter::with_writer(
            OutputFormat::Json,
            false,
            true,
            0,
            Box::new(std::io::sink()),
        );
        let err = handle_resolve(
            ResolveArgs {
                document: PathBuf::from("/nonexistent/view.json"),
            },
            &Config::default(),
            &mut output,
        )
        .unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
