//! Render command handler

use super::{is_yaml_path, load_view_data};
use crate::cli::RenderArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use std::fs;
use std::path::Path;
use transformer_view_core::{IncludeDirective, RenderOptions, TransformOverrides, TransformerRef};

/// Handle the render command
pub fn handle_render(args: RenderArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let timer = Timer::with_details("render", &args.document.display().to_string());
    output.info(&format!("Rendering {}", args.document.display()))?;

    if args.save_to.as_deref() == Some(args.document.as_path()) {
        return Err(Error::invalid_args("--save-to must not overwrite the input document"));
    }

    let (data, document_options) = load_view_data(&args.document)?;
    let options = apply_arguments(document_options, &args)?;
    tracing::debug!(options = ?options, "Effective render options");

    let pipeline = config.build_pipeline()?;
    let rendered = pipeline.render(&options, data)?.to_json();

    output.debug(&format!("Rendered in {:?}", timer.elapsed()))?;
    output.data(&rendered)?;

    if let Some(path) = &args.save_to {
        save_rendered(path, &rendered, config.output.pretty)?;
        output.success(&format!("✓ Output saved to {}", path.display()))?;
    }

    Ok(())
}

/// Command-line flags take precedence over the document's special variables.
///
/// `--transform-var` cannot be layered over a global `_transform` from the
/// document: the per-variable map would drop it for every other variable.
fn apply_arguments(mut options: RenderOptions, args: &RenderArgs) -> Result<RenderOptions> {
    if let Some(reference) = args.global_reference() {
        options = options.transform(reference);
    }
    if !args.transform_vars.is_empty() {
        if let TransformOverrides::Global(reference) = &options.transform {
            if *reference != TransformerRef::Infer {
                return Err(Error::invalid_args(format!(
                    "--transform-var cannot be combined with the document's global _transform ({}); \
                     use --transform or --no-transform instead",
                    reference
                )));
            }
        }
    }
    for (variable, reference) in &args.transform_vars {
        options = options.transform_var(variable.clone(), reference.clone());
    }
    if let Some(key) = &args.resource_key {
        options = options.resource_key(key.clone());
    }
    if !args.includes.is_empty() {
        options = options.includes(IncludeDirective::parse(&args.includes.join(",")));
    }
    if let Some(kind) = args.serializer {
        options = options.serializer(kind);
    }
    Ok(options)
}

fn save_rendered(path: &Path, rendered: &serde_json::Value, pretty: bool) -> Result<()> {
    let content = if is_yaml_path(path) {
        serde_yaml::to_string(rendered)?
    } else if pretty {
        serde_json::to_string_pretty(rendered)?
    } else {
        serde_json::to_string(rendered)?
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}
