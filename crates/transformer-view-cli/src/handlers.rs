//! Command handlers for CLI subcommands
//!
//! This module contains the implementation logic for each CLI subcommand.

mod config;
mod render;
mod resolve;

pub use config::handle_config;
pub use render::handle_render;
pub use resolve::handle_resolve;

use crate::document::{load_document, ViewDocument};
use crate::error::Result;
use std::path::Path;
use transformer_view_core::{RenderOptions, ViewData};

/// Load a document and split it into the data to render and its render options
fn load_view_data(path: &Path) -> Result<(ViewData, RenderOptions)> {
    Ok(match load_document(path)? {
        ViewDocument::View(view) => (view.data_to_serialize(), view.options().clone()),
        ViewDocument::Bare(value) => (ViewData::Single(value), RenderOptions::new()),
    })
}

fn is_yaml_path(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s.eq_ignore_ascii_case("yaml") || s.eq_ignore_ascii_case("yml"))
        .unwrap_or(false)
}
