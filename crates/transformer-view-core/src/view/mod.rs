//! View adapter
//!
//! [`TransformPipeline`] applies transformers to view data;
//! [`TransformerView`] is the variable bag a controller fills in.

pub mod config;
pub mod pipeline;
pub mod vars;


pub use config::{PipelineConfig, RenderOptions};
pub use pipeline::TransformPipeline;
pub use vars::{SerializeSelection, SpecialVar, TransformerView};
