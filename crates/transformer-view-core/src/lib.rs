//! Transformer View Core - JSON view adapter that runs entities through transformers
//!
//! A view hands over named variables (entities, lists, lazy queries, plain
//! data). Each variable is matched with a transformer, either explicitly or
//! by naming convention, transformed as an item or a collection, optionally
//! expanded with nested includes, and wrapped by a serializer.
//!
//! # Main Components
//!
//! - **Error Handling**: error types using `thiserror` and `anyhow`
//! - **Core Types**: entities, cursors, view values and transformer overrides
//! - **Resolution**: shape detection, convention lookup and the transformer registry
//! - **Engine**: item and collection jobs, include parsing, serializers
//! - **View**: the transform pipeline and a JSON view variable bag
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use transformer_view_core::{
//!     FieldTransformer, PipelineConfig, Record, RenderOptions, TransformPipeline,
//!     TransformerRegistry, ViewData,
//! };
//!
//! fn example() -> transformer_view_core::Result<()> {
//!     let mut registry = TransformerRegistry::new();
//!     let transformer = FieldTransformer::builder("PostTransformer").field("title").build()?;
//!     registry.register_factory("App\\Model\\Transformer\\PostTransformer", move || {
//!         Arc::new(transformer.clone()) as Arc<dyn transformer_view_core::Transformer>
//!     });
//!
//!     let pipeline = TransformPipeline::new(Arc::new(registry), PipelineConfig::default());
//!     let post = Record::new("App\\Model\\Entity\\Post")
//!         .with_field("id", 1)
//!         .with_field("title", "Hello");
//!
//!     let output = pipeline.render(&RenderOptions::new(), ViewData::named([("post", post)]))?;
//!     assert_eq!(output.to_json(), serde_json::json!({"post": {"title": "Hello"}}));
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

pub mod engine;
pub mod error;
pub mod resolution;
pub mod transformer;
pub mod types;
pub mod view;

// Re-export main types for convenience
pub use error::{Error, ErrorCategory, Result};
pub use types::{
    // Values handed over by a view
    Cursor, Entity, Query, Record, ResultSet, ViewData, ViewValue,

    // Override types
    TransformOverrides, TransformerRef,
};

pub use engine::{IncludeDirective, Manager, Resource, Serializer, SerializerKind};
pub use resolution::{
    NamespaceConvention, NamingStrategy, Resolution, Shape, TransformerRegistry,
    TransformerResolver,
};
pub use transformer::{FieldTransformer, Transformer, TransformerDefinition};
pub use view::{
    PipelineConfig, RenderOptions, SerializeSelection, SpecialVar, TransformPipeline,
    TransformerView,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
