//! Transformation rules
//!
//! A [`Transformer`] turns one entity into a flat map of output fields and
//! may expose named relations that callers can request as includes.
//!
//! - [`fields`] - declarative field selecting transformer and its serde form
//! - [`builder`] - fluent builder for declarative transformers
//!
//! # Examples
//!
//! ```
//! use transformer_view_core::transformer::{from_fn, Transformer};
//! use transformer_view_core::{Entity, Record};
//! use serde_json::Map;
//!
//! let titles = from_fn("TitleTransformer", |entity: &dyn Entity| {
//!     let mut out = Map::new();
//!     out.insert("title".to_string(), entity.get("title").unwrap_or_default());
//!     Ok(out)
//! });
//!
//! let post = Record::new("App\\Model\\Entity\\Post").with_field("title", "A");
//! assert_eq!(titles.transform(&post).unwrap()["title"], "A");
//! ```
//!
//! Copyright (c) 2025 Transformer View Team
//! Licensed under the Apache-2.0 license

pub mod builder;
pub mod fields;

use serde_json::{Map, Value};

use crate::engine::{IncludeContext, Resource};
use crate::error::{Error, Result};
use crate::types::Entity;

pub use builder::FieldTransformerBuilder;
pub use fields::{FieldTransformer, IncludeDefinition, TransformerDefinition};

/// The transformation capability
pub trait Transformer: Send + Sync {
    /// Name used in diagnostics
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Produce the output fields for one entity
    fn transform(&self, entity: &dyn Entity) -> Result<Map<String, Value>>;

    /// Relations a caller may request
    fn available_includes(&self) -> Vec<String> {
        Vec::new()
    }

    /// Relations included whether requested or not
    fn default_includes(&self) -> Vec<String> {
        Vec::new()
    }

    /// Build the resource for one relation of `entity`.
    ///
    /// `Ok(None)` leaves the relation out of the output.
    fn include(
        &self,
        _entity: &dyn Entity,
        relation: &str,
        _context: &IncludeContext<'_>,
    ) -> Result<Option<Resource>> {
        Err(Error::UnknownInclude {
            relation: relation.to_string(),
            transformer: self.name().to_string(),
        })
    }
}

/// Transformer backed by a closure, without includes
pub struct FnTransformer<F> {
    name: String,
    func: F,
}

impl<F> Transformer for FnTransformer<F>
where
    F: Fn(&dyn Entity) -> Result<Map<String, Value>> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn transform(&self, entity: &dyn Entity) -> Result<Map<String, Value>> {
        (self.func)(entity)
    }
}

/// Wrap a closure as a transformer
pub fn from_fn<F>(name: impl Into<String>, func: F) -> FnTransformer<F>
where
    F: Fn(&dyn Entity) -> Result<Map<String, Value>> + Send + Sync,
{
    FnTransformer {
        name: name.into(),
        func,
    }
}
