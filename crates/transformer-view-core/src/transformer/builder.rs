//! Builder for declarative field transformers
//!
//! This module provides a fluent builder API for constructing
//! [`FieldTransformer`]s with validation.
//!
//! Copyright (c) 2025 Transformer View Team
//! Licensed under the Apache-2.0 license

use indexmap::IndexMap;
use serde_json::{Map, Value};

use super::fields::{FieldTransformer, IncludeDefinition};
use crate::error::{Error, Result};
use crate::types::TransformerRef;

/// Builder for creating field transformers
pub struct FieldTransformerBuilder {
    name: String,
    fields: Vec<String>,
    renames: IndexMap<String, String>,
    constants: Map<String, Value>,
    includes: IndexMap<String, IncludeDefinition>,
    default_includes: Vec<String>,
}

impl FieldTransformerBuilder {
    /// Create a new builder
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            renames: IndexMap::new(),
            constants: Map::new(),
            includes: IndexMap::new(),
            default_includes: Vec::new(),
        }
    }

    /// Emit a field
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.fields.push(name.into());
        self
    }

    /// Emit several fields
    pub fn fields<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.extend(names.into_iter().map(Into::into));
        self
    }

    /// Emit `from` under the name `to`
    pub fn rename(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.renames.insert(from.into(), to.into());
        self
    }

    /// Add a fixed output value
    pub fn constant(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.constants.insert(key.into(), value.into());
        self
    }

    /// Offer a relation as an include
    pub fn include(self, relation: impl Into<String>, transformer: TransformerRef) -> Self {
        self.include_with(
            relation,
            IncludeDefinition {
                transformer,
                ..IncludeDefinition::default()
            },
        )
    }

    /// Offer an include with full control over its definition
    pub fn include_with(mut self, name: impl Into<String>, definition: IncludeDefinition) -> Self {
        self.includes.insert(name.into(), definition);
        self
    }

    /// Always emit an include
    pub fn default_include(mut self, name: impl Into<String>) -> Self {
        self.default_includes.push(name.into());
        self
    }

    /// Build the transformer
    pub fn build(self) -> Result<FieldTransformer> {
        if let Some(missing) = self
            .default_includes
            .iter()
            .find(|name| !self.includes.contains_key(*name))
        {
            return Err(Error::configuration(format!(
                "default include '{}' of {} is not a declared include",
                missing, self.name
            )));
        }

        if self.fields.iter().any(|f| f.is_empty()) {
            return Err(Error::configuration(format!(
                "empty field name in {}",
                self.name
            )));
        }

        Ok(FieldTransformer {
            name: self.name,
            fields: self.fields,
            renames: self.renames,
            constants: self.constants,
            includes: self.includes,
            default_includes: self.default_includes,
        })
    }
}
