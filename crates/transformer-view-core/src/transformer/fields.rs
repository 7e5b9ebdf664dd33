//! Declarative field transformer
//!
//! A [`FieldTransformer`] selects, renames and augments entity fields and
//! exposes relations as includes. It is what configuration files describe
//! through [`TransformerDefinition`].
//!
//! Copyright (c) 2025 Transformer View Team
//! Licensed under the Apache-2.0 license

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::builder::FieldTransformerBuilder;
use super::Transformer;
use crate::engine::{IncludeContext, Resource};
use crate::error::{Error, Result};
use crate::types::{Entity, TransformerRef, ViewValue};

/// How one relation is included
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IncludeDefinition {
    /// Relation read from the entity, defaults to the include name
    pub relation: Option<String>,
    /// Transformer for the related value; `null` infers by convention
    pub transformer: TransformerRef,
    /// Resource key for the nested resource
    pub resource_key: Option<String>,
}

/// Serde form of a [`FieldTransformer`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransformerDefinition {
    /// Fields to emit, in order; empty emits every field
    pub fields: Vec<String>,
    /// Output names for fields
    pub rename: IndexMap<String, String>,
    /// Fixed values added to every output
    pub constants: Map<String, Value>,
    /// Includes this transformer offers
    pub includes: IndexMap<String, IncludeDefinition>,
    /// Includes emitted without being requested
    pub default_includes: Vec<String>,
}

impl TransformerDefinition {
    /// Build and validate the transformer this definition describes
    pub fn into_transformer(self, name: impl Into<String>) -> Result<FieldTransformer> {
        let mut builder = FieldTransformerBuilder::new(name)
            .fields(self.fields);
        for (from, to) in self.rename {
            builder = builder.rename(from, to);
        }
        for (key, value) in self.constants {
            builder = builder.constant(key, value);
        }
        for (include, definition) in self.includes {
            builder = builder.include_with(include, definition);
        }
        for include in self.default_includes {
            builder = builder.default_include(include);
        }
        builder.build()
    }
}

/// Field selecting transformer with relation includes
#[derive(Debug, Clone, PartialEq)]
pub struct FieldTransformer {
    pub(super) name: String,
    pub(super) fields: Vec<String>,
    pub(super) renames: IndexMap<String, String>,
    pub(super) constants: Map<String, Value>,
    pub(super) includes: IndexMap<String, IncludeDefinition>,
    pub(super) default_includes: Vec<String>,
}

impl FieldTransformer {
    /// A transformer that emits every field unchanged
    pub fn passthrough(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            renames: IndexMap::new(),
            constants: Map::new(),
            includes: IndexMap::new(),
            default_includes: Vec::new(),
        }
    }

    /// Start a builder
    pub fn builder(name: impl Into<String>) -> FieldTransformerBuilder {
        FieldTransformerBuilder::new(name)
    }

    fn output_name<'a>(&'a self, field: &'a str) -> &'a str {
        self.renames.get(field).map(String::as_str).unwrap_or(field)
    }
}

impl Transformer for FieldTransformer {
    fn name(&self) -> &str {
        &self.name
    }

    fn transform(&self, entity: &dyn Entity) -> Result<Map<String, Value>> {
        let mut output = Map::new();

        if self.fields.is_empty() {
            for field in entity.field_names() {
                let value = entity.get(&field).unwrap_or(Value::Null);
                output.insert(self.output_name(&field).to_string(), value);
            }
        } else {
            // Listed fields are always present, missing ones as null
            for field in &self.fields {
                let value = entity.get(field).unwrap_or(Value::Null);
                output.insert(self.output_name(field).to_string(), value);
            }
        }

        for (key, value) in &self.constants {
            output.insert(key.clone(), value.clone());
        }

        Ok(output)
    }

    fn available_includes(&self) -> Vec<String> {
        self.includes.keys().cloned().collect()
    }

    fn default_includes(&self) -> Vec<String> {
        self.default_includes.clone()
    }

    fn include(
        &self,
        entity: &dyn Entity,
        relation: &str,
        context: &IncludeContext<'_>,
    ) -> Result<Option<Resource>> {
        let definition = self.includes.get(relation).ok_or_else(|| Error::UnknownInclude {
            relation: relation.to_string(),
            transformer: self.name.clone(),
        })?;

        let source = definition.relation.as_deref().unwrap_or(relation);
        let value = match entity.related(source) {
            None | Some(ViewValue::Plain(Value::Null)) => return Ok(Some(Resource::Null)),
            Some(value) => value,
        };

        match context.resolve(&value, &definition.transformer)? {
            Some(resolved) => Resource::for_value(
                &value,
                resolved.transformer,
                definition.resource_key.as_deref(),
            )
            .map(Some),
            // Related data without a transformer is emitted as-is
            None => Ok(Some(Resource::Primitive(value.to_json()))),
        }
    }
}
