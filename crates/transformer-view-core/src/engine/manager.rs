//! Transformation manager
//!
//! The manager runs resources through their transformers, expands the
//! requested includes scope by scope and hands the result to the
//! serializer.
//!
//! Copyright (c) 2025 Transformer View Team
//! Licensed under the Apache-2.0 license

use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::trace;

use super::includes::{IncludeDirective, IncludeParams, RequestedIncludes, DEFAULT_RECURSION_LIMIT};
use super::resource::Resource;
use super::serializer::Serializer;
use crate::error::Result;
use crate::resolution::{ResolvedTransformer, TransformerResolver};
use crate::transformer::Transformer;
use crate::types::{Entity, TransformerRef, ViewValue};

/// What an include implementation can see
pub struct IncludeContext<'a> {
    resolver: &'a TransformerResolver,
    path: &'a str,
    params: IncludeParams,
}

impl<'a> IncludeContext<'a> {
    /// Full dotted path of the include being built
    pub fn path(&self) -> &str {
        self.path
    }

    /// Parameters requested for this include
    pub fn params(&self) -> &IncludeParams {
        &self.params
    }

    /// Resolve a transformer for related data with the same rules as top-level values
    pub fn resolve(
        &self,
        value: &ViewValue,
        reference: &TransformerRef,
    ) -> Result<Option<ResolvedTransformer>> {
        self.resolver.resolve(value, reference)
    }

    /// Instantiate a transformer by identifier
    pub fn transformer(&self, id: &str) -> Result<Arc<dyn Transformer>> {
        self.resolver.instantiate(id)
    }
}

/// Runs transformation jobs for one render call
pub struct Manager<'a> {
    resolver: &'a TransformerResolver,
    serializer: Arc<dyn Serializer>,
    includes: RequestedIncludes,
    recursion_limit: usize,
}

impl<'a> Manager<'a> {
    /// Create a manager with no requested includes
    pub fn new(resolver: &'a TransformerResolver, serializer: Arc<dyn Serializer>) -> Self {
        Self {
            resolver,
            serializer,
            includes: RequestedIncludes::default(),
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }

    /// Limit include depth
    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }

    /// Parse the include directive shared by every resource of this call
    pub fn parse_includes(&mut self, directive: &IncludeDirective) -> &mut Self {
        self.includes = RequestedIncludes::parse(directive, self.recursion_limit);
        let paths: Vec<&str> = self.includes.paths().collect();
        trace!(includes = ?paths, "Parsed includes");
        self
    }

    /// Parsed includes
    pub fn requested_includes(&self) -> &RequestedIncludes {
        &self.includes
    }

    /// The serializer in use
    pub fn serializer(&self) -> &dyn Serializer {
        self.serializer.as_ref()
    }

    /// Transform and serialize a resource from the root scope
    pub fn create_data(&self, resource: &Resource) -> Result<Value> {
        self.serialize_resource(resource, None)
    }

    fn serialize_resource(&self, resource: &Resource, scope: Option<&str>) -> Result<Value> {
        match resource {
            Resource::Item {
                data,
                transformer,
                resource_key,
                meta,
            } => {
                let fields = self.transform_entity(data.as_ref(), transformer.as_ref(), scope)?;
                let mut output = self.serializer.item(resource_key.as_deref(), fields);
                merge_meta(&mut output, self.serializer.meta(meta));
                Ok(output)
            }
            Resource::Collection {
                data,
                transformer,
                resource_key,
                meta,
            } => {
                let items = data
                    .iter()
                    .map(|entity| {
                        self.transform_entity(entity.as_ref(), transformer.as_ref(), scope)
                            .map(Value::Object)
                    })
                    .collect::<Result<Vec<_>>>()?;
                let mut output = self.serializer.collection(resource_key.as_deref(), items);
                merge_meta(&mut output, self.serializer.meta(meta));
                Ok(output)
            }
            Resource::Null => Ok(self.serializer.null()),
            Resource::Primitive(value) => Ok(value.clone()),
        }
    }

    fn transform_entity(
        &self,
        entity: &dyn Entity,
        transformer: &dyn Transformer,
        scope: Option<&str>,
    ) -> Result<Map<String, Value>> {
        let mut fields = transformer.transform(entity)?;

        for relation in self.includes_for(transformer, scope) {
            let path = scoped(scope, &relation);
            let context = IncludeContext {
                resolver: self.resolver,
                path: &path,
                params: self.includes.params(&path).cloned().unwrap_or_default(),
            };

            if let Some(resource) = transformer.include(entity, &relation, &context)? {
                trace!(path = %path, kind = resource.kind(), "Including relation");
                let included = self.serialize_resource(&resource, Some(&path))?;
                fields.insert(relation, included);
            }
        }

        Ok(fields)
    }

    /// Default includes plus the available ones requested at this scope
    fn includes_for(&self, transformer: &dyn Transformer, scope: Option<&str>) -> Vec<String> {
        let depth = scope.map(|s| s.split('.').count()).unwrap_or(0);
        if depth >= self.recursion_limit {
            return Vec::new();
        }

        let mut includes = transformer.default_includes();
        for available in transformer.available_includes() {
            if !includes.contains(&available) && self.includes.is_requested(&scoped(scope, &available)) {
                includes.push(available);
            }
        }
        includes
    }
}

fn scoped(scope: Option<&str>, relation: &str) -> String {
    match scope {
        Some(scope) => format!("{}.{}", scope, relation),
        None => relation.to_string(),
    }
}

fn merge_meta(output: &mut Value, meta: Map<String, Value>) {
    if meta.is_empty() {
        return;
    }
    if let Value::Object(object) = output {
        object.extend(meta);
    }
}
