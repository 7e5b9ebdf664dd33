//! Transform pipeline
//!
//! For every value handed over by a view: pick its override, classify its
//! shape, resolve its transformer, build an item or collection job and run
//! it through the serializer. Values without a transformer pass through
//! untouched. Any error aborts the whole call.

use indexmap::IndexMap;
use std::sync::Arc;
use tracing::{debug, instrument};

use super::config::{PipelineConfig, RenderOptions};
use crate::engine::{Manager, Resource};
use crate::error::{Error, Result};
use crate::resolution::{classify, Resolution, TransformerRegistry, TransformerResolver};
use crate::types::{ViewData, ViewValue};

/// Resolves and applies transformers to view data
#[derive(Debug, Clone)]
pub struct TransformPipeline {
    resolver: TransformerResolver,
    config: PipelineConfig,
}

impl TransformPipeline {
    /// Create a pipeline over a registry
    pub fn new(registry: Arc<TransformerRegistry>, config: PipelineConfig) -> Self {
        let resolver = TransformerResolver::new(registry, config.naming.clone());
        Self { resolver, config }
    }

    /// The resolver used for every value
    pub fn resolver(&self) -> &TransformerResolver {
        &self.resolver
    }

    /// The configuration this pipeline was built with
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Transform view data.
    ///
    /// Named data keeps its order and every untransformed sibling. A single
    /// value comes back as a single value; a selected one still picks up the
    /// override keyed by its name.
    #[instrument(skip_all, fields(resource_key = ?options.resource_key))]
    pub fn render(&self, options: &RenderOptions, data: ViewData) -> Result<ViewData> {
        let manager = self.manager(options);

        match data {
            ViewData::Single(value) => {
                Ok(ViewData::Single(self.transform_value(&manager, options, None, value)?))
            }
            ViewData::Selected(name, value) => {
                let transformed = self.transform_value(&manager, options, Some(&name), value)?;
                Ok(ViewData::Selected(name, transformed))
            }
            ViewData::Named(vars) => {
                let mut output = IndexMap::with_capacity(vars.len());
                for (name, value) in vars {
                    let transformed = self.transform_value(&manager, options, Some(&name), value)?;
                    output.insert(name, transformed);
                }
                Ok(ViewData::Named(output))
            }
        }
    }

    /// Transform one bare value
    pub fn render_value(&self, options: &RenderOptions, value: ViewValue) -> Result<ViewValue> {
        let manager = self.manager(options);
        self.transform_value(&manager, options, None, value)
    }

    /// Report, per variable, which transformer `render` would apply.
    ///
    /// Fails the same way `render` would for invalid references.
    pub fn resolve_all(
        &self,
        options: &RenderOptions,
        data: &ViewData,
    ) -> Result<Vec<(Option<String>, Resolution)>> {
        match data {
            ViewData::Single(value) => {
                let reference = options.transform.reference_for(None);
                Ok(vec![(None, self.resolver.explain(value, &reference)?)])
            }
            ViewData::Selected(name, value) => {
                let reference = options.transform.reference_for(Some(name));
                Ok(vec![(Some(name.clone()), self.resolver.explain(value, &reference)?)])
            }
            ViewData::Named(vars) => vars
                .iter()
                .map(|(name, value)| {
                    let reference = options.transform.reference_for(Some(name));
                    Ok((Some(name.clone()), self.resolver.explain(value, &reference)?))
                })
                .collect(),
        }
    }

    fn manager(&self, options: &RenderOptions) -> Manager<'_> {
        let serializer = options
            .serializer
            .map(|kind| kind.build())
            .unwrap_or_else(|| self.config.serializer.clone());

        let mut manager = Manager::new(&self.resolver, serializer)
            .with_recursion_limit(self.config.recursion_limit);
        if let Some(includes) = options.includes.as_ref().filter(|i| !i.is_empty()) {
            manager.parse_includes(includes);
        }
        manager
    }

    fn transform_value(
        &self,
        manager: &Manager<'_>,
        options: &RenderOptions,
        name: Option<&str>,
        value: ViewValue,
    ) -> Result<ViewValue> {
        let reference = options.transform.reference_for(name);
        let shape = classify(&value);
        debug!(variable = ?name, shape = %shape, reference = %reference, "Transforming variable");

        let resolved = match self.resolver.resolve(&value, &reference)? {
            Some(resolved) => resolved,
            None => return Ok(value),
        };

        let resource = Resource::for_value(&value, resolved.transformer, options.resource_key.as_deref())
            .map_err(|err| match err {
                Error::UnserializableVariable { variable: None } => Error::UnserializableVariable {
                    variable: name.map(str::to_string),
                },
                other => other,
            })?;

        debug!(variable = ?name, transformer = %resolved.id, kind = resource.kind(), "Running transformation");
        Ok(ViewValue::Plain(manager.create_data(&resource)?))
    }
}
