//! Pipeline configuration and per-call render options

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::engine::{IncludeDirective, Serializer, SerializerKind, DEFAULT_RECURSION_LIMIT};
use crate::resolution::{NamespaceConvention, NamingStrategy};
use crate::types::{TransformOverrides, TransformerRef};

/// Immutable settings shared by every render call
#[derive(Clone)]
pub struct PipelineConfig {
    /// Serializer used when a call does not pick one
    pub serializer: Arc<dyn Serializer>,
    /// Entity type to transformer identifier mapping
    pub naming: Arc<dyn NamingStrategy>,
    /// Maximum include depth
    pub recursion_limit: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            serializer: SerializerKind::default().build(),
            naming: Arc::new(NamespaceConvention::default()),
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a built-in serializer
    pub fn with_serializer_kind(mut self, kind: SerializerKind) -> Self {
        self.serializer = kind.build();
        self
    }

    /// Use a custom serializer
    pub fn with_serializer(mut self, serializer: Arc<dyn Serializer>) -> Self {
        self.serializer = serializer;
        self
    }

    /// Use a custom naming strategy
    pub fn with_naming<N: NamingStrategy + 'static>(mut self, naming: N) -> Self {
        self.naming = Arc::new(naming);
        self
    }

    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }
}

impl fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("serializer", &self.serializer.name())
            .field("recursion_limit", &self.recursion_limit)
            .finish_non_exhaustive()
    }
}

/// Options for one render call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Transformer overrides, global or per variable
    pub transform: TransformOverrides,
    /// Resource key attached to every job
    pub resource_key: Option<String>,
    /// Requested includes
    pub includes: Option<IncludeDirective>,
    /// Serializer for this call only
    pub serializer: Option<SerializerKind>,
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one reference to every variable
    pub fn transform(mut self, reference: TransformerRef) -> Self {
        self.transform = TransformOverrides::Global(reference);
        self
    }

    /// Set the reference for one variable, replacing any global reference
    pub fn transform_var(mut self, variable: impl Into<String>, reference: TransformerRef) -> Self {
        let variable = variable.into();
        match &mut self.transform {
            TransformOverrides::PerVariable(map) => {
                map.insert(variable, reference);
            }
            TransformOverrides::Global(_) => {
                let mut map = indexmap::IndexMap::new();
                map.insert(variable, reference);
                self.transform = TransformOverrides::PerVariable(map);
            }
        }
        self
    }

    pub fn resource_key(mut self, key: impl Into<String>) -> Self {
        self.resource_key = Some(key.into());
        self
    }

    pub fn includes(mut self, includes: impl Into<IncludeDirective>) -> Self {
        self.includes = Some(includes.into());
        self
    }

    pub fn serializer(mut self, kind: SerializerKind) -> Self {
        self.serializer = Some(kind);
        self
    }
}
