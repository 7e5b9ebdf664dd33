//! Transformer registration system.
//!
//! The registry maps identifiers to the types an application knows about.
//! Transformers are registered as factories so every resolution gets a
//! fresh instance; other known types are registered as opaque entries so
//! that naming one of them as a transformer is reported as a capability
//! mismatch rather than a missing type.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::transformer::{Transformer, TransformerDefinition};

/// Produces a new transformer instance
pub type TransformerFactory = Arc<dyn Fn() -> Arc<dyn Transformer> + Send + Sync>;

/// What an identifier refers to
#[derive(Clone)]
pub enum TypeEntry {
    /// A type with the transformer capability
    Transformer(TransformerFactory),
    /// A known type without it (entities, serializers, ...)
    Opaque { kind: String },
}

impl TypeEntry {
    /// Whether the entry provides the transformer capability
    pub fn is_transformer(&self) -> bool {
        matches!(self, TypeEntry::Transformer(_))
    }
}

impl fmt::Debug for TypeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeEntry::Transformer(_) => write!(f, "Transformer"),
            TypeEntry::Opaque { kind } => f.debug_struct("Opaque").field("kind", kind).finish(),
        }
    }
}

/// Registry of known types, built at startup.
#[derive(Debug, Clone, Default)]
pub struct TransformerRegistry {
    entries: HashMap<String, TypeEntry>,
}

impl TransformerRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a transformer type constructed through `Default`.
    pub fn register<T>(&mut self, id: impl Into<String>) -> &mut Self
    where
        T: Transformer + Default + 'static,
    {
        self.register_factory(id, || Arc::new(T::default()) as Arc<dyn Transformer>)
    }

    /// Register a transformer factory.
    pub fn register_factory<F>(&mut self, id: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> Arc<dyn Transformer> + Send + Sync + 'static,
    {
        let id = id.into();
        if self.entries.contains_key(&id) {
            tracing::warn!(id = %id, "Replacing registered type");
        }
        self.entries.insert(id, TypeEntry::Transformer(Arc::new(factory)));
        self
    }

    /// Register a declaratively defined transformer.
    pub fn register_definition(
        &mut self,
        id: impl Into<String>,
        definition: TransformerDefinition,
    ) -> Result<&mut Self> {
        let id = id.into();
        let transformer = definition.into_transformer(id.clone())?;
        Ok(self.register_factory(id, move || {
            Arc::new(transformer.clone()) as Arc<dyn Transformer>
        }))
    }

    /// Register a known type that is not a transformer.
    pub fn register_opaque(&mut self, id: impl Into<String>, kind: impl Into<String>) -> &mut Self {
        self.entries.insert(id.into(), TypeEntry::Opaque { kind: kind.into() });
        self
    }

    /// Check whether an identifier names any known type.
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Look up an entry.
    pub fn get(&self, id: &str) -> Option<&TypeEntry> {
        self.entries.get(id)
    }

    /// Create a transformer for an identifier, checking it exists and has
    /// the transformer capability.
    pub fn instantiate(&self, id: &str) -> Result<Arc<dyn Transformer>> {
        match self.entries.get(id) {
            None => Err(Error::InvalidTransformerReference {
                reference: id.to_string(),
            }),
            Some(TypeEntry::Opaque { .. }) => Err(Error::CapabilityMismatch {
                reference: id.to_string(),
            }),
            Some(TypeEntry::Transformer(factory)) => Ok(factory()),
        }
    }

    /// Identifiers of all registered transformers, sorted.
    pub fn transformer_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_transformer())
            .map(|(id, _)| id.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Check if anything is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get count of registered types.
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Build a registry from declarative definitions and opaque type names.
pub fn build_registry<D, O>(definitions: D, opaque_types: O) -> Result<TransformerRegistry>
where
    D: IntoIterator<Item = (String, TransformerDefinition)>,
    O: IntoIterator<Item = String>,
{
    let mut registry = TransformerRegistry::new();

    for (id, definition) in definitions {
        registry.register_definition(id, definition)?;
    }
    for id in opaque_types {
        registry.register_opaque(id, "type");
    }

    tracing::info!(
        "Built transformer registry with {} types ({} transformers)",
        registry.len(),
        registry.transformer_ids().len()
    );

    Ok(registry)
}

