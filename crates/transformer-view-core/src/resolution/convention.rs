//! Convention based transformer lookup
//!
//! When no transformer is configured for a value, its identifier is derived
//! from the entity type name: `App\Model\Entity\Post` becomes
//! `App\Model\Transformer\PostTransformer`. The mapping is a pluggable
//! [`NamingStrategy`]; [`NamespaceConvention`] is the default.

use crate::types::ViewValue;
use serde::{Deserialize, Serialize};

use super::registry::TransformerRegistry;

/// Maps an entity type name to a candidate transformer identifier
pub trait NamingStrategy: Send + Sync {
    fn candidate(&self, entity_type: &str) -> String;
}

impl<F> NamingStrategy for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn candidate(&self, entity_type: &str) -> String {
        self(entity_type)
    }
}

/// Namespace segment substitution plus a fixed suffix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamespaceConvention {
    /// Segment that marks entity types
    pub entity_segment: String,
    /// Segment substituted for it
    pub transformer_segment: String,
    /// Appended to the substituted name
    pub suffix: String,
}

impl Default for NamespaceConvention {
    fn default() -> Self {
        Self {
            entity_segment: "\\Model\\Entity\\".to_string(),
            transformer_segment: "\\Model\\Transformer\\".to_string(),
            suffix: "Transformer".to_string(),
        }
    }
}

impl NamingStrategy for NamespaceConvention {
    fn candidate(&self, entity_type: &str) -> String {
        let mut name = if self.entity_segment.is_empty() {
            entity_type.to_string()
        } else {
            entity_type.replace(&self.entity_segment, &self.transformer_segment)
        };
        name.push_str(&self.suffix);
        name
    }
}

/// Type name of the entity that stands for the whole value
///
/// A list is represented by its first element, a cursor by its declared
/// type (falling back to its first row) and an entity by itself.
pub fn representative_type(value: &ViewValue) -> Option<String> {
    match value {
        ViewValue::Entity(entity) => Some(entity.entity_type().to_string()),
        ViewValue::List(items) => match items.first() {
            Some(ViewValue::Entity(entity)) => Some(entity.entity_type().to_string()),
            _ => None,
        },
        ViewValue::Cursor(cursor) => cursor
            .entity_type()
            .map(str::to_string)
            .or_else(|| cursor.first().map(|e| e.entity_type().to_string())),
        ViewValue::Plain(_) => None,
    }
}

/// Infers transformer identifiers from entity types
pub struct ConventionalLookup<'a> {
    registry: &'a TransformerRegistry,
    naming: &'a dyn NamingStrategy,
}

impl<'a> ConventionalLookup<'a> {
    pub fn new(registry: &'a TransformerRegistry, naming: &'a dyn NamingStrategy) -> Self {
        Self { registry, naming }
    }

    /// Candidate identifier for a value, whether or not it is registered
    pub fn candidate(&self, value: &ViewValue) -> Option<String> {
        representative_type(value).map(|entity_type| self.naming.candidate(&entity_type))
    }

    /// Registered identifier for a value, if the convention finds one
    pub fn infer(&self, value: &ViewValue) -> Option<String> {
        self.candidate(value)
            .filter(|candidate| self.registry.contains(candidate))
    }
}
