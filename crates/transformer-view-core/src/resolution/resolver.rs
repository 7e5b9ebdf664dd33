//! Transformer resolution for a single value
//!
//! Resolution follows one rule set for every value:
//!
//! 1. `Disabled` short-circuits: the value is passed through.
//! 2. `Infer` asks the naming convention; no match also passes through.
//! 3. `Named` must exist and must be a transformer, otherwise the call fails.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::transformer::Transformer;
use crate::types::{TransformerRef, ViewValue};

use super::convention::{ConventionalLookup, NamingStrategy};
use super::registry::TransformerRegistry;

/// A transformer ready to be applied
#[derive(Clone)]
pub struct ResolvedTransformer {
    /// Registry identifier it was resolved from
    pub id: String,
    /// Fresh instance
    pub transformer: Arc<dyn Transformer>,
}

impl fmt::Debug for ResolvedTransformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedTransformer")
            .field("id", &self.id)
            .finish()
    }
}

/// Outcome of resolving a value, without the instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "transformer", rename_all = "snake_case")]
pub enum Resolution {
    /// The value will be transformed with this transformer
    Transformer(String),
    /// Transformation was explicitly disabled
    Disabled,
    /// No transformer was configured and the convention found none
    NoConvention,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Transformer(id) => write!(f, "{}", id),
            Resolution::Disabled => write!(f, "disabled (pass-through)"),
            Resolution::NoConvention => write!(f, "no transformer found (pass-through)"),
        }
    }
}

/// Resolves transformer references against a registry
#[derive(Clone)]
pub struct TransformerResolver {
    registry: Arc<TransformerRegistry>,
    naming: Arc<dyn NamingStrategy>,
}

impl TransformerResolver {
    pub fn new(registry: Arc<TransformerRegistry>, naming: Arc<dyn NamingStrategy>) -> Self {
        Self { registry, naming }
    }

    /// The registry used for lookups
    pub fn registry(&self) -> &TransformerRegistry {
        &self.registry
    }

    /// Convention lookup over this resolver's registry and naming strategy
    pub fn conventions(&self) -> ConventionalLookup<'_> {
        ConventionalLookup::new(&self.registry, self.naming.as_ref())
    }

    /// Resolve the transformer for a value.
    ///
    /// Returns `Ok(None)` when the value should pass through unchanged.
    pub fn resolve(
        &self,
        value: &ViewValue,
        reference: &TransformerRef,
    ) -> Result<Option<ResolvedTransformer>> {
        let id = match reference {
            TransformerRef::Disabled => {
                debug!("Transformation disabled, passing value through");
                return Ok(None);
            }
            TransformerRef::Infer => match self.conventions().infer(value) {
                Some(id) => {
                    debug!(transformer = %id, "Inferred transformer by convention");
                    id
                }
                None => {
                    debug!(
                        candidate = ?self.conventions().candidate(value),
                        "No conventional transformer, passing value through"
                    );
                    return Ok(None);
                }
            },
            TransformerRef::Named(id) => id.clone(),
        };

        let transformer = self.instantiate(&id)?;
        Ok(Some(ResolvedTransformer { id, transformer }))
    }

    /// Like [`resolve`](Self::resolve) but reports the outcome instead of the instance.
    pub fn explain(&self, value: &ViewValue, reference: &TransformerRef) -> Result<Resolution> {
        Ok(match self.resolve(value, reference)? {
            Some(resolved) => Resolution::Transformer(resolved.id),
            None if *reference == TransformerRef::Disabled => Resolution::Disabled,
            None => Resolution::NoConvention,
        })
    }

    /// Instantiate a transformer by identifier, validating its capability
    pub fn instantiate(&self, id: &str) -> Result<Arc<dyn Transformer>> {
        self.registry.instantiate(id)
    }
}

impl fmt::Debug for TransformerResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformerResolver")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
