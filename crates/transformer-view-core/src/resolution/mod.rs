//! Transformer resolution
//!
//! Given an arbitrary view value and an optional override, decide which
//! transformer applies to it:
//!
//! - [`classifier`] - single / collection / unsupported shape detection
//! - [`convention`] - naming convention fallback
//! - [`registry`] - identifiers to transformer factories
//! - [`resolver`] - the resolution rules tying them together

pub mod classifier;
pub mod convention;
pub mod registry;
pub mod resolver;

#[cfg(test)]
mod tests;

pub use classifier::{classify, Shape};
pub use convention::{representative_type, ConventionalLookup, NamespaceConvention, NamingStrategy};
pub use registry::{build_registry, TransformerFactory, TransformerRegistry, TypeEntry};
pub use resolver::{Resolution, ResolvedTransformer, TransformerResolver};
