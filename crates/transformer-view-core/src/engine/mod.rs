//! Transformation engine
//!
//! Builds item and collection jobs, expands nested includes and runs the
//! result through a pluggable serializer.
//!
//! - [`resource`] - item / collection / null / primitive jobs
//! - [`includes`] - include directive and parameter parsing
//! - [`serializer`] - output envelopes
//! - [`manager`] - job execution with scoped includes
//!
//! Copyright (c) 2025 Transformer View Team
//! Licensed under the Apache-2.0 license

pub mod includes;
pub mod manager;
pub mod resource;
pub mod serializer;

#[cfg(test)]
mod tests;

pub use includes::{IncludeDirective, IncludeParams, RequestedIncludes, DEFAULT_RECURSION_LIMIT};
pub use manager::{IncludeContext, Manager};
pub use resource::Resource;
pub use serializer::{
    DataArraySerializer, FlatArraySerializer, KeyedArraySerializer, Serializer, SerializerKind,
};
