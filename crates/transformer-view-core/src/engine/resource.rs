//! Transformation jobs
//!
//! A [`Resource`] pairs data with the transformer that renders it, as one
//! item or as a collection.

use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::resolution::{classify, Shape};
use crate::transformer::Transformer;
use crate::types::{Entity, ViewValue};

/// A unit of work for the [`Manager`](super::Manager)
#[derive(Clone)]
pub enum Resource {
    /// One entity
    Item {
        data: Arc<dyn Entity>,
        transformer: Arc<dyn Transformer>,
        resource_key: Option<String>,
        meta: Map<String, Value>,
    },
    /// Entities transformed element-wise with one transformer
    Collection {
        data: Vec<Arc<dyn Entity>>,
        transformer: Arc<dyn Transformer>,
        resource_key: Option<String>,
        meta: Map<String, Value>,
    },
    /// An absent relation
    Null,
    /// Data emitted without transformation
    Primitive(Value),
}

impl Resource {
    /// Item job
    pub fn item(data: Arc<dyn Entity>, transformer: Arc<dyn Transformer>) -> Self {
        Self::Item {
            data,
            transformer,
            resource_key: None,
            meta: Map::new(),
        }
    }

    /// Collection job
    pub fn collection(data: Vec<Arc<dyn Entity>>, transformer: Arc<dyn Transformer>) -> Self {
        Self::Collection {
            data,
            transformer,
            resource_key: None,
            meta: Map::new(),
        }
    }

    /// Job for a view value, chosen by its shape
    pub fn for_value(
        value: &ViewValue,
        transformer: Arc<dyn Transformer>,
        resource_key: Option<&str>,
    ) -> Result<Self> {
        let resource = match (classify(value), value) {
            (Shape::Single, ViewValue::Entity(entity)) => Self::item(entity.clone(), transformer),
            (Shape::Collection, ViewValue::List(items)) => {
                let entities = items
                    .iter()
                    .map(|item| match item {
                        ViewValue::Entity(entity) => Ok(entity.clone()),
                        _ => Err(Error::UnserializableVariable { variable: None }),
                    })
                    .collect::<Result<Vec<_>>>()?;
                Self::collection(entities, transformer)
            }
            (Shape::Collection, ViewValue::Cursor(cursor)) => {
                Self::collection(cursor.fetch(), transformer)
            }
            _ => return Err(Error::UnserializableVariable { variable: None }),
        };

        Ok(resource.with_resource_key(resource_key))
    }

    /// Set the resource key
    pub fn with_resource_key(mut self, key: Option<&str>) -> Self {
        if let Self::Item { resource_key, .. } | Self::Collection { resource_key, .. } = &mut self {
            *resource_key = key.map(str::to_string);
        }
        self
    }

    /// Attach a meta entry
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        if let Self::Item { meta, .. } | Self::Collection { meta, .. } = &mut self {
            meta.insert(key.into(), value.into());
        }
        self
    }

    /// Resource key, if any
    pub fn resource_key(&self) -> Option<&str> {
        match self {
            Self::Item { resource_key, .. } | Self::Collection { resource_key, .. } => {
                resource_key.as_deref()
            }
            _ => None,
        }
    }

    /// Short name of the resource kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Item { .. } => "item",
            Self::Collection { .. } => "collection",
            Self::Null => "null",
            Self::Primitive(_) => "primitive",
        }
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Item { data, transformer, resource_key, .. } => f
                .debug_struct("Item")
                .field("entity_type", &data.entity_type())
                .field("transformer", &transformer.name())
                .field("resource_key", resource_key)
                .finish(),
            Self::Collection { data, transformer, resource_key, .. } => f
                .debug_struct("Collection")
                .field("len", &data.len())
                .field("transformer", &transformer.name())
                .field("resource_key", resource_key)
                .finish(),
            Self::Null => write!(f, "Null"),
            Self::Primitive(value) => f.debug_tuple("Primitive").field(value).finish(),
        }
    }
}
