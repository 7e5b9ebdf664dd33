//! Shape detection for view values

use crate::types::ViewValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a value is treated by the transformation engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    /// One entity, transformed as an item
    Single,
    /// An ordered sequence or lazy cursor, transformed element-wise
    Collection,
    /// Anything the engine cannot transform
    Unsupported,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Single => write!(f, "single"),
            Shape::Collection => write!(f, "collection"),
            Shape::Unsupported => write!(f, "unsupported"),
        }
    }
}

/// Classify a value by its runtime shape
pub fn classify(value: &ViewValue) -> Shape {
    match value {
        ViewValue::List(_) | ViewValue::Cursor(_) => Shape::Collection,
        ViewValue::Entity(_) => Shape::Single,
        ViewValue::Plain(_) => Shape::Unsupported,
    }
}
