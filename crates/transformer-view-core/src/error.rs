//! Error types for the transformer-view core library
//!
//! This module defines the error handling system for the view adapter,
//! using thiserror for ergonomic error definitions and anyhow for wrapping
//! failures raised inside user supplied transformers.

use std::fmt;
use thiserror::Error;
use serde::{Deserialize, Serialize};

/// Main error type for view transformation
#[derive(Error, Debug)]
pub enum Error {
    /// An explicitly named transformer does not exist in the registry
    #[error("Invalid Transformer class: {reference}")]
    InvalidTransformerReference {
        reference: String,
    },

    /// The named type exists but does not provide the transformer capability
    #[error("Transformer class not instance of required capability: {reference}")]
    CapabilityMismatch {
        reference: String,
    },

    /// A value with a resolved transformer is neither a single entity nor a collection
    #[error("Unserializable variable{}", variable.as_ref().map(|v| format!(": {}", v)).unwrap_or_default())]
    UnserializableVariable {
        variable: Option<String>,
    },

    /// A transformer advertised an include it does not implement
    #[error("Include '{relation}' is declared by {transformer} but not implemented")]
    UnknownInclude {
        relation: String,
        transformer: String,
    },

    /// A transformer failed while producing output fields
    #[error("Transformation failed: {message}")]
    Transformation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },

    /// Invalid configuration values (overrides, include directives, definitions)
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
    },

    /// JSON parsing and serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse grouping of errors, mirroring how callers usually present them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// Misconfigured transformer references or definitions
    Configuration,
    /// Failures while running a transformation job
    Transform,
    /// Failures encoding the final output
    Serialization,
}

impl Error {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a transformation error without an underlying cause
    pub fn transformation(message: impl Into<String>) -> Self {
        Self::Transformation {
            message: message.into(),
            source: None,
        }
    }

    /// Which category this error belongs to
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidTransformerReference { .. }
            | Self::CapabilityMismatch { .. }
            | Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::UnserializableVariable { .. }
            | Self::UnknownInclude { .. }
            | Self::Transformation { .. } => ErrorCategory::Transform,
            Self::Json { .. } => ErrorCategory::Serialization,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Configuration => write!(f, "configuration"),
            ErrorCategory::Transform => write!(f, "transform"),
            ErrorCategory::Serialization => write!(f, "serialization"),
        }
    }
}

// Conversion implementations
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Transformation {
            message: format!("{:#}", err),
            source: Some(err.into()),
        }
    }
}
