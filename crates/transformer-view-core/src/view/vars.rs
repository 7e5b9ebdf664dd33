//! JSON view variable bag
//!
//! Controllers set named variables on a [`TransformerView`]; a handful of
//! reserved names configure the render instead of being rendered.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::config::RenderOptions;
use super::pipeline::TransformPipeline;
use crate::engine::{IncludeDirective, SerializerKind};
use crate::error::{Error, Result};
use crate::types::{TransformOverrides, ViewData, ViewValue};

/// Which variables end up in the response
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum SerializeSelection {
    /// Every non-special variable
    #[default]
    All,
    /// The listed variables that exist, in this order
    Names(Vec<String>),
    /// One variable, rendered bare
    One(String),
}

impl TryFrom<Value> for SerializeSelection {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Bool(true) | Value::Null => Ok(Self::All),
            Value::String(name) => Ok(Self::One(name)),
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(name) => Ok(name),
                    other => Err(Error::configuration(format!(
                        "_serialize entries must be variable names, got {}",
                        other
                    ))),
                })
                .collect::<Result<Vec<_>>>()
                .map(Self::Names),
            other => Err(Error::configuration(format!(
                "_serialize must be true, a name or a list of names, got {}",
                other
            ))),
        }
    }
}

impl From<SerializeSelection> for Value {
    fn from(selection: SerializeSelection) -> Self {
        match selection {
            SerializeSelection::All => Value::Bool(true),
            SerializeSelection::Names(names) => {
                Value::Array(names.into_iter().map(Value::String).collect())
            }
            SerializeSelection::One(name) => Value::String(name),
        }
    }
}

/// Reserved variable names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialVar {
    Serialize,
    Transform,
    ResourceKey,
    Includes,
}

impl SpecialVar {
    pub const ALL: [SpecialVar; 4] = [
        SpecialVar::Serialize,
        SpecialVar::Transform,
        SpecialVar::ResourceKey,
        SpecialVar::Includes,
    ];

    /// Recognize a reserved name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|special| special.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            SpecialVar::Serialize => "_serialize",
            SpecialVar::Transform => "_transform",
            SpecialVar::ResourceKey => "_resourceKey",
            SpecialVar::Includes => "_includes",
        }
    }
}

impl fmt::Display for SpecialVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A JSON view that transforms its variables before encoding them
#[derive(Debug, Clone, Default)]
pub struct TransformerView {
    vars: IndexMap<String, ViewValue>,
    selection: SerializeSelection,
    options: RenderOptions,
}

impl TransformerView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a variable. Reserved names configure the render.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<ViewValue>) -> Result<&mut Self> {
        let name = name.into();
        let value = value.into();

        match SpecialVar::from_name(&name) {
            Some(special) => self.set_special(special, value)?,
            None => {
                self.vars.insert(name, value);
            }
        }
        Ok(self)
    }

    /// Choose which variables to serialize
    pub fn serialize(&mut self, selection: SerializeSelection) -> &mut Self {
        self.selection = selection;
        self
    }

    /// Serializer for this view only
    pub fn with_serializer(&mut self, kind: SerializerKind) -> &mut Self {
        self.options.serializer = Some(kind);
        self
    }

    /// Non-special variables
    pub fn vars(&self) -> &IndexMap<String, ViewValue> {
        &self.vars
    }

    /// Options collected from the reserved variables
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn selection(&self) -> &SerializeSelection {
        &self.selection
    }

    /// The variables picked by the current selection, untransformed
    pub fn data_to_serialize(&self) -> ViewData {
        match &self.selection {
            SerializeSelection::All => ViewData::Named(self.vars.clone()),
            SerializeSelection::Names(names) => ViewData::Named(
                names
                    .iter()
                    .filter_map(|name| self.vars.get(name).map(|v| (name.clone(), v.clone())))
                    .collect(),
            ),
            SerializeSelection::One(name) => ViewData::Selected(
                name.clone(),
                self.vars
                    .get(name)
                    .cloned()
                    .unwrap_or(ViewValue::Plain(Value::Null)),
            ),
        }
    }

    /// Transform the selected variables
    pub fn render(&self, pipeline: &TransformPipeline) -> Result<Value> {
        let data = pipeline.render(&self.options, self.data_to_serialize())?;
        Ok(data.to_json())
    }

    /// Transform and encode the selected variables
    pub fn render_json(&self, pipeline: &TransformPipeline, pretty: bool) -> Result<String> {
        let value = self.render(pipeline)?;
        let encoded = if pretty {
            serde_json::to_string_pretty(&value)?
        } else {
            serde_json::to_string(&value)?
        };
        Ok(encoded)
    }

    fn set_special(&mut self, special: SpecialVar, value: ViewValue) -> Result<()> {
        let json = value.to_json();
        let invalid = |err: serde_json::Error| {
            Error::configuration(format!("invalid value for {}: {}", special, err))
        };

        match special {
            SpecialVar::Serialize => {
                self.selection = SerializeSelection::try_from(json)?;
            }
            SpecialVar::Transform => {
                self.options.transform =
                    serde_json::from_value::<TransformOverrides>(json).map_err(invalid)?;
            }
            SpecialVar::ResourceKey => {
                self.options.resource_key = match json {
                    Value::Null | Value::Bool(false) => None,
                    Value::String(key) => Some(key),
                    other => {
                        return Err(Error::configuration(format!(
                            "{} must be a string, got {}",
                            special, other
                        )))
                    }
                };
            }
            SpecialVar::Includes => {
                self.options.includes = match json {
                    Value::Null | Value::Bool(false) => None,
                    other => Some(serde_json::from_value::<IncludeDirective>(other).map_err(invalid)?),
                };
            }
        }
        Ok(())
    }
}
