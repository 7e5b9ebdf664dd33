//! Core data types for the view adapter
//!
//! This module defines the values a view hands over for transformation
//! (single entities, eager lists, lazy cursors, plain data), the named
//! variable container, and the transformer override types.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::{Arc, OnceLock};

/// A record-like domain object with a typed identity
pub trait Entity: fmt::Debug + Send + Sync {
    /// Fully qualified type name, e.g. `App\Model\Entity\Post`
    fn entity_type(&self) -> &str;

    /// Field access by name
    fn get(&self, field: &str) -> Option<Value>;

    /// Names of all scalar fields, in declaration order
    fn field_names(&self) -> Vec<String>;

    /// A named relation, if loaded
    fn related(&self, _relation: &str) -> Option<ViewValue> {
        None
    }

    /// Plain representation used when the entity is rendered untransformed
    fn to_value(&self) -> Value;
}

/// A lazily iterable, query-like result set
pub trait Cursor: fmt::Debug + Send + Sync {
    /// The entity type this cursor yields, when it is known without loading rows
    fn entity_type(&self) -> Option<&str>;

    /// First row, materializing it if needed
    fn first(&self) -> Option<Arc<dyn Entity>>;

    /// Materialize every row
    fn fetch(&self) -> Vec<Arc<dyn Entity>>;
}

/// Untyped input handed to the pipeline
#[derive(Debug, Clone)]
pub enum ViewValue {
    /// One record
    Entity(Arc<dyn Entity>),
    /// An eagerly materialized, ordered sequence
    List(Vec<ViewValue>),
    /// A lazy query-like result
    Cursor(Arc<dyn Cursor>),
    /// Anything else: scalars, free-form structures
    Plain(Value),
}

impl ViewValue {
    /// Wrap an entity
    pub fn entity<E: Entity + 'static>(entity: E) -> Self {
        Self::Entity(Arc::new(entity))
    }

    /// Wrap an ordered sequence
    pub fn list<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<ViewValue>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Wrap a lazy cursor
    pub fn cursor<C: Cursor + 'static>(cursor: C) -> Self {
        Self::Cursor(Arc::new(cursor))
    }

    /// Get the entity if this value is a single entity
    pub fn as_entity(&self) -> Option<&Arc<dyn Entity>> {
        match self {
            Self::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    /// Plain JSON rendering of the value, fetching cursors
    pub fn to_json(&self) -> Value {
        match self {
            Self::Entity(entity) => entity.to_value(),
            Self::List(items) => Value::Array(items.iter().map(ViewValue::to_json).collect()),
            Self::Cursor(cursor) => {
                Value::Array(cursor.fetch().iter().map(|e| e.to_value()).collect())
            }
            Self::Plain(value) => value.clone(),
        }
    }
}

impl PartialEq for ViewValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Entity(a), Self::Entity(b)) => {
                Arc::ptr_eq(a, b)
                    || (a.entity_type() == b.entity_type() && a.to_value() == b.to_value())
            }
            (Self::List(a), Self::List(b)) => a == b,
            // Cursors compare by identity so equality never triggers a load
            (Self::Cursor(a), Self::Cursor(b)) => Arc::ptr_eq(a, b),
            (Self::Plain(a), Self::Plain(b)) => a == b,
            _ => false,
        }
    }
}

impl Serialize for ViewValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<Value> for ViewValue {
    fn from(value: Value) -> Self {
        Self::Plain(value)
    }
}

impl From<Record> for ViewValue {
    fn from(record: Record) -> Self {
        Self::entity(record)
    }
}

impl From<Arc<dyn Entity>> for ViewValue {
    fn from(entity: Arc<dyn Entity>) -> Self {
        Self::Entity(entity)
    }
}

/// Stock entity implementation: a type name, ordered fields and loaded relations
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    entity_type: String,
    fields: Map<String, Value>,
    relations: IndexMap<String, ViewValue>,
}

impl Record {
    /// Create an empty record of the given type
    pub fn new(entity_type: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            fields: Map::new(),
            relations: IndexMap::new(),
        }
    }

    /// Set a field
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Set all fields from a JSON object
    pub fn with_fields(mut self, fields: Map<String, Value>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Attach a loaded relation
    pub fn with_relation(mut self, name: impl Into<String>, value: impl Into<ViewValue>) -> Self {
        self.relations.insert(name.into(), value.into());
        self
    }

    /// Raw field map
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Loaded relations
    pub fn relations(&self) -> &IndexMap<String, ViewValue> {
        &self.relations
    }
}

impl Entity for Record {
    fn entity_type(&self) -> &str {
        &self.entity_type
    }

    fn get(&self, field: &str) -> Option<Value> {
        self.fields.get(field).cloned()
    }

    fn field_names(&self) -> Vec<String> {
        self.fields.keys().cloned().collect()
    }

    fn related(&self, relation: &str) -> Option<ViewValue> {
        self.relations.get(relation).cloned()
    }

    fn to_value(&self) -> Value {
        let mut object = self.fields.clone();
        for (name, related) in &self.relations {
            object.insert(name.clone(), related.to_json());
        }
        Value::Object(object)
    }
}

type RowLoader = Box<dyn Fn() -> Vec<Arc<dyn Entity>> + Send + Sync>;

/// A lazy query: the entity type is declared up front, rows load on first use
pub struct Query {
    entity_type: String,
    loader: RowLoader,
    rows: OnceLock<Vec<Arc<dyn Entity>>>,
}

impl Query {
    /// Create a query whose rows are produced by `loader` on first access
    pub fn new<F>(entity_type: impl Into<String>, loader: F) -> Self
    where
        F: Fn() -> Vec<Arc<dyn Entity>> + Send + Sync + 'static,
    {
        Self {
            entity_type: entity_type.into(),
            loader: Box::new(loader),
            rows: OnceLock::new(),
        }
    }

    /// Create a query over rows that are already known
    pub fn from_rows(entity_type: impl Into<String>, rows: Vec<Arc<dyn Entity>>) -> Self {
        Self::new(entity_type, move || rows.clone())
    }

    /// Whether the rows have been materialized
    pub fn is_loaded(&self) -> bool {
        self.rows.get().is_some()
    }

    fn rows(&self) -> &[Arc<dyn Entity>] {
        self.rows.get_or_init(|| (self.loader)())
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("entity_type", &self.entity_type)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

impl Cursor for Query {
    fn entity_type(&self) -> Option<&str> {
        Some(&self.entity_type)
    }

    fn first(&self) -> Option<Arc<dyn Entity>> {
        self.rows().first().cloned()
    }

    fn fetch(&self) -> Vec<Arc<dyn Entity>> {
        self.rows().to_vec()
    }
}

/// An executed result set; its type is only known through its rows
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    rows: Vec<Arc<dyn Entity>>,
}

impl ResultSet {
    pub fn new(rows: Vec<Arc<dyn Entity>>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Cursor for ResultSet {
    fn entity_type(&self) -> Option<&str> {
        None
    }

    fn first(&self) -> Option<Arc<dyn Entity>> {
        self.rows.first().cloned()
    }

    fn fetch(&self) -> Vec<Arc<dyn Entity>> {
        self.rows.clone()
    }
}

/// What a view hands to the pipeline: one bare value or named variables
#[derive(Debug, Clone, PartialEq)]
pub enum ViewData {
    Single(ViewValue),
    /// One named variable rendered on its own, without the enclosing map
    Selected(String, ViewValue),
    Named(IndexMap<String, ViewValue>),
}

impl ViewData {
    /// Build named data from `(name, value)` pairs, keeping their order
    pub fn named<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ViewValue>,
    {
        Self::Named(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    /// Plain JSON rendering
    pub fn to_json(&self) -> Value {
        match self {
            Self::Single(value) | Self::Selected(_, value) => value.to_json(),
            Self::Named(vars) => Value::Object(
                vars.iter()
                    .map(|(name, value)| (name.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }

    /// Value of a named variable
    pub fn get(&self, name: &str) -> Option<&ViewValue> {
        match self {
            Self::Single(_) => None,
            Self::Selected(selected, value) => (selected == name).then_some(value),
            Self::Named(vars) => vars.get(name),
        }
    }
}

impl Serialize for ViewData {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Which transformer to use for a value
///
/// Serialized as JSON `null` (infer), `false` (disabled) or a string identifier.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum TransformerRef {
    /// Derive the transformer from the entity type by naming convention
    #[default]
    Infer,
    /// Never transform this value
    Disabled,
    /// Use the transformer registered under this identifier
    Named(String),
}

impl TransformerRef {
    pub fn named(id: impl Into<String>) -> Self {
        Self::Named(id.into())
    }
}

impl TryFrom<Value> for TransformerRef {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Self::Infer),
            Value::Bool(false) => Ok(Self::Disabled),
            Value::String(id) => Ok(Self::Named(id)),
            other => Err(Error::configuration(format!(
                "transformer reference must be null, false or an identifier, got {}",
                other
            ))),
        }
    }
}

impl From<TransformerRef> for Value {
    fn from(reference: TransformerRef) -> Self {
        match reference {
            TransformerRef::Infer => Value::Null,
            TransformerRef::Disabled => Value::Bool(false),
            TransformerRef::Named(id) => Value::String(id),
        }
    }
}

impl fmt::Display for TransformerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformerRef::Infer => write!(f, "<infer>"),
            TransformerRef::Disabled => write!(f, "<disabled>"),
            TransformerRef::Named(id) => write!(f, "{}", id),
        }
    }
}

/// Transformer overrides for a render call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TransformOverrides {
    /// One reference applied to every variable
    Global(TransformerRef),
    /// References keyed by variable name; missing names infer
    PerVariable(IndexMap<String, TransformerRef>),
}

impl Default for TransformOverrides {
    fn default() -> Self {
        Self::Global(TransformerRef::Infer)
    }
}

impl TransformOverrides {
    /// The reference that applies to a variable (`None` for a bare value)
    pub fn reference_for(&self, variable: Option<&str>) -> TransformerRef {
        match self {
            Self::Global(reference) => reference.clone(),
            Self::PerVariable(map) => variable
                .and_then(|name| map.get(name))
                .cloned()
                .unwrap_or_default(),
        }
    }
}
