//! View documents
//!
//! A view document is a JSON or YAML file describing what a controller would
//! hand to the view. Entities are objects tagged with `@type`; their other
//! keys are fields and `@relations` holds related values:
//!
//! ```yaml
//! posts:
//!   "@query": App\Model\Entity\Post
//!   rows:
//!     - {id: 1, title: Hello}
//! author:
//!   "@type": App\Model\Entity\User
//!   id: 7
//!   "@relations":
//!     profile: {"@type": App\Model\Entity\Profile, bio: "..."}
//! _serialize: [posts, author]
//! ```
//!
//! `{"@resultSet": [...]}` describes an already executed result set. A
//! top-level object becomes named view variables (special `_`-prefixed keys
//! configure the render); anything else is rendered as a single bare value.

use crate::error::{Error, Result};
use anyhow::{bail, Context};
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Arc;
use transformer_view_core::{
    Entity, Query, Record, ResultSet, SpecialVar, TransformerView, ViewValue,
};

const TYPE_KEY: &str = "@type";
const RELATIONS_KEY: &str = "@relations";
const QUERY_KEY: &str = "@query";
const ROWS_KEY: &str = "rows";
const RESULT_SET_KEY: &str = "@resultSet";

/// A parsed view document
#[derive(Debug)]
pub enum ViewDocument {
    /// Named variables plus their render settings
    View(TransformerView),
    /// One bare value
    Bare(ViewValue),
}

/// Load a view document from a JSON or YAML file
pub fn load_document(path: &Path) -> Result<ViewDocument> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path)?;

    let value: Value = match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
        _ => serde_json::from_str(&content)?,
    };

    parse_document(value).map_err(|err| Error::InvalidDocument {
        path: path.to_path_buf(),
        message: format!("{:#}", err),
    })
}

/// Turn a decoded document into view variables
pub fn parse_document(value: Value) -> anyhow::Result<ViewDocument> {
    match value {
        Value::Object(map) if !is_tagged(&map) => {
            let mut view = TransformerView::new();
            for (name, value) in map {
                let parsed = if SpecialVar::from_name(&name).is_some() {
                    ViewValue::Plain(value)
                } else {
                    parse_value(value).with_context(|| format!("variable '{}'", name))?
                };
                view.set(name, parsed)?;
            }
            Ok(ViewDocument::View(view))
        }
        other => Ok(ViewDocument::Bare(parse_value(other)?)),
    }
}

fn is_tagged(map: &Map<String, Value>) -> bool {
    map.contains_key(TYPE_KEY) || map.contains_key(QUERY_KEY) || map.contains_key(RESULT_SET_KEY)
}

/// Parse one value, recognizing entity, query and result set markers
pub fn parse_value(value: Value) -> anyhow::Result<ViewValue> {
    match value {
        Value::Object(map) if map.contains_key(TYPE_KEY) => Ok(ViewValue::from(parse_record(map, None)?)),
        Value::Object(mut map) if map.contains_key(QUERY_KEY) => {
            let entity_type = match map.remove(QUERY_KEY) {
                Some(Value::String(entity_type)) => entity_type,
                other => bail!("{} must name an entity type, got {:?}", QUERY_KEY, other),
            };
            let rows = match map.remove(ROWS_KEY) {
                None | Some(Value::Null) => Vec::new(),
                Some(Value::Array(rows)) => rows,
                Some(other) => bail!("query rows must be an array, got {}", other),
            };
            let rows = parse_rows(rows, Some(&entity_type))
                .with_context(|| format!("query of {}", entity_type))?;
            Ok(ViewValue::cursor(Query::from_rows(entity_type, rows)))
        }
        Value::Object(mut map) if map.contains_key(RESULT_SET_KEY) => {
            let rows = match map.remove(RESULT_SET_KEY) {
                Some(Value::Array(rows)) => rows,
                other => bail!("{} must be an array, got {:?}", RESULT_SET_KEY, other),
            };
            Ok(ViewValue::cursor(ResultSet::new(parse_rows(rows, None)?)))
        }
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| parse_value(item).with_context(|| format!("item {}", index)))
            .collect::<anyhow::Result<Vec<_>>>()
            .map(ViewValue::List),
        other => Ok(ViewValue::Plain(other)),
    }
}

fn parse_rows(rows: Vec<Value>, default_type: Option<&str>) -> anyhow::Result<Vec<Arc<dyn Entity>>> {
    rows.into_iter()
        .enumerate()
        .map(|(index, row)| match row {
            Value::Object(map) => parse_record(map, default_type)
                .map(|record| Arc::new(record) as Arc<dyn Entity>)
                .with_context(|| format!("row {}", index)),
            other => bail!("row {} must be an entity object, got {}", index, other),
        })
        .collect()
}

fn parse_record(map: Map<String, Value>, default_type: Option<&str>) -> anyhow::Result<Record> {
    // Rebuild the field map so the remaining fields keep their order
    let mut tagged_type = None;
    let mut relations = None;
    let mut fields = Map::new();
    for (key, value) in map {
        match key.as_str() {
            TYPE_KEY => tagged_type = Some(value),
            RELATIONS_KEY => relations = Some(value),
            _ => {
                fields.insert(key, value);
            }
        }
    }

    let entity_type = match tagged_type {
        Some(Value::String(entity_type)) => entity_type,
        None => match default_type {
            Some(entity_type) => entity_type.to_string(),
            None => bail!("entity is missing {}", TYPE_KEY),
        },
        Some(other) => bail!("{} must be a string, got {}", TYPE_KEY, other),
    };

    let relations = match relations {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(relations)) => relations,
        Some(other) => bail!("{} must be an object, got {}", RELATIONS_KEY, other),
    };

    let mut record = Record::new(entity_type.as_str()).with_fields(fields);
    for (name, value) in relations {
        let related = parse_value(value)
            .with_context(|| format!("relation '{}' of {}", name, entity_type))?;
        record = record.with_relation(name, related);
    }
    Ok(record)
}
