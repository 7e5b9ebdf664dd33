//! Include directive parsing
//!
//! Callers request nested relations with a comma separated list of dotted
//! paths, optionally followed by parameters:
//!
//! ```text
//! author,comments.author,comments:limit(5|1):order(created_at|desc)
//! ```
//!
//! Copyright (c) 2025 Transformer View Team
//! Licensed under the Apache-2.0 license

use indexmap::{IndexMap, IndexSet};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::str::FromStr;
use std::sync::OnceLock;

/// Default maximum depth of include paths
pub const DEFAULT_RECURSION_LIMIT: usize = 10;

static MODIFIER_REGEX: OnceLock<Regex> = OnceLock::new();

fn modifier_regex() -> &'static Regex {
    MODIFIER_REGEX.get_or_init(|| {
        Regex::new(r"(\w+)(\(([^)]+)\))?").expect("modifier pattern is valid")
    })
}

/// Raw include request as supplied by the caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "IncludeInput", into = "Vec<String>")]
pub struct IncludeDirective {
    entries: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IncludeInput {
    Joined(String),
    List(Vec<String>),
}

impl From<IncludeInput> for IncludeDirective {
    fn from(input: IncludeInput) -> Self {
        match input {
            IncludeInput::Joined(joined) => IncludeDirective::parse(&joined),
            IncludeInput::List(list) => IncludeDirective::from_list(list),
        }
    }
}

impl From<IncludeDirective> for Vec<String> {
    fn from(directive: IncludeDirective) -> Self {
        directive.entries
    }
}

impl IncludeDirective {
    /// Parse a comma separated directive
    pub fn parse(joined: &str) -> Self {
        Self::from_list(joined.split(','))
    }

    /// Build a directive from individual entries
    pub fn from_list<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|e| e.as_ref().trim().to_string())
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    /// Entries as supplied, trimmed
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<&str> for IncludeDirective {
    fn from(joined: &str) -> Self {
        IncludeDirective::parse(joined)
    }
}

impl FromStr for IncludeDirective {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

/// Parameters attached to one include, e.g. `limit(5|1)`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IncludeParams {
    values: IndexMap<String, Vec<String>>,
}

impl IncludeParams {
    /// Parse the modifier part after the include name
    pub fn parse(modifiers: &str) -> Self {
        let values = modifier_regex()
            .captures_iter(modifiers)
            .map(|caps| {
                let name = caps[1].to_string();
                let args = caps
                    .get(3)
                    .map(|m| m.as_str().split('|').map(|a| a.trim().to_string()).collect())
                    .unwrap_or_default();
                (name, args)
            })
            .collect();
        Self { values }
    }

    /// Arguments of a parameter
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.values.get(name).map(Vec::as_slice)
    }

    /// First argument of a parameter
    pub fn first(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|args| args.first()).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}

/// Include paths requested for one render call, parents included
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestedIncludes {
    paths: IndexSet<String>,
    params: IndexMap<String, IncludeParams>,
}

impl RequestedIncludes {
    /// Parse a directive, truncating paths deeper than `recursion_limit`
    pub fn parse(directive: &IncludeDirective, recursion_limit: usize) -> Self {
        let mut requested = Self::default();

        for entry in directive.entries() {
            let (path, modifiers) = match entry.split_once(':') {
                Some((path, modifiers)) => (path, Some(modifiers)),
                None => (entry.as_str(), None),
            };

            let segments: Vec<&str> = path
                .split('.')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .take(recursion_limit)
                .collect();
            if segments.is_empty() {
                continue;
            }

            // Requesting `a.b.c` also requests `a` and `a.b`
            for depth in 1..=segments.len() {
                requested.paths.insert(segments[..depth].join("."));
            }

            if let Some(modifiers) = modifiers {
                let params = IncludeParams::parse(modifiers);
                if !params.is_empty() {
                    requested.params.insert(segments.join("."), params);
                }
            }
        }

        requested
    }

    /// Whether a full dotted path was requested
    pub fn is_requested(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    /// Parameters for a full dotted path
    pub fn params(&self, path: &str) -> Option<&IncludeParams> {
        self.params.get(path)
    }

    /// Requested paths in request order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
