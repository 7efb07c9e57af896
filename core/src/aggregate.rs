#![deny(missing_docs)]

//! # Schema Aggregation
//!
//! Merges every discovered endpoint's per-method schemas into one
//! [`EndpointSchemasMap`] keyed by `"name::METHOD"`.
//!
//! The map is what gets embedded into the generated client, written to the
//! optional JSON manifest, and consulted by the Rust transport wrappers.

use crate::definition::{load_definition, EndpointSchemas, IoSchema};
use crate::discovery::EndpointDescriptor;
use crate::error::{AppError, AppResult};
use crate::method::HttpMethod;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Separator between endpoint name and method in a textual key.
pub const KEY_SEPARATOR: &str = "::";

/// Identifies one method of one endpoint. Textual form: `endpoint1::POST`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EndpointKey {
    /// Endpoint name.
    pub name: String,
    /// HTTP method.
    pub method: HttpMethod,
}

impl EndpointKey {
    /// Creates a key.
    pub fn new(name: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            name: name.into(),
            method,
        }
    }
}

impl fmt::Display for EndpointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.name, KEY_SEPARATOR, self.method)
    }
}

impl FromStr for EndpointKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, method) = s
            .rsplit_once(KEY_SEPARATOR)
            .ok_or_else(|| format!("Endpoint key '{}' is not of the form name::METHOD", s))?;
        if name.is_empty() {
            return Err(format!("Endpoint key '{}' has an empty name", s));
        }
        Ok(Self::new(name, method.parse()?))
    }
}

impl Serialize for EndpointKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EndpointKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Every endpoint method's schemas, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EndpointSchemasMap {
    entries: IndexMap<EndpointKey, IoSchema>,
}

impl EndpointSchemasMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a map from already-parsed endpoint declarations.
    pub fn from_endpoints<I, N>(endpoints: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = (N, EndpointSchemas)>,
        N: Into<String>,
    {
        let mut map = Self::new();
        for (name, schemas) in endpoints {
            let name = name.into();
            for (method, io) in schemas {
                map.insert(EndpointKey::new(name.clone(), method), io)?;
            }
        }
        Ok(map)
    }

    /// Adds an entry. Keys are unique.
    pub fn insert(&mut self, key: EndpointKey, io: IoSchema) -> AppResult<()> {
        if self.entries.contains_key(&key) {
            return Err(AppError::General(format!(
                "Endpoint key '{}' is declared more than once",
                key
            )));
        }
        self.entries.insert(key, io);
        Ok(())
    }

    /// Looks up an entry by key.
    pub fn get(&self, key: &EndpointKey) -> Option<&IoSchema> {
        self.entries.get(key)
    }

    /// Looks up an entry by its textual key. Malformed keys simply miss.
    pub fn lookup(&self, key: &str) -> Option<(EndpointKey, &IoSchema)> {
        let parsed: EndpointKey = key.parse().ok()?;
        let io = self.entries.get(&parsed)?;
        Some((parsed, io))
    }

    /// Iterates entries in order.
    pub fn iter(&self) -> impl Iterator<Item = (&EndpointKey, &IoSchema)> {
        self.entries.iter()
    }

    /// Iterates keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &EndpointKey> {
        self.entries.keys()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no endpoint was aggregated.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Regroups entries by endpoint name, preserving order.
    pub fn by_endpoint(&self) -> IndexMap<&str, Vec<(HttpMethod, &IoSchema)>> {
        let mut grouped: IndexMap<&str, Vec<(HttpMethod, &IoSchema)>> = IndexMap::new();
        for (key, io) in &self.entries {
            grouped
                .entry(key.name.as_str())
                .or_default()
                .push((key.method, io));
        }
        grouped
    }

    /// Parses a JSON manifest.
    pub fn from_json(json: &str) -> AppResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| AppError::General(format!("Invalid endpoint schemas manifest: {}", e)))
    }

    /// Renders the map as a pretty-printed JSON manifest.
    pub fn to_json_pretty(&self) -> AppResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| AppError::General(format!("JSON serialization failed: {}", e)))
    }
}

/// Reads every discovered endpoint's definition and merges them.
///
/// Fails the whole run if any definition is incomplete, or if a definition's
/// methods no longer match what discovery saw.
pub fn aggregate(endpoints: &[EndpointDescriptor]) -> AppResult<EndpointSchemasMap> {
    let mut map = EndpointSchemasMap::new();

    for endpoint in endpoints {
        let schemas = load_definition(&endpoint.file_path)?;

        if !schemas.keys().eq(endpoint.methods.iter()) {
            return Err(AppError::Definition {
                path: endpoint.file_path.clone(),
                reason: "declared methods changed while generating".into(),
            });
        }

        for (method, io) in schemas {
            map.insert(EndpointKey::new(endpoint.name.clone(), method), io)?;
        }
    }

    tracing::info!(entries = map.len(), "aggregated endpoint schemas");
    Ok(map)
}
