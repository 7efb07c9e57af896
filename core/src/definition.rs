#![deny(missing_docs)]

//! # Endpoint Definitions
//!
//! Reads the per-endpoint declaration files. A definition is a mapping from HTTP
//! method to a `{request, response}` pair of [`SchemaShape`]s, written in YAML
//! (`endpoint.yaml` / `endpoint.yml`) or JSON (`endpoint.json`):
//!
//! ```yaml
//! POST:
//!   request:
//!     object:
//!       bundle_id: number
//!   response:
//!     object:
//!       success: boolean
//!       products: { array: number }
//! ```
//!
//! Definitions are data, never code: nothing from the target project is executed.

use crate::error::{AppError, AppResult};
use crate::method::HttpMethod;
use crate::schema::{CompiledShape, SchemaShape};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// The request/response shape pair for one endpoint method, compiled for validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IoSchema {
    /// Shape the request body must satisfy.
    pub request: CompiledShape,
    /// Shape every response body (success or structured error) must satisfy.
    pub response: CompiledShape,
}

impl IoSchema {
    /// Compiles both shapes.
    pub fn new(request: SchemaShape, response: SchemaShape) -> AppResult<Self> {
        Ok(Self {
            request: CompiledShape::new(request)?,
            response: CompiledShape::new(response)?,
        })
    }
}

/// Everything one endpoint declares, keyed by method in canonical order.
pub type EndpointSchemas = IndexMap<HttpMethod, IoSchema>;

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawIoSchema {
    request: Option<SchemaShape>,
    response: Option<SchemaShape>,
}

/// Serialization formats accepted for definition files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionFormat {
    /// `.yaml` / `.yml`
    Yaml,
    /// `.json`
    Json,
}

impl DefinitionFormat {
    /// Picks the format from a file extension. Anything that is not `.json` is read as YAML,
    /// which is a superset of JSON anyway.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => DefinitionFormat::Json,
            _ => DefinitionFormat::Yaml,
        }
    }
}

fn definition_error(path: &Path, reason: impl Into<String>) -> AppError {
    AppError::Definition {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

fn parse_document(path: &Path, content: &str) -> AppResult<Map<String, Value>> {
    if content.trim().is_empty() {
        return Ok(Map::new());
    }

    let document: Value = match DefinitionFormat::from_path(path) {
        DefinitionFormat::Json => serde_json::from_str(content)
            .map_err(|e| definition_error(path, format!("invalid JSON: {}", e)))?,
        DefinitionFormat::Yaml => serde_yaml::from_str(content)
            .map_err(|e| definition_error(path, format!("invalid YAML: {}", e)))?,
    };

    match document {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => Err(definition_error(
            path,
            format!(
                "expected a mapping of HTTP method to {{request, response}}, found {}",
                other
            ),
        )),
    }
}

/// Lists the HTTP methods a definition declares, without interpreting their shapes.
pub fn declared_methods(path: &Path, content: &str) -> AppResult<BTreeSet<HttpMethod>> {
    let document = parse_document(path, content)?;
    let mut methods = BTreeSet::new();
    for key in document.keys() {
        let method = key
            .parse::<HttpMethod>()
            .map_err(|e| definition_error(path, e))?;
        if !methods.insert(method) {
            return Err(definition_error(
                path,
                format!("method {} is declared more than once", method),
            ));
        }
    }
    Ok(methods)
}

/// Parses a definition into its per-method schemas.
///
/// Fails when no method is declared or when a method lacks either its request
/// or its response shape.
pub fn parse_definition(path: &Path, content: &str) -> AppResult<EndpointSchemas> {
    let document = parse_document(path, content)?;
    if document.is_empty() {
        return Err(definition_error(path, "declares no HTTP methods"));
    }

    let mut schemas = EndpointSchemas::new();
    for (key, value) in document {
        let method = key
            .parse::<HttpMethod>()
            .map_err(|e| definition_error(path, e))?;

        // An unquoted YAML `null` is a missing schema, not the `null` shape.
        for side in ["request", "response"] {
            if value.get(side).is_some_and(Value::is_null) {
                return Err(definition_error(
                    path,
                    format!(
                        "{} {} is an unquoted null; write 'null' (quoted) to declare a null body",
                        method, side
                    ),
                ));
            }
        }

        let raw: RawIoSchema = serde_json::from_value(value)
            .map_err(|e| definition_error(path, format!("{}: {}", method, e)))?;

        let request = raw.request.ok_or_else(|| {
            definition_error(path, format!("{} is missing a request schema", method))
        })?;
        let response = raw.response.ok_or_else(|| {
            definition_error(path, format!("{} is missing a response schema", method))
        })?;

        let io = IoSchema::new(request, response)
            .map_err(|e| definition_error(path, format!("{}: {}", method, e)))?;
        if schemas.insert(method, io).is_some() {
            return Err(definition_error(
                path,
                format!("method {} is declared more than once", method),
            ));
        }
    }

    schemas.sort_keys();
    Ok(schemas)
}

/// Reads and parses a definition file.
pub fn load_definition(path: &Path) -> AppResult<EndpointSchemas> {
    let content = fs::read_to_string(path)
        .map_err(|e| definition_error(path, format!("unreadable: {}", e)))?;
    parse_definition(path, &content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const ENDPOINT1: &str = r#"
POST:
  request:
    object:
      bundle_id: number
  response:
    object:
      success: boolean
      products: { array: number }
"#;

    fn yaml_path() -> PathBuf {
        PathBuf::from("functions/endpoint1/endpoint.yaml")
    }

    #[test]
    fn test_parse_yaml_definition() {
        let schemas = parse_definition(&yaml_path(), ENDPOINT1).unwrap();
        assert_eq!(schemas.len(), 1);
        let io = &schemas[&HttpMethod::Post];
        assert!(matches!(io.request.shape(), SchemaShape::Object(_)));
        assert!(matches!(io.response.shape(), SchemaShape::Object(_)));
        assert!(io.request.accepts(&serde_json::json!({"bundle_id": 3})));
    }

    #[test]
    fn test_parse_json_definition() {
        let json = r#"{"get": {"request": "null", "response": {"array": "string"}}}"#;
        let schemas = parse_definition(Path::new("x/list/endpoint.json"), json).unwrap();
        assert_eq!(
            schemas[&HttpMethod::Get].response.shape(),
            &SchemaShape::Array(Box::new(SchemaShape::String))
        );
        assert_eq!(schemas[&HttpMethod::Get].request.shape(), &SchemaShape::Null);
    }

    #[test]
    fn test_methods_are_sorted_canonically() {
        let yaml = r#"
DELETE: { request: any, response: any }
GET: { request: any, response: any }
"#;
        let schemas = parse_definition(&yaml_path(), yaml).unwrap();
        let methods: Vec<_> = schemas.keys().copied().collect();
        assert_eq!(methods, vec![HttpMethod::Get, HttpMethod::Delete]);
    }

    #[test]
    fn test_missing_response_fails() {
        let yaml = "POST:\n  request: string\n";
        let err = parse_definition(&yaml_path(), yaml).unwrap_err();
        assert!(err.to_string().contains("POST is missing a response schema"));
    }

    #[test]
    fn test_missing_request_fails() {
        let yaml = "PUT:\n  response: string\n";
        let err = parse_definition(&yaml_path(), yaml).unwrap_err();
        assert!(err.to_string().contains("PUT is missing a request schema"));
    }

    #[test]
    fn test_unquoted_null_shape_is_explained() {
        let yaml = "POST:\n  request: null\n  response: string\n";
        let err = parse_definition(&yaml_path(), yaml).unwrap_err();
        assert!(err.to_string().contains("POST request is an unquoted null"));
        assert!(err.to_string().contains("'null' (quoted)"));

        let quoted = "POST:\n  request: 'null'\n  response: string\n";
        let schemas = parse_definition(&yaml_path(), quoted).unwrap();
        assert!(schemas[&HttpMethod::Post].request.accepts(&Value::Null));
    }

    #[test]
    fn test_empty_definition_fails() {
        let err = parse_definition(&yaml_path(), "").unwrap_err();
        assert!(err.to_string().contains("declares no HTTP methods"));
    }

    #[test]
    fn test_unknown_method_fails() {
        let yaml = "OPTIONS: { request: any, response: any }\n";
        let err = parse_definition(&yaml_path(), yaml).unwrap_err();
        assert!(err.to_string().contains("Unsupported HTTP method 'OPTIONS'"));
    }

    #[test]
    fn test_duplicate_method_case_fails() {
        let yaml = "POST: { request: any, response: any }\npost: { request: any, response: any }\n";
        let err = declared_methods(&yaml_path(), yaml).unwrap_err();
        assert!(err.to_string().contains("declared more than once"));
    }

    #[test]
    fn test_unknown_shape_fails() {
        let yaml = "POST: { request: timestamp, response: any }\n";
        assert!(parse_definition(&yaml_path(), yaml).is_err());
    }

    #[test]
    fn test_declared_methods() {
        let methods = declared_methods(&yaml_path(), ENDPOINT1).unwrap();
        assert_eq!(methods.into_iter().collect::<Vec<_>>(), vec![HttpMethod::Post]);
    }
}
