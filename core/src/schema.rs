#![deny(missing_docs)]

//! # Schema Shapes
//!
//! The declarative shape language endpoint definitions are written in, and the
//! validation capability every other component leans on: given a shape and a
//! value, report success or a list of located issues.
//!
//! Shapes are the model the zod emitter renders from. Validation goes through
//! [`CompiledShape`], which translates a shape into a Draft 7 JSON Schema once
//! and checks values with `jsonschema`. Both sides read a shape the same way:
//! `optional` admits `null` and absence (zod `.nullish()`), and a field that
//! admits `undefined` in zod (`any`, `optional`) may be left out of an object.
//!
//! Shapes deserialize from a compact form:
//! - scalars are bare strings: `string`, `number`, `integer`, `boolean`,
//!   `null`, `any`, `bytes`;
//! - composites are single-key maps: `{array: <shape>}`,
//!   `{object: {field: <shape>}}`, `{record: <shape>}`, `{optional: <shape>}`,
//!   `{nullable: <shape>}`, `{union: [<shape>..]}`, `{enum: [..]}`,
//!   `{literal: <value>}`.
//!
//! Objects are open: keys that are not declared are ignored.

use crate::error::{AppError, AppResult};
use crate::payload::Payload;
use indexmap::IndexMap;
use jsonschema::error::ValidationErrorKind;
use jsonschema::{Draft, JSONSchema};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;
use std::sync::Arc;

/// A declarative description of an expected data structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaShape {
    /// Any JSON string.
    String,
    /// Any JSON number.
    Number,
    /// A JSON number without a fractional part.
    Integer,
    /// `true` or `false`.
    Boolean,
    /// JSON `null`.
    Null,
    /// Anything at all.
    Any,
    /// A raw byte buffer (only satisfied by binary payloads).
    Bytes,
    /// Exactly this JSON value.
    Literal(Value),
    /// One of these strings.
    Enum(Vec<String>),
    /// An array whose items all match the inner shape.
    Array(Box<SchemaShape>),
    /// An object with these (ordered) fields.
    Object(IndexMap<String, SchemaShape>),
    /// An object whose values all match the inner shape.
    Record(Box<SchemaShape>),
    /// The inner shape, `null`, or absent.
    Optional(Box<SchemaShape>),
    /// The inner shape, or `null`.
    Nullable(Box<SchemaShape>),
    /// At least one of these shapes.
    Union(Vec<SchemaShape>),
}

/// One step into a value: an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Object field.
    Key(String),
    /// Array element.
    Index(usize),
}

/// A single validation failure, located by its path from the root value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Location of the failing value.
    pub path: Vec<PathSegment>,
    /// Human readable description.
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            return write!(f, "(root): {}", self.message);
        }
        let mut rendered = String::new();
        for (i, segment) in self.path.iter().enumerate() {
            match segment {
                PathSegment::Key(k) if i == 0 => rendered.push_str(k),
                PathSegment::Key(k) => {
                    rendered.push('.');
                    rendered.push_str(k);
                }
                PathSegment::Index(idx) => rendered.push_str(&format!("[{}]", idx)),
            }
        }
        write!(f, "{}: {}", rendered, self.message)
    }
}

/// The outcome of a failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Every issue found, in traversal order.
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.issues.iter().map(|i| i.to_string()).collect();
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for ValidationError {}

impl SchemaShape {
    /// Translates this shape into an equivalent Draft 7 JSON Schema.
    ///
    /// `bytes` becomes the `false` schema: no JSON value is a byte buffer.
    pub fn to_json_schema(&self) -> Value {
        match self {
            SchemaShape::String => json!({"type": "string"}),
            SchemaShape::Number => json!({"type": "number"}),
            SchemaShape::Integer => json!({"type": "integer"}),
            SchemaShape::Boolean => json!({"type": "boolean"}),
            SchemaShape::Null => json!({"type": "null"}),
            SchemaShape::Any => json!({}),
            SchemaShape::Bytes => Value::Bool(false),
            SchemaShape::Literal(value) => json!({"const": value}),
            SchemaShape::Enum(options) if options.is_empty() => Value::Bool(false),
            SchemaShape::Enum(options) => json!({"type": "string", "enum": options}),
            SchemaShape::Array(item) => json!({"type": "array", "items": item.to_json_schema()}),
            SchemaShape::Object(fields) => {
                let properties: Map<String, Value> = fields
                    .iter()
                    .map(|(name, shape)| (name.clone(), shape.to_json_schema()))
                    .collect();
                let required: Vec<&str> = fields
                    .iter()
                    .filter(|(_, shape)| !shape.accepts_missing())
                    .map(|(name, _)| name.as_str())
                    .collect();
                json!({"type": "object", "properties": properties, "required": required})
            }
            SchemaShape::Record(inner) => {
                json!({"type": "object", "additionalProperties": inner.to_json_schema()})
            }
            SchemaShape::Optional(inner) | SchemaShape::Nullable(inner) => {
                json!({"anyOf": [{"type": "null"}, inner.to_json_schema()]})
            }
            SchemaShape::Union(members) => match members.as_slice() {
                [] => Value::Bool(false),
                [only] => only.to_json_schema(),
                _ => {
                    let any_of: Vec<Value> = members.iter().map(SchemaShape::to_json_schema).collect();
                    json!({"anyOf": any_of})
                }
            },
        }
    }

    /// Whether an object field of this shape may be left out.
    pub fn accepts_missing(&self) -> bool {
        match self {
            SchemaShape::Any | SchemaShape::Optional(_) => true,
            SchemaShape::Nullable(inner) => inner.accepts_missing(),
            SchemaShape::Union(members) => members.iter().any(SchemaShape::accepts_missing),
            _ => false,
        }
    }

    /// Compiles this shape for validation.
    pub fn compile(&self) -> AppResult<CompiledShape> {
        CompiledShape::new(self.clone())
    }

    fn accepts_bytes(&self) -> bool {
        match self {
            SchemaShape::Bytes | SchemaShape::Any => true,
            SchemaShape::Optional(inner) | SchemaShape::Nullable(inner) => inner.accepts_bytes(),
            SchemaShape::Union(members) => members.iter().any(SchemaShape::accepts_bytes),
            _ => false,
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            SchemaShape::String => "string",
            SchemaShape::Number => "number",
            SchemaShape::Integer => "integer",
            SchemaShape::Boolean => "boolean",
            SchemaShape::Null => "null",
            SchemaShape::Any => "any",
            SchemaShape::Bytes => "Uint8Array",
            SchemaShape::Literal(_) => "literal",
            SchemaShape::Enum(_) => "enum",
            SchemaShape::Array(_) => "array",
            SchemaShape::Object(_) | SchemaShape::Record(_) => "object",
            SchemaShape::Optional(inner) | SchemaShape::Nullable(inner) => inner.describe(),
            SchemaShape::Union(_) => "union",
        }
    }
}

/// A [`SchemaShape`] paired with its compiled JSON Schema validator.
///
/// Serializes as the bare shape.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "SchemaShape", into = "SchemaShape")]
pub struct CompiledShape {
    shape: SchemaShape,
    validator: Arc<JSONSchema>,
}

impl CompiledShape {
    /// Compiles `shape` into a validator.
    pub fn new(shape: SchemaShape) -> AppResult<Self> {
        let schema = shape.to_json_schema();
        let validator = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(&schema)
            .map_err(|e| AppError::Schema(format!("{}", e)))?;
        Ok(Self {
            shape,
            validator: Arc::new(validator),
        })
    }

    /// The declared shape.
    pub fn shape(&self) -> &SchemaShape {
        &self.shape
    }

    /// Validates a JSON value.
    pub fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let errors = match self.validator.validate(value) {
            Ok(()) => return Ok(()),
            Err(errors) => errors,
        };
        let issues = errors.map(|error| to_issue(value, &error)).collect();
        Err(ValidationError { issues })
    }

    /// Validates a payload, which may be binary.
    pub fn validate_payload(&self, payload: &Payload) -> Result<(), ValidationError> {
        match payload {
            Payload::Json(value) => self.validate(value),
            Payload::Bytes(_) if self.shape.accepts_bytes() => Ok(()),
            Payload::Bytes(_) => Err(ValidationError {
                issues: vec![ValidationIssue {
                    path: Vec::new(),
                    message: format!("Expected {}, received Uint8Array", self.shape.describe()),
                }],
            }),
        }
    }

    /// Convenience boolean form of [`CompiledShape::validate`].
    pub fn accepts(&self, value: &Value) -> bool {
        self.validator.is_valid(value)
    }
}

impl fmt::Debug for CompiledShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CompiledShape").field(&self.shape).finish()
    }
}

impl PartialEq for CompiledShape {
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape
    }
}

impl TryFrom<SchemaShape> for CompiledShape {
    type Error = AppError;

    fn try_from(shape: SchemaShape) -> AppResult<Self> {
        Self::new(shape)
    }
}

impl From<CompiledShape> for SchemaShape {
    fn from(compiled: CompiledShape) -> Self {
        compiled.shape
    }
}

fn to_issue(root: &Value, error: &jsonschema::ValidationError<'_>) -> ValidationIssue {
    let mut path = locate(root, &error.instance_path.to_string());
    if let ValidationErrorKind::Required { property } = &error.kind {
        let field = match property.as_str() {
            Some(name) => name.to_string(),
            None => property.to_string(),
        };
        path.push(PathSegment::Key(field));
        return ValidationIssue {
            path,
            message: "Required".into(),
        };
    }
    ValidationIssue {
        path,
        message: error.to_string(),
    }
}

/// Resolves a JSON Pointer against `root`; numeric tokens are indices only where
/// the value at that point is an array.
fn locate(root: &Value, pointer: &str) -> Vec<PathSegment> {
    let mut path = Vec::new();
    let tokens = pointer.strip_prefix('/').unwrap_or(pointer);
    if tokens.is_empty() {
        return path;
    }

    let mut current = Some(root);
    for raw in tokens.split('/') {
        let token = raw.replace("~1", "/").replace("~0", "~");
        let segment = match (current, token.parse::<usize>()) {
            (Some(Value::Array(_)), Ok(idx)) => PathSegment::Index(idx),
            _ => PathSegment::Key(token),
        };
        current = current.and_then(|node| match &segment {
            PathSegment::Index(idx) => node.get(*idx),
            PathSegment::Key(key) => node.get(key.as_str()),
        });
        path.push(segment);
    }
    path
}
