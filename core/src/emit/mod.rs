#![deny(missing_docs)]

//! # Client Code Emission
//!
//! Serializes an [`EndpointSchemasMap`] into a self-contained TypeScript module:
//!
//! 1. One `<Name>_EndpointSchemas` constant per endpoint, holding its zod shapes per method.
//! 2. `EndpointSchemasMap`, from endpoint name to that constant.
//! 3. `EndpointTypesMap`, from `"name::METHOD"` to the inferred request/response types.
//! 4. The fixed client template: `invokeEdge`, `fetchEdge` and their binding factories.
//!
//! The module imports nothing but `zod` and `@supabase/supabase-js`. Output is a
//! pure function of the map and the template, so regenerating unchanged input is
//! byte-identical.

pub mod naming;
pub mod zod;

use crate::aggregate::EndpointSchemasMap;
use crate::error::{AppError, AppResult};
use naming::{schemas_identifier, ts_string};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// File name of the generated client module.
pub const OUTPUT_FILE: &str = "EndpointMap.ts";

/// File name of the optional JSON manifest.
pub const MANIFEST_FILE: &str = "EndpointMap.json";

/// Line in the template replaced by the generated declarations.
pub const SCHEMAS_MARKER: &str = "/* @endpoint-schemas-map */";

/// Indentation unit of generated code.
pub(crate) const INDENT: &str = "    ";

const BUILTIN_TEMPLATE: &str = include_str!("../../templates/client.ts");

/// The module skeleton the declarations are spliced into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientTemplate {
    source: String,
}

impl ClientTemplate {
    /// The template shipped with this crate.
    pub fn builtin() -> Self {
        Self {
            source: BUILTIN_TEMPLATE.to_string(),
        }
    }

    /// Wraps a template source. It must contain [`SCHEMAS_MARKER`] exactly once.
    pub fn new(source: impl Into<String>) -> AppResult<Self> {
        let source = source.into();
        match source.matches(SCHEMAS_MARKER).count() {
            1 => Ok(Self { source }),
            0 => Err(AppError::Template(format!(
                "template does not contain the marker {}",
                SCHEMAS_MARKER
            ))),
            n => Err(AppError::Template(format!(
                "template contains the marker {} {} times",
                SCHEMAS_MARKER, n
            ))),
        }
    }

    /// Reads a template from disk.
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let source = fs::read_to_string(path)
            .map_err(|e| AppError::Template(format!("Could not read {:?}: {}", path, e)))?;
        Self::new(source)
    }

    /// Raw template text.
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl Default for ClientTemplate {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Renders the schema constants, `EndpointSchemasMap` and `EndpointTypesMap`.
///
/// Fails when two endpoint names collapse onto the same TypeScript identifier.
pub fn render_declarations(map: &EndpointSchemasMap) -> AppResult<String> {
    let grouped = map.by_endpoint();

    let mut identifiers: HashMap<String, &str> = HashMap::new();
    for name in grouped.keys() {
        let ident = schemas_identifier(name);
        if let Some(previous) = identifiers.insert(ident.clone(), *name) {
            return Err(AppError::General(format!(
                "Endpoints '{}' and '{}' both map to the TypeScript identifier {}",
                previous, name, ident
            )));
        }
    }

    let mut out = String::new();

    // 1. Per-endpoint constants
    for (name, methods) in &grouped {
        out.push_str(&format!("const {} = {{\n", schemas_identifier(name)));
        for (method, io) in methods {
            out.push_str(&format!("{}{}: {{\n", INDENT, ts_string(method.as_str())));
            out.push_str(&format!(
                "{}request: {},\n",
                INDENT.repeat(2),
                zod::render_shape(io.request.shape(), 2)
            ));
            out.push_str(&format!(
                "{}response: {},\n",
                INDENT.repeat(2),
                zod::render_shape(io.response.shape(), 2)
            ));
            out.push_str(&format!("{}}},\n", INDENT));
        }
        out.push_str("};\n\n");
    }

    // 2. Name -> constant
    out.push_str("const EndpointSchemasMap = {");
    if grouped.is_empty() {
        out.push_str("};\n\n");
    } else {
        out.push('\n');
        for name in grouped.keys() {
            out.push_str(&format!(
                "{}{}: {},\n",
                INDENT,
                ts_string(name),
                schemas_identifier(name)
            ));
        }
        out.push_str("};\n\n");
    }

    // 3. "name::METHOD" -> inferred types
    out.push_str("type EndpointTypesMap = {");
    if map.is_empty() {
        out.push_str("};\n");
    } else {
        out.push('\n');
        for key in map.keys() {
            let ident = schemas_identifier(&key.name);
            let method = ts_string(key.method.as_str());
            out.push_str(&format!("{}{}: {{\n", INDENT, ts_string(&key.to_string())));
            for side in ["request", "response"] {
                out.push_str(&format!(
                    "{}{}: z.infer<typeof {}[{}]['{}']>,\n",
                    INDENT.repeat(2),
                    side,
                    ident,
                    method,
                    side
                ));
            }
            out.push_str(&format!("{}}},\n", INDENT));
        }
        out.push_str("};\n");
    }

    Ok(out)
}

/// Produces the full client module source.
pub fn emit_client(map: &EndpointSchemasMap, template: &ClientTemplate) -> AppResult<String> {
    let declarations = render_declarations(map)?;
    Ok(template
        .source
        .replacen(SCHEMAS_MARKER, declarations.trim_end(), 1))
}

/// Writes `contents` to `destination/file_name`, creating the directory if needed.
///
/// The file is replaced wholesale.
pub fn write_output(destination: &Path, file_name: &str, contents: &str) -> AppResult<std::path::PathBuf> {
    if !destination.exists() {
        fs::create_dir_all(destination).map_err(|e| {
            AppError::General(format!("Failed to create output directory {:?}: {}", destination, e))
        })?;
    }
    let path = destination.join(file_name);
    fs::write(&path, contents)
        .map_err(|e| AppError::General(format!("Failed to write file {:?}: {}", path, e)))?;
    Ok(path)
}
