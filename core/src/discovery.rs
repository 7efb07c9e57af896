#![deny(missing_docs)]

//! # Endpoint Discovery
//!
//! Walks a root directory looking for endpoint definition files
//! (`endpoint.yaml`, `endpoint.yml`, `endpoint.json`) and derives each endpoint's
//! name from the directory that contains it:
//!
//! ```text
//! functions/
//!   endpoint1/endpoint.yaml   -> "endpoint1"
//!   billing/refund/endpoint.json -> "refund"
//! ```
//!
//! The walk is sorted by file name so repeated runs see endpoints in the same order.

use crate::definition::declared_methods;
use crate::error::{AppError, AppResult};
use crate::method::HttpMethod;
use regex::Regex;
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use walkdir::{DirEntry, WalkDir};

const DEFINITION_FILE_PATTERN: &str = r"(?i)^endpoint\.(ya?ml|json)$";

/// Directories never descended into.
const SKIPPED_DIRECTORIES: [&str; 2] = ["node_modules", "target"];

/// A discovered endpoint definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointDescriptor {
    /// Endpoint name, taken from the containing directory.
    pub name: String,
    /// Path of the definition file.
    pub file_path: PathBuf,
    /// Methods declared at the top level of the definition.
    pub methods: BTreeSet<HttpMethod>,
}

fn definition_file_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(DEFINITION_FILE_PATTERN).expect("Invalid regex constant"))
}

/// Returns true when the file name follows the endpoint definition convention.
pub fn is_definition_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| definition_file_regex().is_match(n))
}

fn is_skipped(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || SKIPPED_DIRECTORIES.contains(&name.as_ref())
}

/// Lists definition files beneath `root` in deterministic order, without reading them.
///
/// Fails on the first entry the walk cannot read.
pub fn find_definition_files(root: &Path) -> AppResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_skipped(e));

    for entry in walker {
        let entry = entry.map_err(|e| {
            AppError::General(format!("Failed to walk endpoint root {:?}: {}", root, e))
        })?;
        if entry.file_type().is_file() && is_definition_file(entry.path()) {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

/// Derives the endpoint name for a definition file: the name of its parent directory.
pub fn endpoint_name(file_path: &Path) -> AppResult<String> {
    file_path
        .parent()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| AppError::Definition {
            path: file_path.to_path_buf(),
            reason: "cannot derive an endpoint name from its directory".into(),
        })
}

/// Discovers every endpoint beneath `root`.
///
/// Fails if `root` is not a directory, if a definition cannot be read, or if two
/// definitions resolve to the same endpoint name.
pub fn discover_endpoints(root: &Path) -> AppResult<Vec<EndpointDescriptor>> {
    if !root.is_dir() {
        return Err(AppError::General(format!(
            "Endpoint root directory not found: {:?}",
            root
        )));
    }

    let mut seen: HashMap<String, PathBuf> = HashMap::new();
    let mut endpoints = Vec::new();

    for file_path in find_definition_files(root)? {
        let name = endpoint_name(&file_path)?;

        if let Some(first) = seen.get(&name) {
            return Err(AppError::DuplicateEndpoint {
                name,
                first: first.clone(),
                second: file_path,
            });
        }

        let content = fs::read_to_string(&file_path).map_err(|e| AppError::Definition {
            path: file_path.clone(),
            reason: format!("unreadable: {}", e),
        })?;
        let methods = declared_methods(&file_path, &content)?;

        tracing::debug!(endpoint = %name, path = ?file_path, "discovered endpoint");

        seen.insert(name.clone(), file_path.clone());
        endpoints.push(EndpointDescriptor {
            name,
            file_path,
            methods,
        });
    }

    Ok(endpoints)
}
