#![deny(missing_docs)]

//! # Generation Pipeline
//!
//! Discovery → Aggregation → Emission, driven by two directory questions.
//!
//! Everything the pipeline needs from its surroundings is explicit: the
//! invocation directory lives in [`GenerationConfig`], and the answers come from
//! a [`UserInput`] implementation (terminal prompt, CLI flags, or a fixed
//! [`AnswerMap`] in tests).

use crate::aggregate::{aggregate, EndpointKey};
use crate::discovery::{discover_endpoints, find_definition_files};
use crate::emit::{emit_client, write_output, ClientTemplate, MANIFEST_FILE, OUTPUT_FILE};
use crate::error::AppResult;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Key of the root directory question.
pub const ROOT_QUESTION_KEY: &str = "endpoint-root-dir";
/// Text of the root directory question.
pub const ROOT_QUESTION: &str = "What is the root directory of all your endpoints?";
/// Key of the destination directory question.
pub const DESTINATION_QUESTION_KEY: &str = "destination-dir";
/// Text of the destination directory question.
pub const DESTINATION_QUESTION: &str =
    "In which directory should the generated consumer client be placed?";

/// Answers directory questions.
pub trait UserInput {
    /// Asks `question` (identified by `key`), offering `suggestions`.
    ///
    /// `Ok(None)` means the question was left unanswered. Relative answers are
    /// resolved against the invocation directory by the caller.
    fn ask_directory(
        &self,
        key: &str,
        question: &str,
        suggestions: &[PathBuf],
    ) -> AppResult<Option<PathBuf>>;
}

/// Fixed answers by question key.
#[derive(Debug, Clone, Default)]
pub struct AnswerMap {
    answers: HashMap<String, PathBuf>,
}

impl AnswerMap {
    /// No answers at all.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an answer.
    pub fn with(mut self, key: impl Into<String>, answer: impl Into<PathBuf>) -> Self {
        self.answers.insert(key.into(), answer.into());
        self
    }
}

impl UserInput for AnswerMap {
    fn ask_directory(&self, key: &str, _question: &str, _suggestions: &[PathBuf]) -> AppResult<Option<PathBuf>> {
        Ok(self.answers.get(key).cloned())
    }
}

/// Environment of one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationConfig {
    /// Directory the tool was invoked from.
    pub invocation_dir: PathBuf,
    /// Replacement client template.
    pub template_path: Option<PathBuf>,
    /// Also write the JSON manifest.
    pub manifest: bool,
}

impl GenerationConfig {
    /// Defaults for the given invocation directory.
    pub fn new(invocation_dir: impl Into<PathBuf>) -> Self {
        Self {
            invocation_dir: invocation_dir.into(),
            template_path: None,
            manifest: false,
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.invocation_dir.join(path)
        }
    }
}

/// What a run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    /// The written client module.
    pub output_path: PathBuf,
    /// The written manifest, if requested.
    pub manifest_path: Option<PathBuf>,
    /// Every emitted key, in output order.
    pub keys: Vec<EndpointKey>,
}

/// Asks both questions, then generates.
///
/// Returns `Ok(None)` with a warning when either question goes unanswered.
pub fn run<I: UserInput + ?Sized>(
    input: &I,
    config: &GenerationConfig,
) -> AppResult<Option<GenerationReport>> {
    let root = input.ask_directory(
        ROOT_QUESTION_KEY,
        ROOT_QUESTION,
        &suggest_root(&config.invocation_dir),
    )?;
    let Some(root) = root else {
        tracing::warn!("Aborting - no root path chosen");
        return Ok(None);
    };

    let destination = input.ask_directory(
        DESTINATION_QUESTION_KEY,
        DESTINATION_QUESTION,
        &suggest_destinations(&config.invocation_dir),
    )?;
    let Some(destination) = destination else {
        tracing::warn!("Aborting - no destination path chosen");
        return Ok(None);
    };

    generate(&config.resolve(&root), &config.resolve(&destination), config).map(Some)
}

/// Discovers, aggregates and writes the client for `root` into `destination`.
pub fn generate(
    root: &Path,
    destination: &Path,
    config: &GenerationConfig,
) -> AppResult<GenerationReport> {
    let endpoints = discover_endpoints(root)?;
    if endpoints.is_empty() {
        tracing::warn!(root = %root.display(), "No endpoint definitions found, emitting an empty client");
    }

    let map = aggregate(&endpoints)?;

    let template = match &config.template_path {
        Some(path) => ClientTemplate::from_file(&config.resolve(path))?,
        None => ClientTemplate::builtin(),
    };
    let code = emit_client(&map, &template)?;
    let output_path = write_output(destination, OUTPUT_FILE, &code)?;
    tracing::info!(path = %output_path.display(), endpoints = endpoints.len(), "Wrote client");

    let manifest_path = if config.manifest {
        let path = write_output(destination, MANIFEST_FILE, &map.to_json_pretty()?)?;
        tracing::info!(path = %path.display(), "Wrote manifest");
        Some(path)
    } else {
        None
    };

    Ok(GenerationReport {
        output_path,
        manifest_path,
        keys: map.keys().cloned().collect(),
    })
}

/// Suggests the parent of the shallowest endpoint directory below `invocation_dir`.
pub fn suggest_root(invocation_dir: &Path) -> Vec<PathBuf> {
    let files = match find_definition_files(invocation_dir) {
        Ok(files) => files,
        Err(e) => {
            tracing::warn!(error = %e, "Could not scan for endpoint definitions");
            return Vec::new();
        }
    };
    files
        .into_iter()
        .min_by_key(|path| path.components().count())
        .and_then(|file| file.parent()?.parent().map(Path::to_path_buf))
        .into_iter()
        .collect()
}

/// Suggests sibling directories that already hold a generated client, then
/// `temp` and `dist` below the invocation directory.
pub fn suggest_destinations(invocation_dir: &Path) -> Vec<PathBuf> {
    let mut suggestions: Vec<PathBuf> = Vec::new();

    if let Some(Ok(entries)) = invocation_dir.parent().map(fs::read_dir) {
        let mut siblings: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_dir() && path.join(OUTPUT_FILE).is_file())
            .collect();
        siblings.sort();
        suggestions.extend(siblings);
    }

    for fallback in [invocation_dir.join("temp"), invocation_dir.join("dist")] {
        if !suggestions.contains(&fallback) {
            suggestions.push(fallback);
        }
    }
    suggestions
}
