#![deny(missing_docs)]

//! # Generate Command
//!
//! Resolves the endpoint root and the destination directory, then writes
//! `EndpointMap.ts` (and optionally `EndpointMap.json`) through the core pipeline.
//!
//! Answers come from flags or their environment variables first. Anything left
//! open is asked on the terminal, unless `--no-input` is set, in which case the
//! run aborts with a warning.

use crate::error::CliResult;
use crate::prompt::ArgsInput;
use endpoint_schemas_core::generator::{self, DESTINATION_QUESTION_KEY, ROOT_QUESTION_KEY};
use endpoint_schemas_core::{GenerationConfig, UserInput};
use std::path::{Path, PathBuf};

/// Arguments for the generate command.
#[derive(clap::Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Root directory of all endpoints.
    #[clap(long, env = "ENDPOINT_SCHEMAS_ROOT")]
    pub root: Option<PathBuf>,

    /// Directory the generated client is written to.
    #[clap(long, env = "ENDPOINT_SCHEMAS_DEST")]
    pub dest: Option<PathBuf>,

    /// Client template to use instead of the built-in one.
    #[clap(long)]
    pub template: Option<PathBuf>,

    /// Also write `EndpointMap.json`.
    #[clap(long)]
    pub manifest: bool,

    /// Never prompt; unanswered questions abort the run.
    #[clap(long)]
    pub no_input: bool,
}

/// Executes the generate command.
///
/// # Arguments
///
/// * `args` - Command arguments.
/// * `invocation_dir` - Directory relative answers resolve against.
/// * `prompt` - Asked for whatever the arguments leave open.
pub fn execute(args: &GenerateArgs, invocation_dir: &Path, prompt: &dyn UserInput) -> CliResult<()> {
    let fallback = if args.no_input { None } else { Some(prompt) };
    let input = ArgsInput::new(fallback)
        .preset(ROOT_QUESTION_KEY, args.root.as_ref())
        .preset(DESTINATION_QUESTION_KEY, args.dest.as_ref());

    let config = GenerationConfig {
        invocation_dir: invocation_dir.to_path_buf(),
        template_path: args.template.clone(),
        manifest: args.manifest,
    };

    if let Some(report) = generator::run(&input, &config)? {
        println!(
            "Generated {} endpoint method(s) into {}",
            report.keys.len(),
            report.output_path.display()
        );
        if let Some(manifest) = report.manifest_path {
            println!("Manifest written to {}", manifest.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use endpoint_schemas_core::{AnswerMap, AppError};
    use std::fs;
    use tempfile::tempdir;

    fn args(root: Option<&str>, dest: Option<&str>) -> GenerateArgs {
        GenerateArgs {
            root: root.map(PathBuf::from),
            dest: dest.map(PathBuf::from),
            template: None,
            manifest: false,
            no_input: true,
        }
    }

    fn write_endpoint(dir: &Path) {
        fs::create_dir_all(dir).unwrap();
        fs::write(
            dir.join("endpoint.yaml"),
            "POST: { request: { object: { bundle_id: number } }, response: { object: { success: boolean } } }\n",
        )
        .unwrap();
    }

    #[test]
    fn test_generate_from_flags() {
        let dir = tempdir().unwrap();
        write_endpoint(&dir.path().join("functions/endpoint1"));

        execute(&args(Some("functions"), Some("client")), dir.path(), &AnswerMap::new()).unwrap();

        let code = fs::read_to_string(dir.path().join("client/EndpointMap.ts")).unwrap();
        assert!(code.contains("'endpoint1::POST':"));
    }

    #[test]
    fn test_prompt_fills_missing_answers() {
        let dir = tempdir().unwrap();
        write_endpoint(&dir.path().join("functions/endpoint1"));
        let prompt = AnswerMap::new().with(DESTINATION_QUESTION_KEY, "out");

        let mut interactive = args(Some("functions"), None);
        interactive.no_input = false;
        execute(&interactive, dir.path(), &prompt).unwrap();
        assert!(dir.path().join("out/EndpointMap.ts").exists());
    }

    #[test]
    fn test_no_input_without_answers_is_not_an_error() {
        let dir = tempdir().unwrap();
        let prompt = AnswerMap::new().with(DESTINATION_QUESTION_KEY, "out");

        execute(&args(Some("."), None), dir.path(), &prompt).unwrap();
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_duplicate_endpoints_fail() {
        let dir = tempdir().unwrap();
        write_endpoint(&dir.path().join("functions/a/orders"));
        write_endpoint(&dir.path().join("functions/b/orders"));

        let err = execute(&args(Some("functions"), Some("client")), dir.path(), &AnswerMap::new()).unwrap_err();
        assert!(matches!(err, CliError::Core(AppError::DuplicateEndpoint { .. })));
    }
}
