//! # Inspect Command
//!
//! Runs discovery and aggregation without writing anything, and prints the
//! resulting keys (or the full JSON manifest).

use crate::error::CliResult;
use endpoint_schemas_core::{aggregate, discover_endpoints};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Arguments for the inspect command.
#[derive(clap::Args, Debug, Clone)]
pub struct InspectArgs {
    /// Root directory of all endpoints.
    #[clap(long, env = "ENDPOINT_SCHEMAS_ROOT")]
    pub root: PathBuf,

    /// Print the JSON manifest instead of the key list.
    #[clap(long)]
    pub json: bool,
}

/// Executes the inspect command, writing to `out`.
pub fn execute(args: &InspectArgs, invocation_dir: &Path, out: &mut impl Write) -> CliResult<()> {
    let root = invocation_dir.join(&args.root);
    let endpoints = discover_endpoints(&root)?;
    let map = aggregate(&endpoints)?;

    if args.json {
        writeln!(out, "{}", map.to_json_pretty()?)?;
        return Ok(());
    }

    for endpoint in &endpoints {
        for method in &endpoint.methods {
            writeln!(
                out,
                "{}::{}\t{}",
                endpoint.name,
                method,
                endpoint.file_path.display()
            )?;
        }
    }
    Ok(())
}
