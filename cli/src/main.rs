#![deny(missing_docs)]

//! # Endpoint Schemas CLI
//!
//! Command Line Interface for the endpoint schema client generator.
//!
//! Supported Commands:
//! - `generate`: Discovers endpoint definitions and writes `EndpointMap.ts`.
//! - `inspect`: Prints the aggregated endpoint keys or the JSON manifest.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::error::CliResult;
use crate::prompt::TerminalInput;

mod error;
mod generate;
mod inspect;
mod prompt;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Endpoint schemas client generator")]
struct Cli {
    /// Raise log verbosity (-v, -vv). `RUST_LOG` takes precedence.
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate the consumer client from endpoint definitions.
    Generate(generate::GenerateArgs),
    /// Show what would be generated, without writing anything.
    Inspect(inspect::InspectArgs),
}

fn init_tracing(verbose: u8) {
    let filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            0 => "warn,endpoint_schemas_core=info".to_string(),
            1 => "info,endpoint_schemas_core=debug,endpoint_schemas=debug".to_string(),
            _ => "debug,endpoint_schemas_core=trace,endpoint_schemas=trace".to_string(),
        },
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let invocation_dir = std::env::current_dir()?;

    match &cli.command {
        Commands::Generate(args) => {
            // Terminal prompt answers whatever the flags leave open
            let prompt = TerminalInput::stdio();
            generate::execute(args, &invocation_dir, &prompt)?;
        }
        Commands::Inspect(args) => {
            inspect::execute(args, &invocation_dir, &mut std::io::stdout().lock())?;
        }
    }

    Ok(())
}
