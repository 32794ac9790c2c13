//! tlgen CLI - TL schema to C++ binding generator
//!
//! Commands:
//! - `tlgen generate` - Regenerate `functions.hpp` / `types.hpp`
//! - `tlgen check` - Parse and validate schemas without writing
//! - `tlgen clean` - Remove generated headers
//! - `tlgen decode` - Decode a hex-encoded TL object to JSON

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tlgen_core::GenerateError;
use tlgen_wire::WireError;

mod decode;
mod generate;
mod logging;
mod manifest;

#[derive(Parser)]
#[command(name = "tlgen")]
#[command(author, version, about = "Generate C++ bindings from TL schemas", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Regenerate bindings, replacing previous output
    Generate {
        /// Path to tlgen.toml manifest (default: ./tlgen.toml if present)
        #[arg(short, long)]
        manifest: Option<PathBuf>,

        /// Output directory for generated headers
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Schema file for a layer, as LAYER=PATH (repeatable)
        #[arg(short, long = "layer", value_name = "LAYER=PATH")]
        layers: Vec<String>,
    },

    /// Parse and validate schemas, then report counts
    Check {
        /// Path to tlgen.toml manifest (default: ./tlgen.toml if present)
        #[arg(short, long)]
        manifest: Option<PathBuf>,

        /// Schema file for a layer, as LAYER=PATH (repeatable)
        #[arg(short, long = "layer", value_name = "LAYER=PATH")]
        layers: Vec<String>,
    },

    /// Remove generated headers
    Clean {
        /// Path to tlgen.toml manifest (default: ./tlgen.toml if present)
        #[arg(short, long)]
        manifest: Option<PathBuf>,

        /// Output directory holding generated headers
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Decode a boxed TL object and print it as JSON
    Decode {
        /// Path to tlgen.toml manifest (default: ./tlgen.toml if present)
        #[arg(short, long)]
        manifest: Option<PathBuf>,

        /// Schema file for a layer, as LAYER=PATH (repeatable)
        #[arg(short, long = "layer", value_name = "LAYER=PATH")]
        layers: Vec<String>,

        /// Hex-encoded object bytes
        #[arg(long)]
        hex: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}

fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Generate {
            manifest,
            output,
            layers,
        } => {
            let inputs = generate::resolve(manifest.as_deref(), &layers, output.as_deref())?;
            generate::run(inputs)?;
        }
        Commands::Check { manifest, layers } => {
            let inputs = generate::resolve(manifest.as_deref(), &layers, None)?;
            generate::check(inputs)?;
        }
        Commands::Clean { manifest, output } => {
            let inputs = generate::resolve(manifest.as_deref(), &[], output.as_deref())?;
            generate::clean(inputs.config)?;
        }
        Commands::Decode {
            manifest,
            layers,
            hex,
        } => {
            let inputs = generate::resolve(manifest.as_deref(), &layers, None)?;
            decode::run(inputs, &hex)?;
        }
    }

    Ok(())
}

/// Process exit status: the library error code when there is one, else 1.
fn exit_code(err: &anyhow::Error) -> u8 {
    if let Some(e) = err.downcast_ref::<GenerateError>() {
        e.error_code()
    } else if let Some(e) = err.downcast_ref::<WireError>() {
        e.error_code()
    } else {
        1
    }
}
