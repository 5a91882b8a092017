//! `strata` command-line front end.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p strata-cli -- preview --seed 7 --topology Alpine`.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use strata_config::{CliArgs, Config, default_config_dir};
use tracing::error;

use crate::commands::CliError;

#[derive(Parser, Debug)]
#[command(name = "strata", version, about = "Procedural terrain generator")]
struct Cli {
    #[command(flatten)]
    args: CliArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Print height, climate, biome and material at one point.
    Sample {
        #[arg(long, allow_hyphen_values = true)]
        x: f64,
        #[arg(long, allow_hyphen_values = true)]
        z: f64,
    },
    /// Render the top-down preview image.
    Preview {
        /// Output PNG. Defaults to `<output_dir>/<name>.png`.
        #[arg(long)]
        out: Option<PathBuf>,
        /// Also export a 16-bit grayscale heightmap here.
        #[arg(long)]
        heightmap: Option<PathBuf>,
    },
    /// Write the whole map as voxel batches.
    Voxels {
        /// Store file. Defaults to `<output_dir>/<name>.svb`.
        #[arg(long)]
        out: Option<PathBuf>,
        /// Cancel once this many batches are written.
        #[arg(long)]
        max_batches: Option<usize>,
    },
    /// Emit the Luau generator for an external voxel host.
    Script {
        /// Output file. Printed to stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print the resolved config.
    Config {
        /// Write it back to `config.ron`.
        #[arg(long)]
        save: bool,
    },
}

fn run(command: Command, config: &Config, config_dir: &std::path::Path) -> Result<(), CliError> {
    match command {
        Command::Sample { x, z } => print!("{}", commands::sample(config, x, z)),
        Command::Preview { out, heightmap } => {
            let path = commands::preview(config, out.as_deref(), heightmap.as_deref())?;
            println!("Preview written to {}", path.display());
        }
        Command::Voxels { out, max_batches } => {
            commands::voxels(config, out.as_deref(), max_batches)?;
        }
        Command::Script { out } => {
            let text = commands::script(config, out.as_deref())?;
            if out.is_none() {
                print!("{text}");
            }
        }
        Command::Config { save } => println!("{}", commands::config(config, config_dir, save)?),
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config_dir = cli.args.config.clone().unwrap_or_else(default_config_dir);
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    if let Err(e) = config.apply_cli_overrides(&cli.args) {
        eprintln!("Invalid argument: {e}");
        return ExitCode::from(2);
    }

    let log_dir = config_dir.join("logs");
    strata_log::init_logging(
        Some(&log_dir),
        cfg!(debug_assertions) || config.debug.file_logging,
        Some(&config),
    );

    match run(cli.command, &config, &config_dir) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
