#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Entry point for the carbon sense toolchain.
//!
//! Runs one of the `generate`, `detect`, or `verify` subcommands, or the
//! interactive menu when no subcommand is given. Output is JSON on stdout.
//!
//! Uses `indicatif-log-bridge` (via [`carbon_sense_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and the verification progress bar never fight for the terminal.

mod commands;
mod config;
mod interactive;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::{DetectArgs, GenerateArgs};

#[derive(Parser, Debug)]
#[command(name = "carbon_sense", about = "Carbon sensing anomaly toolchain")]
struct Cli {
    /// Configuration file (defaults to `$CARBON_SENSE_CONFIG`, then the
    /// built-in defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate synthetic anomalies around a drawn area
    Generate(GenerateArgs),
    /// Detect anomalies from measured carbon metrics
    Detect(DetectArgs),
    /// Run a verification session with a progress display
    Verify(DetectArgs),
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = carbon_sense_cli_utils::init_logger();
    let cli = Cli::parse();
    let config = config::load(cli.config.as_deref())?;

    let Some(command) = cli.command else {
        println!("Carbon Sense Toolchain");
        println!();
        return interactive::run(&config, &multi);
    };

    let output = match command {
        Commands::Generate(args) => commands::generate(&args, &config)?,
        Commands::Detect(args) => commands::detect(&args, &config)?,
        Commands::Verify(args) => commands::verify(&args, &config, &multi)?,
    };

    println!("{output}");

    Ok(())
}
