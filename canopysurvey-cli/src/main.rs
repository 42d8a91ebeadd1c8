//! CanopySurvey CLI - terminal host adapter for the survey engine.
//!
//! Loads a target polygon from a GeoJSON file and walks a surveyor through
//! a full sampling session at the terminal: metadata prompts, sample-box
//! corner entry, diameter calibration, item counting, and the finalize /
//! suggestion flow. All survey logic lives in the `canopysurvey` library;
//! this binary only translates terminal input into engine events and
//! renders the engine's effects.

mod commands;
mod error;
mod prompts;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use console::style;

use canopysurvey::ConfigFile;

#[derive(Parser)]
#[command(name = "canopysurvey", version, about = "Statistical vegetation-density sampling")]
struct Cli {
    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run an interactive survey over a target polygon.
    Survey {
        /// GeoJSON file holding the target Polygon or MultiPolygon.
        polygon: PathBuf,

        /// Name of the imagery layer the survey is read from. Omit to
        /// trigger the missing-imagery warning.
        #[arg(long)]
        imagery: Option<String>,
    },

    /// Print the resolved net area of a target polygon.
    Area {
        /// GeoJSON file holding the target Polygon or MultiPolygon.
        polygon: PathBuf,
    },

    /// Write the default configuration file.
    Init,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    canopysurvey::logging::init(cli.verbose);

    let config = match ConfigFile::load() {
        Ok(file) => file.engine_config(),
        Err(err) => {
            eprintln!(
                "{} {} (using defaults)",
                style("warning:").yellow().bold(),
                err
            );
            canopysurvey::EngineConfig::default()
        }
    };

    let result = match cli.command {
        Command::Survey { polygon, imagery } => commands::survey::run(&polygon, imagery, config),
        Command::Area { polygon } => commands::area::run(&polygon),
        Command::Init => commands::init::run(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {}", style("error:").red().bold(), err);
            ExitCode::FAILURE
        }
    }
}
