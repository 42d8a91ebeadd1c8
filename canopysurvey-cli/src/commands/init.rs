//! Init command - write the default configuration file.

use canopysurvey::ConfigFile;

use crate::error::CliError;

/// Run the init command.
pub fn run() -> Result<(), CliError> {
    let path = ConfigFile::default().save()?;

    println!("Configuration file: {}", path.display());
    println!();
    println!("Edit this file to customize sampling and threshold settings.");
    println!("Missing keys fall back to built-in defaults.");
    Ok(())
}
