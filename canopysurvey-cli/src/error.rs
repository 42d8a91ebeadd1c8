//! CLI error type.

use std::fmt;

use canopysurvey::config::ConfigError;
use canopysurvey::AreaError;

/// Errors surfaced by CLI commands.
#[derive(Debug)]
pub enum CliError {
    /// File read/write failed.
    Io(std::io::Error),

    /// The polygon file could not be parsed into a target area.
    Area(AreaError),

    /// The config file could not be loaded or saved.
    Config(ConfigError),

    /// A terminal prompt failed for a reason other than cancellation.
    Prompt(dialoguer::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Io(e) => write!(f, "I/O error: {}", e),
            CliError::Area(e) => write!(f, "Could not load target polygon: {}", e),
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::Prompt(e) => write!(f, "Prompt error: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Io(e) => Some(e),
            CliError::Area(e) => Some(e),
            CliError::Config(e) => Some(e),
            CliError::Prompt(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}

impl From<AreaError> for CliError {
    fn from(e: AreaError) -> Self {
        CliError::Area(e)
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e)
    }
}

impl From<dialoguer::Error> for CliError {
    fn from(e: dialoguer::Error) -> Self {
        CliError::Prompt(e)
    }
}
