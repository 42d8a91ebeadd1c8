//! Engine configuration.
//!
//! All policy constants the engine consumes live in [`EngineConfig`]:
//! sampling geometry (snap grid, click tolerance, minimum box area), the
//! FAO density thresholds, and the suggestion policy. Hosts can use the
//! defaults, build a config programmatically, or load overrides from the
//! user's INI config file at `~/.config/canopysurvey/config.ini`.

use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;

use crate::extrapolate::{DensityClass, DensityThresholds};
use crate::suggest::SuggestionPolicy;

/// Errors raised while loading or saving the config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File exists but is not valid INI.
    #[error("Failed to parse config file: {0}")]
    Parse(String),

    /// A value is present but unusable.
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    /// No home directory to resolve the default path against.
    #[error("Could not determine the user config directory")]
    NoConfigDir,
}

/// Geometry constants for sample measurement.
#[derive(Debug, Clone, Copy)]
pub struct SamplingConfig {
    /// Grid step for corner snapping, in meters.
    pub snap_step_m: f64,
    /// Minimum drag length for a diameter measurement; anything shorter is
    /// an accidental click.
    pub min_drag_m: f64,
    /// Minimum sample-box area; smaller boxes are rejected as degenerate.
    pub min_box_area_m2: f64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            snap_step_m: 0.5,
            min_drag_m: 0.05,
            min_box_area_m2: 1.0,
        }
    }
}

/// Top-level configuration passed to a survey session.
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineConfig {
    /// Sampling geometry constants.
    pub sampling: SamplingConfig,
    /// Canopy-percentage class cut points.
    pub thresholds: DensityThresholds,
    /// Suggestion policy constants.
    pub suggestion: SuggestionPolicy,
}

impl EngineConfig {
    /// Replace the density thresholds.
    pub fn with_thresholds(mut self, thresholds: DensityThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Replace the suggestion policy.
    pub fn with_suggestion(mut self, suggestion: SuggestionPolicy) -> Self {
        self.suggestion = suggestion;
        self
    }

    /// Replace the sampling constants.
    pub fn with_sampling(mut self, sampling: SamplingConfig) -> Self {
        self.sampling = sampling;
        self
    }
}

/// Default location of the user config file.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    Ok(base.join("canopysurvey").join("config.ini"))
}

/// The persisted configuration file.
///
/// Every key is optional; missing keys fall back to the engine defaults, so
/// a config file only carries the values the user actually changed.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    config: EngineConfig,
}

impl ConfigFile {
    /// Load the config from the default path.
    ///
    /// A missing file is not an error: defaults are returned.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load the config from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let ini =
            Ini::load_from_file(path).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let mut config = EngineConfig::default();

        if let Some(section) = ini.section(Some("sampling")) {
            if let Some(v) = section.get("snap_step_m") {
                config.sampling.snap_step_m = parse_f64("sampling.snap_step_m", v)?;
            }
            if let Some(v) = section.get("min_drag_m") {
                config.sampling.min_drag_m = parse_f64("sampling.min_drag_m", v)?;
            }
            if let Some(v) = section.get("min_box_area_m2") {
                config.sampling.min_box_area_m2 = parse_f64("sampling.min_box_area_m2", v)?;
            }
        }

        if let Some(section) = ini.section(Some("thresholds")) {
            if let Some(v) = section.get("open_pct") {
                config.thresholds.open_pct = parse_u8("thresholds.open_pct", v)?;
            }
            if let Some(v) = section.get("dense_pct") {
                config.thresholds.dense_pct = parse_u8("thresholds.dense_pct", v)?;
            }
            if let Some(v) = section.get("very_dense_pct") {
                config.thresholds.very_dense_pct = parse_u8("thresholds.very_dense_pct", v)?;
            }
        }

        if let Some(section) = ini.section(Some("suggestion")) {
            if let Some(v) = section.get("boundary") {
                config.suggestion.boundary =
                    v.parse::<DensityClass>()
                        .map_err(|_| ConfigError::InvalidValue {
                            key: "suggestion.boundary".to_string(),
                            value: v.to_string(),
                        })?;
            }
            if let Some(v) = section.get("reclassify_forest") {
                config.suggestion.reclassify_forest =
                    v.parse::<bool>().map_err(|_| ConfigError::InvalidValue {
                        key: "suggestion.reclassify_forest".to_string(),
                        value: v.to_string(),
                    })?;
            }
        }

        Ok(Self { config })
    }

    /// Save the full config to the default path, creating directories.
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save the full config to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let c = &self.config;
        let mut ini = Ini::new();
        ini.with_section(Some("sampling"))
            .set("snap_step_m", c.sampling.snap_step_m.to_string())
            .set("min_drag_m", c.sampling.min_drag_m.to_string())
            .set("min_box_area_m2", c.sampling.min_box_area_m2.to_string());
        ini.with_section(Some("thresholds"))
            .set("open_pct", c.thresholds.open_pct.to_string())
            .set("dense_pct", c.thresholds.dense_pct.to_string())
            .set("very_dense_pct", c.thresholds.very_dense_pct.to_string());
        ini.with_section(Some("suggestion"))
            .set("boundary", c.suggestion.boundary.tag_value())
            .set(
                "reclassify_forest",
                c.suggestion.reclassify_forest.to_string(),
            );

        ini.write_to_file(path)?;
        Ok(())
    }

    /// The effective engine configuration.
    pub fn engine_config(&self) -> EngineConfig {
        self.config
    }
}

impl From<EngineConfig> for ConfigFile {
    fn from(config: EngineConfig) -> Self {
        Self { config }
    }
}

fn parse_f64(key: &str, value: &str) -> Result<f64, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u8(key: &str, value: &str) -> Result<u8, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
