//! CanopySurvey - statistical vegetation-density sampling for map surveys
//!
//! This library implements the sampling & extrapolation engine behind the
//! `canopysurvey` tool: a surveyor measures a small representative sample
//! box inside a large polygon, calibrates the average crown diameter,
//! counts individual plants by hand, and the engine extrapolates canopy
//! percentage, an FAO-style density class, a full-polygon stem count, and
//! mean inter-individual spacing.
//!
//! The engine is host-agnostic. The [`survey::SurveySession`] state machine
//! consumes [`survey::SurveyEvent`]s and returns [`survey::Effect`]
//! descriptors; a host adapter (the bundled CLI, a map-editor plugin, a
//! test harness) translates its native input into events and performs the
//! effects. Nothing is written to the host until a survey finalizes
//! successfully, so cancellation at any point is free.

pub mod area;
pub mod calibration;
pub mod config;
pub mod counting;
pub mod extrapolate;
pub mod geom;
pub mod logging;
pub mod report;
pub mod sample;
pub mod suggest;
pub mod survey;
pub mod tags;

pub use area::{resolve_area, AreaError, Ring, TargetArea, TargetKind};
pub use config::{ConfigFile, EngineConfig, SamplingConfig};
pub use extrapolate::{DensityClass, DensityThresholds, SurveyResult, VegetationKind};
pub use geom::Point;
pub use report::AuditRecord;
pub use survey::{Choice, Effect, SurveyError, SurveyEvent, SurveyPhase, SurveySession};
