//! Extrapolation from sample to target.
//!
//! Turns the frozen measurements of one survey (sample-box geometry, mean
//! crown diameter, item count) into the full-polygon estimate: canopy
//! percentage, density class, extrapolated stem count, and mean spacing.
//!
//! The computation is pure and deterministic: identical inputs always
//! produce identical output, so regression tests can pin exact values.

use std::f64::consts::PI;

use serde::Serialize;

use crate::area::TargetArea;
use crate::counting::CountedItem;
use crate::sample::SampleBox;

/// Canopy percentage is reported to the nearest 5 %.
pub const CANOPY_ROUND_STEP_PCT: f64 = 5.0;

/// What kind of vegetation is being counted.
///
/// Fixes the tag vocabulary used downstream (crown vs shrub); the math is
/// identical for all kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VegetationKind {
    /// Individual trees.
    Trees,
    /// Bushes.
    Bushes,
    /// Heathland plants.
    Heathland,
}

impl VegetationKind {
    /// Singular noun for prompts and status text.
    pub fn singular(&self) -> &'static str {
        match self {
            VegetationKind::Trees => "tree",
            VegetationKind::Bushes => "bush",
            VegetationKind::Heathland => "plant",
        }
    }

    /// Suffix for the `est:avg_*` diameter tag.
    pub fn diameter_tag_suffix(&self) -> &'static str {
        match self {
            VegetationKind::Trees => "crown",
            VegetationKind::Bushes | VegetationKind::Heathland => "shrub",
        }
    }

    /// Marker vocabulary the host uses while rendering counted items.
    pub fn marker_value(&self) -> &'static str {
        match self {
            VegetationKind::Trees => "tree",
            VegetationKind::Bushes | VegetationKind::Heathland => "shrub",
        }
    }
}

impl std::fmt::Display for VegetationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VegetationKind::Trees => write!(f, "Trees"),
            VegetationKind::Bushes => write!(f, "Bushes"),
            VegetationKind::Heathland => write!(f, "Heathland Plants"),
        }
    }
}

/// Ordered canopy-density bins.
///
/// The ordering is meaningful: `Scattered < Open < Dense < VeryDense`, and
/// the suggestion policy compares classes against a boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum DensityClass {
    /// Below the open threshold.
    Scattered,
    /// Sparse but continuous cover.
    Open,
    /// Closed-canopy territory.
    Dense,
    /// Near-complete cover.
    VeryDense,
}

impl DensityClass {
    /// The `wood:density` tag value for this class.
    pub fn tag_value(&self) -> &'static str {
        match self {
            DensityClass::Scattered => "scattered",
            DensityClass::Open => "open",
            DensityClass::Dense => "dense",
            DensityClass::VeryDense => "very_dense",
        }
    }
}

impl std::fmt::Display for DensityClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag_value())
    }
}

impl std::str::FromStr for DensityClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scattered" => Ok(DensityClass::Scattered),
            "open" => Ok(DensityClass::Open),
            "dense" => Ok(DensityClass::Dense),
            "very_dense" => Ok(DensityClass::VeryDense),
            other => Err(format!("unknown density class: {}", other)),
        }
    }
}

/// Canopy-percentage cut points between the four density classes.
///
/// Defaults follow the FAO-derived constants the original field tool
/// shipped with. These are policy constants, configurable and testable,
/// never derived from first principles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DensityThresholds {
    /// Minimum canopy % for `Open`.
    pub open_pct: u8,
    /// Minimum canopy % for `Dense`.
    pub dense_pct: u8,
    /// Minimum canopy % for `VeryDense`.
    pub very_dense_pct: u8,
}

impl Default for DensityThresholds {
    fn default() -> Self {
        Self {
            open_pct: 10,
            dense_pct: 40,
            very_dense_pct: 70,
        }
    }
}

impl DensityThresholds {
    /// Classify a canopy percentage into its density bin.
    pub fn classify(&self, canopy_percent: u8) -> DensityClass {
        if canopy_percent >= self.very_dense_pct {
            DensityClass::VeryDense
        } else if canopy_percent >= self.dense_pct {
            DensityClass::Dense
        } else if canopy_percent >= self.open_pct {
            DensityClass::Open
        } else {
            DensityClass::Scattered
        }
    }
}

/// The frozen outcome of one survey.
///
/// Computed exactly once per finalize from a snapshot of all prior
/// measurements; never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct SurveyResult {
    /// Canopy cover, rounded to the nearest 5 %.
    pub canopy_percent: u8,
    /// Density bin for `canopy_percent`.
    pub density_class: DensityClass,
    /// Estimated individuals across the whole target.
    pub stem_count: u64,
    /// Mean measured diameter in meters.
    pub mean_diameter_m: f64,
    /// Mean gap between neighboring individuals; `None` at zero density.
    pub mean_spacing_m: Option<f64>,
    /// Net target area in square meters.
    pub source_area_m2: f64,
    /// Planar sample-box area in square meters.
    pub sample_area_m2: f64,
    /// Individuals per square meter inside the sample box.
    pub density_per_m2: f64,
    /// Raw number of counted individuals.
    pub count: usize,
    /// What was counted.
    pub vegetation_kind: VegetationKind,
}

/// Extrapolate a frozen sample to the full target area.
///
/// Steps, in order (rounding rules are part of the contract):
/// 1. `sample_area` is the planar product of the snapped box dimensions.
/// 2. `density = count / sample_area`.
/// 3. `crown_area = π (d/2)²`; the raw canopy fraction
///    `min(1.0, crown_area · count / sample_area)` is rounded to the
///    nearest 5 %.
/// 4. The class comes from `thresholds`.
/// 5. `stem_count = round(density · target_area)`.
/// 6. `mean_spacing = sqrt(1 / density)`, not applicable at zero density.
///
/// A zero sample area is a precondition violation rejected when the box is
/// committed; it cannot reach this function.
pub fn compute(
    target: &TargetArea,
    sample_box: &SampleBox,
    mean_diameter_m: f64,
    items: &[CountedItem],
    vegetation_kind: VegetationKind,
    thresholds: &DensityThresholds,
) -> SurveyResult {
    let sample_area_m2 = sample_box.area_m2();
    let count = items.len();
    let density_per_m2 = count as f64 / sample_area_m2;

    let crown_area = PI * (mean_diameter_m / 2.0).powi(2);
    let canopy_fraction = (crown_area * count as f64 / sample_area_m2).min(1.0);
    let canopy_percent = round_to_step(canopy_fraction * 100.0, CANOPY_ROUND_STEP_PCT) as u8;

    let density_class = thresholds.classify(canopy_percent);

    let source_area_m2 = target.resolve_area();
    let stem_count = (density_per_m2 * source_area_m2).round() as u64;

    let mean_spacing_m = if density_per_m2 > 0.0 {
        Some((1.0 / density_per_m2).sqrt())
    } else {
        None
    };

    tracing::debug!(
        count,
        canopy_percent,
        class = %density_class,
        stem_count,
        "Extrapolation computed"
    );

    SurveyResult {
        canopy_percent,
        density_class,
        stem_count,
        mean_diameter_m,
        mean_spacing_m,
        source_area_m2,
        sample_area_m2,
        density_per_m2,
        count,
        vegetation_kind,
    }
}

/// Round to the nearest multiple of `step`.
fn round_to_step(value: f64, step: f64) -> f64 {
    (value / step).round() * step
}
