//! Survey audit record.
//!
//! A successful survey can be exported as a plain-text record holding the
//! survey metadata, the applied tags, and the literal coordinates of every
//! measurement: sample-box corners, diameter segment endpoints, and counted
//! items. The engine only produces the record's content: writing it to a
//! file is the host's job.
//!
//! The record also derives `Serialize` so hosts that want a structured copy
//! can emit JSON instead of (or next to) the text form.

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::area::TargetKind;
use crate::calibration::DiameterSegment;
use crate::counting::CountedItem;
use crate::geom::Point;

/// Tool version stamped into record headers.
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// How the suggestion phase ended, for the record's status line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SuggestionOutcome {
    /// No suggestion applied to this target.
    NotApplicable,
    /// The surveyor accepted the proposed change.
    Accepted { from: String, to: String },
    /// The surveyor declined; tags written without the change.
    Declined { proposed: String },
}

impl std::fmt::Display for SuggestionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuggestionOutcome::NotApplicable => write!(f, "None"),
            SuggestionOutcome::Accepted { from, to } => {
                write!(f, "Accepted: Changed {} -> {}", from, to)
            }
            SuggestionOutcome::Declined { proposed } => {
                write!(f, "Declined: Kept current tag (proposed {})", proposed)
            }
        }
    }
}

/// Everything a finished survey leaves behind, ready to render.
#[derive(Debug, Clone, Serialize)]
pub struct AuditRecord {
    /// Imagery layer the survey was read from.
    pub imagery_source: String,
    /// Imagery capture date, when known.
    pub imagery_date: Option<String>,
    /// Host object id.
    pub target_id: i64,
    /// Host object kind.
    pub target_kind: TargetKind,
    /// The target's primary category before the survey.
    pub surveyed_category: String,
    /// Net target area in square meters.
    pub target_area_m2: f64,
    /// How the suggestion phase ended.
    pub suggestion: SuggestionOutcome,
    /// The tags applied to the target, in application order.
    pub tags: Vec<(String, String)>,
    /// Snapped sample-box width in meters.
    pub box_width_m: f64,
    /// Snapped sample-box height in meters.
    pub box_height_m: f64,
    /// Planar sample-box area in square meters.
    pub box_area_m2: f64,
    /// The four geographic box corners.
    pub box_corners: Vec<Point>,
    /// Every diameter measurement, oldest first.
    pub calibration: Vec<DiameterSegment>,
    /// Every counted individual, in click order.
    pub items: Vec<CountedItem>,
}

impl AuditRecord {
    /// Render the record as plain text.
    ///
    /// The timestamp is injected by the host; the engine never reads the
    /// clock itself.
    pub fn render(&self, timestamp: DateTime<Local>) -> String {
        let mut out = String::new();

        out.push_str(
            "=========================================================================\n",
        );
        out.push_str(" VEGETATION DENSITY SURVEY LOG\n");
        out.push_str(&format!(" Tool: canopysurvey v{}\n", TOOL_VERSION));
        out.push_str(
            "=========================================================================\n\n",
        );

        out.push_str("METADATA\n--------\n");
        out.push_str(&format!(
            "Survey Date:       {}\n",
            timestamp.format("%Y-%m-%d %H:%M:%S")
        ));
        out.push_str(&format!("Imagery Source:    {}\n", self.imagery_source));
        if let Some(date) = &self.imagery_date {
            out.push_str(&format!("Imagery Date:      {}\n", date));
        }
        out.push_str(&format!(
            "Target Object:     {} ({})\n",
            self.target_id, self.target_kind
        ));
        out.push_str(&format!("Surveyed Type:     {}\n", self.surveyed_category));
        out.push_str(&format!(
            "Target Area Size:  {:.1} m2\n\n",
            self.target_area_m2
        ));

        out.push_str("SUGGESTION\n----------\n");
        out.push_str(&format!("Status: {}\n\n", self.suggestion));

        out.push_str("RESULTING TAGS\n--------------\n");
        for (key, value) in &self.tags {
            out.push_str(&format!("{}: {}\n", key, value));
        }

        out.push_str("\nAPPENDIX\n--------\n");
        out.push_str(&format!(
            "[1] Sample Box: {:.1}m x {:.1}m | {:.1} m2\n",
            self.box_width_m, self.box_height_m, self.box_area_m2
        ));
        for (index, corner) in self.box_corners.iter().enumerate() {
            out.push_str(&format!("    Corner {}: {}\n", index + 1, corner));
        }

        out.push_str("[2] Calibrations (Diameters):\n");
        for (index, segment) in self.calibration.iter().enumerate() {
            out.push_str(&format!(
                "  #{}: {:.1}m | ({:.6},{:.6})->({:.6},{:.6})\n",
                index + 1,
                segment.length_m,
                segment.start.lat,
                segment.start.lon,
                segment.end.lat,
                segment.end.lon
            ));
        }

        out.push_str("[3] Counted Items:\n");
        for item in &self.items {
            out.push_str(&format!("  #{}: {}\n", item.ordinal, item.location));
        }

        out
    }

    /// Default filename for the host's save dialog.
    pub fn default_filename(&self, timestamp: DateTime<Local>) -> String {
        format!(
            "CanopySurvey_{}_{}.txt",
            self.target_id,
            timestamp.timestamp()
        )
    }
}
