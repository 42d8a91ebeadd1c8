//! Result tag rendering.
//!
//! On a successful finalize the survey is exported as a set of key/value
//! string tags merged onto the target by the host. Keys, value formats, and
//! ordering are stable so repeat surveys diff cleanly.

use regex::Regex;
use serde::Serialize;

use crate::extrapolate::SurveyResult;

/// Tool attribution appended to the `source` tag.
const TOOL_ATTRIBUTION: &str = "canopysurvey";

/// Metadata captured before measuring begins.
#[derive(Debug, Clone, Serialize)]
pub struct SurveyMetadata {
    /// Name of the imagery layer the survey was read from.
    pub imagery_source: String,
    /// Capture date of the imagery, when known (YYYY-MM-DD).
    pub imagery_date: Option<String>,
}

impl SurveyMetadata {
    /// Build metadata, normalizing the imagery date.
    ///
    /// The date is trimmed and kept only when it has the `YYYY-MM-DD`
    /// shape; anything else is treated as unknown rather than written into
    /// the `source` tag.
    pub fn new(imagery_source: impl Into<String>, imagery_date: Option<&str>) -> Self {
        let imagery_date = imagery_date
            .map(str::trim)
            .filter(|d| is_valid_imagery_date(d))
            .map(str::to_string);
        Self {
            imagery_source: imagery_source.into(),
            imagery_date,
        }
    }

    /// The composed `source` tag value: imagery name, optional capture date
    /// in parentheses, and tool attribution.
    pub fn source_tag(&self) -> String {
        match &self.imagery_date {
            Some(date) => format!("{} ({}); {}", self.imagery_source, date, TOOL_ATTRIBUTION),
            None => format!("{}; {}", self.imagery_source, TOOL_ATTRIBUTION),
        }
    }
}

/// Check an imagery date string for the `YYYY-MM-DD` shape.
pub fn is_valid_imagery_date(date: &str) -> bool {
    // Shape check only; the surveyor copies the date off the imagery layer
    Regex::new(r"^\d{4}-\d{2}-\d{2}$")
        .map(|re| re.is_match(date))
        .unwrap_or(false)
}

/// Render the full result tag set, in stable order.
///
/// `accepted_primary` carries the suggested primary-tag change when the
/// surveyor accepted one.
pub fn render_tags(
    result: &SurveyResult,
    metadata: &SurveyMetadata,
    accepted_primary: Option<(&str, &str)>,
) -> Vec<(String, String)> {
    let mut tags = vec![
        (
            "wood:density".to_string(),
            result.density_class.tag_value().to_string(),
        ),
        ("canopy".to_string(), format!("{}%", result.canopy_percent)),
        ("est:stem_count".to_string(), result.stem_count.to_string()),
        (
            format!("est:avg_{}", result.vegetation_kind.diameter_tag_suffix()),
            format!("{:.1}m", result.mean_diameter_m),
        ),
        (
            "est:avg_spacing".to_string(),
            match result.mean_spacing_m {
                Some(spacing) => format!("{:.1}m", spacing),
                None => "n/a".to_string(),
            },
        ),
        (
            "est:source_area".to_string(),
            format!("{:.1}", round_to_decimeter(result.source_area_m2)),
        ),
        ("source".to_string(), metadata.source_tag()),
    ];

    if let Some((key, value)) = accepted_primary {
        tags.push((key.to_string(), value.to_string()));
    }

    tags
}

fn round_to_decimeter(area_m2: f64) -> f64 {
    (area_m2 * 10.0).round() / 10.0
}
