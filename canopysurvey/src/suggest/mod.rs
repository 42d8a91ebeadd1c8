//! Primary-category suggestion policy.
//!
//! After a survey, the measured density class may contradict the target's
//! current primary tag: a `natural=scrub` patch measured as dense canopy is
//! probably a wood by now, and a `natural=wood` measured as scattered cover
//! is probably scrub. This module decides whether to propose the change.
//!
//! Only the scrub/wood continuum is modeled. Heath, grassland, wetland and
//! every other category are outside it: their density is still recorded,
//! but no category change is ever proposed.

use std::collections::BTreeMap;

use crate::extrapolate::DensityClass;

/// The target's current primary category, parsed from its tag map.
///
/// `natural=*` takes precedence over `landuse=*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryCategory {
    /// `natural=scrub`
    Scrub,
    /// `natural=wood`
    Wood,
    /// `landuse=forest` (managed forest)
    Forest,
    /// `natural=heath`
    Heath,
    /// `natural=grassland` or `landuse=grass`
    Grassland,
    /// `natural=wetland`
    Wetland,
    /// Anything else, including untagged targets.
    Other,
}

impl PrimaryCategory {
    /// Parse the primary category from a tag map.
    pub fn from_tags(tags: &BTreeMap<String, String>) -> Self {
        match tags.get("natural").map(String::as_str) {
            Some("scrub") => return PrimaryCategory::Scrub,
            Some("wood") => {
                // natural=wood + landuse=forest is managed forest
                if tags.get("landuse").map(String::as_str) == Some("forest") {
                    return PrimaryCategory::Forest;
                }
                return PrimaryCategory::Wood;
            }
            Some("heath") => return PrimaryCategory::Heath,
            Some("grassland") => return PrimaryCategory::Grassland,
            Some("wetland") => return PrimaryCategory::Wetland,
            _ => {}
        }
        match tags.get("landuse").map(String::as_str) {
            Some("forest") => PrimaryCategory::Forest,
            Some("grass") | Some("meadow") => PrimaryCategory::Grassland,
            _ => PrimaryCategory::Other,
        }
    }

    /// Whether this category sits on the scrub/wood continuum.
    pub fn is_forest_family(&self) -> bool {
        matches!(
            self,
            PrimaryCategory::Scrub | PrimaryCategory::Wood | PrimaryCategory::Forest
        )
    }

    /// Human-readable `key=value` form, for status text and the audit log.
    pub fn describe(&self) -> &'static str {
        match self {
            PrimaryCategory::Scrub => "natural=scrub",
            PrimaryCategory::Wood => "natural=wood",
            PrimaryCategory::Forest => "landuse=forest",
            PrimaryCategory::Heath => "natural=heath",
            PrimaryCategory::Grassland => "natural=grassland",
            PrimaryCategory::Wetland => "natural=wetland",
            PrimaryCategory::Other => "None",
        }
    }
}

/// Policy constants for the suggestion decision.
#[derive(Debug, Clone, Copy)]
pub struct SuggestionPolicy {
    /// First class on the "wood" side of the continuum. Classes at or above
    /// the boundary read as wood, below as scrub.
    pub boundary: DensityClass,
    /// Whether a managed forest (`landuse=forest`) may be proposed for
    /// downgrade to scrub. Off by default: harvested or young managed
    /// forest stays forest.
    pub reclassify_forest: bool,
}

impl Default for SuggestionPolicy {
    fn default() -> Self {
        Self {
            boundary: DensityClass::Dense,
            reclassify_forest: false,
        }
    }
}

/// Outcome of the suggestion decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Suggestion {
    /// Propose replacing the primary tag.
    Suggest {
        /// Tag key to write (always `natural` today).
        key: &'static str,
        /// Proposed tag value.
        value: &'static str,
    },
    /// Record the measurement, propose nothing.
    Silent,
}

/// Decide whether a primary-category change should be proposed.
pub fn suggest(
    category: PrimaryCategory,
    class: DensityClass,
    policy: &SuggestionPolicy,
) -> Suggestion {
    let wood_side = class >= policy.boundary;

    match category {
        PrimaryCategory::Scrub if wood_side => Suggestion::Suggest {
            key: "natural",
            value: "wood",
        },
        PrimaryCategory::Wood if !wood_side => Suggestion::Suggest {
            key: "natural",
            value: "scrub",
        },
        PrimaryCategory::Forest if !wood_side && policy.reclassify_forest => {
            Suggestion::Suggest {
                key: "natural",
                value: "scrub",
            }
        }
        _ => Suggestion::Silent,
    }
}
