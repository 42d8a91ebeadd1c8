//! Target-area resolution.
//!
//! Resolves the surveyor's selected polygon into one net area value. The
//! simple case is a single closed ring; the multipolygon case is a set of
//! outer rings (disjoint patches, summed) and inner rings (clearings such as
//! a lake inside a forest, subtracted).
//!
//! # Known limitation
//!
//! A relation with several outer members is surveyed as one target: the
//! density measured in the sample box is applied uniformly across all outer
//! patches. This mirrors how the measurement is actually taken and is
//! documented rather than corrected.

mod geojson;

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use crate::geom::{ring_area, LocalFrame, Point};

/// Errors raised while building or resolving a target area.
#[derive(Debug, Error)]
pub enum AreaError {
    /// A ring with fewer than three distinct vertices.
    #[error("Ring has only {0} distinct vertices (minimum 3)")]
    RingTooSmall(usize),

    /// The target had no outer ring at all.
    #[error("Target area has no outer ring")]
    NoOuterRing,

    /// The GeoJSON payload could not be parsed.
    #[error("Invalid GeoJSON: {0}")]
    InvalidGeoJson(String),

    /// The GeoJSON parsed but holds a geometry this engine does not survey.
    #[error("Unsupported geometry type: {0} (expected Polygon or MultiPolygon)")]
    UnsupportedGeometry(String),

    /// Underlying JSON syntax error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Kind of host object the target was selected from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TargetKind {
    /// A single closed way.
    Way,
    /// A multipolygon relation.
    Relation,
}

impl std::fmt::Display for TargetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetKind::Way => write!(f, "Way"),
            TargetKind::Relation => write!(f, "Relation"),
        }
    }
}

/// An ordered, closed sequence of geographic points.
///
/// The closing vertex is implicit: a trailing point equal to the first is
/// dropped on construction so every stored vertex is distinct.
#[derive(Debug, Clone)]
pub struct Ring {
    points: Vec<Point>,
}

impl Ring {
    /// Build a ring from its vertices.
    ///
    /// Accepts both open (`first != last`) and explicitly closed vertex
    /// lists. Fails with [`AreaError::RingTooSmall`] when fewer than three
    /// distinct vertices remain.
    pub fn new(mut points: Vec<Point>) -> Result<Self, AreaError> {
        if points.len() >= 2 {
            let first = points[0];
            let last = points[points.len() - 1];
            if first.lat == last.lat && first.lon == last.lon {
                points.pop();
            }
        }
        if points.len() < 3 {
            return Err(AreaError::RingTooSmall(points.len()));
        }
        Ok(Self { points })
    }

    /// The ring's distinct vertices, in order.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Unsigned geometric area of the ring in square meters.
    ///
    /// Vertices are projected into a local frame anchored at the first
    /// vertex, then run through the shoelace formula. Winding order does not
    /// matter to the caller; only the magnitude is returned.
    pub fn area_m2(&self) -> f64 {
        let frame = LocalFrame::new(self.points[0]);
        let local: Vec<(f64, f64)> = self.points.iter().map(|p| frame.to_local(*p)).collect();
        ring_area(&local).abs()
    }
}

/// The surveyor's selected polygon, read-only for the duration of a survey.
///
/// Owns a snapshot of the host object's identity and tag map so the engine
/// can classify the current primary category and compose the audit record
/// without touching the host again.
#[derive(Debug, Clone)]
pub struct TargetArea {
    id: i64,
    kind: TargetKind,
    outer: Vec<Ring>,
    inner: Vec<Ring>,
    tags: BTreeMap<String, String>,
}

impl TargetArea {
    /// Build a target from a single closed way.
    pub fn from_way(id: i64, ring: Ring, tags: BTreeMap<String, String>) -> Self {
        Self {
            id,
            kind: TargetKind::Way,
            outer: vec![ring],
            inner: Vec::new(),
            tags,
        }
    }

    /// Build a target from a multipolygon relation's members.
    ///
    /// Fails with [`AreaError::NoOuterRing`] when `outer` is empty.
    pub fn from_relation(
        id: i64,
        outer: Vec<Ring>,
        inner: Vec<Ring>,
        tags: BTreeMap<String, String>,
    ) -> Result<Self, AreaError> {
        if outer.is_empty() {
            return Err(AreaError::NoOuterRing);
        }
        Ok(Self {
            id,
            kind: TargetKind::Relation,
            outer,
            inner,
            tags,
        })
    }

    /// Parse a target from a GeoJSON `Polygon` or `MultiPolygon`.
    ///
    /// Accepts a bare geometry, a `Feature`, or a `FeatureCollection` (first
    /// feature wins). Feature properties become the target's tag map.
    pub fn from_geojson(payload: &str) -> Result<Self, AreaError> {
        geojson::parse(payload)
    }

    /// Host object id.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Host object kind.
    pub fn kind(&self) -> TargetKind {
        self.kind
    }

    /// Outer boundary rings.
    pub fn outer_rings(&self) -> &[Ring] {
        &self.outer
    }

    /// Hole rings.
    pub fn inner_rings(&self) -> &[Ring] {
        &self.inner
    }

    /// The target's current tag map.
    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    /// Look up a single tag value.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// Net area of the target in square meters.
    pub fn resolve_area(&self) -> f64 {
        resolve_area(&self.outer, &self.inner)
    }
}

/// Net area of a ring set: sum of outer areas minus sum of inner areas.
///
/// Clamped at zero; inner rings that nominally exceed their outers (bad
/// data) yield an empty target rather than a negative area.
pub fn resolve_area(outer: &[Ring], inner: &[Ring]) -> f64 {
    let added: f64 = outer.iter().map(Ring::area_m2).sum();
    let removed: f64 = inner.iter().map(Ring::area_m2).sum();
    (added - removed).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::LocalFrame;

    /// Build a rectangular ring of the given metric size around an anchor.
    fn metric_ring(anchor: Point, width_m: f64, height_m: f64) -> Ring {
        let frame = LocalFrame::new(anchor);
        Ring::new(vec![
            frame.from_local(0.0, 0.0),
            frame.from_local(width_m, 0.0),
            frame.from_local(width_m, height_m),
            frame.from_local(0.0, height_m),
        ])
        .unwrap()
    }

    const ANCHOR: Point = Point {
        lat: 49.0,
        lon: 10.0,
    };

    mod ring {
        use super::*;

        #[test]
        fn test_trailing_duplicate_is_dropped() {
            let frame = LocalFrame::new(ANCHOR);
            let a = frame.from_local(0.0, 0.0);
            let b = frame.from_local(5.0, 0.0);
            let c = frame.from_local(5.0, 5.0);
            let ring = Ring::new(vec![a, b, c, a]).unwrap();
            assert_eq!(ring.points().len(), 3);
        }

        #[test]
        fn test_too_few_vertices() {
            let frame = LocalFrame::new(ANCHOR);
            let a = frame.from_local(0.0, 0.0);
            let b = frame.from_local(5.0, 0.0);
            let err = Ring::new(vec![a, b, a]).unwrap_err();
            assert!(matches!(err, AreaError::RingTooSmall(2)));
        }

        #[test]
        fn test_metric_rectangle_area() {
            let ring = metric_ring(ANCHOR, 100.0, 60.0);
            let area = ring.area_m2();
            assert!(
                (area - 6000.0).abs() < 1.0,
                "Expected ~6000 m2, got {:.2}",
                area
            );
        }

        #[test]
        fn test_area_invariant_under_reversal() {
            let ring = metric_ring(ANCHOR, 40.0, 25.0);
            let reversed =
                Ring::new(ring.points().iter().rev().copied().collect()).unwrap();
            assert!((ring.area_m2() - reversed.area_m2()).abs() < 1e-6);
        }

        #[test]
        fn test_unit_square_anywhere() {
            for (lat, lon) in [(0.0, 0.0), (59.3, 18.1), (-41.3, 174.8)] {
                let ring = metric_ring(Point::new(lat, lon), 1.0, 1.0);
                assert!(
                    (ring.area_m2() - 1.0).abs() < 1e-3,
                    "Unit square at ({}, {}) resolved to {}",
                    lat,
                    lon,
                    ring.area_m2()
                );
            }
        }
    }

    mod resolution {
        use super::*;

        #[test]
        fn test_hole_subtracts() {
            let outer = metric_ring(ANCHOR, 10.0, 10.0);
            let inner = metric_ring(ANCHOR, 5.0, 4.0);
            let net = resolve_area(&[outer], &[inner]);
            assert!((net - 80.0).abs() < 0.1, "100 - 20 should be 80, got {}", net);
        }

        #[test]
        fn test_multiple_outers_sum() {
            let frame = LocalFrame::new(ANCHOR);
            let patch_a = metric_ring(ANCHOR, 10.0, 10.0);
            let patch_b = metric_ring(frame.from_local(500.0, 0.0), 20.0, 10.0);
            let net = resolve_area(&[patch_a, patch_b], &[]);
            assert!((net - 300.0).abs() < 0.5);
        }

        #[test]
        fn test_clamped_at_zero() {
            let outer = metric_ring(ANCHOR, 5.0, 5.0);
            let inner = metric_ring(ANCHOR, 10.0, 10.0);
            assert_eq!(resolve_area(&[outer], &[inner]), 0.0);
        }

        #[test]
        fn test_target_area_way() {
            let target = TargetArea::from_way(
                42,
                metric_ring(ANCHOR, 100.0, 60.0),
                BTreeMap::new(),
            );
            assert_eq!(target.kind(), TargetKind::Way);
            assert!((target.resolve_area() - 6000.0).abs() < 1.0);
        }

        #[test]
        fn test_relation_requires_outer() {
            let err =
                TargetArea::from_relation(7, vec![], vec![], BTreeMap::new()).unwrap_err();
            assert!(matches!(err, AreaError::NoOuterRing));
        }
    }
}
