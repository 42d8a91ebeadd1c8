//! Planar geometry over geographic coordinates.
//!
//! Provides the small set of geometric primitives the sampling engine is
//! built on: a WGS84 point type, an equirectangular local-tangent frame for
//! converting between degrees and meters, the shoelace ring area, grid
//! snapping, and an axis-aligned rectangle for hit testing.
//!
//! # Planar by design
//!
//! All coordinate-to-meter conversion goes through [`LocalFrame`], a flat
//! east/north projection anchored at a reference point. Sample boxes are a
//! few hundred meters across at most, where the divergence from geodesic
//! distance is orders of magnitude below the 0.5 m snap grid. Using one
//! projection everywhere keeps the sample-box area consistent with the
//! linear dimensions the surveyor measures on screen.

mod frame;

pub use frame::LocalFrame;

use serde::{Deserialize, Serialize};

/// WGS84 mean equatorial radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// A geographic coordinate in WGS84 degrees.
///
/// Immutable once recorded; every measurement the engine stores is a point
/// or a pair of points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Latitude in degrees, positive north.
    pub lat: f64,
    /// Longitude in degrees, positive east.
    pub lon: f64,
}

impl Point {
    /// Create a new point.
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lat, self.lon)
    }
}

/// Signed area of a closed planar ring via the shoelace formula.
///
/// Input vertices are (x, y) pairs in meters. The first vertex does not need
/// to be repeated at the end; the formula closes the ring implicitly. The
/// sign depends on winding order (counter-clockwise positive), the magnitude
/// is the geometric area in square meters.
///
/// Rings with fewer than three vertices have zero area.
pub fn ring_area(vertices: &[(f64, f64)]) -> f64 {
    if vertices.len() < 3 {
        return 0.0;
    }

    let mut sum = 0.0;
    for i in 0..vertices.len() {
        let (x1, y1) = vertices[i];
        let (x2, y2) = vertices[(i + 1) % vertices.len()];
        sum += x1 * y2 - x2 * y1;
    }
    sum / 2.0
}

/// Snap a value to the nearest multiple of `step`.
///
/// Used to snap sample-box corners to the 0.5 m grid so the box area matches
/// the dimensions shown to the surveyor. Snapping is idempotent.
pub fn snap_to_grid(value: f64, step: f64) -> f64 {
    (value / step).round() * step
}

/// Planar distance in meters between two geographic points.
///
/// Projects both points into a [`LocalFrame`] anchored at `p1` and measures
/// the Euclidean distance there.
pub fn distance(p1: Point, p2: Point) -> f64 {
    let frame = LocalFrame::new(p1);
    let (x, y) = frame.to_local(p2);
    (x * x + y * y).sqrt()
}

/// An axis-aligned rectangle in local meters.
///
/// Bounds are inclusive on all four edges: a point exactly on the boundary
/// counts as inside, so items placed on the sample-box edge are accepted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Western edge (minimum x).
    pub min_x: f64,
    /// Southern edge (minimum y).
    pub min_y: f64,
    /// Eastern edge (maximum x).
    pub max_x: f64,
    /// Northern edge (maximum y).
    pub max_y: f64,
}

impl Rect {
    /// Build a rectangle from two opposite corners, in any order.
    pub fn from_corners(a: (f64, f64), b: (f64, f64)) -> Self {
        Self {
            min_x: a.0.min(b.0),
            min_y: a.1.min(b.1),
            max_x: a.0.max(b.0),
            max_y: a.1.max(b.1),
        }
    }

    /// Width of the rectangle in meters.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the rectangle in meters.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Inclusive containment test.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}
