//! Equirectangular local-tangent projection.

use super::{Point, EARTH_RADIUS_M};

/// A flat east/north coordinate frame anchored at a reference point.
///
/// Converts between geographic degrees and local meters using the
/// equirectangular approximation: one radian of latitude is one Earth
/// radius of northing, one radian of longitude is `cos(origin.lat)` Earth
/// radii of easting. The approximation is accurate to well under the snap
/// grid for the sample scales this engine handles.
///
/// Conversions are exact inverses of each other, so coordinates survive a
/// round trip through the frame.
#[derive(Debug, Clone, Copy)]
pub struct LocalFrame {
    origin: Point,
    cos_lat: f64,
}

impl LocalFrame {
    /// Create a frame anchored at `origin`.
    pub fn new(origin: Point) -> Self {
        Self {
            origin,
            cos_lat: origin.lat.to_radians().cos(),
        }
    }

    /// The anchor point of this frame.
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Project a geographic point into local (east, north) meters.
    pub fn to_local(&self, p: Point) -> (f64, f64) {
        let x = (p.lon - self.origin.lon).to_radians() * EARTH_RADIUS_M * self.cos_lat;
        let y = (p.lat - self.origin.lat).to_radians() * EARTH_RADIUS_M;
        (x, y)
    }

    /// Unproject local (east, north) meters back to a geographic point.
    pub fn from_local(&self, x: f64, y: f64) -> Point {
        let lat = self.origin.lat + (y / EARTH_RADIUS_M).to_degrees();
        let lon = self.origin.lon + (x / (EARTH_RADIUS_M * self.cos_lat)).to_degrees();
        Point::new(lat, lon)
    }
}
