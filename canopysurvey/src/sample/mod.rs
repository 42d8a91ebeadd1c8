//! Sample-box definition.
//!
//! The sample box is the small axis-aligned rectangle the surveyor measures
//! by hand to represent the whole target. Both drag corners are snapped to
//! the 0.5 m grid the moment the box is committed, and the box area is the
//! planar product of the snapped dimensions, deliberately not the geodesic
//! area of the footprint, so the math matches the dimensions shown on
//! screen.

use thiserror::Error;

use crate::config::SamplingConfig;
use crate::geom::{snap_to_grid, LocalFrame, Point, Rect};

/// Errors raised while committing a sample box.
#[derive(Debug, Error)]
pub enum SampleBoxError {
    /// The drag collapsed below the minimum usable area.
    #[error("Sample box too small: {width_m:.1}m x {height_m:.1}m (minimum area {min_area_m2:.1} m2)")]
    Degenerate {
        width_m: f64,
        height_m: f64,
        min_area_m2: f64,
    },
}

/// An axis-aligned sample rectangle with snapped, cached dimensions.
///
/// Immutable for the duration of the survey once committed.
#[derive(Debug, Clone)]
pub struct SampleBox {
    frame: LocalFrame,
    rect: Rect,
    corners: [Point; 4],
    width_m: f64,
    height_m: f64,
    area_m2: f64,
}

impl SampleBox {
    /// Commit a drag from `anchor` to `opposite` into a snapped box.
    ///
    /// The anchor becomes the origin of the box's local frame (on-grid by
    /// construction); the opposite corner's local coordinates are snapped
    /// independently to the configured grid. Width, height, and area are
    /// cached from the snapped values.
    ///
    /// # Errors
    ///
    /// [`SampleBoxError::Degenerate`] when the snapped area falls below
    /// `config.min_box_area_m2`: a bare click or a sliver drag.
    pub fn from_drag(
        anchor: Point,
        opposite: Point,
        config: &SamplingConfig,
    ) -> Result<Self, SampleBoxError> {
        let frame = LocalFrame::new(anchor);
        let (raw_x, raw_y) = frame.to_local(opposite);

        let snapped_x = snap_to_grid(raw_x, config.snap_step_m);
        let snapped_y = snap_to_grid(raw_y, config.snap_step_m);

        let width_m = snapped_x.abs();
        let height_m = snapped_y.abs();
        let area_m2 = width_m * height_m;

        if area_m2 < config.min_box_area_m2 {
            return Err(SampleBoxError::Degenerate {
                width_m,
                height_m,
                min_area_m2: config.min_box_area_m2,
            });
        }

        let rect = Rect::from_corners((0.0, 0.0), (snapped_x, snapped_y));
        let corners = [
            frame.from_local(0.0, 0.0),
            frame.from_local(snapped_x, 0.0),
            frame.from_local(snapped_x, snapped_y),
            frame.from_local(0.0, snapped_y),
        ];

        Ok(Self {
            frame,
            rect,
            corners,
            width_m,
            height_m,
            area_m2,
        })
    }

    /// Snapped width in meters. Always positive.
    pub fn width_m(&self) -> f64 {
        self.width_m
    }

    /// Snapped height in meters. Always positive.
    pub fn height_m(&self) -> f64 {
        self.height_m
    }

    /// Planar area in square meters (`width * height` of snapped dims).
    pub fn area_m2(&self) -> f64 {
        self.area_m2
    }

    /// The four geographic corners, anchor first, winding around the box.
    pub fn corners(&self) -> &[Point; 4] {
        &self.corners
    }

    /// Inclusive containment test against the snapped extents.
    pub fn contains(&self, p: Point) -> bool {
        let (x, y) = self.frame.to_local(p);
        self.rect.contains(x, y)
    }
}

impl std::fmt::Display for SampleBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:.1}m x {:.1}m ({:.1} m2)",
            self.width_m, self.height_m, self.area_m2
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANCHOR: Point = Point {
        lat: 48.2,
        lon: 16.37,
    };

    fn opposite_at(dx: f64, dy: f64) -> Point {
        LocalFrame::new(ANCHOR).from_local(dx, dy)
    }

    #[test]
    fn test_dimensions_snap_to_half_meter() {
        let sample_box =
            SampleBox::from_drag(ANCHOR, opposite_at(100.23, 59.8), &SamplingConfig::default())
                .unwrap();
        assert_eq!(sample_box.width_m(), 100.0);
        assert_eq!(sample_box.height_m(), 60.0);
        assert_eq!(sample_box.area_m2(), 6000.0);
    }

    #[test]
    fn test_drag_direction_does_not_matter() {
        // Dragging up-left instead of down-right yields the same box size
        let sample_box =
            SampleBox::from_drag(ANCHOR, opposite_at(-40.1, -19.9), &SamplingConfig::default())
                .unwrap();
        assert_eq!(sample_box.width_m(), 40.0);
        assert_eq!(sample_box.height_m(), 20.0);
    }

    #[test]
    fn test_bare_click_is_degenerate() {
        let err = SampleBox::from_drag(ANCHOR, ANCHOR, &SamplingConfig::default()).unwrap_err();
        assert!(matches!(err, SampleBoxError::Degenerate { .. }));
    }

    #[test]
    fn test_sliver_drag_is_degenerate() {
        // 10m x 0.1m: height snaps to 0, area 0 < 1 m2
        let err = SampleBox::from_drag(ANCHOR, opposite_at(10.0, 0.1), &SamplingConfig::default())
            .unwrap_err();
        match err {
            SampleBoxError::Degenerate { height_m, .. } => assert_eq!(height_m, 0.0),
        }
    }

    #[test]
    fn test_contains_inclusive_bounds() {
        let sample_box =
            SampleBox::from_drag(ANCHOR, opposite_at(30.0, 20.0), &SamplingConfig::default())
                .unwrap();
        let frame = LocalFrame::new(ANCHOR);

        assert!(sample_box.contains(frame.from_local(15.0, 10.0)));
        assert!(sample_box.contains(frame.from_local(0.0, 0.0)), "Anchor corner");
        assert!(sample_box.contains(frame.from_local(30.0, 20.0)), "Far corner");
        assert!(!sample_box.contains(frame.from_local(30.6, 10.0)));
        assert!(!sample_box.contains(frame.from_local(-0.6, 10.0)));
    }

    #[test]
    fn test_contains_handles_negative_drag() {
        let sample_box =
            SampleBox::from_drag(ANCHOR, opposite_at(-30.0, -20.0), &SamplingConfig::default())
                .unwrap();
        let frame = LocalFrame::new(ANCHOR);

        assert!(sample_box.contains(frame.from_local(-15.0, -10.0)));
        assert!(!sample_box.contains(frame.from_local(15.0, 10.0)));
    }

    #[test]
    fn test_corners_reproject_to_snapped_grid() {
        let sample_box =
            SampleBox::from_drag(ANCHOR, opposite_at(50.2, 29.7), &SamplingConfig::default())
                .unwrap();
        let frame = LocalFrame::new(ANCHOR);

        let (x, y) = frame.to_local(sample_box.corners()[2]);
        assert!((x - 50.0).abs() < 1e-6);
        assert!((y - 30.0).abs() < 1e-6);
    }

    #[test]
    fn test_display() {
        let sample_box =
            SampleBox::from_drag(ANCHOR, opposite_at(12.0, 8.0), &SamplingConfig::default())
                .unwrap();
        assert_eq!(format!("{}", sample_box), "12.0m x 8.0m (96.0 m2)");
    }
}
