//! Diameter calibration.
//!
//! During the calibration phase the surveyor drags across a handful of
//! individual crowns to establish the average diameter. The tracker records
//! each accepted segment, reports the running mean after every addition for
//! live feedback, supports undo, and freezes once the phase ends.

use thiserror::Error;

use crate::geom::{distance, Point};

/// Errors raised by the calibration tracker.
#[derive(Debug, Error)]
pub enum CalibrationError {
    /// Drag shorter than the configured click tolerance.
    #[error("Measurement too short: {length_m:.2}m (minimum {min_m:.2}m)")]
    MeasurementTooShort { length_m: f64, min_m: f64 },

    /// Confirm pressed with zero recorded measurements.
    #[error("At least one diameter measurement is required")]
    InsufficientData,

    /// The calibration phase has already ended.
    #[error("Calibration is frozen")]
    Frozen,
}

/// One recorded diameter drag.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct DiameterSegment {
    /// Drag start.
    pub start: Point,
    /// Drag end.
    pub end: Point,
    /// Planar length in meters.
    pub length_m: f64,
}

/// Accumulates diameter measurements and their running mean.
#[derive(Debug)]
pub struct CalibrationTracker {
    segments: Vec<DiameterSegment>,
    min_drag_m: f64,
    frozen: bool,
}

impl CalibrationTracker {
    /// Create a tracker with the given minimum drag length.
    ///
    /// Drags below `min_drag_m` are accidental micro-clicks and rejected.
    pub fn new(min_drag_m: f64) -> Self {
        Self {
            segments: Vec::new(),
            min_drag_m,
            frozen: false,
        }
    }

    /// Record a diameter drag and return the new running mean.
    ///
    /// # Errors
    ///
    /// [`CalibrationError::MeasurementTooShort`] for micro-clicks,
    /// [`CalibrationError::Frozen`] after [`finalize`](Self::finalize).
    pub fn add_measurement(&mut self, start: Point, end: Point) -> Result<f64, CalibrationError> {
        if self.frozen {
            return Err(CalibrationError::Frozen);
        }

        let length_m = distance(start, end);
        if length_m <= self.min_drag_m {
            return Err(CalibrationError::MeasurementTooShort {
                length_m,
                min_m: self.min_drag_m,
            });
        }

        self.segments.push(DiameterSegment {
            start,
            end,
            length_m,
        });
        tracing::debug!(
            length_m = format!("{:.2}", length_m),
            n = self.segments.len(),
            "Diameter measurement recorded"
        );

        Ok(self.mean_diameter().unwrap_or(length_m))
    }

    /// Remove the most recent measurement.
    ///
    /// Returns the new running mean while measurements remain, `None` once
    /// the list is empty. Calling on an empty or frozen tracker is a no-op.
    pub fn undo_last(&mut self) -> Option<f64> {
        if self.frozen {
            return self.mean_diameter();
        }
        self.segments.pop();
        self.mean_diameter()
    }

    /// Running mean of all recorded lengths, `None` when empty.
    pub fn mean_diameter(&self) -> Option<f64> {
        if self.segments.is_empty() {
            return None;
        }
        let sum: f64 = self.segments.iter().map(|s| s.length_m).sum();
        Some(sum / self.segments.len() as f64)
    }

    /// Number of recorded measurements.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether no measurements have been recorded.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The recorded segments, oldest first.
    pub fn segments(&self) -> &[DiameterSegment] {
        &self.segments
    }

    /// End the calibration phase and return the mean diameter.
    ///
    /// Freezes the tracker: further additions and undos become no-ops.
    ///
    /// # Errors
    ///
    /// [`CalibrationError::InsufficientData`] when nothing was recorded -
    /// the phase transition is blocked and the surveyor re-prompted.
    pub fn finalize(&mut self) -> Result<f64, CalibrationError> {
        let mean = self
            .mean_diameter()
            .ok_or(CalibrationError::InsufficientData)?;
        self.frozen = true;
        Ok(mean)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::LocalFrame;

    const ANCHOR: Point = Point {
        lat: 51.0,
        lon: 7.0,
    };

    /// A drag of the given metric length, eastward from the anchor.
    fn drag(length_m: f64) -> (Point, Point) {
        let frame = LocalFrame::new(ANCHOR);
        (ANCHOR, frame.from_local(length_m, 0.0))
    }

    #[test]
    fn test_running_mean_updates_per_measurement() {
        let mut tracker = CalibrationTracker::new(0.05);

        let (s, e) = drag(4.0);
        let mean = tracker.add_measurement(s, e).unwrap();
        assert!((mean - 4.0).abs() < 0.01);

        let (s, e) = drag(6.0);
        let mean = tracker.add_measurement(s, e).unwrap();
        assert!((mean - 5.0).abs() < 0.01);

        assert_eq!(tracker.len(), 2);
    }

    #[test]
    fn test_micro_click_rejected() {
        let mut tracker = CalibrationTracker::new(0.05);
        let (s, e) = drag(0.03);
        let err = tracker.add_measurement(s, e).unwrap_err();
        assert!(matches!(err, CalibrationError::MeasurementTooShort { .. }));
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_undo_restores_prior_mean() {
        let mut tracker = CalibrationTracker::new(0.05);
        let (s, e) = drag(4.0);
        tracker.add_measurement(s, e).unwrap();
        let (s, e) = drag(8.0);
        tracker.add_measurement(s, e).unwrap();

        let mean = tracker.undo_last().unwrap();
        assert!((mean - 4.0).abs() < 0.01);
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_undo_to_empty_and_beyond() {
        let mut tracker = CalibrationTracker::new(0.05);
        let (s, e) = drag(3.0);
        tracker.add_measurement(s, e).unwrap();

        assert!(tracker.undo_last().is_none());
        assert!(tracker.is_empty());
        // No-op on empty
        assert!(tracker.undo_last().is_none());
    }

    #[test]
    fn test_finalize_requires_data() {
        let mut tracker = CalibrationTracker::new(0.05);
        assert!(matches!(
            tracker.finalize(),
            Err(CalibrationError::InsufficientData)
        ));

        // Still usable after the blocked transition
        let (s, e) = drag(5.0);
        tracker.add_measurement(s, e).unwrap();
        let mean = tracker.finalize().unwrap();
        assert!((mean - 5.0).abs() < 0.01);
    }

    #[test]
    fn test_frozen_after_finalize() {
        let mut tracker = CalibrationTracker::new(0.05);
        let (s, e) = drag(5.0);
        tracker.add_measurement(s, e).unwrap();
        tracker.finalize().unwrap();

        let (s, e) = drag(9.0);
        assert!(matches!(
            tracker.add_measurement(s, e),
            Err(CalibrationError::Frozen)
        ));
        // Undo is a no-op; the mean is unchanged
        let mean = tracker.undo_last().unwrap();
        assert!((mean - 5.0).abs() < 0.01);
        assert_eq!(tracker.len(), 1);
    }
}
