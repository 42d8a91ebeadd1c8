//! Individual counting.
//!
//! During the counting phase every click inside the sample box records one
//! individual plant. Ordinals are assigned sequentially for display
//! numbering and re-compacted on undo so the next item always receives
//! `count + 1`. The tracker does not deduplicate overlapping clicks: every
//! accepted click is one counted individual; preventing accidental double
//! counts is the host's rendering concern.

use thiserror::Error;

use crate::geom::Point;
use crate::sample::SampleBox;

/// Errors raised by the counting tracker.
#[derive(Debug, Error)]
pub enum CountingError {
    /// Click outside the sample box; the input is rejected, nothing changes.
    #[error("Point is outside the sample box")]
    OutOfBounds,

    /// The counting phase has already ended.
    #[error("Counting is frozen")]
    Frozen,
}

/// One counted individual.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct CountedItem {
    /// Where the surveyor clicked.
    pub location: Point,
    /// 1-based display number.
    pub ordinal: usize,
}

/// Accumulates counted individuals with undo.
#[derive(Debug, Default)]
pub struct CountingTracker {
    items: Vec<CountedItem>,
    frozen: bool,
}

impl CountingTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a counted individual and return its ordinal.
    ///
    /// The location must lie within the sample box (inclusive bounds).
    ///
    /// # Errors
    ///
    /// [`CountingError::OutOfBounds`] leaves the tracker unchanged;
    /// [`CountingError::Frozen`] after [`finalize`](Self::finalize).
    pub fn add_item(
        &mut self,
        location: Point,
        sample_box: &SampleBox,
    ) -> Result<usize, CountingError> {
        if self.frozen {
            return Err(CountingError::Frozen);
        }
        if !sample_box.contains(location) {
            return Err(CountingError::OutOfBounds);
        }

        let ordinal = self.items.len() + 1;
        self.items.push(CountedItem { location, ordinal });
        Ok(ordinal)
    }

    /// Remove the most recently counted item.
    ///
    /// Returns the new count. No-op on an empty or frozen tracker.
    pub fn undo_last(&mut self) -> usize {
        if !self.frozen {
            self.items.pop();
        }
        self.items.len()
    }

    /// Number of counted individuals.
    pub fn count(&self) -> usize {
        self.items.len()
    }

    /// The counted items in click order.
    pub fn items(&self) -> &[CountedItem] {
        &self.items
    }

    /// End the counting phase.
    ///
    /// Freezes the tracker and returns the ordered item list. Zero items is
    /// a valid outcome (the survey finalizes with zero density).
    pub fn finalize(&mut self) -> Vec<CountedItem> {
        self.frozen = true;
        self.items.clone()
    }
}
