//! Closed-open time intervals.
//!
//! A [`TimeFrame`] is a `[start, end)` interval over the simulation time
//! axis. `end` may be `f64::INFINITY`, which marks the frame as *open*
//! ("still active"). Closing a frame -- assigning it a finite `end` -- is
//! the only mutation a past frame ever receives.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// TimeFrame
// ---------------------------------------------------------------------------

/// A closed-open interval `[start, end)` over the time axis.
///
/// Invariant: `end >= start`. An open frame has `end == f64::INFINITY`.
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeFrame {
    /// Inclusive lower bound.
    pub start: f64,
    /// Exclusive upper bound; `f64::INFINITY` while the frame is open.
    pub end: f64,
}

impl TimeFrame {
    /// Construct a closed frame `[start, end)`.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `end < start`.
    pub fn new(start: f64, end: f64) -> Self {
        debug_assert!(end >= start, "TimeFrame end {end} precedes start {start}");
        Self { start, end }
    }

    /// Construct an open frame `[start, +inf)`.
    pub fn open(start: f64) -> Self {
        Self {
            start,
            end: f64::INFINITY,
        }
    }

    /// `true` while the frame has not been closed.
    pub fn is_open(&self) -> bool {
        self.end == f64::INFINITY
    }

    /// Close the frame at `end`.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if the frame is already closed or if
    /// `end < start`.
    pub fn close(&mut self, end: f64) {
        debug_assert!(self.is_open(), "closing an already-closed TimeFrame");
        debug_assert!(end >= self.start, "close time {end} precedes start");
        self.end = end;
    }

    /// Closed-open containment: `start <= time < end`.
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && time < self.end
    }

    /// `true` if the two frames share any instant.
    pub fn overlaps(&self, other: &TimeFrame) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Length of the frame; infinite for open frames.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

impl fmt::Debug for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_open() {
            write!(f, "[{}, ..)", self.start)
        } else {
            write!(f, "[{}, {})", self.start, self.end)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
