//! Append-only snapshot history for continuous values.
//!
//! A [`Scrapbook`] records samples of a continuous signal (position,
//! velocity, sprite alpha, animator state) at the write frontier and plays
//! them back at any past time with per-snapshot interpolation. Storage is
//! proportional to *changes*, not to wall-clock ticks: recording a value
//! equal to the most recent entry is coalesced into it.
//!
//! # Example
//!
//! ```
//! use tempo_history::prelude::*;
//!
//! let mut book = Scrapbook::new();
//! book.record(0.0, [0.0, 0.0], Interpolation::Linear).unwrap();
//! book.record(10.0, [10.0, 0.0], Interpolation::Linear).unwrap();
//!
//! assert_eq!(book.sample(5.0).unwrap(), [5.0, 0.0]);
//! // Open-ended extrapolation past the last snapshot.
//! assert_eq!(book.sample(50.0).unwrap(), [10.0, 0.0]);
//! ```

use serde::{Deserialize, Serialize};

use crate::interp::{Interpolation, Lerp};
use crate::HistoryError;

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// One sampled value of a continuous signal at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot<T> {
    /// Simulation time at which the value was recorded.
    pub time: f64,
    /// The recorded value.
    pub data: T,
    /// How to read the value back between this snapshot and the next.
    pub interpolation: Interpolation,
}

// ---------------------------------------------------------------------------
// Scrapbook
// ---------------------------------------------------------------------------

/// A time-ordered, append-only sequence of [`Snapshot`]s.
///
/// Invariant: snapshot times are strictly increasing. A write at an
/// existing timestamp replaces that snapshot rather than appending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scrapbook<T> {
    snapshots: Vec<Snapshot<T>>,
}

impl<T> Default for Scrapbook<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scrapbook<T> {
    /// Create an empty scrapbook.
    pub fn new() -> Self {
        Self {
            snapshots: Vec::new(),
        }
    }

    /// Number of stored snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// `true` if nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Read-only view of the stored snapshots, in time order.
    pub fn snapshots(&self) -> &[Snapshot<T>] {
        &self.snapshots
    }

    /// The most recent snapshot, if any.
    pub fn latest(&self) -> Option<&Snapshot<T>> {
        self.snapshots.last()
    }

    /// Index of the last snapshot with `time <= t`, or `None` if `t`
    /// precedes the first snapshot.
    fn floor_index(&self, t: f64) -> Option<usize> {
        let after = self.snapshots.partition_point(|s| s.time <= t);
        after.checked_sub(1)
    }

    /// Remove every snapshot strictly after `time`.
    ///
    /// Idempotent. Called on divergence, when a previously recorded future
    /// is erased before recording resumes.
    pub fn trim_after(&mut self, time: f64) {
        let keep = self.snapshots.partition_point(|s| s.time <= time);
        self.snapshots.truncate(keep);
    }

    /// Drop snapshots before the latest one at-or-before `time`.
    ///
    /// Retains the bracketing snapshot so that sampling at `time` still
    /// returns the value that was in effect there. Used when a slice of
    /// history is deep-copied for a clone, and for reclaiming memory
    /// behind a committed rewind floor.
    pub fn trim_before(&mut self, time: f64) {
        if let Some(floor) = self.floor_index(time) {
            self.snapshots.drain(..floor);
        }
    }
}

impl<T: Clone + PartialEq + Lerp> Scrapbook<T> {
    /// Record `data` at `time` with the given interpolation mode.
    ///
    /// Must be called at the write frontier: `time` must be at or after
    /// the latest snapshot's time, otherwise [`HistoryError::OutOfOrderWrite`]
    /// is returned. A write at exactly the latest time replaces it. A write
    /// whose value and mode both equal the latest entry is coalesced
    /// (no new entry), keeping storage proportional to changes.
    pub fn record(
        &mut self,
        time: f64,
        data: T,
        interpolation: Interpolation,
    ) -> Result<(), HistoryError> {
        if let Some(last) = self.snapshots.last_mut() {
            if time < last.time {
                return Err(HistoryError::OutOfOrderWrite {
                    last: last.time,
                    attempted: time,
                });
            }
            if time == last.time {
                last.data = data;
                last.interpolation = interpolation;
                return Ok(());
            }
            if last.data == data && last.interpolation == interpolation {
                return Ok(());
            }
        }
        self.snapshots.push(Snapshot {
            time,
            data,
            interpolation,
        });
        Ok(())
    }

    /// Sample the recorded signal at `time`.
    ///
    /// Binary-searches the two bracketing snapshots. If the earlier one is
    /// tagged `Linear` the result is the component-wise blend proportional
    /// to elapsed time; if `Step`, the earlier value holds until the next
    /// snapshot's exact time. Queries before the first snapshot return the
    /// first value; past the last, the last value (open-ended
    /// extrapolation).
    ///
    /// # Errors
    ///
    /// [`HistoryError::EmptyHistory`] if nothing has been recorded.
    pub fn sample(&self, time: f64) -> Result<T, HistoryError> {
        if self.snapshots.is_empty() {
            return Err(HistoryError::EmptyHistory);
        }
        let Some(i) = self.floor_index(time) else {
            return Ok(self.snapshots[0].data.clone());
        };
        let lower = &self.snapshots[i];
        let Some(upper) = self.snapshots.get(i + 1) else {
            return Ok(lower.data.clone());
        };
        match lower.interpolation {
            Interpolation::Step => Ok(lower.data.clone()),
            Interpolation::Linear => {
                let span = upper.time - lower.time;
                // Snapshot times are strictly increasing, so span > 0.
                let alpha = (time - lower.time) / span;
                Ok(lower.data.lerp(&upper.data, alpha))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
