//! Discrete, non-interpolated event logs.
//!
//! An [`Album`] records *moments* -- arbitrary event payloads keyed by
//! time. Unlike a [`Scrapbook`](crate::scrapbook::Scrapbook), an album
//! never coalesces or interpolates: every record is appended verbatim,
//! and playback asks for the latest moment at-or-before a time.

use serde::{Deserialize, Serialize};

use crate::HistoryError;

// ---------------------------------------------------------------------------
// Moment
// ---------------------------------------------------------------------------

/// One discrete event payload at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Moment<T> {
    /// Simulation time at which the event was recorded.
    pub time: f64,
    /// The event payload.
    pub data: T,
}

// ---------------------------------------------------------------------------
// Album
// ---------------------------------------------------------------------------

/// A pure, time-ordered event log.
///
/// Invariant: moment times are non-decreasing -- the write frontier only
/// moves forward. An append with a decreasing time indicates broken
/// frontier discipline in the caller and is surfaced as an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Album<T> {
    moments: Vec<Moment<T>>,
}

impl<T> Default for Album<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Album<T> {
    /// Create an empty album.
    pub fn new() -> Self {
        Self {
            moments: Vec::new(),
        }
    }

    /// Number of recorded moments.
    pub fn len(&self) -> usize {
        self.moments.len()
    }

    /// `true` if nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.moments.is_empty()
    }

    /// Read-only view of the recorded moments, in time order.
    pub fn moments(&self) -> &[Moment<T>] {
        &self.moments
    }

    /// Append an event at `time`.
    ///
    /// Never coalesces: two moments may share a timestamp (their relative
    /// order is the record order).
    ///
    /// # Errors
    ///
    /// [`HistoryError::OutOfOrderWrite`] if `time` precedes the last
    /// recorded moment.
    pub fn record(&mut self, time: f64, data: T) -> Result<(), HistoryError> {
        if let Some(last) = self.moments.last() {
            if time < last.time {
                debug_assert!(
                    false,
                    "album write at {time} behind frontier {}",
                    last.time
                );
                return Err(HistoryError::OutOfOrderWrite {
                    last: last.time,
                    attempted: time,
                });
            }
        }
        self.moments.push(Moment { time, data });
        Ok(())
    }

    /// The latest moment with `time <= t`, or `None` if `t` precedes the
    /// first moment (or the album is empty).
    ///
    /// When several moments share the greatest timestamp `<= t`, the most
    /// recently recorded one wins.
    pub fn latest_at_or_before(&self, t: f64) -> Option<&T> {
        let after = self.moments.partition_point(|m| m.time <= t);
        after.checked_sub(1).map(|i| &self.moments[i].data)
    }

    /// Remove every moment strictly after `time`. Idempotent.
    pub fn trim_after(&mut self, time: f64) {
        let keep = self.moments.partition_point(|m| m.time <= time);
        self.moments.truncate(keep);
    }

    /// Drop moments before the latest one at-or-before `time`, so that
    /// `latest_at_or_before(time)` is unchanged by the trim.
    pub fn trim_before(&mut self, time: f64) {
        let after = self.moments.partition_point(|m| m.time <= time);
        if let Some(floor) = after.checked_sub(1) {
            self.moments.drain(..floor);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_album_returns_none() {
        let album: Album<u32> = Album::new();
        assert_eq!(album.latest_at_or_before(10.0), None);
    }

    #[test]
    fn query_before_first_moment_returns_none() {
        let mut album = Album::new();
        album.record(5.0, "spawn").unwrap();
        assert_eq!(album.latest_at_or_before(4.999), None);
        assert_eq!(album.latest_at_or_before(5.0), Some(&"spawn"));
    }

    #[test]
    fn latest_at_or_before_picks_greatest_time() {
        let mut album = Album::new();
        album.record(0.0, 'a').unwrap();
        album.record(2.0, 'b').unwrap();
        album.record(4.0, 'c').unwrap();

        assert_eq!(album.latest_at_or_before(1.0), Some(&'a'));
        assert_eq!(album.latest_at_or_before(2.0), Some(&'b'));
        assert_eq!(album.latest_at_or_before(3.9), Some(&'b'));
        assert_eq!(album.latest_at_or_before(100.0), Some(&'c'));
    }

    #[test]
    fn duplicate_timestamps_are_kept_in_record_order() {
        let mut album = Album::new();
        album.record(1.0, 1).unwrap();
        album.record(1.0, 2).unwrap();
        album.record(1.0, 3).unwrap();
        assert_eq!(album.len(), 3);
        // The most recently recorded moment at the timestamp wins.
        assert_eq!(album.latest_at_or_before(1.0), Some(&3));
    }

    #[cfg(not(debug_assertions))]
    #[test]
    fn decreasing_time_is_rejected() {
        let mut album = Album::new();
        album.record(3.0, ()).unwrap();
        assert!(matches!(
            album.record(2.0, ()),
            Err(HistoryError::OutOfOrderWrite { .. })
        ));
        assert_eq!(album.len(), 1);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "behind frontier")]
    fn decreasing_time_aborts_in_debug() {
        let mut album = Album::new();
        album.record(3.0, ()).unwrap();
        let _ = album.record(2.0, ());
    }

    #[test]
    fn trim_after_removes_later_moments() {
        let mut album = Album::new();
        for t in 0..5 {
            album.record(t as f64, t).unwrap();
        }
        album.trim_after(2.0);
        assert_eq!(album.len(), 3);
        assert_eq!(album.latest_at_or_before(100.0), Some(&2));
    }

    #[test]
    fn trim_after_is_idempotent() {
        let mut album = Album::new();
        for t in 0..5 {
            album.record(t as f64, t).unwrap();
        }
        album.trim_after(3.5);
        let once = album.clone();
        album.trim_after(3.5);
        assert_eq!(album.moments(), once.moments());
    }

    #[test]
    fn trim_before_preserves_floor_query() {
        let mut album = Album::new();
        for t in 0..6 {
            album.record(t as f64, t).unwrap();
        }
        album.trim_before(3.5);
        assert_eq!(album.len(), 3);
        assert_eq!(album.latest_at_or_before(3.5), Some(&3));
        assert_eq!(album.latest_at_or_before(5.0), Some(&5));
    }
}
