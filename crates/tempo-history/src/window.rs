//! Contiguous windows over a discrete-valued signal.
//!
//! A [`WindowRecorder`] tracks a signal that holds one constant value over
//! a maximal span of time ("who is pushing this box", "which surface is
//! this standing on"). Each value change closes the current window and
//! opens a new one, so storage is `O(changes)` for a signal with bounded
//! cardinality, not `O(ticks)`.
//!
//! Structural invariant: windows are sorted, non-overlapping, and
//! contiguous -- `windows[i].frame.end == windows[i + 1].frame.start` --
//! and the trailing window stays open (`end == +inf`) until the recorder
//! is explicitly stopped.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::frame::TimeFrame;
use crate::HistoryError;

// ---------------------------------------------------------------------------
// Window
// ---------------------------------------------------------------------------

/// A maximal contiguous span over which the signal held one value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Window<T> {
    /// The span covered by this window.
    pub frame: TimeFrame,
    /// The constant value held over the span.
    pub data: T,
}

// ---------------------------------------------------------------------------
// WindowRecorder
// ---------------------------------------------------------------------------

/// Records a sequence of disjoint, contiguous [`Window`]s.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowRecorder<T> {
    windows: Vec<Window<T>>,
}

impl<T> Default for WindowRecorder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> WindowRecorder<T> {
    /// Create a recorder with no windows.
    pub fn new() -> Self {
        Self {
            windows: Vec::new(),
        }
    }

    /// Number of stored windows.
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    /// `true` if no window has been opened yet.
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Read-only view of the windows, in time order.
    pub fn windows(&self) -> &[Window<T>] {
        &self.windows
    }

    /// The trailing window, if any.
    pub fn current(&self) -> Option<&Window<T>> {
        self.windows.last()
    }

    /// The window whose frame contains `time`, if any.
    pub fn window_at(&self, time: f64) -> Option<&Window<T>> {
        let after = self.windows.partition_point(|w| w.frame.start <= time);
        let i = after.checked_sub(1)?;
        let w = &self.windows[i];
        w.frame.contains(time).then_some(w)
    }

    /// Seal the trailing open window at `now`, stopping the recorder.
    ///
    /// No-op if there is no window or the trailing window is already
    /// closed.
    pub fn close(&mut self, now: f64) {
        if let Some(last) = self.windows.last_mut() {
            if last.frame.is_open() {
                last.frame.close(now);
            }
        }
    }

    /// Remove windows that start strictly after `time`; the window that
    /// contains `time` collapses back to open (`end = +inf`).
    ///
    /// A window that spanned into a now-erased future is not deleted: the
    /// relationship it represents may legitimately continue, so recording
    /// resumes into it. Idempotent.
    pub fn trim_after(&mut self, time: f64) {
        let keep = self.windows.partition_point(|w| w.frame.start <= time);
        self.windows.truncate(keep);
        if let Some(last) = self.windows.last_mut() {
            // Reopen the straddling window; a window already sealed at or
            // before `time` stayed entirely in the surviving past.
            if last.frame.end > time {
                last.frame.end = f64::INFINITY;
            }
        }
    }

    /// Drop windows that ended at or before `time`.
    pub fn trim_before(&mut self, time: f64) {
        let first_kept = self.windows.partition_point(|w| w.frame.end <= time);
        self.windows.drain(..first_kept);
    }
}

impl<T: Eq> WindowRecorder<T> {
    /// Start a new window holding `data` at `now`.
    ///
    /// Closes the current open window at `now` and opens a fresh one. If
    /// `data` equals the current window's value this is a no-op: the
    /// existing window simply continues.
    ///
    /// # Errors
    ///
    /// [`HistoryError::OutOfOrderWrite`] if `now` precedes the current
    /// window's start.
    pub fn start_window(&mut self, now: f64, data: T) -> Result<(), HistoryError> {
        if let Some(last) = self.windows.last_mut() {
            if now < last.frame.start {
                return Err(HistoryError::OutOfOrderWrite {
                    last: last.frame.start,
                    attempted: now,
                });
            }
            if last.data == data {
                return Ok(());
            }
            if last.frame.is_open() {
                last.frame.close(now);
            }
        }
        trace!(time = now, "window opened");
        self.windows.push(Window {
            frame: TimeFrame::open(now),
            data,
        });
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
