//! The recorder lifecycle shared by every timed entity.
//!
//! A [`TimedObject`] wraps an entity's history containers (its *timeline
//! set*, any [`History`] implementor) with the time bookkeeping and state
//! machine every recorded identity needs:
//!
//! - `spawn_time <= cur_time <= farthest_time`, where `farthest_time` is
//!   the write frontier -- the furthest point actual simulation has
//!   reached. It never decreases while recording is active.
//! - A `Recording <-> Rewinding` state machine. While rewinding,
//!   `cur_time` moves freely inside the recorded range and the containers
//!   are only queried, never written.
//! - Reference-counted suspension: any number of independent callers may
//!   request that recording pause (cutscenes, dialogue); writes resume
//!   only once every request is cancelled.
//! - The divergence protocol: resuming forward play from an earlier
//!   `cur_time` trims all recorded data after it, so history never holds
//!   two contradictory futures for one identity.
//!
//! The engine only stores and retrieves data. Moving a visible object to
//! match a scrubbed time is the consumer's job, via whatever "apply state
//! at time T" callback its rendering/physics layer implements.

use std::any::Any;

use tracing::{debug, trace, warn};

use tempo_history::history::History;

use crate::EngineError;

// ---------------------------------------------------------------------------
// RecordState
// ---------------------------------------------------------------------------

/// The two modes of a recorder's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum RecordState {
    /// Live simulation: `cur_time` rides the write frontier and new
    /// samples are accepted (unless suspended).
    Recording,
    /// Time scrubbing: `cur_time` moves under external navigation,
    /// containers are read-only.
    Rewinding,
}

// ---------------------------------------------------------------------------
// TimedObject
// ---------------------------------------------------------------------------

/// Lifecycle wrapper that owns an entity's timeline set.
#[derive(Debug, Clone)]
pub struct TimedObject<S> {
    /// Time at which this identity came into existence.
    spawn_time: f64,
    /// The currently presented time, always within
    /// `[spawn_time, farthest_time]`.
    cur_time: f64,
    /// The write frontier.
    farthest_time: f64,
    state: RecordState,
    /// Outstanding suspend requests; writes are accepted only at zero.
    suspend_requests: u32,
    /// Set by [`force_set_time_bounds`](Self::force_set_time_bounds):
    /// the frontier is administratively fixed and `advance` will never
    /// grow it (clone playback).
    bounds_locked: bool,
    /// The entity's history containers.
    timelines: S,
}

impl<S: History> TimedObject<S> {
    /// Create a recorder at `spawn_time` with the given (usually empty)
    /// timeline set.
    pub fn new(spawn_time: f64, timelines: S) -> Self {
        Self {
            spawn_time,
            cur_time: spawn_time,
            farthest_time: spawn_time,
            state: RecordState::Recording,
            suspend_requests: 0,
            bounds_locked: false,
            timelines,
        }
    }

    // -- accessors ----------------------------------------------------------

    /// Time at which this identity came into existence.
    pub fn spawn_time(&self) -> f64 {
        self.spawn_time
    }

    /// The currently presented time.
    pub fn cur_time(&self) -> f64 {
        self.cur_time
    }

    /// The write frontier: the latest simulated instant for this identity.
    pub fn farthest_time(&self) -> f64 {
        self.farthest_time
    }

    /// The current lifecycle state.
    pub fn state(&self) -> RecordState {
        self.state
    }

    /// `true` while at least one suspend request is outstanding.
    pub fn is_suspended(&self) -> bool {
        self.suspend_requests > 0
    }

    /// Read-only access to the timeline set, valid in any state.
    pub fn timelines(&self) -> &S {
        &self.timelines
    }

    /// Mutable access to the timeline set at the write frontier.
    ///
    /// Returns `Some((frontier_time, timelines))` only while the recorder
    /// is in `Recording` state with no outstanding suspend requests;
    /// entity code records its per-tick samples through this. Returns
    /// `None` while rewinding or suspended, which is how "no new samples
    /// are accepted" is enforced.
    pub fn frontier(&mut self) -> Option<(f64, &mut S)> {
        if self.state == RecordState::Recording && self.suspend_requests == 0 {
            Some((self.cur_time, &mut self.timelines))
        } else {
            None
        }
    }

    // -- time flow ----------------------------------------------------------

    /// Advance live time by `dt`.
    ///
    /// While recording, `cur_time` and the frontier move together; while
    /// suspended, time still passes (so `cur_time` keeps reporting
    /// correctly) but no samples land in the gap. On a bounds-locked
    /// recorder (a clone) `cur_time` advances only up to the fixed
    /// frontier. No-op while rewinding.
    pub fn advance(&mut self, dt: f64) {
        debug_assert!(dt >= 0.0, "advance with negative dt {dt}");
        if self.state != RecordState::Recording {
            return;
        }
        if self.bounds_locked {
            self.cur_time = (self.cur_time + dt).min(self.farthest_time);
        } else {
            self.cur_time += dt;
            self.farthest_time = self.cur_time;
        }
    }

    /// Scrub the presented time to `time`, clamped to
    /// `[spawn_time, farthest_time]`.
    ///
    /// Sampling outside the recorded range is recovered by clamping, never
    /// surfaced as an error. Returns the clamped time actually applied.
    pub fn set_to_time(&mut self, time: f64) -> f64 {
        let clamped = time.clamp(self.spawn_time, self.farthest_time);
        self.cur_time = clamped;
        clamped
    }

    // -- suspension ---------------------------------------------------------

    /// Request that recording pause. Reference-counted: recording resumes
    /// only once every outstanding request has been cancelled.
    pub fn request_suspend_recording(&mut self) {
        self.suspend_requests += 1;
        trace!(requests = self.suspend_requests, "suspend requested");
    }

    /// Cancel one previously issued suspend request.
    pub fn cancel_suspend_request(&mut self) {
        if self.suspend_requests == 0 {
            warn!("cancel_suspend_request without an outstanding request");
            return;
        }
        self.suspend_requests -= 1;
        trace!(requests = self.suspend_requests, "suspend cancelled");
    }

    // -- rewind / divergence protocol ---------------------------------------

    /// Enter `Rewinding`: freeze the frontier and hand `cur_time` over to
    /// navigation control.
    pub fn begin_rewind(&mut self) {
        if self.state == RecordState::Rewinding {
            return;
        }
        self.state = RecordState::Rewinding;
        trace!(cur = self.cur_time, farthest = self.farthest_time, "rewind begun");
    }

    /// Leave `Rewinding` and resume forward recording from `cur_time`.
    ///
    /// If `cur_time` is behind the frontier this is a *divergence*: all
    /// data after `cur_time` is trimmed first, so the erased future can
    /// never be observed again.
    pub fn resume(&mut self) {
        if self.state != RecordState::Rewinding {
            return;
        }
        if self.cur_time < self.farthest_time {
            debug!(
                from = self.farthest_time,
                to = self.cur_time,
                "diverging; trimming erased future"
            );
            // cur_time >= spawn_time always holds, so this cannot fail.
            let _ = self.trim_data_after(self.cur_time);
        }
        self.state = RecordState::Recording;
    }

    /// Delete all recorded data strictly after `time` and pull the
    /// frontier back to it.
    ///
    /// Caller contract: the recorder must not be actively recording
    /// (asserted in debug builds). A `time` at or past the frontier is a
    /// no-op; a `time` before `spawn_time` would delete the identity's
    /// genesis state and is an error.
    pub fn trim_data_after(&mut self, time: f64) -> Result<(), EngineError> {
        if time < self.spawn_time {
            return Err(EngineError::InvalidTrimTime {
                attempted: time,
                spawn_time: self.spawn_time,
            });
        }
        if time >= self.farthest_time {
            return Ok(());
        }
        debug_assert!(
            self.state != RecordState::Recording || self.is_suspended(),
            "trim while the write frontier is live"
        );
        self.timelines.trim_after(time);
        self.farthest_time = time;
        self.cur_time = self.cur_time.min(time);
        Ok(())
    }

    /// Drop recorded data that no longer affects queries at or after
    /// `time` (memory reclamation behind a committed floor, clone
    /// slicing). Queries earlier than `time` afterwards read clamped
    /// values.
    pub fn trim_data_before(&mut self, time: f64) {
        self.timelines.trim_before(time);
    }

    /// Administrative override fixing `[spawn_time, farthest_time]` to
    /// `[start, end]` without tick-driven growth. Used only at
    /// clone-creation time; afterwards the frontier is locked and
    /// [`advance`](Self::advance) clamps against it.
    pub fn force_set_time_bounds(&mut self, start: f64, end: f64) {
        debug_assert!(end >= start, "time bounds end {end} precedes start {start}");
        self.spawn_time = start;
        self.cur_time = start;
        self.farthest_time = end;
        self.bounds_locked = true;
        debug!(start, end, "time bounds forced");
    }
}

// ---------------------------------------------------------------------------
// TimedRecorder (object-safe surface)
// ---------------------------------------------------------------------------

/// The type-erased surface the [`TimeController`](crate::controller::TimeController)
/// drives recorders through. Implemented by every `TimedObject`.
pub trait TimedRecorder: Any {
    /// Advance live time by `dt`.
    fn advance(&mut self, dt: f64);
    /// Scrub the presented time; returns the clamped time applied.
    fn set_to_time(&mut self, time: f64) -> f64;
    /// Enter `Rewinding`.
    fn begin_rewind(&mut self);
    /// Leave `Rewinding`, trimming on divergence.
    fn resume(&mut self);
    /// Drop data behind a committed floor.
    fn trim_data_before(&mut self, time: f64);
    /// Time at which this identity came into existence.
    fn spawn_time(&self) -> f64;
    /// The currently presented time.
    fn cur_time(&self) -> f64;
    /// The write frontier.
    fn farthest_time(&self) -> f64;
    /// The current lifecycle state.
    fn state(&self) -> RecordState;
    /// Upcast for typed retrieval.
    fn as_any(&self) -> &dyn Any;
    /// Upcast for typed retrieval.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<S: History + 'static> TimedRecorder for TimedObject<S> {
    fn advance(&mut self, dt: f64) {
        TimedObject::advance(self, dt);
    }

    fn set_to_time(&mut self, time: f64) -> f64 {
        TimedObject::set_to_time(self, time)
    }

    fn begin_rewind(&mut self) {
        TimedObject::begin_rewind(self);
    }

    fn resume(&mut self) {
        TimedObject::resume(self);
    }

    fn trim_data_before(&mut self, time: f64) {
        TimedObject::trim_data_before(self, time);
    }

    fn spawn_time(&self) -> f64 {
        self.spawn_time
    }

    fn cur_time(&self) -> f64 {
        self.cur_time
    }

    fn farthest_time(&self) -> f64 {
        self.farthest_time
    }

    fn state(&self) -> RecordState {
        self.state
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
