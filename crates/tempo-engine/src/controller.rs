//! The process-wide time driver.
//!
//! A [`TimeController`] owns every registered recorder and moves them in
//! lockstep: during live play, [`advance`](TimeController::advance) pushes
//! all write frontiers forward by one fixed simulation step; during rewind
//! navigation it integrates a signed *navigation velocity* (magnitude =
//! speed multiplier, sign = direction) and scrubs every recorder to the
//! resulting global time.
//!
//! Within one step, all recorders are moved before the call returns, so
//! any read made between steps sees one consistent global time.
//!
//! There is no hidden global state: the controller is an ordinary value
//! constructed by the host and passed by reference to whoever needs it.
//! Recorders are owned behind a generational [`RecorderId`], so a handle
//! held past unregistration is detected as stale instead of aliasing a
//! recycled slot.

use std::collections::VecDeque;
use std::fmt;

use tracing::{debug, trace, warn};

use tempo_history::history::History;

use crate::recorder::{TimedObject, TimedRecorder};

// ---------------------------------------------------------------------------
// RecorderId
// ---------------------------------------------------------------------------

/// A generational recorder handle.
///
/// Layout: `[generation: u32 | index: u32]`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct RecorderId(u64);

impl RecorderId {
    /// Construct a `RecorderId` from an index and generation.
    #[inline]
    pub fn new(index: u32, generation: u32) -> Self {
        Self((generation as u64) << 32 | index as u64)
    }

    /// The index portion (low 32 bits).
    #[inline]
    pub fn index(self) -> u32 {
        self.0 as u32
    }

    /// The generation portion (high 32 bits).
    #[inline]
    pub fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }
}

impl fmt::Debug for RecorderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecorderId({}v{})", self.index(), self.generation())
    }
}

// ---------------------------------------------------------------------------
// ControllerMode / BoundEvent
// ---------------------------------------------------------------------------

/// The controller's global mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerMode {
    /// Live recording: every step advances all write frontiers.
    Live,
    /// Rewind navigation: every step integrates the navigation velocity.
    Rewinding,
}

/// One-shot notification that navigation hit a bound and the velocity was
/// clamped to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundEvent {
    /// Navigation hit the earliest allowed time floor.
    ReachedEarliest,
    /// Navigation returned to the write frontier.
    ReachedFarthest,
}

// ---------------------------------------------------------------------------
// TimeController
// ---------------------------------------------------------------------------

/// Owns all registered recorders and drives their `cur_time` in lockstep.
pub struct TimeController {
    /// Recorder storage; `None` marks a free slot.
    recorders: Vec<Option<Box<dyn TimedRecorder>>>,
    /// Current generation per slot.
    generations: Vec<u32>,
    /// Recyclable slot indices (FIFO so generations spread out).
    free_indices: VecDeque<u32>,
    mode: ControllerMode,
    /// The single global presented time.
    cur_time: f64,
    /// The global write frontier.
    farthest_time: f64,
    /// Monotonically non-decreasing floor; rewinding can never go below.
    earliest_time: f64,
    /// Signed navigation velocity, used only while rewinding.
    velocity: f64,
    /// Set once a bound notification has fired for the current gesture.
    bound_notified: bool,
}

impl TimeController {
    /// Create a controller whose timeline starts at `start_time`.
    pub fn new(start_time: f64) -> Self {
        Self {
            recorders: Vec::new(),
            generations: Vec::new(),
            free_indices: VecDeque::new(),
            mode: ControllerMode::Live,
            cur_time: start_time,
            farthest_time: start_time,
            earliest_time: start_time,
            velocity: 0.0,
            bound_notified: false,
        }
    }

    // -- registry -----------------------------------------------------------

    /// Take ownership of a recorder and return its handle.
    pub fn register<S: History + 'static>(&mut self, recorder: TimedObject<S>) -> RecorderId {
        let boxed: Box<dyn TimedRecorder> = Box::new(recorder);
        if let Some(index) = self.free_indices.pop_front() {
            self.recorders[index as usize] = Some(boxed);
            RecorderId::new(index, self.generations[index as usize])
        } else {
            let index = self.recorders.len() as u32;
            self.recorders.push(Some(boxed));
            self.generations.push(0);
            RecorderId::new(index, 0)
        }
    }

    /// Drop a recorder and recycle its slot.
    ///
    /// Returns `false` for a stale or unknown handle.
    pub fn unregister(&mut self, id: RecorderId) -> bool {
        if !self.is_registered(id) {
            return false;
        }
        let idx = id.index() as usize;
        self.recorders[idx] = None;
        self.generations[idx] = self.generations[idx].wrapping_add(1);
        self.free_indices.push_back(id.index());
        true
    }

    /// `true` if `id` refers to a currently registered recorder.
    pub fn is_registered(&self, id: RecorderId) -> bool {
        let idx = id.index() as usize;
        idx < self.recorders.len()
            && self.generations[idx] == id.generation()
            && self.recorders[idx].is_some()
    }

    /// Number of currently registered recorders.
    pub fn recorder_count(&self) -> usize {
        self.recorders.iter().filter(|r| r.is_some()).count()
    }

    /// Typed access to a registered recorder.
    ///
    /// Returns `None` for a stale handle or a timeline-set type mismatch.
    pub fn get<S: History + 'static>(&self, id: RecorderId) -> Option<&TimedObject<S>> {
        if !self.is_registered(id) {
            return None;
        }
        self.recorders[id.index() as usize]
            .as_ref()?
            .as_any()
            .downcast_ref::<TimedObject<S>>()
    }

    /// Typed mutable access to a registered recorder.
    pub fn get_mut<S: History + 'static>(&mut self, id: RecorderId) -> Option<&mut TimedObject<S>> {
        if !self.is_registered(id) {
            return None;
        }
        self.recorders[id.index() as usize]
            .as_mut()?
            .as_any_mut()
            .downcast_mut::<TimedObject<S>>()
    }

    // -- global clock -------------------------------------------------------

    /// The global presented time.
    pub fn cur_time(&self) -> f64 {
        self.cur_time
    }

    /// The global write frontier.
    pub fn farthest_time(&self) -> f64 {
        self.farthest_time
    }

    /// The earliest time rewinding may reach.
    pub fn earliest_time(&self) -> f64 {
        self.earliest_time
    }

    /// The controller's current mode.
    pub fn mode(&self) -> ControllerMode {
        self.mode
    }

    /// The current navigation velocity.
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Raise the earliest-allowed-time floor to `time`.
    ///
    /// The floor is monotonic: attempts to lower it are ignored (with a
    /// warning), so a committed story/puzzle checkpoint can never be
    /// rewound past.
    pub fn raise_earliest(&mut self, time: f64) {
        if time < self.earliest_time {
            warn!(
                floor = self.earliest_time,
                attempted = time,
                "ignoring attempt to lower the earliest-time floor"
            );
            return;
        }
        self.earliest_time = time.min(self.farthest_time);
        debug!(floor = self.earliest_time, "earliest-time floor raised");
    }

    /// Drop recorded data behind the committed floor on every recorder.
    ///
    /// Queries earlier than the floor afterwards read clamped values, but
    /// navigation can never reach them anyway.
    pub fn reclaim_history(&mut self) {
        let floor = self.earliest_time;
        for rec in self.recorders.iter_mut().flatten() {
            rec.trim_data_before(floor);
        }
    }

    // -- stepping -----------------------------------------------------------

    /// Execute one simulation step of `dt` seconds.
    ///
    /// In `Live` mode, advances the global clock and every recorder's
    /// write frontier by `dt`. In `Rewinding` mode, integrates the
    /// navigation velocity, clamps to `[earliest_time, farthest_time]`,
    /// and scrubs every recorder to the new global time. Hitting a bound
    /// fires a one-shot [`BoundEvent`] and clamps the velocity to zero.
    pub fn advance(&mut self, dt: f64) -> Option<BoundEvent> {
        debug_assert!(dt >= 0.0, "advance with negative dt {dt}");
        match self.mode {
            ControllerMode::Live => {
                self.cur_time += dt;
                self.farthest_time = self.cur_time;
                for rec in self.recorders.iter_mut().flatten() {
                    rec.advance(dt);
                }
                None
            }
            ControllerMode::Rewinding => {
                let target = self.cur_time + self.velocity * dt;
                let clamped = target.clamp(self.earliest_time, self.farthest_time);
                self.cur_time = clamped;
                for rec in self.recorders.iter_mut().flatten() {
                    rec.set_to_time(clamped);
                }
                if clamped != target && !self.bound_notified {
                    self.bound_notified = true;
                    let event = if target < self.earliest_time {
                        BoundEvent::ReachedEarliest
                    } else {
                        BoundEvent::ReachedFarthest
                    };
                    debug!(?event, time = clamped, "navigation bound reached");
                    self.velocity = 0.0;
                    return Some(event);
                }
                None
            }
        }
    }

    /// Enter rewind navigation: freeze all frontiers and hand the global
    /// time over to [`set_velocity`](Self::set_velocity) /
    /// [`advance`](Self::advance).
    pub fn begin_rewind(&mut self) {
        if self.mode == ControllerMode::Rewinding {
            return;
        }
        self.mode = ControllerMode::Rewinding;
        self.velocity = 0.0;
        self.bound_notified = false;
        for rec in self.recorders.iter_mut().flatten() {
            rec.begin_rewind();
        }
        debug!(time = self.cur_time, "rewind navigation begun");
    }

    /// Set the signed navigation velocity. Re-arms bound notification.
    pub fn set_velocity(&mut self, velocity: f64) {
        self.velocity = velocity;
        self.bound_notified = false;
    }

    /// Scrub every recorder directly to `time`, clamped to the navigable
    /// range. Returns the clamped global time.
    pub fn set_to_time(&mut self, time: f64) -> f64 {
        debug_assert!(
            self.mode == ControllerMode::Rewinding,
            "scrubbing outside rewind navigation"
        );
        let clamped = time.clamp(self.earliest_time, self.farthest_time);
        self.cur_time = clamped;
        for rec in self.recorders.iter_mut().flatten() {
            rec.set_to_time(clamped);
        }
        trace!(time = clamped, "scrubbed");
        clamped
    }

    /// Leave rewind navigation and resume live recording from the current
    /// global time.
    ///
    /// If navigation stopped behind the old frontier, every recorder trims
    /// its erased future first (divergence), and the global frontier is
    /// pulled back to the current time.
    pub fn resume(&mut self) {
        if self.mode == ControllerMode::Live {
            return;
        }
        for rec in self.recorders.iter_mut().flatten() {
            rec.resume();
        }
        self.farthest_time = self.cur_time;
        self.velocity = 0.0;
        self.mode = ControllerMode::Live;
        debug!(time = self.cur_time, "live recording resumed");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
