//! Branch copies ("time clones") with bounded lifetimes.
//!
//! A [`CloneManager`] creates independent copies of a subject's recorded
//! history over a slice `[start, end]`. The copy is a brand-new identity:
//! its containers are deep-copied, its time bounds are administratively
//! fixed, and it carries a standing suspend request so it can never accept
//! writes. The originating subject keeps recording past `end`, entirely
//! unaffected.
//!
//! After its slice has been replayed the clone lingers for a configured
//! *decay* ("blink") tail -- still queryable, frozen at its last state --
//! and is then destroyed. How many clones may be alive at once is bounded
//! by a small pool of reusable integer *charges*; a charge returns to the
//! pool when its clone is destroyed or disconnected.
//!
//! Clones are owned by the manager behind generational [`CloneHandle`]s;
//! the subject holds handles, never references, so there is no ownership
//! cycle between subject and copies.

use std::collections::VecDeque;
use std::fmt;

use tracing::{debug, trace};

use tempo_history::history::History;

use crate::recorder::TimedObject;
use crate::EngineError;

// ---------------------------------------------------------------------------
// CloneHandle
// ---------------------------------------------------------------------------

/// A generational handle to a clone owned by a [`CloneManager`].
///
/// Layout: `[generation: u32 | index: u32]`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct CloneHandle(u64);

impl CloneHandle {
    /// Construct a `CloneHandle` from an index and generation.
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

impl fmt::Debug for CloneHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CloneHandle({}v{})", self.index(), self.generation())
    }
}

// ---------------------------------------------------------------------------
// CloneConfig
// ---------------------------------------------------------------------------

/// Configuration for a [`CloneManager`].
#[derive(Debug, Clone)]
pub struct CloneConfig {
    /// How many clones may be alive at the same time.
    pub max_charges: usize,
    /// How long a clone remains queryable after its slice has been
    /// replayed, before it is destroyed.
    pub decay_duration: f64,
}

impl Default for CloneConfig {
    /// One charge, one second of decay tail.
    fn default() -> Self {
        Self {
            max_charges: 1,
            decay_duration: 1.0,
        }
    }
}

// ---------------------------------------------------------------------------
// CloneSlot
// ---------------------------------------------------------------------------

/// One alive clone and its lifetime bookkeeping.
struct CloneSlot<S> {
    recorder: TimedObject<S>,
    /// Charge slot this clone occupies; `None` once disconnected.
    charge: Option<usize>,
    /// Subject time at which the clone was created. Clones branched after
    /// a later-erased point are destroyed on the subject's divergence.
    branched_at: f64,
    /// World time at which replay started.
    world_spawn: f64,
    /// World time at which the clone is destroyed (slice length + decay).
    world_expiry: f64,
}

// ---------------------------------------------------------------------------
// CloneManager
// ---------------------------------------------------------------------------

/// Creates, drives, and destroys time clones for one subject type.
pub struct CloneManager<S> {
    /// Clone storage; `None` marks a free slot.
    slots: Vec<Option<CloneSlot<S>>>,
    /// Current generation per slot.
    generations: Vec<u32>,
    /// Recyclable slot indices.
    free_indices: VecDeque<u32>,
    /// Stack of unclaimed charge slot ids, `0..max_charges` initially.
    free_charges: Vec<usize>,
    config: CloneConfig,
    /// The manager's view of global time, fed by `advance`/`set_world_time`.
    world_time: f64,
}

impl<S: History + Clone + 'static> CloneManager<S> {
    /// Create a manager whose world clock starts at `world_time`.
    pub fn new(config: CloneConfig, world_time: f64) -> Self {
        let free_charges = (0..config.max_charges).rev().collect();
        Self {
            slots: Vec::new(),
            generations: Vec::new(),
            free_indices: VecDeque::new(),
            free_charges,
            config,
            world_time,
        }
    }

    // -- accessors ----------------------------------------------------------

    /// Number of currently alive clones.
    pub fn alive_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Number of charges left in the pool.
    pub fn charges_available(&self) -> usize {
        self.free_charges.len()
    }

    /// `true` if `handle` refers to a currently alive clone.
    pub fn is_alive(&self, handle: CloneHandle) -> bool {
        let idx = handle.index() as usize;
        idx < self.slots.len()
            && self.generations[idx] == handle.generation()
            && self.slots[idx].is_some()
    }

    /// The manager's world clock.
    pub fn world_time(&self) -> f64 {
        self.world_time
    }

    /// Query access to a clone's recorder.
    pub fn get(&self, handle: CloneHandle) -> Option<&TimedObject<S>> {
        if !self.is_alive(handle) {
            return None;
        }
        self.slots[handle.index() as usize]
            .as_ref()
            .map(|slot| &slot.recorder)
    }

    // -- lifecycle ----------------------------------------------------------

    /// Deep-copy `subject`'s history over `[start, end]` into a new,
    /// independent, bounded-lifetime recorder.
    ///
    /// The slice bounds are clamped to the subject's recorded range. The
    /// clone's frontier is fixed at `end + decay_duration`; during the
    /// decay tail it is still queryable but frozen at its last state.
    ///
    /// # Errors
    ///
    /// [`EngineError::NoChargesAvailable`] when as many clones are alive
    /// as the pool allows.
    pub fn spawn_clone(
        &mut self,
        subject: &TimedObject<S>,
        start: f64,
        end: f64,
    ) -> Result<CloneHandle, EngineError> {
        let charge = self
            .free_charges
            .pop()
            .ok_or(EngineError::NoChargesAvailable {
                capacity: self.config.max_charges,
            })?;

        // Out-of-bounds slice times are recovered by clamping, like any
        // other out-of-bounds query.
        let start = start.clamp(subject.spawn_time(), subject.farthest_time());
        let end = end.clamp(start, subject.farthest_time());

        let mut timelines = subject.timelines().clone();
        timelines.trim_after(end);
        timelines.trim_before(start);

        let mut recorder = TimedObject::new(start, timelines);
        recorder.force_set_time_bounds(start, end + self.config.decay_duration);
        // A clone never records; park it behind a standing suspend request.
        recorder.request_suspend_recording();

        let slot = CloneSlot {
            recorder,
            charge: Some(charge),
            branched_at: subject.cur_time(),
            world_spawn: self.world_time,
            world_expiry: self.world_time + (end - start) + self.config.decay_duration,
        };

        let handle = if let Some(index) = self.free_indices.pop_front() {
            self.slots[index as usize] = Some(slot);
            CloneHandle::new(index, self.generations[index as usize])
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Some(slot));
            self.generations.push(0);
            CloneHandle::new(index, 0)
        };
        debug!(?handle, start, end, charge, "clone spawned");
        Ok(handle)
    }

    /// Destroy a clone, returning its charge to the pool.
    ///
    /// Returns `false` for a stale or unknown handle.
    pub fn destroy(&mut self, handle: CloneHandle) -> bool {
        if !self.is_alive(handle) {
            return false;
        }
        let idx = handle.index() as usize;
        let slot = self.slots[idx].take().expect("alive clone has a slot");
        if let Some(charge) = slot.charge {
            self.free_charges.push(charge);
        }
        self.generations[idx] = self.generations[idx].wrapping_add(1);
        self.free_indices.push_back(handle.index());
        debug!(?handle, "clone destroyed");
        true
    }

    /// Advance the world clock and every clone's replay position by `dt`.
    ///
    /// Clones whose decay tail has fully elapsed are destroyed and their
    /// charges returned. Returns the handles destroyed this step so the
    /// host can tear down whatever visuals represented them.
    pub fn advance(&mut self, dt: f64) -> Vec<CloneHandle> {
        self.world_time += dt;
        for slot in self.slots.iter_mut().flatten() {
            slot.recorder.advance(dt);
        }
        let world_time = self.world_time;
        let expired: Vec<CloneHandle> = self
            .handles()
            .into_iter()
            .filter(|h| {
                self.slots[h.index() as usize]
                    .as_ref()
                    .is_some_and(|s| world_time >= s.world_expiry)
            })
            .collect();
        for &handle in &expired {
            trace!(?handle, "clone decay elapsed");
            self.destroy(handle);
        }
        expired
    }

    /// Scrub the world clock to `time`, moving every clone to the replay
    /// position it presented at that world time (clamped to its bounds).
    pub fn set_world_time(&mut self, time: f64) {
        self.world_time = time;
        for slot in self.slots.iter_mut().flatten() {
            let local = slot.recorder.spawn_time() + (time - slot.world_spawn);
            slot.recorder.set_to_time(local);
        }
    }

    /// Destroy every clone branched from a subject time strictly after
    /// `time`.
    ///
    /// Mirrors container trimming at the branch level: when the subject
    /// rewinds and diverges, a clone created in the erased future must
    /// cease to exist.
    pub fn destroy_clones_after(&mut self, time: f64) {
        for handle in self.handles() {
            let branched_at = self.slots[handle.index() as usize]
                .as_ref()
                .map(|s| s.branched_at);
            if branched_at.is_some_and(|t| t > time) {
                debug!(?handle, branched_at, "destroying clone from erased future");
                self.destroy(handle);
            }
        }
    }

    /// Detach all alive clones from charge bookkeeping, returning their
    /// charges immediately while keeping the clones alive and queryable.
    ///
    /// Used when the subject is ending (scene transition) but its clones
    /// should persist independently.
    pub fn disconnect_clones(&mut self) {
        for slot in self.slots.iter_mut().flatten() {
            if let Some(charge) = slot.charge.take() {
                self.free_charges.push(charge);
            }
        }
        debug!(alive = self.alive_count(), "clones disconnected");
    }

    /// Handles of all currently alive clones.
    pub fn handles(&self) -> Vec<CloneHandle> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_some())
            .map(|(i, _)| CloneHandle::new(i as u32, self.generations[i]))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
