//! Tempo Engine -- recording lifecycle, global time driver, and time
//! clones.
//!
//! This crate sits on top of [`tempo_history`]'s containers and provides
//! the machinery that makes them a rewind engine:
//!
//! - [`TimedObject`](recorder::TimedObject) -- the lifecycle wrapper every
//!   recorded identity shares: time bounds, the `Recording <-> Rewinding`
//!   state machine, reference-counted suspension, and the divergence
//!   (trim-on-resume) protocol.
//! - [`TimeController`](controller::TimeController) -- the process-wide
//!   driver that advances all registered recorders in lockstep, or scrubs
//!   them during rewind navigation, with a monotonic earliest-time floor.
//! - [`CloneManager`](branch::CloneManager) -- bounded-lifetime deep
//!   copies of a slice of one identity's history, paid for from a small
//!   pool of reusable charges.
//!
//! # Quick Start
//!
//! ```
//! use tempo_engine::prelude::*;
//! use tempo_history::prelude::*;
//!
//! let mut tc = TimeController::new(0.0);
//! let id = tc.register(TimedObject::new(0.0, Scrapbook::<f64>::new()));
//!
//! // Live loop: push samples at the write frontier, then step.
//! for _ in 0..60 {
//!     let obj = tc.get_mut::<Scrapbook<f64>>(id).unwrap();
//!     if let Some((now, book)) = obj.frontier() {
//!         book.record(now, now * 2.0, Interpolation::Linear).unwrap();
//!     }
//!     tc.advance(1.0 / 60.0);
//! }
//!
//! // Rewind halfway, then diverge.
//! tc.begin_rewind();
//! tc.set_to_time(0.5);
//! tc.resume();
//! let obj = tc.get::<Scrapbook<f64>>(id).unwrap();
//! assert!((obj.farthest_time() - 0.5).abs() < 1e-9);
//! ```

#![deny(unsafe_code)]

pub mod branch;
pub mod controller;
pub mod dump;
pub mod recorder;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by engine operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// A trim would delete the identity's genesis state.
    #[error("cannot trim to t={attempted}: precedes spawn time t={spawn_time}")]
    InvalidTrimTime {
        /// The rejected trim time.
        attempted: f64,
        /// The identity's spawn time.
        spawn_time: f64,
    },

    /// The clone charge pool is exhausted. A normal, user-visible
    /// condition ("cannot create clone now"), not a bug.
    #[error("no clone charges available (capacity {capacity})")]
    NoChargesAvailable {
        /// Total size of the charge pool.
        capacity: usize,
    },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::branch::{CloneConfig, CloneHandle, CloneManager};
    pub use crate::controller::{BoundEvent, ControllerMode, RecorderId, TimeController};
    pub use crate::dump::HistoryDump;
    pub use crate::recorder::{RecordState, TimedObject, TimedRecorder};
    pub use crate::EngineError;
}
