//! Tempo History -- time-indexed containers for continuous recording and
//! rewind.
//!
//! This crate provides the storage layer of the Tempo engine: containers
//! that record a live signal at the write frontier and play it back at any
//! past time, then *trim* -- erase a future that no longer happened -- when
//! the simulation rewinds and diverges.
//!
//! - [`Scrapbook`](scrapbook::Scrapbook) -- snapshots of a continuous
//!   value with per-entry interpolation (Linear or Step).
//! - [`Album`](album::Album) -- a pure event log queried by
//!   latest-at-or-before.
//! - [`WindowRecorder`](window::WindowRecorder) -- maximal contiguous
//!   spans over which a discrete signal held one value.
//! - [`TimeFrame`](frame::TimeFrame) -- the closed-open interval the
//!   windows are built from.
//! - [`History`](history::History) -- uniform trimming across a
//!   heterogeneous set of the above.
//!
//! # Quick Start
//!
//! ```
//! use tempo_history::prelude::*;
//!
//! let mut position = Scrapbook::new();
//! position.record(0.0, [0.0f64, 0.0], Interpolation::Linear).unwrap();
//! position.record(10.0, [10.0, 0.0], Interpolation::Linear).unwrap();
//! assert_eq!(position.sample(5.0).unwrap(), [5.0, 0.0]);
//!
//! // Rewind to t=4 and diverge: the future after 4 is erased.
//! position.trim_after(4.0);
//! position.record(4.0, [4.0, 1.0], Interpolation::Linear).unwrap();
//! assert_eq!(position.sample(100.0).unwrap(), [4.0, 1.0]);
//! ```

#![deny(unsafe_code)]

pub mod album;
pub mod frame;
pub mod history;
pub mod interp;
pub mod scrapbook;
pub mod window;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by history container operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HistoryError {
    /// A query was made before any data exists. Callers recover locally by
    /// falling back to an initial/default value.
    #[error("history is empty; nothing has been recorded yet")]
    EmptyHistory,

    /// A write landed behind the container's frontier. This indicates
    /// broken write-frontier discipline in the caller, not a recoverable
    /// runtime condition.
    #[error("write at t={attempted} is behind the frontier t={last}")]
    OutOfOrderWrite {
        /// Time of the last recorded entry.
        last: f64,
        /// Time of the rejected write.
        attempted: f64,
    },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::album::{Album, Moment};
    pub use crate::frame::TimeFrame;
    pub use crate::history::History;
    pub use crate::interp::{Interpolation, Lerp};
    pub use crate::scrapbook::{Scrapbook, Snapshot};
    pub use crate::window::{Window, WindowRecorder};
    pub use crate::HistoryError;
}

// ---------------------------------------------------------------------------
// Integration tests
// ---------------------------------------------------------------------------
