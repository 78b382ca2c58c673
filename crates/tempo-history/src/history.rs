//! Uniform trimming over heterogeneous container sets.
//!
//! A recorder typically owns several containers of different element types
//! (a position [`Scrapbook`], a pusher [`WindowRecorder`], an event
//! [`Album`]...). The [`History`] trait gives them one trimming surface so
//! the divergence protocol can fan out over all of them without knowing
//! their element types.
//!
//! Composite impls are provided for tuples (up to six members), `Vec`,
//! and `Option`, so an entity's timeline set is usually just a struct
//! whose `History` impl forwards to each field -- or a plain tuple.

use crate::album::Album;
use crate::scrapbook::Scrapbook;
use crate::window::WindowRecorder;

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// Anything that stores time-keyed data and supports structural trimming.
pub trait History {
    /// Delete recorded data strictly after `time`.
    fn trim_after(&mut self, time: f64);

    /// Drop recorded data that no longer affects queries at or after
    /// `time`.
    fn trim_before(&mut self, time: f64);
}

impl<T> History for Scrapbook<T> {
    fn trim_after(&mut self, time: f64) {
        Scrapbook::trim_after(self, time);
    }

    fn trim_before(&mut self, time: f64) {
        Scrapbook::trim_before(self, time);
    }
}

impl<T> History for Album<T> {
    fn trim_after(&mut self, time: f64) {
        Album::trim_after(self, time);
    }

    fn trim_before(&mut self, time: f64) {
        Album::trim_before(self, time);
    }
}

impl<T> History for WindowRecorder<T> {
    fn trim_after(&mut self, time: f64) {
        WindowRecorder::trim_after(self, time);
    }

    fn trim_before(&mut self, time: f64) {
        WindowRecorder::trim_before(self, time);
    }
}

// ---------------------------------------------------------------------------
// Composite impls
// ---------------------------------------------------------------------------

impl History for () {
    fn trim_after(&mut self, _time: f64) {}
    fn trim_before(&mut self, _time: f64) {}
}

impl<H: History> History for Vec<H> {
    fn trim_after(&mut self, time: f64) {
        for h in self {
            h.trim_after(time);
        }
    }

    fn trim_before(&mut self, time: f64) {
        for h in self {
            h.trim_before(time);
        }
    }
}

impl<H: History> History for Option<H> {
    fn trim_after(&mut self, time: f64) {
        if let Some(h) = self {
            h.trim_after(time);
        }
    }

    fn trim_before(&mut self, time: f64) {
        if let Some(h) = self {
            h.trim_before(time);
        }
    }
}

macro_rules! tuple_history {
    ($($name:ident),+) => {
        impl<$($name: History),+> History for ($($name,)+) {
            fn trim_after(&mut self, time: f64) {
                #[allow(non_snake_case)]
                let ($($name,)+) = self;
                $($name.trim_after(time);)+
            }

            fn trim_before(&mut self, time: f64) {
                #[allow(non_snake_case)]
                let ($($name,)+) = self;
                $($name.trim_before(time);)+
            }
        }
    };
}

tuple_history!(A);
tuple_history!(A, B);
tuple_history!(A, B, C);
tuple_history!(A, B, C, D);
tuple_history!(A, B, C, D, E);
tuple_history!(A, B, C, D, E, F);

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
