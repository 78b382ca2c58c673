//! Serializable history dumps with BLAKE3 hashing.
//!
//! A [`HistoryDump`] is a point-in-time copy of everything a recorder has
//! stored -- its time bounds plus the full timeline set -- with a BLAKE3
//! content hash. Dumps exist for verification, not persistence: two dumps
//! with equal hashes hold identical histories, which is how clone
//! isolation and divergence behavior are checked without comparing
//! containers field by field.
//!
//! # Usage
//!
//! ```
//! use tempo_engine::prelude::*;
//! use tempo_history::prelude::*;
//!
//! let mut obj = TimedObject::new(0.0, Scrapbook::new());
//! let (now, book) = obj.frontier().unwrap();
//! book.record(now, 1.0f64, Interpolation::Linear).unwrap();
//!
//! let dump = obj.capture_dump();
//! assert_eq!(dump.hash.len(), 64); // BLAKE3 hex digest
//! assert!(dump.verify());
//! assert_eq!(dump.hash, obj.history_hash());
//! ```

use serde::Serialize;

use tempo_history::history::History;

use crate::recorder::TimedObject;

// ---------------------------------------------------------------------------
// HistoryDump
// ---------------------------------------------------------------------------

/// A hashed copy of a recorder's complete stored history.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryDump<S> {
    /// Time at which the identity came into existence.
    pub spawn_time: f64,
    /// The write frontier at capture time.
    pub farthest_time: f64,
    /// Deep copy of the timeline set.
    pub timelines: S,
    /// BLAKE3 hex digest (64 lowercase hex chars) of the serialized
    /// bounds + timelines. The hash field itself is not part of the
    /// hashed data.
    pub hash: String,
}

impl<S: Serialize> HistoryDump<S> {
    /// Recompute the hash from the dump's data and compare it to the
    /// recorded one.
    pub fn verify(&self) -> bool {
        compute_hash(self.spawn_time, self.farthest_time, &self.timelines) == self.hash
    }
}

// ---------------------------------------------------------------------------
// Hashing helpers
// ---------------------------------------------------------------------------

/// BLAKE3 hex digest of the hashable history state.
///
/// Covers the time bounds and the serialized timeline set -- everything
/// that playback can observe. `cur_time` is deliberately excluded: two
/// recorders scrubbed to different instants of the same history are the
/// same history.
fn compute_hash<S: Serialize>(spawn_time: f64, farthest_time: f64, timelines: &S) -> String {
    #[derive(Serialize)]
    struct HashableState<'a, S> {
        spawn_time: f64,
        farthest_time: f64,
        timelines: &'a S,
    }

    let hashable = HashableState {
        spawn_time,
        farthest_time,
        timelines,
    };
    let json_bytes = serde_json::to_vec(&hashable)
        .expect("history state should always be JSON-serializable");
    blake3::hash(&json_bytes).to_hex().to_string()
}

// ---------------------------------------------------------------------------
// TimedObject dump methods
// ---------------------------------------------------------------------------

impl<S: History + Serialize + Clone> TimedObject<S> {
    /// Capture a hashed copy of everything this recorder has stored.
    pub fn capture_dump(&self) -> HistoryDump<S> {
        let hash = self.history_hash();
        HistoryDump {
            spawn_time: self.spawn_time(),
            farthest_time: self.farthest_time(),
            timelines: self.timelines().clone(),
            hash,
        }
    }

    /// The BLAKE3 hex digest of the stored history, without allocating a
    /// full dump.
    pub fn history_hash(&self) -> String {
        compute_hash(self.spawn_time(), self.farthest_time(), self.timelines())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempo_history::prelude::*;

    fn recorded() -> TimedObject<Scrapbook<f64>> {
        let mut obj = TimedObject::new(0.0, Scrapbook::new());
        for i in 0..5 {
            let (now, book) = obj.frontier().unwrap();
            book.record(now, i as f64, Interpolation::Linear).unwrap();
            obj.advance(1.0);
        }
        obj
    }

    #[test]
    fn identical_histories_hash_identically() {
        assert_eq!(recorded().history_hash(), recorded().history_hash());
    }

    #[test]
    fn hash_ignores_scrub_position() {
        let mut obj = recorded();
        let before = obj.history_hash();
        obj.begin_rewind();
        obj.set_to_time(1.5);
        assert_eq!(obj.history_hash(), before);
    }

    #[test]
    fn divergence_changes_the_hash() {
        let mut obj = recorded();
        let before = obj.history_hash();
        obj.begin_rewind();
        obj.set_to_time(2.0);
        obj.resume();
        assert_ne!(obj.history_hash(), before);
    }

    #[test]
    fn dump_verifies_and_detects_tampering() {
        let dump = recorded().capture_dump();
        assert!(dump.verify());

        let mut tampered = dump.clone();
        tampered.farthest_time += 1.0;
        assert!(!tampered.verify());
    }
}
