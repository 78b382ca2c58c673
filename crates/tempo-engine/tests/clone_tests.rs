//! Clone lifecycle scenarios: isolation from the subject, charge pool
//! behavior, decay, and divergence interplay.

use tempo_engine::prelude::*;
use tempo_history::prelude::*;

/// A player's recorded state: position plus the action log a clone
/// re-enacts.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct PlayerHistory {
    position: Scrapbook<[f64; 2]>,
    actions: Album<String>,
}

impl History for PlayerHistory {
    fn trim_after(&mut self, time: f64) {
        self.position.trim_after(time);
        self.actions.trim_after(time);
    }

    fn trim_before(&mut self, time: f64) {
        self.position.trim_before(time);
        self.actions.trim_before(time);
    }
}

/// Subject that walked x = t over [0, 10], pressing a button at t=4.
fn walked_subject() -> TimedObject<PlayerHistory> {
    let mut obj = TimedObject::new(
        0.0,
        PlayerHistory {
            position: Scrapbook::new(),
            actions: Album::new(),
        },
    );
    for i in 0..=10 {
        let (now, h) = obj.frontier().unwrap();
        h.position.record(now, [now, 0.0], Interpolation::Linear).unwrap();
        if i == 4 {
            h.actions.record(now, "press".to_owned()).unwrap();
        }
        if i < 10 {
            obj.advance(1.0);
        }
    }
    obj
}

fn manager(max_charges: usize) -> CloneManager<PlayerHistory> {
    CloneManager::new(
        CloneConfig {
            max_charges,
            decay_duration: 0.5,
        },
        10.0,
    )
}

// -- re-enactment ---------------------------------------------------------

#[test]
fn clone_reenacts_the_recorded_slice() {
    let subj = walked_subject();
    let mut mgr = manager(1);
    let handle = mgr.spawn_clone(&subj, 2.0, 8.0).unwrap();

    // World time advances 2.5s: the clone is at local time 4.5, just
    // after its recorded button press.
    mgr.advance(2.5);
    let clone = mgr.get(handle).unwrap();
    assert_eq!(clone.cur_time(), 4.5);
    let h = clone.timelines();
    assert_eq!(h.position.sample(clone.cur_time()).unwrap(), [4.5, 0.0]);
    assert_eq!(h.actions.latest_at_or_before(clone.cur_time()).unwrap(), "press");
}

#[test]
fn clone_slice_excludes_surrounding_history() {
    let subj = walked_subject();
    let mut mgr = manager(1);
    let handle = mgr.spawn_clone(&subj, 3.0, 6.0).unwrap();
    let h = mgr.get(handle).unwrap().timelines();

    // Outside the slice, queries clamp to the slice endpoints.
    assert_eq!(h.position.sample(0.0).unwrap(), [3.0, 0.0]);
    assert_eq!(h.position.sample(100.0).unwrap(), [6.0, 0.0]);
}

// -- isolation ------------------------------------------------------------

#[test]
fn subject_mutation_never_reaches_the_clone() {
    let mut subj = walked_subject();
    let mut mgr = manager(1);
    let handle = mgr.spawn_clone(&subj, 2.0, 8.0).unwrap();
    let clone_hash = mgr.get(handle).unwrap().history_hash();

    // The subject keeps living: records further...
    subj.advance(1.0);
    let (now, h) = subj.frontier().unwrap();
    h.position.record(now, [-5.0, 3.0], Interpolation::Linear).unwrap();
    assert_eq!(mgr.get(handle).unwrap().history_hash(), clone_hash);

    // ...then rewinds straight through the cloned slice and diverges.
    subj.begin_rewind();
    subj.set_to_time(1.0);
    subj.resume();
    assert_eq!(mgr.get(handle).unwrap().history_hash(), clone_hash);
}

#[test]
fn clone_destruction_never_reaches_the_subject() {
    let subj = walked_subject();
    let subject_hash = subj.history_hash();
    let mut mgr = manager(1);
    let handle = mgr.spawn_clone(&subj, 2.0, 8.0).unwrap();
    mgr.destroy(handle);
    assert_eq!(subj.history_hash(), subject_hash);
}

// -- charge pool -----------------------------------------------------------

#[test]
fn single_charge_pool_round_trip() {
    let subj = walked_subject();
    let mut mgr = manager(1);

    let first = mgr.spawn_clone(&subj, 0.0, 5.0).unwrap();
    assert!(matches!(
        mgr.spawn_clone(&subj, 0.0, 5.0),
        Err(EngineError::NoChargesAvailable { capacity: 1 })
    ));

    assert!(mgr.destroy(first));
    assert!(mgr.spawn_clone(&subj, 0.0, 5.0).is_ok());
}

// -- decay and scrubbing ---------------------------------------------------

#[test]
fn decay_tail_is_queryable_then_gone() {
    let subj = walked_subject();
    let mut mgr = manager(1);
    let handle = mgr.spawn_clone(&subj, 2.0, 8.0).unwrap();

    // Replay the whole 6s slice; now inside the 0.5s decay tail.
    mgr.advance(6.2);
    let clone = mgr.get(handle).unwrap();
    assert!((clone.cur_time() - 8.2).abs() < 1e-9);
    // Frozen at the slice's final state.
    assert_eq!(clone.timelines().position.sample(clone.cur_time()).unwrap(), [8.0, 0.0]);

    // Tail elapses: destroyed, charge back.
    let expired = mgr.advance(0.4);
    assert_eq!(expired, vec![handle]);
    assert!(mgr.get(handle).is_none());
    assert_eq!(mgr.charges_available(), 1);
}

#[test]
fn global_rewind_scrubs_clone_replay() {
    let subj = walked_subject();
    let mut mgr = manager(1);
    let handle = mgr.spawn_clone(&subj, 2.0, 8.0).unwrap();
    mgr.advance(4.0); // world 14, clone local 6

    mgr.set_world_time(11.5);
    let clone = mgr.get(handle).unwrap();
    assert_eq!(clone.cur_time(), 3.5);
    assert_eq!(clone.timelines().position.sample(3.5).unwrap(), [3.5, 0.0]);
}

// -- divergence interplay ---------------------------------------------------

#[test]
fn clones_from_an_erased_future_cease_to_exist() {
    let mut subj = walked_subject();
    let mut mgr = manager(2);

    // One clone branched at the frontier (t=10), one branched while
    // scrubbed back to t=3.
    let doomed = mgr.spawn_clone(&subj, 8.0, 10.0).unwrap();
    subj.begin_rewind();
    subj.set_to_time(3.0);
    let kept = mgr.spawn_clone(&subj, 0.0, 2.0).unwrap();

    // Subject diverges at t=6; the t=10 branch is from the erased future.
    subj.set_to_time(6.0);
    subj.resume();
    mgr.destroy_clones_after(6.0);

    assert!(!mgr.is_alive(doomed));
    assert!(mgr.is_alive(kept));
    assert_eq!(mgr.charges_available(), 1);
}

#[test]
fn disconnected_clones_outlive_the_subject() {
    let subj = walked_subject();
    let mut mgr = manager(1);
    let handle = mgr.spawn_clone(&subj, 2.0, 8.0).unwrap();

    // Scene transition: subject goes away, clone persists, charge pool
    // is whole again.
    mgr.disconnect_clones();
    drop(subj);
    assert_eq!(mgr.charges_available(), 1);
    assert!(mgr.is_alive(handle));
    assert!(mgr.get(handle).unwrap().timelines().position.sample(5.0).is_ok());
}
