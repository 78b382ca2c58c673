//! End-to-end record / rewind / diverge scenarios driven through the
//! TimeController, the way a game loop drives them.

use tempo_engine::prelude::*;
use tempo_history::prelude::*;

/// A pushable box's full recorded state: continuous position, discrete
/// pusher windows, and a discrete event log.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct BoxHistory {
    position: Scrapbook<[f64; 2]>,
    pusher: WindowRecorder<Option<u32>>,
    sounds: Album<String>,
}

impl BoxHistory {
    fn new() -> Self {
        Self {
            position: Scrapbook::new(),
            pusher: WindowRecorder::new(),
            sounds: Album::new(),
        }
    }
}

impl History for BoxHistory {
    fn trim_after(&mut self, time: f64) {
        self.position.trim_after(time);
        self.pusher.trim_after(time);
        self.sounds.trim_after(time);
    }

    fn trim_before(&mut self, time: f64) {
        self.position.trim_before(time);
        self.pusher.trim_before(time);
        self.sounds.trim_before(time);
    }
}

const DT: f64 = 1.0 / 60.0;

/// Run one second of live simulation: the box is pushed by player 1
/// between t=0.25 and t=0.75, moving 1 unit/s in x.
fn simulate_push(tc: &mut TimeController, id: RecorderId, seconds: f64) {
    let steps = (seconds / DT).round() as u64;
    for _ in 0..steps {
        let obj = tc.get_mut::<BoxHistory>(id).unwrap();
        if let Some((now, h)) = obj.frontier() {
            let pushed = (0.25..0.75).contains(&now);
            let x = (now.min(0.75) - 0.25).max(0.0);
            h.position.record(now, [x, 0.0], Interpolation::Linear).unwrap();
            h.pusher
                .start_window(now, if pushed { Some(1) } else { None })
                .unwrap();
            if pushed && h.sounds.is_empty() {
                h.sounds.record(now, "scrape".to_owned()).unwrap();
            }
        }
        tc.advance(DT);
    }
}

fn setup() -> (TimeController, RecorderId) {
    let mut tc = TimeController::new(0.0);
    let id = tc.register(TimedObject::new(0.0, BoxHistory::new()));
    simulate_push(&mut tc, id, 1.0);
    (tc, id)
}

// -- playback -----------------------------------------------------------

#[test]
fn scrubbed_state_is_consistent_across_containers() {
    let (mut tc, id) = setup();
    tc.begin_rewind();
    tc.set_to_time(0.5);

    let obj = tc.get::<BoxHistory>(id).unwrap();
    assert_eq!(obj.cur_time(), 0.5);
    let h = obj.timelines();

    // Mid-push: pusher window covers the time and position interpolates.
    assert_eq!(h.pusher.window_at(0.5).unwrap().data, Some(1));
    let [x, _] = h.position.sample(0.5).unwrap();
    assert!((x - 0.25).abs() < 0.02, "x at t=0.5 was {x}");
    assert_eq!(h.sounds.latest_at_or_before(0.5).unwrap(), "scrape");

    // Before the push.
    assert_eq!(h.pusher.window_at(0.1).unwrap().data, None);
    assert_eq!(h.sounds.latest_at_or_before(0.1), None);
}

#[test]
fn rewinding_recorder_accepts_no_writes() {
    let (mut tc, id) = setup();
    tc.begin_rewind();
    tc.set_to_time(0.3);

    let before = tc.get::<BoxHistory>(id).unwrap().history_hash();
    // A confused caller asking for the frontier gets nothing.
    assert!(tc.get_mut::<BoxHistory>(id).unwrap().frontier().is_none());
    assert_eq!(tc.get::<BoxHistory>(id).unwrap().history_hash(), before);
}

// -- navigation ----------------------------------------------------------

#[test]
fn velocity_navigation_reaches_both_bounds() {
    let (mut tc, _) = setup();
    tc.begin_rewind();

    tc.set_velocity(-4.0);
    let mut event = None;
    for _ in 0..120 {
        event = tc.advance(DT);
        if event.is_some() {
            break;
        }
    }
    assert_eq!(event, Some(BoundEvent::ReachedEarliest));
    assert_eq!(tc.cur_time(), 0.0);
    assert_eq!(tc.velocity(), 0.0);

    tc.set_velocity(4.0);
    let mut event = None;
    for _ in 0..120 {
        event = tc.advance(DT);
        if event.is_some() {
            break;
        }
    }
    assert_eq!(event, Some(BoundEvent::ReachedFarthest));
    assert!((tc.cur_time() - tc.farthest_time()).abs() < 1e-9);
}

// -- divergence ----------------------------------------------------------

#[test]
fn diverging_mid_push_reopens_the_pusher_window() {
    let (mut tc, id) = setup();
    tc.begin_rewind();
    tc.set_to_time(0.5);
    tc.resume();

    let obj = tc.get::<BoxHistory>(id).unwrap();
    assert_eq!(obj.state(), RecordState::Recording);
    assert!((obj.farthest_time() - 0.5).abs() < 1e-9);

    // The push was still in progress at the divergence point, so its
    // window collapses back to open rather than being deleted.
    let current = obj.timelines().pusher.current().unwrap();
    assert_eq!(current.data, Some(1));
    assert!(current.frame.is_open());
}

#[test]
fn rerecorded_future_replaces_the_erased_one() {
    let (mut tc, id) = setup();
    tc.begin_rewind();
    tc.set_to_time(0.5);
    tc.resume();

    // This time nobody pushes: the box holds still from t=0.5 on.
    for _ in 0..30 {
        let obj = tc.get_mut::<BoxHistory>(id).unwrap();
        if let Some((now, h)) = obj.frontier() {
            let [x, y] = h.position.sample(now).unwrap_or([0.0, 0.0]);
            h.position.record(now, [x, y], Interpolation::Linear).unwrap();
            h.pusher.start_window(now, None).unwrap();
        }
        tc.advance(DT);
    }

    let obj = tc.get::<BoxHistory>(id).unwrap();
    let h = obj.timelines();
    // At t=0.9 the old future said the push had finished at x=0.5; the
    // new one froze the box where the divergence left it.
    let [x, _] = h.position.sample(0.9).unwrap();
    assert!((x - 0.25).abs() < 0.02, "x at t=0.9 was {x}");
    // No window from the erased future survives.
    assert!(h.pusher.windows().iter().all(|w| w.frame.start <= 0.9));
    assert_eq!(h.pusher.current().unwrap().data, None);
}

#[test]
fn divergence_is_stable_under_repeat() {
    let (mut tc, id) = setup();
    tc.begin_rewind();
    tc.set_to_time(0.5);
    tc.resume();
    let once = tc.get::<BoxHistory>(id).unwrap().history_hash();

    // Rewinding to the same point and resuming again trims nothing more.
    tc.begin_rewind();
    tc.set_to_time(0.5);
    tc.resume();
    assert_eq!(tc.get::<BoxHistory>(id).unwrap().history_hash(), once);
}

// -- suspension ----------------------------------------------------------

#[test]
fn suspension_leaves_a_sample_gap_but_time_flows() {
    let mut tc = TimeController::new(0.0);
    let id = tc.register(TimedObject::new(0.0, BoxHistory::new()));
    simulate_push(&mut tc, id, 0.25);

    // A cutscene and a dialogue box both suspend recording.
    let obj = tc.get_mut::<BoxHistory>(id).unwrap();
    obj.request_suspend_recording();
    obj.request_suspend_recording();
    simulate_push(&mut tc, id, 0.25);

    let obj = tc.get_mut::<BoxHistory>(id).unwrap();
    assert!((obj.cur_time() - 0.5).abs() < 1e-9);
    let frontier_sample = obj.timelines().position.latest().unwrap().time;
    assert!(frontier_sample < 0.26, "sample landed during suspension");

    // Only cancelling both resumes writes.
    obj.cancel_suspend_request();
    assert!(obj.frontier().is_none());
    let obj = tc.get_mut::<BoxHistory>(id).unwrap();
    obj.cancel_suspend_request();
    assert!(obj.frontier().is_some());
}

// -- committed floor ------------------------------------------------------

#[test]
fn raised_floor_survives_rewind_cycles() {
    let (mut tc, _) = setup();
    tc.raise_earliest(0.4);

    for _ in 0..3 {
        tc.begin_rewind();
        tc.set_velocity(-10.0);
        while tc.advance(DT).is_none() {}
        assert!((tc.cur_time() - 0.4).abs() < 1e-9);
        tc.resume();
    }
    assert_eq!(tc.earliest_time(), 0.4);
}
