//! A crate on a conveyor, recorded and rewound.
//!
//! Records five seconds of a crate sliding along a conveyor while a
//! grabber toggles on and off, then:
//!
//! 1. rewinds to the midpoint and scrubs around,
//! 2. resumes there (diverging: the old future is erased),
//! 3. spawns a time clone that re-enacts a slice of the new timeline.
//!
//! Run with `RUST_LOG=debug cargo run --example box_rewind` to watch the
//! engine's own tracing output alongside the printed state.

use tempo_engine::prelude::*;
use tempo_history::prelude::*;

const DT: f64 = 1.0 / 60.0;

/// Everything recorded about the crate.
#[derive(Debug, Clone, serde::Serialize)]
struct CrateHistory {
    /// Conveyor-space position, linearly interpolated between samples.
    position: Scrapbook<f64>,
    /// Which grabber holds the crate, if any. Changes rarely, so a
    /// window per contiguous hold is the cheap representation.
    held_by: WindowRecorder<Option<u32>>,
    /// One-shot clank sounds, replayed verbatim on re-watch.
    clanks: Album<String>,
}

impl History for CrateHistory {
    fn trim_after(&mut self, time: f64) {
        self.position.trim_after(time);
        self.held_by.trim_after(time);
        self.clanks.trim_after(time);
    }

    fn trim_before(&mut self, time: f64) {
        self.position.trim_before(time);
        self.held_by.trim_before(time);
        self.clanks.trim_before(time);
    }
}

/// One simulation tick: the conveyor moves the crate unless a grabber
/// holds it; the grabber grips during [2, 3).
fn tick(controller: &mut TimeController, id: RecorderId) {
    let obj = controller
        .get_mut::<CrateHistory>(id)
        .expect("crate recorder");
    let Some((now, h)) = obj.frontier() else {
        return;
    };
    let grabbed = (2.0..3.0).contains(&now);
    let pos = if grabbed {
        2.0 * 2.0 // frozen where the grab started
    } else if now < 2.0 {
        2.0 * now
    } else {
        4.0 + 2.0 * (now - 3.0).max(0.0)
    };
    h.position.record(now, pos, Interpolation::Linear).unwrap();
    h.held_by
        .start_window(now, if grabbed { Some(7) } else { None })
        .unwrap();
    if grabbed && h.clanks.latest_at_or_before(now).is_none() {
        h.clanks.record(now, "clank".to_owned()).unwrap();
    }
    controller.advance(DT);
}

fn report(controller: &TimeController, id: RecorderId, label: &str) {
    let obj = controller.get::<CrateHistory>(id).expect("crate recorder");
    let t = obj.cur_time();
    println!(
        "{label:<28} t={t:5.2}  pos={:6.2}  held_by={:?}  windows={}",
        obj.timelines().position.sample(t).unwrap(),
        obj.timelines().held_by.window_at(t).map(|w| w.data),
        obj.timelines().held_by.len(),
    );
}

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let mut controller = TimeController::new(0.0);
    let id = controller.register(TimedObject::new(
        0.0,
        CrateHistory {
            position: Scrapbook::new(),
            held_by: WindowRecorder::new(),
            clanks: Album::new(),
        },
    ));

    // -- 1. Record five seconds of live play --
    while controller.cur_time() < 5.0 {
        tick(&mut controller, id);
    }
    report(&controller, id, "after recording");

    // -- 2. Rewind and scrub --
    controller.begin_rewind();
    controller.set_velocity(-4.0);
    while controller.advance(DT).is_none() {}
    report(&controller, id, "hit earliest bound");

    controller.set_to_time(2.5);
    report(&controller, id, "scrubbed to mid-grab");

    // -- 3. Diverge: resume at t=2.5, the old [2.5, 5] is erased --
    controller.resume();
    while controller.cur_time() < 4.0 {
        tick(&mut controller, id);
    }
    report(&controller, id, "after diverging");
    println!(
        "history hash now {}",
        controller
            .get::<CrateHistory>(id)
            .expect("crate recorder")
            .history_hash()
    );

    // -- 4. Clone a slice of the new timeline --
    let mut clones: CloneManager<CrateHistory> =
        CloneManager::new(CloneConfig::default(), controller.cur_time());
    let subject = controller.get::<CrateHistory>(id).expect("crate recorder");
    let handle = clones.spawn_clone(subject, 1.0, 3.5)?;

    for _ in 0..90 {
        clones.advance(DT);
    }
    let clone = clones.get(handle).expect("clone alive");
    println!(
        "clone                        t={:5.2}  pos={:6.2}",
        clone.cur_time(),
        clone.timelines().position.sample(clone.cur_time()).unwrap(),
    );

    Ok(())
}
