//! Duel stage timeline scenarios against a fake notifier and scripted
//! entropy.

use std::sync::{Arc, Mutex};

use arena_core::mocks::{FakeNotifier, RecordingField, RecordingLamp, ScriptedEntropy};
use arena_core::{DuelCfg, DuelStage, DuelState, HitMark, Stage};
use arena_traits::{EdgeNotifier, Rgb};

const LINE_VIB: u8 = 2;

struct Rig {
    notifier: Arc<FakeNotifier>,
    stage: DuelStage,
    field_log: Arc<Mutex<Vec<bool>>>,
    saber_fills: Arc<Mutex<Vec<Rgb>>>,
}

impl Rig {
    /// Entropy script selects the fighting-pattern row (`sample % 10`).
    fn new(entropy: u32) -> Self {
        let notifier = FakeNotifier::new();
        let (field, field_log) = RecordingField::new();
        let (saber, saber_fills) = RecordingLamp::new();
        let mut stage = DuelStage::new(
            DuelCfg::default(),
            notifier.clone(),
            Box::new(field),
            Box::new(saber),
            Box::new(ScriptedEntropy::new([entropy])),
        );
        stage.start().unwrap();
        Self {
            notifier,
            stage,
            field_log,
            saber_fills,
        }
    }

    fn step(&mut self, now_ms: u64) {
        self.stage.step(now_ms).unwrap();
    }

    fn hit(&mut self, now_ms: u64) {
        self.notifier.trigger(LINE_VIB);
        self.step(now_ms);
    }

    /// Walk the fixed opening: countdown, start grace, into Waiting.
    fn advance_to_waiting(&mut self) {
        for t in [0, 1_000, 2_000, 3_000, 8_000] {
            self.step(t);
        }
        assert_eq!(self.stage.state(), DuelState::Waiting);
    }

    fn last_field(&self) -> bool {
        *self.field_log.lock().unwrap().last().unwrap()
    }

    fn last_fill(&self) -> Rgb {
        *self.saber_fills.lock().unwrap().last().unwrap()
    }
}

#[test]
fn countdown_and_grace_hits_never_log() {
    let mut rig = Rig::new(0);
    rig.step(0);
    rig.hit(500); // during Countdown1
    rig.step(1_000);
    rig.step(2_000);
    rig.step(3_000); // Start
    rig.hit(4_000); // during the disarmed grace window
    rig.step(8_000);
    assert_eq!(rig.stage.state(), DuelState::Waiting);
    assert!(rig.stage.hit_log().is_empty());
    // A hit raised during the grace window must not fire the transition
    // the instant the sensor arms.
    rig.step(8_005);
    assert_eq!(rig.stage.state(), DuelState::Waiting);
    assert!(rig.stage.hit_log().is_empty());
}

#[test]
fn first_hit_selects_row_and_engages() {
    let mut rig = Rig::new(13); // 13 % 10 -> row 3
    rig.advance_to_waiting();
    assert!(rig.last_field(), "field energized while waiting");
    rig.hit(9_000);
    assert_eq!(rig.stage.pattern_row(), Some(3));
    assert_eq!(rig.stage.hit_log(), &[HitMark::Positive]);
    // Zero-dwell transition into the neutral window drops the field.
    rig.step(9_005);
    assert_eq!(rig.stage.state(), DuelState::FieldOffNeutral);
    assert!(!rig.last_field());
}

#[test]
fn field_off_hits_are_penalties() {
    let mut rig = Rig::new(4); // row 4: off times 5,5,5,5
    rig.advance_to_waiting();
    rig.hit(9_000);
    rig.step(9_005); // FieldOffNeutral, deadline 9505
    rig.step(9_505); // FieldOff
    assert_eq!(rig.stage.state(), DuelState::FieldOff);
    rig.hit(10_000);
    assert_eq!(
        rig.stage.hit_log(),
        &[HitMark::Positive, HitMark::Penalty]
    );
    assert_eq!(rig.last_fill(), Rgb::RED);
}

#[test]
fn field_on_hit_scores_and_drops_field_early() {
    let mut rig = Rig::new(4);
    rig.advance_to_waiting();
    rig.hit(9_000);
    rig.step(9_005); // neutral until 9505
    rig.step(9_505); // FieldOff, 5s dwell
    rig.step(14_510); // past the off dwell
    rig.step(14_515); // FieldOn, coil back up
    assert_eq!(rig.stage.state(), DuelState::FieldOn);
    assert!(rig.last_field());
    rig.hit(15_000);
    assert_eq!(rig.stage.hit_log().last(), Some(&HitMark::Positive));
    assert!(!rig.last_field(), "hit ends the on-phase early");
    assert_eq!(rig.last_fill(), Rgb::BLUE);
}

#[test]
fn pattern_consumed_to_stopped() {
    let mut rig = Rig::new(4); // row 4: 5,5,5,5,0
    rig.advance_to_waiting();
    rig.hit(9_000);
    let mut now = 9_005;
    // March time forward in coarse steps until the machine parks itself.
    while rig.stage.state() != DuelState::Stopped {
        assert!(now < 60_000, "duel failed to stop");
        rig.step(now);
        now += 100;
    }
    // Four off/on cycles, no further hits: only the engage mark remains.
    assert_eq!(rig.stage.hit_log(), &[HitMark::Positive]);
    assert!(!rig.last_field());
    assert_eq!(rig.last_fill(), Rgb::GREEN);
    // Terminal: a later hit changes nothing.
    rig.notifier.trigger(LINE_VIB);
    rig.step(now);
    assert_eq!(rig.stage.hit_log().len(), 1);
}

#[test]
fn stop_detaches_sensor_and_kills_field() {
    let mut rig = Rig::new(0);
    rig.advance_to_waiting();
    rig.stage.stop(9_000).unwrap();
    assert!(!rig.last_field());
    assert_eq!(rig.last_fill(), Rgb::RED);
    let _ = rig.notifier.take_error_mask();
    rig.notifier.trigger(LINE_VIB);
    assert_ne!(rig.notifier.take_error_mask(), 0);
}

#[test]
fn report_summarizes_row_and_marks() {
    let mut rig = Rig::new(7);
    rig.advance_to_waiting();
    rig.hit(9_000);
    let report = rig.stage.report();
    assert!(report.summary.contains("#7"));
    assert!(report.summary.contains("[+........]"));
    assert_eq!(report.score, arena_core::score::DUEL_POINTS[1]);
}
