//! Whole-match runs against the deterministic test clock.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arena_core::mocks::{
    FailingKnobLamp, FakeNotifier, RecordingField, RecordingKnobLamp, RecordingLamp,
    ScriptedEntropy,
};
use arena_traits::EdgeNotifier;
use arena_core::runner::StopReason;
use arena_core::{MatchBuilder, MatchCfg, TargetPattern};
use arena_traits::clock::test_clock::TestClock;

const LINE_VIB: u8 = 2;

fn short_match() -> MatchCfg {
    MatchCfg {
        countdown_ms: 3_000,
        runtime_ms: 12_000,
        poll_ms: 5,
        wait_for_start: false,
    }
}

#[test]
fn match_runs_to_time_and_scores_the_first_hit() {
    let notifier = FakeNotifier::new();
    let (field, _) = RecordingField::new();
    let (saber, _) = RecordingLamp::new();
    let (knob, _) = RecordingKnobLamp::new();

    // One saber hit while armed and waiting.
    let script = notifier.clone();
    let mut fired = false;
    let runner = MatchBuilder::new()
        .with_notifier(notifier)
        .with_field(field)
        .with_target(TargetPattern::new(12345).unwrap())
        .with_saber(saber)
        .with_knob_lamp(knob)
        .with_entropy(ScriptedEntropy::new([6]))
        .with_clock(TestClock::new())
        .with_match_cfg(short_match())
        .with_tick_hook(move |now| {
            if !fired && now >= 9_000 {
                fired = true;
                script.trigger(LINE_VIB);
            }
        })
        .build();
    let mut runner = runner.unwrap();

    let summary = runner.run().unwrap();
    assert_eq!(summary.stopped, StopReason::TimeExpired);
    assert!(summary.elapsed_ms >= 12_000);
    assert_eq!(summary.dial.score, 0);
    assert_eq!(summary.duel.score, arena_core::score::DUEL_POINTS[1]);
    assert_eq!(summary.total, summary.duel.score);
    assert_eq!(runner.duel().pattern_row(), Some(6));
}

#[test]
fn external_stop_ends_the_match_early() {
    let notifier = FakeNotifier::new();
    let (field, _) = RecordingField::new();
    let (saber, _) = RecordingLamp::new();
    let (knob, _) = RecordingKnobLamp::new();

    let flag = Arc::new(AtomicBool::new(false));
    let setter = flag.clone();
    let mut runner = MatchBuilder::new()
        .with_notifier(notifier)
        .with_field(field)
        .with_target(TargetPattern::new(1).unwrap())
        .with_saber(saber)
        .with_knob_lamp(knob)
        .with_entropy(ScriptedEntropy::new([0]))
        .with_clock(TestClock::new())
        .with_match_cfg(short_match())
        .with_tick_hook(move |now| {
            if now >= 1_000 {
                setter.store(true, Ordering::Relaxed);
            }
        })
        .with_stop_check(move || flag.load(Ordering::Relaxed))
        .build()
        .unwrap();

    let summary = runner.run().unwrap();
    assert_eq!(summary.stopped, StopReason::External);
    assert!(summary.elapsed_ms < 12_000);
    assert_eq!(summary.total, 0);
}

#[test]
fn failed_dial_teardown_still_disarms_the_duel() {
    let notifier = FakeNotifier::new();
    let spy = notifier.clone();
    let (field, field_log) = RecordingField::new();
    let (saber, _) = RecordingLamp::new();

    let mut runner = MatchBuilder::new()
        .with_notifier(notifier)
        .with_field(field)
        .with_target(TargetPattern::new(1).unwrap())
        .with_saber(saber)
        .with_knob_lamp(FailingKnobLamp)
        .with_entropy(ScriptedEntropy::new([0]))
        .with_clock(TestClock::new())
        .with_match_cfg(short_match())
        .build()
        .unwrap();

    let summary = runner.run().unwrap();
    assert_eq!(summary.stopped, StopReason::TimeExpired);

    // Vibration sensor is detached and the coil ends de-energized.
    let _ = spy.take_error_mask();
    spy.trigger(LINE_VIB);
    assert_ne!(spy.take_error_mask(), 0);
    assert_eq!(field_log.lock().unwrap().last(), Some(&false));
}
