use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use arena_hardware::PinChange;
use arena_hardware::pin_change::NUM_LINES;
use arena_traits::EdgeNotifier;
use rstest::rstest;

fn counter_callback(hits: &Arc<AtomicU32>) -> Box<dyn FnMut() + Send> {
    let hits = hits.clone();
    Box::new(move || {
        hits.fetch_add(1, Ordering::Relaxed);
    })
}

#[rstest]
fn subscribe_reports_prior_group_subscription() {
    let pc = PinChange::new();
    let hits = Arc::new(AtomicU32::new(0));
    // Lines 2 and 3 share group 0; line 8 is group 1.
    assert!(!pc.subscribe(2, counter_callback(&hits)));
    assert!(pc.subscribe(3, counter_callback(&hits)));
    assert!(!pc.subscribe(8, counter_callback(&hits)));
}

#[rstest]
fn unsubscribe_reports_last_line_on_group() {
    let pc = PinChange::new();
    let hits = Arc::new(AtomicU32::new(0));
    pc.subscribe(2, counter_callback(&hits));
    pc.subscribe(3, counter_callback(&hits));
    assert!(!pc.unsubscribe(2));
    assert!(pc.unsubscribe(3));
    // Already empty: not "the last one" again.
    assert!(!pc.unsubscribe(3));
}

#[rstest]
fn inject_dispatches_and_latches_level() {
    let pc = PinChange::new();
    let hits = Arc::new(AtomicU32::new(0));
    pc.subscribe(4, counter_callback(&hits));
    pc.inject(4, true);
    pc.inject(4, false);
    assert_eq!(hits.load(Ordering::Relaxed), 2);
    assert!(!pc.level(4));
    pc.inject(4, true);
    assert!(pc.level(4));
}

#[rstest]
fn callback_may_read_levels() {
    let pc = PinChange::new();
    let seen = Arc::new(AtomicU32::new(0));
    let sink = seen.clone();
    let reader = pc.clone();
    pc.subscribe(
        3,
        Box::new(move || {
            if reader.level(3) {
                sink.fetch_add(1, Ordering::Relaxed);
            }
        }),
    );
    pc.inject(3, true);
    pc.inject(3, false);
    assert_eq!(seen.load(Ordering::Relaxed), 1);
}

#[rstest]
fn unsubscribed_edge_sets_group_spurious_bit() {
    let pc = PinChange::new();
    pc.inject(1, true); // group 0
    pc.inject(9, true); // group 1
    assert_eq!(pc.take_error_mask(), 0b011);
    assert_eq!(pc.take_error_mask(), 0);
}

#[rstest]
#[case(NUM_LINES as u8)]
#[case(255)]
fn invalid_lines_are_no_ops(#[case] line: u8) {
    let pc = PinChange::new();
    let hits = Arc::new(AtomicU32::new(0));
    assert!(!pc.subscribe(line, counter_callback(&hits)));
    assert!(!pc.unsubscribe(line));
    assert!(!pc.level(line));
    pc.inject(line, true);
    assert_eq!(pc.take_error_mask(), 0);
}
