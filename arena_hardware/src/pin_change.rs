//! Grouped edge dispatcher behind the `EdgeNotifier` seam.
//!
//! Input lines are organized as three groups of eight, mirroring the
//! controller's pin-change interrupt banks. Levels live in atomics so a
//! callback may read any line without taking a lock; callbacks live behind
//! a mutex taken only by `inject` and (un)subscription. An edge on a group
//! with no subscriber latches a spurious bit instead of faulting.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use arena_traits::{EdgeCallback, EdgeNotifier, LineId};

/// Number of interrupt groups.
pub const NUM_GROUPS: usize = 3;
/// Lines per group.
pub const LINES_PER_GROUP: usize = 8;
/// Total addressable lines.
pub const NUM_LINES: usize = NUM_GROUPS * LINES_PER_GROUP;

pub struct PinChange {
    levels: [AtomicBool; NUM_LINES],
    callbacks: Mutex<[Option<EdgeCallback>; NUM_LINES]>,
    /// Bit mask of subscribed lines, one word per group.
    masks: [AtomicU8; NUM_GROUPS],
    spurious: AtomicU8,
}

impl Default for PinChange {
    fn default() -> Self {
        Self {
            levels: [const { AtomicBool::new(false) }; NUM_LINES],
            callbacks: Mutex::new([const { None }; NUM_LINES]),
            masks: [const { AtomicU8::new(0) }; NUM_GROUPS],
            spurious: AtomicU8::new(0),
        }
    }
}

impl PinChange {
    pub fn new() -> std::sync::Arc<Self> {
        std::sync::Arc::new(Self::default())
    }

    /// Feed one edge from the interrupt source: latch the new level, then
    /// run the line's callback. Called with interrupt-context discipline;
    /// the callback must not re-enter subscription.
    pub fn inject(&self, line: LineId, level: bool) {
        let idx = usize::from(line);
        if idx >= NUM_LINES {
            return;
        }
        self.levels[idx].store(level, Ordering::Release);
        let Ok(mut callbacks) = self.callbacks.lock() else {
            return;
        };
        match callbacks[idx].as_mut() {
            Some(cb) => cb(),
            None => {
                self.spurious
                    .fetch_or(1 << (idx / LINES_PER_GROUP), Ordering::Relaxed);
                tracing::trace!(line, "edge on unsubscribed line");
            }
        }
    }
}

impl EdgeNotifier for PinChange {
    fn subscribe(&self, line: LineId, callback: EdgeCallback) -> bool {
        let idx = usize::from(line);
        if idx >= NUM_LINES {
            return false;
        }
        let Ok(mut callbacks) = self.callbacks.lock() else {
            return false;
        };
        let group = idx / LINES_PER_GROUP;
        let bit = 1u8 << (idx % LINES_PER_GROUP);
        let had = self.masks[group].fetch_or(bit, Ordering::AcqRel) != 0;
        callbacks[idx] = Some(callback);
        had
    }

    fn unsubscribe(&self, line: LineId) -> bool {
        let idx = usize::from(line);
        if idx >= NUM_LINES {
            return false;
        }
        let Ok(mut callbacks) = self.callbacks.lock() else {
            return false;
        };
        let group = idx / LINES_PER_GROUP;
        let bit = 1u8 << (idx % LINES_PER_GROUP);
        callbacks[idx] = None;
        let prior = self.masks[group].fetch_and(!bit, Ordering::AcqRel);
        prior & !bit == 0 && prior != 0
    }

    fn level(&self, line: LineId) -> bool {
        let idx = usize::from(line);
        if idx >= NUM_LINES {
            return false;
        }
        self.levels[idx].load(Ordering::Acquire)
    }

    fn take_error_mask(&self) -> u8 {
        self.spurious.swap(0, Ordering::Relaxed)
    }
}
