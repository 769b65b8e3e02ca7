//! Shared cells written from edge-callback context and read by the poll loop.
//!
//! Each cell has exactly one writer (the interrupt-context callback) and one
//! reader (the polling loop). Single atomic loads cannot tear, so a snapshot
//! is always internally consistent; `Relaxed` ordering suffices because no
//! other memory is published through these counters.

use std::sync::Arc;
use std::sync::atomic::{AtomicI32, AtomicU8, AtomicU32, Ordering};

/// Encoder tick count plus the rolling 2-bit previous-pin state used by the
/// quadrature decoder between edges.
#[derive(Debug, Default)]
pub struct EncoderCell {
    position: AtomicI32,
    quad_state: AtomicU8,
}

impl EncoderCell {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Snapshot of the signed tick count.
    #[inline]
    pub fn position(&self) -> i32 {
        self.position.load(Ordering::Relaxed)
    }

    #[inline]
    pub(crate) fn add(&self, delta: i32) {
        self.position.fetch_add(delta, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn quad_state(&self) -> u8 {
        self.quad_state.load(Ordering::Relaxed)
    }

    #[inline]
    pub(crate) fn set_quad_state(&self, s: u8) {
        self.quad_state.store(s, Ordering::Relaxed);
    }

    /// Reset tick count and pin state (test/bench support).
    pub fn reset(&self) {
        self.position.store(0, Ordering::Relaxed);
        self.quad_state.store(0, Ordering::Relaxed);
    }
}

/// Raw vibration-hit counter incremented once per sensor edge.
#[derive(Debug, Default)]
pub struct HitCounter {
    raw: AtomicU32,
}

impl HitCounter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Record one raw sensor edge. Callable from interrupt context.
    #[inline]
    pub fn record(&self) {
        self.raw.fetch_add(1, Ordering::Relaxed);
    }

    /// True when any edges arrived since the last call; clears the counter.
    /// Multiple physical bounces within one poll interval collapse to a
    /// single accepted hit.
    #[inline]
    pub fn take(&self) -> bool {
        self.raw.swap(0, Ordering::Relaxed) != 0
    }
}
