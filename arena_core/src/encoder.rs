//! Quadrature decoding from paired edge events.
//!
//! Two phase-offset lines A and B encode direction and magnitude of rotary
//! motion. On every edge of either line the decoder folds the new pin pair
//! with the previous pin pair into a 4-bit state and adds the table delta to
//! the shared tick count. If a single edge is missed the position error is
//! bounded to one tick; ambiguous 4-bit states (both pins flipped at once,
//! or nothing changed) contribute zero.

use std::sync::Arc;

use crate::cell::EncoderCell;

/// Signed tick delta per 4-bit `(newB, newA, oldB, oldA)` state.
///
/// The index packs oldA into bit 0, oldB into bit 1, newA into bit 2 and
/// newB into bit 3. Entries of 0 mark the no-movement and physically
/// impossible double-flip states.
pub const DELTA_TABLE: [i32; 16] = [
    0, 1, -1, 2, -1, 0, -2, 1, //
    1, -2, 0, -1, 2, -1, 1, 0,
];

/// Decodes edges into position deltas. Runs entirely in edge-callback
/// context; all state lives in the shared [`EncoderCell`].
#[derive(Debug, Clone)]
pub struct QuadratureDecoder {
    cell: Arc<EncoderCell>,
}

impl QuadratureDecoder {
    pub fn new(cell: Arc<EncoderCell>) -> Self {
        Self { cell }
    }

    /// Seed the previous-pin state from the current line levels. Call once
    /// before the first edge is delivered.
    pub fn prime(&self, a: bool, b: bool) {
        self.cell.set_quad_state(pack(a, b));
    }

    /// Process one edge given the post-edge line levels.
    pub fn on_edge(&self, a: bool, b: bool) {
        let state = (pack(a, b) << 2) | (self.cell.quad_state() & 0b11);
        let delta = DELTA_TABLE[state as usize];
        if delta != 0 {
            self.cell.add(delta);
        }
        tracing::trace!(state, delta, "quadrature edge");
        self.cell.set_quad_state(state >> 2);
    }
}

#[inline]
fn pack(a: bool, b: bool) -> u8 {
    u8::from(a) | (u8::from(b) << 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Canonical deltas, spelled out per 4-bit state.
    #[test]
    fn delta_table_is_canonical() {
        let expected: [(u8, i32); 16] = [
            (0b0000, 0),
            (0b0001, 1),
            (0b0010, -1),
            (0b0011, 2),
            (0b0100, -1),
            (0b0101, 0),
            (0b0110, -2),
            (0b0111, 1),
            (0b1000, 1),
            (0b1001, -2),
            (0b1010, 0),
            (0b1011, -1),
            (0b1100, 2),
            (0b1101, -1),
            (0b1110, 1),
            (0b1111, 0),
        ];
        for (state, delta) in expected {
            assert_eq!(DELTA_TABLE[state as usize], delta, "state {state:#06b}");
        }
    }

    #[test]
    fn full_clockwise_cycle_is_four_ticks() {
        let cell = EncoderCell::new();
        let dec = QuadratureDecoder::new(cell.clone());
        dec.prime(false, false);
        // Gray sequence 00 -> 01 -> 11 -> 10 -> 00
        dec.on_edge(true, false);
        dec.on_edge(true, true);
        dec.on_edge(false, true);
        dec.on_edge(false, false);
        assert_eq!(cell.position().abs(), 4);
    }

    #[test]
    fn reversing_returns_to_zero() {
        let cell = EncoderCell::new();
        let dec = QuadratureDecoder::new(cell.clone());
        dec.prime(false, false);
        dec.on_edge(true, false);
        dec.on_edge(true, true);
        dec.on_edge(true, false);
        dec.on_edge(false, false);
        assert_eq!(cell.position(), 0);
    }

    #[test]
    fn repeated_state_contributes_nothing() {
        let cell = EncoderCell::new();
        let dec = QuadratureDecoder::new(cell.clone());
        dec.prime(true, false);
        dec.on_edge(true, false);
        assert_eq!(cell.position(), 0);
    }
}
