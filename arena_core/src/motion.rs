//! Motion filtering and null-zone detection over the raw tick count.
//!
//! Each poll reads one position snapshot. Direction is smoothed with a
//! short shift-register history (2 bits per sample) and a majority vote so
//! a noisy knob does not flicker the indicator. The classifier only feeds
//! the visual indicator and the enter/exit edges consumed by the dial
//! stage; it never gates which digits are extracted.

use arena_traits::Direction;

use crate::config::DialCfg;

const DIR_MASK: u32 = 0b11;
const DIR_CW: u32 = 0b01;
const DIR_CCW: u32 = 0b10;

/// One classified position sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Motion {
    pub position: i32,
    pub direction: Direction,
    /// True when the position lies within the tolerance band around a
    /// whole-revolution boundary.
    pub centered: bool,
}

/// Stateful direction/center classifier, one instance per dial.
#[derive(Debug)]
pub struct MotionClassifier {
    ticks_per_rev: i32,
    tolerance: i32,
    history_len: u32,
    history: u32,
    prev_position: i32,
    moved: bool,
}

impl MotionClassifier {
    pub fn new(cfg: &DialCfg) -> Self {
        Self {
            ticks_per_rev: cfg.ticks_per_revolution,
            tolerance: cfg.center_tolerance,
            history_len: u32::from(cfg.history_len),
            history: 0,
            prev_position: 0,
            moved: false,
        }
    }

    /// True once any motion has been observed since construction.
    pub fn has_moved(&self) -> bool {
        self.moved
    }

    /// Classify a position snapshot. Returns `None` when the position has
    /// not changed since the previous poll.
    pub fn sample(&mut self, position: i32) -> Option<Motion> {
        if position == self.prev_position {
            return None;
        }
        let instantaneous = if position > self.prev_position {
            Direction::Clockwise
        } else {
            Direction::CounterClockwise
        };
        self.prev_position = position;
        self.moved = true;

        let centered = self.is_centered(position);
        let direction = if centered {
            // A fresh approach starts with a clean history.
            self.history = 0;
            Direction::Center
        } else {
            self.vote(instantaneous)
        };

        Some(Motion {
            position,
            direction,
            centered,
        })
    }

    /// True iff the position lies within the tolerance band of any multiple
    /// of ticks-per-revolution.
    pub fn is_centered(&self, position: i32) -> bool {
        self.folded(position).abs() <= self.tolerance
    }

    /// Offset from the nearest revolution boundary, folded into
    /// `(-ticks_per_rev/2, ticks_per_rev/2]`.
    fn folded(&self, position: i32) -> i32 {
        let mut rel = position.rem_euclid(self.ticks_per_rev);
        if rel > self.ticks_per_rev / 2 {
            rel -= self.ticks_per_rev;
        }
        rel
    }

    /// Push the instantaneous direction into the shift register and return
    /// the majority direction of the last N samples. Ties go clockwise.
    fn vote(&mut self, instantaneous: Direction) -> Direction {
        let code = match instantaneous {
            Direction::Clockwise => DIR_CW,
            Direction::CounterClockwise => DIR_CCW,
            Direction::Center => unreachable!("center never voted"),
        };
        self.history = ((self.history << 2) | code) & ((1 << (2 * self.history_len)) - 1);

        let mut cw = 0u32;
        let mut ccw = 0u32;
        let mut h = self.history;
        for _ in 0..self.history_len {
            match h & DIR_MASK {
                DIR_CW => cw += 1,
                DIR_CCW => ccw += 1,
                _ => {}
            }
            h >>= 2;
        }
        if cw >= ccw {
            Direction::Clockwise
        } else {
            Direction::CounterClockwise
        }
    }
}
