//! Pure scoring over the recorded digit and hit logs.

use thiserror::Error;

use crate::duel::HitMark;

/// Points for 0..=5 position-matching dial digits.
pub const DIAL_POINTS: [i32; 6] = [0, 45, 95, 155, 230, 325];

/// Points for 0..=5 positive saber hits. Saturates past the last entry.
pub const DUEL_POINTS: [i32; 6] = [0, 40, 105, 150, 210, 290];

/// Points deducted per penalty hit.
pub const PENALTY_POINTS: i32 = 50;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("target pattern must have at most {} decimal digits", TargetPattern::WIDTH)]
pub struct PatternRangeError;

/// The expected dial sequence: a positive integer whose decimal digits,
/// most significant first at fixed width, are the correct digits.
///
/// Supplied once by the relay-selection stage before the dial starts;
/// immutable thereafter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetPattern(u32);

impl TargetPattern {
    pub const WIDTH: usize = 5;

    pub fn new(value: u32) -> Result<Self, PatternRangeError> {
        if value >= 10u32.pow(Self::WIDTH as u32) {
            return Err(PatternRangeError);
        }
        Ok(Self(value))
    }

    pub fn value(self) -> u32 {
        self.0
    }

    /// Decimal digits, most significant first, zero padded to WIDTH.
    pub fn digits(self) -> [u8; Self::WIDTH] {
        let mut out = [0u8; Self::WIDTH];
        let mut v = self.0;
        for slot in out.iter_mut().rev() {
            *slot = (v % 10) as u8;
            v /= 10;
        }
        out
    }
}

impl std::fmt::Display for TargetPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:0width$}", self.0, width = Self::WIDTH)
    }
}

/// Score the dialed digits against the target pattern.
///
/// `recent` holds the most recent digits in append order, at most
/// [`TargetPattern::WIDTH`] of them. Each is compared position-for-position
/// against the target's digits; out-of-range log values never match. The
/// match count maps through [`DIAL_POINTS`].
pub fn dial_score(recent: &[i8], target: TargetPattern) -> i32 {
    let wanted = target.digits();
    let matches = recent
        .iter()
        .take(TargetPattern::WIDTH)
        .zip(wanted.iter())
        .filter(|(got, want)| **got == **want as i8)
        .count();
    DIAL_POINTS[matches.min(DIAL_POINTS.len() - 1)]
}

/// Score the duel hit log: positive hits map through [`DUEL_POINTS`]
/// (saturating), each penalty deducts [`PENALTY_POINTS`], floor at zero.
pub fn duel_score(log: &[HitMark]) -> i32 {
    let positive = log.iter().filter(|m| **m == HitMark::Positive).count();
    let penalties = log.iter().filter(|m| **m == HitMark::Penalty).count();
    let earned = DUEL_POINTS[positive.min(DUEL_POINTS.len() - 1)];
    (earned - PENALTY_POINTS * penalties as i32).max(0)
}
