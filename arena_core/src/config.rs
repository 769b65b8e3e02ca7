//! Runtime configuration structs for the arena stages.
//!
//! These are plain structs with sane defaults matching the physical prop.
//! The TOML-deserialized schema lives in `arena_config` and maps into these
//! via `From` impls.

use crate::duel::{FIGHTING_PATTERNS, PATTERN_LEN, PATTERN_ROWS};

/// Dial (rotary knob) configuration.
#[derive(Debug, Clone)]
pub struct DialCfg {
    /// Encoder ticks per full knob revolution.
    pub ticks_per_revolution: i32,
    /// Half-width of the null zone around each revolution boundary, in ticks.
    pub center_tolerance: i32,
    /// Direction-history window length in samples (1..=15).
    pub history_len: u8,
    /// Input line of quadrature channel A.
    pub line_a: u8,
    /// Input line of quadrature channel B.
    pub line_b: u8,
}

impl Default for DialCfg {
    fn default() -> Self {
        Self {
            ticks_per_revolution: 96,
            center_tolerance: 5,
            history_len: 7,
            line_a: 3,
            line_b: 4,
        }
    }
}

/// Duel (force field) configuration.
#[derive(Debug, Clone)]
pub struct DuelCfg {
    /// Dwell of each countdown state in ms.
    pub countdown_step_ms: u64,
    /// Grace period after match start with the sensor disarmed, in ms.
    pub grace_ms: u64,
    /// Neutral dwell after the field drops, in ms.
    pub neutral_ms: u64,
    /// Field-on dwell unless ended early by a hit, in ms.
    pub field_on_ms: u64,
    /// How long the saber stays lit after a hit flash, in ms.
    pub flash_ms: u64,
    /// Input line of the vibration sensor.
    pub line_vibration: u8,
    /// Fighting-pattern rows: field-off durations in seconds, zero sentinel
    /// terminated. One row is selected at the first hit.
    pub patterns: [[u8; PATTERN_LEN]; PATTERN_ROWS],
}

impl Default for DuelCfg {
    fn default() -> Self {
        Self {
            countdown_step_ms: 1_000,
            grace_ms: 5_000,
            neutral_ms: 500,
            field_on_ms: 2_000,
            flash_ms: 50,
            line_vibration: 2,
            patterns: FIGHTING_PATTERNS,
        }
    }
}

/// Whole-match configuration for the host loop.
#[derive(Debug, Clone)]
pub struct MatchCfg {
    /// Console countdown display window at match start, in ms.
    pub countdown_ms: u64,
    /// Total match runtime including the countdown, in ms.
    pub runtime_ms: u64,
    /// Poll period of the host loop, in ms.
    pub poll_ms: u64,
    /// Wait for the console START button before running (ignored when no
    /// console is attached).
    pub wait_for_start: bool,
}

impl Default for MatchCfg {
    fn default() -> Self {
        Self {
            countdown_ms: 3_000,
            // 4 minute match plus the countdown
            runtime_ms: (4 * 60 + 3) * 1_000,
            poll_ms: 5,
            wait_for_start: true,
        }
    }
}
