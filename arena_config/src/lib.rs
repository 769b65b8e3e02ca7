#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the arena controller.
//!
//! `Config` and sub-structs are deserialized from TOML and validated. The
//! runtime structs live in `arena_core`; the CLI maps this schema onto them
//! so the schema can evolve (aliases, optional sections) without touching
//! the control logic.

use serde::Deserialize;

/// Fighting-pattern table shape: rows x entries per row.
pub const PATTERN_ROWS: usize = 10;
pub const PATTERN_LEN: usize = 5;
/// Every pattern row keeps the field down for the same total time.
pub const PATTERN_ROW_SECS: u32 = 20;

/// Input lines addressable on the controller (three groups of eight).
pub const MAX_LINE: u8 = 23;

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct DialCfg {
    pub ticks_per_revolution: i32,
    pub center_tolerance: i32,
    pub history_len: u8,
    pub line_a: u8,
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

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DuelCfg {
    pub countdown_step_ms: u64,
    pub grace_ms: u64,
    pub neutral_ms: u64,
    pub field_on_ms: u64,
    pub flash_ms: u64,
    pub line_vibration: u8,
    /// Optional override of the built-in fighting patterns: field-off
    /// durations in seconds, zero sentinel terminated.
    pub patterns: Option<[[u8; PATTERN_LEN]; PATTERN_ROWS]>,
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
            patterns: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct MatchCfg {
    pub countdown_ms: u64,
    /// Total runtime including the countdown. Also accepts alias
    /// "duration_ms".
    #[serde(alias = "duration_ms")]
    pub runtime_ms: u64,
    pub poll_ms: u64,
    pub wait_for_start: bool,
}

impl Default for MatchCfg {
    fn default() -> Self {
        Self {
            countdown_ms: 3_000,
            runtime_ms: (4 * 60 + 3) * 1_000,
            poll_ms: 5,
            wait_for_start: true,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub dial: DialCfg,
    pub duel: DuelCfg,
    #[serde(rename = "match")]
    pub match_cfg: MatchCfg,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read and parse a config file. Validation is a separate step so callers
/// can report schema and semantic errors distinctly.
pub fn load_file(path: &std::path::Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("reading {}: {e}", path.display()))?;
    load_toml(&text).map_err(|e| eyre::eyre!("parsing {}: {e}", path.display()))
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        let d = &self.dial;
        if d.ticks_per_revolution <= 0 {
            eyre::bail!("dial.ticks_per_revolution must be > 0");
        }
        if d.center_tolerance < 0 {
            eyre::bail!("dial.center_tolerance must be >= 0");
        }
        if i64::from(d.center_tolerance) * 2 >= i64::from(d.ticks_per_revolution) {
            eyre::bail!("dial.center_tolerance must be narrower than half a revolution");
        }
        if d.history_len == 0 || d.history_len > 15 {
            eyre::bail!("dial.history_len must be in 1..=15");
        }
        for (name, line) in [
            ("dial.line_a", d.line_a),
            ("dial.line_b", d.line_b),
            ("duel.line_vibration", self.duel.line_vibration),
        ] {
            if line > MAX_LINE {
                eyre::bail!("{name} must be <= {MAX_LINE}");
            }
        }
        if d.line_a == d.line_b {
            eyre::bail!("dial.line_a and dial.line_b must differ");
        }
        if self.duel.line_vibration == d.line_a || self.duel.line_vibration == d.line_b {
            eyre::bail!("duel.line_vibration collides with the encoder lines");
        }
        if self.duel.countdown_step_ms == 0 {
            eyre::bail!("duel.countdown_step_ms must be > 0");
        }
        if let Some(patterns) = &self.duel.patterns {
            for (idx, row) in patterns.iter().enumerate() {
                validate_pattern_row(idx, row)?;
            }
        }
        let m = &self.match_cfg;
        if m.poll_ms == 0 {
            eyre::bail!("match.poll_ms must be > 0");
        }
        if m.runtime_ms <= m.countdown_ms {
            eyre::bail!("match.runtime_ms must exceed match.countdown_ms");
        }
        if m.runtime_ms > 24 * 60 * 60 * 1_000 {
            eyre::bail!("match.runtime_ms is unreasonably large (>24h)");
        }
        if let Some(level) = self.logging.level.as_deref()
            && !["trace", "debug", "info", "warn", "error"].contains(&level)
        {
            eyre::bail!("logging.level must be one of trace/debug/info/warn/error");
        }
        if let Some(rotation) = self.logging.rotation.as_deref()
            && !["never", "daily", "hourly"].contains(&rotation)
        {
            eyre::bail!("logging.rotation must be one of never/daily/hourly");
        }
        Ok(())
    }
}

/// A pattern row must start with a real duration, carry a zero sentinel,
/// and stay zero after it.
fn validate_pattern_row(idx: usize, row: &[u8; PATTERN_LEN]) -> eyre::Result<()> {
    if row[0] == 0 {
        eyre::bail!("duel.patterns[{idx}] must start with a non-zero duration");
    }
    let Some(end) = row.iter().position(|&s| s == 0) else {
        eyre::bail!("duel.patterns[{idx}] is missing its zero sentinel");
    };
    if row[end..].iter().any(|&s| s != 0) {
        eyre::bail!("duel.patterns[{idx}] has durations after the zero sentinel");
    }
    let total: u32 = row[..end].iter().map(|&s| u32::from(s)).sum();
    if total != PATTERN_ROW_SECS {
        eyre::bail!("duel.patterns[{idx}] field-off durations must sum to {PATTERN_ROW_SECS}s");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn empty_toml_yields_defaults() {
        let cfg = load_toml("").unwrap();
        assert_eq!(cfg.dial.ticks_per_revolution, 96);
        assert_eq!(cfg.match_cfg.runtime_ms, 243_000);
        assert!(cfg.duel.patterns.is_none());
    }
}
