//! Force-field duel stage: countdown, first-hit arming, and the timed
//! field-off/field-on combat loop.
//!
//! The vibration sensor's edge callback only increments a raw counter; the
//! state machine drains it once per poll, so any burst of bounces within a
//! poll interval counts as a single hit. Sub-phase durations after the
//! first hit come from one row of the fighting-pattern table, selected by
//! the injected entropy source.

use std::sync::Arc;

use arena_traits::{EdgeNotifier, Entropy, Field, Lamp, Rgb};
use eyre::WrapErr;

use crate::cell::HitCounter;
use crate::config::DuelCfg;
use crate::error::{Result, map_hw_error};
use crate::score::duel_score;
use crate::stage::{Stage, StageReport};

/// Number of fighting-pattern rows.
pub const PATTERN_ROWS: usize = 10;
/// Entries per row, including the terminal sentinel.
pub const PATTERN_LEN: usize = 5;
/// Sentinel marking the end of a pattern row.
pub const PATTERN_END: u8 = 0;
/// Fixed width of the judge-facing hit report; unused slots stay dotted.
pub const HIT_REPORT_WIDTH: usize = 9;

/// Field-off durations in seconds per combat cycle, sentinel terminated.
/// The field-on time is always fixed, so only off times are listed. Each
/// row's off times sum to 20 seconds for a 30-second duel.
pub const FIGHTING_PATTERNS: [[u8; PATTERN_LEN]; PATTERN_ROWS] = [
    [2, 5, 7, 6, 0],
    [4, 3, 5, 8, 0],
    [2, 4, 7, 7, 0],
    [7, 1, 7, 5, 0],
    [5, 5, 5, 5, 0],
    [4, 6, 7, 3, 0],
    [3, 7, 9, 1, 0],
    [1, 3, 7, 9, 0],
    [6, 2, 4, 8, 0],
    [6, 8, 2, 4, 0],
];

/// Duel phases, advanced strictly forward except for the combat loop
/// FieldOffNeutral -> FieldOff -> FieldOn while the pattern row lasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuelState {
    Countdown1,
    Countdown2,
    Countdown3,
    Start,
    Waiting,
    FieldOffNeutral,
    FieldOff,
    FieldOn,
    Stopped,
}

/// One accepted hit while the sensor was armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitMark {
    Positive,
    Penalty,
}

impl HitMark {
    fn glyph(self) -> char {
        match self {
            HitMark::Positive => '+',
            HitMark::Penalty => '-',
        }
    }
}

/// The duel stage. Owns the saber strip, the field coil, and the hit log.
pub struct DuelStage {
    cfg: DuelCfg,
    notifier: Arc<dyn EdgeNotifier>,
    hits: Arc<HitCounter>,
    field: Box<dyn Field>,
    saber: Box<dyn Lamp>,
    entropy: Box<dyn Entropy>,

    state: DuelState,
    next_state: DuelState,
    /// Timestamp of the pending transition; also the entry time of the
    /// current state for dwell measurement.
    deadline_ms: u64,
    entered: bool,
    /// Saber flash turn-off time; 0 when no flash is pending.
    flash_off_ms: u64,
    armed: bool,
    field_pending_on: bool,
    selected_row: Option<usize>,
    pattern_idx: usize,
    hit_log: Vec<HitMark>,
}

impl std::fmt::Debug for DuelStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuelStage")
            .field("state", &self.state)
            .field("row", &self.selected_row)
            .field("hits", &self.hit_log.len())
            .finish()
    }
}

impl DuelStage {
    pub fn new(
        cfg: DuelCfg,
        notifier: Arc<dyn EdgeNotifier>,
        field: Box<dyn Field>,
        saber: Box<dyn Lamp>,
        entropy: Box<dyn Entropy>,
    ) -> Self {
        Self {
            cfg,
            notifier,
            hits: HitCounter::new(),
            field,
            saber,
            entropy,
            state: DuelState::Countdown1,
            next_state: DuelState::Countdown1,
            deadline_ms: 0,
            entered: false,
            flash_off_ms: 0,
            armed: false,
            field_pending_on: false,
            selected_row: None,
            pattern_idx: 0,
            hit_log: Vec::new(),
        }
    }

    pub fn state(&self) -> DuelState {
        self.state
    }

    /// Accepted hits so far, in order.
    pub fn hit_log(&self) -> &[HitMark] {
        &self.hit_log
    }

    /// Selected fighting-pattern row, once the first hit landed.
    pub fn pattern_row(&self) -> Option<usize> {
        self.selected_row
    }

    pub fn score(&self) -> i32 {
        duel_score(&self.hit_log)
    }

    /// Drain the raw counter; a hit registers only while armed.
    fn take_hit(&mut self) -> bool {
        let raw = self.hits.take();
        raw && self.armed
    }

    fn set_field(&mut self, on: bool) -> Result<()> {
        self.field
            .set_active(on)
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err("field coil")
    }

    fn fill_saber(&mut self, color: Rgb) -> Result<()> {
        self.saber
            .fill(color)
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err("saber fill")
    }

    fn mark_pixels(&mut self, idxs: [u8; 2], color: Rgb) -> Result<()> {
        for idx in idxs {
            self.saber
                .set_pixel(idx, color)
                .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
                .wrap_err("saber pixel")?;
        }
        Ok(())
    }

    fn current_off_secs(&self) -> u64 {
        match self.selected_row {
            Some(row) => u64::from(self.cfg.patterns[row][self.pattern_idx]),
            None => 0,
        }
    }

    fn next_entry_is_end(&self) -> bool {
        match self.selected_row {
            Some(row) => self.cfg.patterns[row][self.pattern_idx] == PATTERN_END,
            None => true,
        }
    }
}

impl Stage for DuelStage {
    fn start(&mut self) -> Result<()> {
        self.set_field(false)?;
        let hits = self.hits.clone();
        self.notifier
            .subscribe(self.cfg.line_vibration, Box::new(move || hits.record()));
        self.fill_saber(Rgb::BLACK)?;
        self.hit_log.clear();
        Ok(())
    }

    fn step(&mut self, now_ms: u64) -> Result<()> {
        // Turn a pending hit flash back off.
        if self.flash_off_ms != 0 && now_ms > self.flash_off_ms {
            self.flash_off_ms = 0;
            self.fill_saber(Rgb::BLACK)?;
        }

        if self.entered && now_ms < self.deadline_ms {
            return Ok(());
        }

        if self.state != self.next_state || !self.entered {
            self.state = self.next_state;
            self.entered = true;
            // Hits raised in the previous state never count in the new one.
            self.hits.take();
            tracing::debug!(state = ?self.state, now_ms, "duel state");
        }

        match self.state {
            // Judge counts 3-2-1 along with the saber segments.
            DuelState::Countdown1 => {
                self.fill_saber(Rgb::RED)?;
                self.mark_pixels([7, 6], Rgb::GREEN)?;
                self.next_state = DuelState::Countdown2;
                self.deadline_ms = now_ms + self.cfg.countdown_step_ms;
            }
            DuelState::Countdown2 => {
                self.fill_saber(Rgb::RED)?;
                self.mark_pixels([4, 3], Rgb::GREEN)?;
                self.next_state = DuelState::Countdown3;
                self.deadline_ms = now_ms + self.cfg.countdown_step_ms;
            }
            DuelState::Countdown3 => {
                self.fill_saber(Rgb::RED)?;
                self.mark_pixels([1, 0], Rgb::GREEN)?;
                self.next_state = DuelState::Start;
                self.deadline_ms = now_ms + self.cfg.countdown_step_ms;
            }
            // Match is running; the team backs out over the prop, so the
            // sensor stays disarmed for the grace window.
            DuelState::Start => {
                self.armed = false;
                self.fill_saber(Rgb::GREEN)?;
                self.next_state = DuelState::Waiting;
                self.deadline_ms = now_ms + self.cfg.grace_ms;
            }
            // Armed and waiting for the first hit to begin the duel.
            DuelState::Waiting => {
                if !self.armed {
                    self.armed = true;
                    self.set_field(true)?;
                }
                if self.take_hit() {
                    let row = (self.entropy.sample() % PATTERN_ROWS as u32) as usize;
                    self.selected_row = Some(row);
                    self.pattern_idx = 0;
                    self.hit_log.push(HitMark::Positive);
                    self.fill_saber(Rgb::BLUE)?;
                    self.flash_off_ms = now_ms + self.cfg.flash_ms;
                    self.next_state = DuelState::FieldOffNeutral;
                    self.deadline_ms = now_ms;
                    tracing::info!(row, "duel engaged");
                }
            }
            // Field just dropped; no penalties during the neutral window.
            DuelState::FieldOffNeutral => {
                self.armed = false;
                self.set_field(false)?;
                self.next_state = DuelState::FieldOff;
                self.deadline_ms = now_ms + self.cfg.neutral_ms;
            }
            // Hits while the field is down cost points.
            DuelState::FieldOff => {
                self.armed = true;
                if self.take_hit() {
                    self.hit_log.push(HitMark::Penalty);
                    self.fill_saber(Rgb::RED)?;
                    self.flash_off_ms = now_ms + self.cfg.flash_ms;
                    tracing::debug!("penalty hit");
                }
                if now_ms.saturating_sub(self.deadline_ms) > self.current_off_secs() * 1_000 {
                    self.next_state = DuelState::FieldOn;
                    self.field_pending_on = true;
                    self.deadline_ms = now_ms;
                    self.pattern_idx += 1;
                }
            }
            // Field up: a hit scores and ends the on-phase early.
            DuelState::FieldOn => {
                self.armed = true;
                if self.field_pending_on {
                    self.field_pending_on = false;
                    self.set_field(true)?;
                }
                if self.take_hit() {
                    self.hit_log.push(HitMark::Positive);
                    self.fill_saber(Rgb::BLUE)?;
                    self.flash_off_ms = now_ms + self.cfg.flash_ms;
                    self.set_field(false)?;
                    tracing::debug!("positive hit");
                }
                if now_ms.saturating_sub(self.deadline_ms) > self.cfg.field_on_ms {
                    self.next_state = if self.next_entry_is_end() {
                        DuelState::Stopped
                    } else {
                        DuelState::FieldOffNeutral
                    };
                    self.deadline_ms = now_ms;
                }
            }
            // Duel over; disable the sensor for good and hold green until
            // the match itself ends.
            DuelState::Stopped => {
                self.armed = false;
                self.fill_saber(Rgb::GREEN)?;
                self.set_field(false)?;
                self.notifier.unsubscribe(self.cfg.line_vibration);
                self.deadline_ms = u64::MAX;
                tracing::info!("duel stopped");
            }
        }
        Ok(())
    }

    fn stop(&mut self, _now_ms: u64) -> Result<()> {
        self.notifier.unsubscribe(self.cfg.line_vibration);
        self.armed = false;
        self.set_field(false)?;
        self.fill_saber(Rgb::RED)?;
        Ok(())
    }

    fn report(&self) -> StageReport {
        let marks: String = self
            .hit_log
            .iter()
            .take(HIT_REPORT_WIDTH)
            .map(|m| m.glyph())
            .collect();
        let row = self
            .selected_row
            .map_or_else(|| "-".to_string(), |r| r.to_string());
        StageReport {
            score: self.score(),
            summary: format!("saber #{row} [{marks:.<HIT_REPORT_WIDTH$}]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_pattern_row_is_sentinel_terminated() {
        for row in &FIGHTING_PATTERNS {
            assert_eq!(row[PATTERN_LEN - 1], PATTERN_END);
            assert!(row[..PATTERN_LEN - 1].iter().all(|&s| s != PATTERN_END));
        }
    }

    #[test]
    fn every_pattern_row_sums_to_twenty_seconds() {
        for row in &FIGHTING_PATTERNS {
            let total: u32 = row.iter().map(|&s| u32::from(s)).sum();
            assert_eq!(total, 20, "row {row:?}");
        }
    }

    #[test]
    fn marks_render_as_plus_and_minus() {
        assert_eq!(HitMark::Positive.glyph(), '+');
        assert_eq!(HitMark::Penalty.glyph(), '-');
    }
}
