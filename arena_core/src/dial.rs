//! Rotary-dial stage: digit extraction from null-zone crossings.
//!
//! The operator dials digits by turning the knob some number of full
//! revolutions into the null zone and reversing direction for the next
//! digit. A digit is accepted only when the knob *reverses* out of the zone
//! (it exits back toward the side it entered from) and the exit direction
//! alternates against the previously accepted digit. Passing straight
//! through the zone mints nothing.

use std::sync::Arc;

use arena_traits::{Direction, EdgeNotifier, KnobLamp};
use eyre::WrapErr;

use crate::cell::EncoderCell;
use crate::config::DialCfg;
use crate::encoder::QuadratureDecoder;
use crate::error::{Result, map_hw_error};
use crate::motion::MotionClassifier;
use crate::score::{TargetPattern, dial_score};
use crate::stage::{Stage, StageReport};

/// Fixed capacity of the digit ring buffer.
pub const DIGIT_CAPACITY: usize = 32;

/// Append-only circular log of dialed digits. Values outside 0..=9 are
/// retained and rendered as an error glyph so the log length stays
/// meaningful when the decode misbehaves.
#[derive(Debug, Default)]
pub struct DigitLog {
    slots: [i8; DIGIT_CAPACITY],
    head: usize,
    len: usize,
}

impl DigitLog {
    pub fn push(&mut self, value: i8) {
        self.slots[self.head] = value;
        self.head = (self.head + 1) % DIGIT_CAPACITY;
        self.len = (self.len + 1).min(DIGIT_CAPACITY);
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The most recent `n` digits, oldest of those first.
    pub fn recent(&self, n: usize) -> Vec<i8> {
        let take = n.min(self.len);
        (0..take)
            .map(|i| {
                let idx = (self.head + DIGIT_CAPACITY - take + i) % DIGIT_CAPACITY;
                self.slots[idx]
            })
            .collect()
    }

    /// Render the most recent digits; `#` marks out-of-range values.
    pub fn render(&self, n: usize) -> String {
        self.recent(n)
            .iter()
            .map(|d| {
                if (0..=9).contains(d) {
                    char::from(b'0' + *d as u8)
                } else {
                    '#'
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DialPhase {
    NotInCenter,
    InCenter,
}

/// Snapshot taken on a genuine transition into the null zone. The initial
/// at-rest position is InCenter without an entry, so the first departure
/// never mints a digit.
#[derive(Debug, Clone, Copy)]
struct CenterEntry {
    turns: i32,
    clockwise: bool,
}

/// The dial stage: owns the classifier, the digit state machine, and the
/// knob LED output. Encoder edges arrive through the shared cell.
pub struct DialStage {
    cfg: DialCfg,
    notifier: Arc<dyn EdgeNotifier>,
    cell: Arc<EncoderCell>,
    decoder: QuadratureDecoder,
    lamp: Box<dyn KnobLamp>,
    motion: MotionClassifier,
    target: TargetPattern,

    phase: DialPhase,
    blink_active: bool,
    entry: Option<CenterEntry>,
    prev_turns: Option<i32>,
    prev_digit_clockwise: Option<bool>,
    digits: DigitLog,
}

impl std::fmt::Debug for DialStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialStage")
            .field("phase", &self.phase)
            .field("digits", &self.digits.len())
            .field("target", &self.target)
            .finish()
    }
}

impl DialStage {
    pub fn new(
        cfg: DialCfg,
        notifier: Arc<dyn EdgeNotifier>,
        lamp: Box<dyn KnobLamp>,
        target: TargetPattern,
    ) -> Self {
        let cell = EncoderCell::new();
        let decoder = QuadratureDecoder::new(cell.clone());
        let motion = MotionClassifier::new(&cfg);
        Self {
            cfg,
            notifier,
            cell,
            decoder,
            lamp,
            motion,
            target,
            phase: DialPhase::NotInCenter,
            blink_active: false,
            entry: None,
            prev_turns: None,
            prev_digit_clockwise: None,
            digits: DigitLog::default(),
        }
    }

    /// Shared position cell (test support).
    pub fn encoder_cell(&self) -> Arc<EncoderCell> {
        self.cell.clone()
    }

    /// Digits recorded so far.
    pub fn digit_log(&self) -> &DigitLog {
        &self.digits
    }

    /// Nearest whole-revolution count at `position`, rounding the half-way
    /// point up.
    fn turns_at(&self, position: i32) -> i32 {
        let tpr = self.cfg.ticks_per_revolution;
        (position + tpr / 2).div_euclid(tpr)
    }

    fn record_digit(&mut self, turns: i32, clockwise: bool) {
        let value = match self.prev_turns {
            None => turns,
            Some(prev) => (turns - prev).abs(),
        };
        self.digits
            .push(value.clamp(i8::MIN as i32, i8::MAX as i32) as i8);
        self.prev_turns = Some(turns);
        self.prev_digit_clockwise = Some(clockwise);
        tracing::debug!(value, turns, clockwise, "digit accepted");
    }

    /// Process one null-zone transition edge.
    fn on_center_edge(&mut self, centered: bool, position: i32) {
        match (self.phase, centered) {
            (DialPhase::NotInCenter, true) => {
                self.phase = DialPhase::InCenter;
                let turns = self.turns_at(position);
                let clockwise = position < turns * self.cfg.ticks_per_revolution;
                self.entry = Some(CenterEntry { turns, clockwise });
                tracing::trace!(turns, clockwise, "entered null zone");
            }
            (DialPhase::InCenter, false) => {
                self.phase = DialPhase::NotInCenter;
                let Some(entry) = self.entry.take() else {
                    return;
                };
                let exiting_clockwise = position > entry.turns * self.cfg.ticks_per_revolution;
                let reversed = exiting_clockwise != entry.clockwise;
                let alternates = self
                    .prev_digit_clockwise
                    .is_none_or(|prev| exiting_clockwise != prev);
                if reversed && alternates {
                    self.record_digit(entry.turns, exiting_clockwise);
                } else {
                    tracing::debug!(reversed, alternates, "digit rejected");
                }
            }
            _ => {}
        }
    }

    /// Flush the rest digit at end of match: the knob came to rest inside
    /// the null zone after moving. There is no exit edge, so the
    /// reversal and alternation checks do not apply.
    fn flush_final_digit(&mut self) {
        if self.phase == DialPhase::InCenter
            && let Some(entry) = self.entry.take()
        {
            self.record_digit(entry.turns, entry.clockwise);
        }
    }

    pub fn score(&self) -> i32 {
        dial_score(&self.digits.recent(TargetPattern::WIDTH), self.target)
    }
}

impl Stage for DialStage {
    fn start(&mut self) -> Result<()> {
        // The knob normally rests in the null zone at power-on.
        self.phase = if self.motion.is_centered(self.cell.position()) {
            DialPhase::InCenter
        } else {
            DialPhase::NotInCenter
        };
        self.entry = None;
        self.decoder.prime(
            self.notifier.level(self.cfg.line_a),
            self.notifier.level(self.cfg.line_b),
        );
        for line in [self.cfg.line_a, self.cfg.line_b] {
            let dec = self.decoder.clone();
            let notifier = Arc::clone(&self.notifier);
            let (a, b) = (self.cfg.line_a, self.cfg.line_b);
            self.notifier
                .subscribe(line, Box::new(move || dec.on_edge(notifier.level(a), notifier.level(b))));
        }
        self.blink_active = true;
        self.lamp
            .set_blink(true)
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err("knob lamp blink on")?;
        self.lamp
            .indicate(Direction::Center)
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err("knob lamp indicate")?;
        Ok(())
    }

    fn step(&mut self, _now_ms: u64) -> Result<()> {
        let position = self.cell.position();
        let Some(sample) = self.motion.sample(position) else {
            return Ok(());
        };

        self.lamp
            .indicate(sample.direction)
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err("knob lamp indicate")?;
        if sample.direction != Direction::Center && self.blink_active {
            self.blink_active = false;
            self.lamp
                .set_blink(false)
                .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
                .wrap_err("knob lamp blink off")?;
        }

        self.on_center_edge(sample.centered, sample.position);
        Ok(())
    }

    fn stop(&mut self, _now_ms: u64) -> Result<()> {
        // Edge sources first; no callback may fire past this point.
        self.notifier.unsubscribe(self.cfg.line_a);
        self.notifier.unsubscribe(self.cfg.line_b);
        self.flush_final_digit();
        self.lamp
            .off()
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err("knob lamp off")?;
        Ok(())
    }

    fn report(&self) -> StageReport {
        StageReport {
            score: self.score(),
            summary: format!(
                "dial [{}] target {}",
                self.digits.render(TargetPattern::WIDTH),
                self.target
            ),
        }
    }
}
