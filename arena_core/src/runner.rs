//! Host-side match loop.
//!
//! Drives both stages on a fixed poll period against the injected clock,
//! paints the judge console once per second, and shuts everything down in a
//! safe order when the match ends. An absent console degrades every display
//! call to a no-op; the match itself never depends on it.

use std::sync::Arc;
use std::time::Duration;

use arena_traits::clock::Clock;
use arena_traits::{BTN_START, BTN_STOP, Console, EdgeNotifier};

use crate::config::MatchCfg;
use crate::dial::DialStage;
use crate::duel::DuelStage;
use crate::error::Result;
use crate::stage::{Stage, StageReport};

/// Why the match loop exited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    TimeExpired,
    StopButton,
    External,
}

/// Final result of one match.
#[derive(Debug, Clone)]
pub struct MatchSummary {
    pub dial: StageReport,
    pub duel: StageReport,
    pub total: i32,
    pub elapsed_ms: u64,
    pub stopped: StopReason,
}

pub struct MatchRunner {
    cfg: MatchCfg,
    clock: Box<dyn Clock + Send + Sync>,
    console: Box<dyn Console>,
    notifier: Arc<dyn EdgeNotifier>,
    dial: DialStage,
    duel: DuelStage,
    stop_check: Option<Box<dyn Fn() -> bool>>,
    tick_hook: Option<Box<dyn FnMut(u64)>>,
    console_present: bool,
}

impl std::fmt::Debug for MatchRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchRunner")
            .field("cfg", &self.cfg)
            .field("console_present", &self.console_present)
            .finish()
    }
}

impl MatchRunner {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        cfg: MatchCfg,
        clock: Box<dyn Clock + Send + Sync>,
        console: Box<dyn Console>,
        notifier: Arc<dyn EdgeNotifier>,
        dial: DialStage,
        duel: DuelStage,
        stop_check: Option<Box<dyn Fn() -> bool>>,
        tick_hook: Option<Box<dyn FnMut(u64)>>,
    ) -> Self {
        Self {
            cfg,
            clock,
            console,
            notifier,
            dial,
            duel,
            stop_check,
            tick_hook,
            console_present: false,
        }
    }

    pub fn dial(&self) -> &DialStage {
        &self.dial
    }

    pub fn duel(&self) -> &DuelStage {
        &self.duel
    }

    fn external_stop(&self) -> bool {
        self.stop_check.as_ref().is_some_and(|check| check())
    }

    /// Write to the console; a failing console is demoted to absent rather
    /// than aborting the match.
    fn console_line(&mut self, row: u8, text: &str) {
        if !self.console_present {
            return;
        }
        let ok = self
            .console
            .set_cursor(0, row)
            .and_then(|()| self.console.print(text));
        if let Err(e) = ok {
            tracing::warn!(error = %e, "console write failed; continuing without it");
            self.console_present = false;
        }
    }

    fn paint(&mut self, now_ms: u64) {
        if now_ms < self.cfg.countdown_ms {
            let n = (self.cfg.countdown_ms - now_ms).div_ceil(1_000);
            self.console_line(1, &format!("  COUNTDOWN {n}  "));
            return;
        }
        let left = self.cfg.runtime_ms.saturating_sub(now_ms) / 1_000;
        self.console_line(0, &format!("T-{:>3}s", left));
        self.console_line(1, &format!("DIAL {:>4}", self.dial.score()));
        self.console_line(2, &format!("DUEL {:>4}", self.duel.score()));
    }

    /// Block until START is pressed, the external stop fires, or the console
    /// turns out to be absent (then the match starts immediately).
    fn wait_for_start(&mut self) -> bool {
        self.console_line(0, "ARENA READY");
        self.console_line(1, "PRESS START");
        loop {
            if self.external_stop() {
                return false;
            }
            if self.console.buttons() & BTN_START != 0 {
                return true;
            }
            self.clock.sleep(Duration::from_millis(self.cfg.poll_ms));
        }
    }

    /// Run one full match to completion and return the summary.
    pub fn run(&mut self) -> Result<MatchSummary> {
        self.console_present = self.console.attached();
        tracing::info!(console = self.console_present, "match setup");

        if self.cfg.wait_for_start && self.console_present && !self.wait_for_start() {
            return self.finish(0, StopReason::External);
        }
        if self.console_present {
            let _ = self.console.clear();
        }

        self.dial.start()?;
        self.duel.start()?;
        let epoch = self.clock.now();
        let mut next_paint = 0u64;

        let reason = loop {
            let now_ms = self.clock.ms_since(epoch);
            if let Some(hook) = self.tick_hook.as_mut() {
                hook(now_ms);
            }

            self.dial.step(now_ms)?;
            self.duel.step(now_ms)?;

            let spurious = self.notifier.take_error_mask();
            if spurious != 0 {
                tracing::warn!(mask = format_args!("{spurious:#04x}"), "spurious edges");
            }

            if now_ms >= self.cfg.runtime_ms {
                break StopReason::TimeExpired;
            }
            if self.console_present && self.console.buttons() & BTN_STOP != 0 {
                break StopReason::StopButton;
            }
            if self.external_stop() {
                break StopReason::External;
            }

            if now_ms >= next_paint {
                self.paint(now_ms);
                next_paint = now_ms + 1_000;
            }
            self.clock.sleep(Duration::from_millis(self.cfg.poll_ms));
        };

        let elapsed = self.clock.ms_since(epoch);
        self.finish(elapsed, reason)
    }

    fn finish(&mut self, elapsed_ms: u64, reason: StopReason) -> Result<MatchSummary> {
        // Stop order matters: stages detach their interrupt sources before
        // any report is taken. A stage that fails to stop cleanly must not
        // leave the other one armed, so both stops always run.
        if let Err(e) = self.dial.stop(elapsed_ms) {
            tracing::error!(error = %e, "dial stage stop failed");
        }
        if let Err(e) = self.duel.stop(elapsed_ms) {
            tracing::error!(error = %e, "duel stage stop failed");
        }

        let dial = self.dial.report();
        let duel = self.duel.report();
        let total = dial.score.saturating_add(duel.score);

        if self.console_present {
            let _ = self.console.clear();
        }
        self.console_line(0, "MATCH OVER");
        self.console_line(1, &format!("DIAL {:>4}", dial.score));
        self.console_line(2, &format!("DUEL {:>4}", duel.score));
        self.console_line(3, &format!("TOTAL {:>4}", total));

        tracing::info!(
            dial = dial.score,
            duel = duel.score,
            total,
            elapsed_ms,
            ?reason,
            "match finished"
        );

        Ok(MatchSummary {
            dial,
            duel,
            total,
            elapsed_ms,
            stopped: reason,
        })
    }
}
