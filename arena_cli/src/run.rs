//! Match execution on simulated hardware with a scripted event feed.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arena_core::{MatchBuilder, MatchRunner, MatchSummary, TargetPattern};
use arena_hardware::{
    PinChange, SimulatedConsole, SimulatedField, SimulatedKnobLamp, SimulatedSaber, TimerEntropy,
};
use arena_traits::Entropy;
use eyre::WrapErr;
use serde_json::json;

/// Entropy pinned to one value, for reproducible runs (`--seed`).
struct SeededEntropy(u32);

impl Entropy for SeededEntropy {
    fn sample(&mut self) -> u32 {
        self.0
    }
}

pub struct RunOpts {
    pub target: u32,
    pub seed: Option<u32>,
    pub hit_at: Vec<u64>,
    pub runtime_ms: Option<u64>,
    pub no_wait: bool,
}

fn dial_cfg(c: &arena_config::DialCfg) -> arena_core::DialCfg {
    arena_core::DialCfg {
        ticks_per_revolution: c.ticks_per_revolution,
        center_tolerance: c.center_tolerance,
        history_len: c.history_len,
        line_a: c.line_a,
        line_b: c.line_b,
    }
}

fn duel_cfg(c: &arena_config::DuelCfg) -> arena_core::DuelCfg {
    arena_core::DuelCfg {
        countdown_step_ms: c.countdown_step_ms,
        grace_ms: c.grace_ms,
        neutral_ms: c.neutral_ms,
        field_on_ms: c.field_on_ms,
        flash_ms: c.flash_ms,
        line_vibration: c.line_vibration,
        patterns: c.patterns.unwrap_or(arena_core::duel::FIGHTING_PATTERNS),
    }
}

fn match_cfg(c: &arena_config::MatchCfg, opts: &RunOpts) -> arena_core::MatchCfg {
    arena_core::MatchCfg {
        countdown_ms: c.countdown_ms,
        runtime_ms: opts.runtime_ms.unwrap_or(c.runtime_ms),
        poll_ms: c.poll_ms,
        wait_for_start: c.wait_for_start && !opts.no_wait,
    }
}

fn build_runner(
    cfg: &arena_config::Config,
    opts: &RunOpts,
    shutdown: Arc<AtomicBool>,
) -> eyre::Result<MatchRunner> {
    let target = TargetPattern::new(opts.target)
        .map_err(eyre::Report::new)
        .wrap_err("--target")?;

    let notifier = PinChange::new();
    let (console, console_handle) = SimulatedConsole::new();
    // No human at the simulated console; press START for them.
    console_handle.press_start();

    let mut hits = opts.hit_at.clone();
    hits.sort_unstable();
    let script_notifier = notifier.clone();
    let vibration = cfg.duel.line_vibration;
    let mut next_hit = 0usize;
    let feed = move |now_ms: u64| {
        while next_hit < hits.len() && hits[next_hit] <= now_ms {
            tracing::info!(at_ms = hits[next_hit], "scripted saber hit");
            script_notifier.inject(vibration, true);
            script_notifier.inject(vibration, false);
            next_hit += 1;
        }
    };

    let builder = MatchBuilder::new()
        .with_notifier(notifier)
        .with_field(SimulatedField::new())
        .with_target(target)
        .with_saber(SimulatedSaber::new())
        .with_knob_lamp(SimulatedKnobLamp::new())
        .with_console(console)
        .with_dial_cfg(dial_cfg(&cfg.dial))
        .with_duel_cfg(duel_cfg(&cfg.duel))
        .with_match_cfg(match_cfg(&cfg.match_cfg, opts))
        .with_tick_hook(feed)
        .with_stop_check(move || shutdown.load(Ordering::Relaxed));

    match opts.seed {
        Some(seed) => builder.with_entropy(SeededEntropy(seed)).build(),
        None => builder.with_entropy(TimerEntropy::new()).build(),
    }
}

pub fn run_match(
    cfg: &arena_config::Config,
    opts: &RunOpts,
    shutdown: Arc<AtomicBool>,
) -> eyre::Result<MatchSummary> {
    let mut runner = build_runner(cfg, opts, shutdown)?;
    runner.run()
}

pub fn print_summary(summary: &MatchSummary, json: bool) {
    if json {
        let line = json!({
            "dial": { "score": summary.dial.score, "summary": summary.dial.summary },
            "duel": { "score": summary.duel.score, "summary": summary.duel.summary },
            "total": summary.total,
            "elapsed_ms": summary.elapsed_ms,
            "stopped": format!("{:?}", summary.stopped),
        });
        println!("{line}");
    } else {
        println!("{}", summary.dial.summary);
        println!("{}", summary.duel.summary);
        println!(
            "total {} in {:.1}s ({:?})",
            summary.total,
            summary.elapsed_ms as f64 / 1_000.0,
            summary.stopped
        );
    }
}
