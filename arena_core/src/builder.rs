//! Type-state builder for `MatchRunner`.
//!
//! The builder enforces at compile time that the edge notifier, the field
//! coil, and the target pattern are provided before `build()` is available.
//! `try_build()` is always available for dynamic checks; the remaining
//! hardware seams are validated there.

use std::marker::PhantomData;
use std::sync::Arc;

use arena_traits::clock::{Clock, MonotonicClock};
use arena_traits::{Console, EdgeNotifier, Entropy, Field, KnobLamp, Lamp};

use crate::config::{DialCfg, DuelCfg, MatchCfg};
use crate::dial::DialStage;
use crate::duel::DuelStage;
use crate::error::{BuildError, Result};
use crate::mocks::NullConsole;
use crate::runner::MatchRunner;
use crate::score::TargetPattern;

pub struct Missing;
pub struct Set;

/// Builder for `MatchRunner`. All fields are validated on `build()`.
pub struct MatchBuilder<N, F, T> {
    notifier: Option<Arc<dyn EdgeNotifier>>,
    field: Option<Box<dyn Field>>,
    saber: Option<Box<dyn Lamp>>,
    knob_lamp: Option<Box<dyn KnobLamp>>,
    entropy: Option<Box<dyn Entropy>>,
    console: Option<Box<dyn Console>>,
    clock: Option<Box<dyn Clock + Send + Sync>>,
    target: Option<TargetPattern>,
    dial_cfg: Option<DialCfg>,
    duel_cfg: Option<DuelCfg>,
    match_cfg: Option<MatchCfg>,
    stop_check: Option<Box<dyn Fn() -> bool>>,
    tick_hook: Option<Box<dyn FnMut(u64)>>,
    _n: PhantomData<N>,
    _f: PhantomData<F>,
    _t: PhantomData<T>,
}

impl Default for MatchBuilder<Missing, Missing, Missing> {
    fn default() -> Self {
        Self {
            notifier: None,
            field: None,
            saber: None,
            knob_lamp: None,
            entropy: None,
            console: None,
            clock: None,
            target: None,
            dial_cfg: None,
            duel_cfg: None,
            match_cfg: None,
            stop_check: None,
            tick_hook: None,
            _n: PhantomData,
            _f: PhantomData,
            _t: PhantomData,
        }
    }
}

impl MatchBuilder<Missing, Missing, Missing> {
    pub fn new() -> Self {
        Self::default()
    }
}

fn validate(dial: &DialCfg, duel: &DuelCfg, match_cfg: &MatchCfg) -> Result<()> {
    if dial.ticks_per_revolution == 0 {
        return Err(BuildError::InvalidConfig("ticks_per_revolution must be positive").into());
    }
    // 15 is the most that fits the 32-bit direction shift register.
    if dial.history_len == 0 || dial.history_len > 15 {
        return Err(BuildError::InvalidConfig("history_len must be in 1..=15").into());
    }
    if i64::from(dial.center_tolerance) * 2 >= i64::from(dial.ticks_per_revolution) {
        return Err(BuildError::InvalidConfig("center_tolerance wider than half a turn").into());
    }
    if duel.line_vibration == dial.line_a || duel.line_vibration == dial.line_b {
        return Err(BuildError::InvalidConfig("vibration line collides with encoder lines").into());
    }
    if match_cfg.poll_ms == 0 {
        return Err(BuildError::InvalidConfig("poll_ms must be positive").into());
    }
    if match_cfg.runtime_ms == 0 {
        return Err(BuildError::InvalidConfig("runtime_ms must be positive").into());
    }
    Ok(())
}

impl<N, F, T> MatchBuilder<N, F, T> {
    /// Dynamic build; succeeds when every hardware seam is present and the
    /// configuration passes validation.
    pub fn try_build(self) -> Result<MatchRunner> {
        let notifier = self.notifier.ok_or(BuildError::MissingNotifier)?;
        let field = self.field.ok_or(BuildError::MissingField)?;
        let saber = self.saber.ok_or(BuildError::MissingSaber)?;
        let knob_lamp = self.knob_lamp.ok_or(BuildError::MissingKnobLamp)?;
        let entropy = self.entropy.ok_or(BuildError::MissingEntropy)?;
        let target = self.target.ok_or(BuildError::MissingTarget)?;

        let dial_cfg = self.dial_cfg.unwrap_or_default();
        let duel_cfg = self.duel_cfg.unwrap_or_default();
        let match_cfg = self.match_cfg.unwrap_or_default();
        validate(&dial_cfg, &duel_cfg, &match_cfg)?;

        let dial = DialStage::new(dial_cfg, notifier.clone(), knob_lamp, target);
        let duel = DuelStage::new(duel_cfg, notifier.clone(), field, saber, entropy);

        Ok(MatchRunner::new(
            match_cfg,
            self.clock.unwrap_or_else(|| Box::new(MonotonicClock::new())),
            self.console.unwrap_or_else(|| Box::new(NullConsole)),
            notifier,
            dial,
            duel,
            self.stop_check,
            self.tick_hook,
        ))
    }

    pub fn with_knob_lamp(mut self, lamp: impl KnobLamp + 'static) -> Self {
        self.knob_lamp = Some(Box::new(lamp));
        self
    }

    pub fn with_saber(mut self, saber: impl Lamp + 'static) -> Self {
        self.saber = Some(Box::new(saber));
        self
    }

    pub fn with_entropy(mut self, entropy: impl Entropy + 'static) -> Self {
        self.entropy = Some(Box::new(entropy));
        self
    }

    pub fn with_console(mut self, console: impl Console + 'static) -> Self {
        self.console = Some(Box::new(console));
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + Send + Sync + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    pub fn with_dial_cfg(mut self, cfg: DialCfg) -> Self {
        self.dial_cfg = Some(cfg);
        self
    }

    pub fn with_duel_cfg(mut self, cfg: DuelCfg) -> Self {
        self.duel_cfg = Some(cfg);
        self
    }

    pub fn with_match_cfg(mut self, cfg: MatchCfg) -> Self {
        self.match_cfg = Some(cfg);
        self
    }

    /// External stop request, polled once per loop iteration.
    pub fn with_stop_check(mut self, check: impl Fn() -> bool + 'static) -> Self {
        self.stop_check = Some(Box::new(check));
        self
    }

    /// Hook invoked with the match time at the top of every poll, before the
    /// stages step. Used to feed scripted events in simulation.
    pub fn with_tick_hook(mut self, hook: impl FnMut(u64) + 'static) -> Self {
        self.tick_hook = Some(Box::new(hook));
        self
    }
}

impl<F, T> MatchBuilder<Missing, F, T> {
    pub fn with_notifier(self, notifier: Arc<dyn EdgeNotifier>) -> MatchBuilder<Set, F, T> {
        MatchBuilder {
            notifier: Some(notifier),
            field: self.field,
            saber: self.saber,
            knob_lamp: self.knob_lamp,
            entropy: self.entropy,
            console: self.console,
            clock: self.clock,
            target: self.target,
            dial_cfg: self.dial_cfg,
            duel_cfg: self.duel_cfg,
            match_cfg: self.match_cfg,
            stop_check: self.stop_check,
            tick_hook: self.tick_hook,
            _n: PhantomData,
            _f: PhantomData,
            _t: PhantomData,
        }
    }
}

impl<N, T> MatchBuilder<N, Missing, T> {
    pub fn with_field(self, field: impl Field + 'static) -> MatchBuilder<N, Set, T> {
        MatchBuilder {
            notifier: self.notifier,
            field: Some(Box::new(field)),
            saber: self.saber,
            knob_lamp: self.knob_lamp,
            entropy: self.entropy,
            console: self.console,
            clock: self.clock,
            target: self.target,
            dial_cfg: self.dial_cfg,
            duel_cfg: self.duel_cfg,
            match_cfg: self.match_cfg,
            stop_check: self.stop_check,
            tick_hook: self.tick_hook,
            _n: PhantomData,
            _f: PhantomData,
            _t: PhantomData,
        }
    }
}

impl<N, F> MatchBuilder<N, F, Missing> {
    pub fn with_target(self, target: TargetPattern) -> MatchBuilder<N, F, Set> {
        MatchBuilder {
            notifier: self.notifier,
            field: self.field,
            saber: self.saber,
            knob_lamp: self.knob_lamp,
            entropy: self.entropy,
            console: self.console,
            clock: self.clock,
            target: Some(target),
            dial_cfg: self.dial_cfg,
            duel_cfg: self.duel_cfg,
            match_cfg: self.match_cfg,
            stop_check: self.stop_check,
            tick_hook: self.tick_hook,
            _n: PhantomData,
            _f: PhantomData,
            _t: PhantomData,
        }
    }
}

impl MatchBuilder<Set, Set, Set> {
    /// Compile-time checked build; the required seams are known present.
    pub fn build(self) -> Result<MatchRunner> {
        self.try_build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BuildError;
    use crate::mocks::{FakeNotifier, RecordingField, RecordingKnobLamp, RecordingLamp, ScriptedEntropy};

    fn full_builder() -> MatchBuilder<Set, Set, Set> {
        let (field, _) = RecordingField::new();
        let (saber, _) = RecordingLamp::new();
        let (knob, _) = RecordingKnobLamp::new();
        MatchBuilder::new()
            .with_notifier(FakeNotifier::new())
            .with_field(field)
            .with_target(TargetPattern::new(12345).unwrap())
            .with_saber(saber)
            .with_knob_lamp(knob)
            .with_entropy(ScriptedEntropy::new([0]))
    }

    #[test]
    fn full_builder_builds() {
        assert!(full_builder().build().is_ok());
    }

    #[test]
    fn missing_saber_is_reported() {
        let (field, _) = RecordingField::new();
        let err = MatchBuilder::new()
            .with_notifier(FakeNotifier::new())
            .with_field(field)
            .with_target(TargetPattern::new(1).unwrap())
            .try_build()
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::MissingSaber)
        ));
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let cfg = MatchCfg {
            poll_ms: 0,
            ..MatchCfg::default()
        };
        let err = full_builder().with_match_cfg(cfg).build().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::InvalidConfig(_))
        ));
    }

    #[test]
    fn sixteen_sample_history_is_rejected() {
        let cfg = DialCfg {
            history_len: 16,
            ..DialCfg::default()
        };
        let err = full_builder().with_dial_cfg(cfg).build().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::InvalidConfig(_))
        ));
    }

    #[test]
    fn colliding_lines_are_rejected() {
        let cfg = DuelCfg {
            line_vibration: DialCfg::default().line_a,
            ..DuelCfg::default()
        };
        let err = full_builder().with_duel_cfg(cfg).build().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::InvalidConfig(_))
        ));
    }
}
