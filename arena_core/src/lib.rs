#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Arena game-prop control logic (hardware-agnostic).
//!
//! This crate holds the state machines for a timed competition prop: the
//! force-field duel controller and the rotary-dial digit decoder, plus the
//! host polling loop that drives both. All hardware interactions go through
//! the `arena_traits` seams so every piece runs against fakes in tests.
//!
//! ## Architecture
//!
//! - **Cells**: atomic counters shared between edge callbacks and the poll
//!   loop (`cell` module)
//! - **Encoder**: quadrature edge decoding into a tick count (`encoder`)
//! - **Motion**: direction filtering and null-zone detection (`motion`)
//! - **Dial**: digit extraction and the dial stage lifecycle (`dial`)
//! - **Duel**: countdown/combat timing state machine (`duel`)
//! - **Scoring**: pure digit/hit scoring functions (`score`)
//! - **Runner**: the cooperative match loop (`runner`)
//!
//! ## Timing model
//!
//! Everything is driven by a host loop calling `step(now)` once per
//! iteration at sub-10ms granularity. Edge callbacks only ever touch the
//! atomic cells; each `step` reads one consistent snapshot per call.

pub mod builder;
pub mod cell;
pub mod config;
pub mod dial;
pub mod duel;
pub mod encoder;
pub mod error;
pub mod mocks;
pub mod motion;
pub mod runner;
pub mod score;
pub mod stage;

pub use builder::MatchBuilder;
pub use cell::{EncoderCell, HitCounter};
pub use config::{DialCfg, DuelCfg, MatchCfg};
pub use dial::{DialStage, DigitLog};
pub use duel::{DuelStage, DuelState, HitMark};
pub use encoder::QuadratureDecoder;
pub use error::{ArenaError, BuildError, Result};
pub use motion::{Motion, MotionClassifier};
pub use runner::{MatchRunner, MatchSummary, StopReason};
pub use score::{TargetPattern, dial_score, duel_score};
pub use stage::{Stage, StageReport};
