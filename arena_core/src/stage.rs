//! The lifecycle contract shared by every arena stage.

use crate::error::Result;

/// End-of-match report from one stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub score: i32,
    pub summary: String,
}

/// One cooperatively-scheduled stage of the match.
///
/// The host loop calls `step(now)` once per iteration; `now` is milliseconds
/// since controller power-on and only ever increases. `stop` must disable
/// the stage's interrupt sources before returning so no callback can fire
/// into quiescent state. `report` is invoked once, after `stop`.
pub trait Stage {
    fn start(&mut self) -> Result<()>;
    fn step(&mut self, now_ms: u64) -> Result<()>;
    fn stop(&mut self, now_ms: u64) -> Result<()>;
    fn report(&self) -> StageReport;
}
