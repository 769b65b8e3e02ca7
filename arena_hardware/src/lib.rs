//! Hardware implementations of the `arena_traits` seams.
//!
//! The real prop drives its peripherals through the same traits; this crate
//! currently ships the grouped pin-change dispatcher plus full simulated
//! peripherals used by the CLI replay mode and bench testing.

pub mod error;
pub mod pin_change;
pub mod sim;

pub use error::HwError;
pub use pin_change::PinChange;
pub use sim::{
    ConsoleHandle, SimulatedConsole, SimulatedField, SimulatedKnobLamp, SimulatedSaber,
    TimerEntropy,
};
