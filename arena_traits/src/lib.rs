pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// Boxed-error result used across the hardware seams.
pub type HwResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Identifies one physical input line on the controller board.
pub type LineId = u8;

/// Callback invoked from interrupt context on an edge of a subscribed line.
///
/// Callbacks must be short and must not call back into the notifier
/// (subscribe/unsubscribe); the notifier is not re-entrant.
pub type EdgeCallback = Box<dyn FnMut() + Send>;

/// Subscription to edge events on named input lines.
///
/// Lines are grouped into physical callback groups; at most one callback per
/// line. Invalid line ids are a no-op returning `false`, never a fault.
pub trait EdgeNotifier: Send + Sync {
    /// Subscribe `callback` to edges on `line`. Returns `true` when the
    /// line's callback group already had a subscriber.
    fn subscribe(&self, line: LineId, callback: EdgeCallback) -> bool;

    /// Remove the subscription for `line`. Returns `true` when this was the
    /// last subscribed line on its group.
    fn unsubscribe(&self, line: LineId) -> bool;

    /// Current level of an input line (false = low). Safe to call from an
    /// edge callback.
    fn level(&self, line: LineId) -> bool;

    /// Read and clear the spurious-interrupt mask. Bit `n` is set when an
    /// edge fired on group `n` without a registered callback.
    fn take_error_mask(&self) -> u8;
}

/// The magnetic force-field coil.
pub trait Field {
    fn set_active(&mut self, on: bool) -> HwResult<()>;
}

/// 8-bit RGB color for the saber strip and knob LED.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const RED: Rgb = Rgb::new(255, 0, 0);
    pub const GREEN: Rgb = Rgb::new(0, 255, 0);
    pub const BLUE: Rgb = Rgb::new(0, 0, 255);
    pub const AMBER: Rgb = Rgb::new(255, 191, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Addressable LED strip (the saber).
pub trait Lamp {
    /// Light every pixel the same color.
    fn fill(&mut self, color: Rgb) -> HwResult<()>;
    /// Light a single pixel; out-of-range indices are ignored.
    fn set_pixel(&mut self, idx: u8, color: Rgb) -> HwResult<()>;
}

/// Rotation direction derived from encoder motion, or rest in the null zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Center,
    Clockwise,
    CounterClockwise,
}

/// The tri-color LED behind the dial knob.
pub trait KnobLamp {
    /// Show the current rotation direction (center = white).
    fn indicate(&mut self, dir: Direction) -> HwResult<()>;
    /// Enable or disable the 5 Hz attract blink.
    fn set_blink(&mut self, on: bool) -> HwResult<()>;
    /// Turn the LED fully off (end of match).
    fn off(&mut self) -> HwResult<()>;
}

/// Start-button bit in the console button mask.
pub const BTN_START: u8 = 0x01;
/// Stop-button bit in the console button mask.
pub const BTN_STOP: u8 = 0x02;

/// Handheld judge console: a character display plus buttons.
///
/// Presence is probed once via `attached()`; when absent, every other call
/// degrades to a no-op and `buttons()` reports nothing pressed.
pub trait Console {
    fn attached(&mut self) -> bool;
    fn set_cursor(&mut self, col: u8, row: u8) -> HwResult<()>;
    fn print(&mut self, text: &str) -> HwResult<()>;
    fn clear(&mut self) -> HwResult<()>;
    /// Bit vector of currently pressed buttons (`BTN_START`, `BTN_STOP`).
    fn buttons(&mut self) -> u8;
}

/// Non-cryptographic entropy for fighting-pattern selection.
///
/// Production implementations sample a free-running high-resolution timer;
/// the contract is only "visually unpredictable", and tests may return a
/// fixed value for deterministic replay.
pub trait Entropy {
    fn sample(&mut self) -> u32;
}
