//! Simulated peripherals for bench runs and the CLI's replay mode.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use arena_traits::{
    BTN_START, BTN_STOP, Console, Direction, Entropy, Field, HwResult, KnobLamp, Lamp, Rgb,
};

use crate::error::HwError;

/// Simulated force-field coil.
#[derive(Debug, Default)]
pub struct SimulatedField {
    active: bool,
}

impl SimulatedField {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Field for SimulatedField {
    fn set_active(&mut self, on: bool) -> HwResult<()> {
        if self.active != on {
            tracing::info!(on, "field coil (simulated)");
        }
        self.active = on;
        Ok(())
    }
}

/// Number of pixels on the saber strip.
pub const SABER_PIXELS: usize = 8;

/// Simulated saber LED strip.
#[derive(Debug)]
pub struct SimulatedSaber {
    pixels: [Rgb; SABER_PIXELS],
}

impl Default for SimulatedSaber {
    fn default() -> Self {
        Self {
            pixels: [Rgb::BLACK; SABER_PIXELS],
        }
    }
}

impl SimulatedSaber {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Lamp for SimulatedSaber {
    fn fill(&mut self, color: Rgb) -> HwResult<()> {
        self.pixels = [color; SABER_PIXELS];
        tracing::debug!(r = color.r, g = color.g, b = color.b, "saber fill (simulated)");
        Ok(())
    }

    fn set_pixel(&mut self, idx: u8, color: Rgb) -> HwResult<()> {
        if let Some(px) = self.pixels.get_mut(usize::from(idx)) {
            *px = color;
        }
        Ok(())
    }
}

/// Simulated tri-color knob LED.
#[derive(Debug, Default)]
pub struct SimulatedKnobLamp {
    shown: Option<Direction>,
    blink: bool,
}

impl SimulatedKnobLamp {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KnobLamp for SimulatedKnobLamp {
    fn indicate(&mut self, dir: Direction) -> HwResult<()> {
        if self.shown != Some(dir) {
            tracing::debug!(?dir, "knob lamp (simulated)");
        }
        self.shown = Some(dir);
        Ok(())
    }

    fn set_blink(&mut self, on: bool) -> HwResult<()> {
        self.blink = on;
        tracing::debug!(on, "knob blink (simulated)");
        Ok(())
    }

    fn off(&mut self) -> HwResult<()> {
        self.shown = None;
        self.blink = false;
        tracing::debug!("knob lamp off (simulated)");
        Ok(())
    }
}

/// Console display geometry.
pub const CONSOLE_COLS: usize = 20;
pub const CONSOLE_ROWS: usize = 4;

type Screen = [[u8; CONSOLE_COLS]; CONSOLE_ROWS];

/// External handle onto a [`SimulatedConsole`]: read the screen and press
/// buttons while the console itself is owned by the match runner.
#[derive(Clone)]
pub struct ConsoleHandle {
    screen: Arc<Mutex<Screen>>,
    buttons: Arc<AtomicU8>,
}

impl ConsoleHandle {
    pub fn press_start(&self) {
        self.buttons.fetch_or(BTN_START, Ordering::Relaxed);
    }

    pub fn press_stop(&self) {
        self.buttons.fetch_or(BTN_STOP, Ordering::Relaxed);
    }

    pub fn release_all(&self) {
        self.buttons.store(0, Ordering::Relaxed);
    }

    /// One display row as trimmed text.
    pub fn line(&self, row: usize) -> String {
        let screen = match self.screen.lock() {
            Ok(guard) => guard,
            Err(_) => return String::new(),
        };
        let Some(cells) = screen.get(row) else {
            return String::new();
        };
        String::from_utf8_lossy(cells).trim_end().to_string()
    }
}

/// Simulated 20x4 judge console with start/stop buttons.
pub struct SimulatedConsole {
    screen: Arc<Mutex<Screen>>,
    buttons: Arc<AtomicU8>,
    col: u8,
    row: u8,
}

impl SimulatedConsole {
    pub fn new() -> (Self, ConsoleHandle) {
        let screen = Arc::new(Mutex::new([[b' '; CONSOLE_COLS]; CONSOLE_ROWS]));
        let buttons = Arc::new(AtomicU8::new(0));
        let handle = ConsoleHandle {
            screen: screen.clone(),
            buttons: buttons.clone(),
        };
        (
            Self {
                screen,
                buttons,
                col: 0,
                row: 0,
            },
            handle,
        )
    }
}

impl Console for SimulatedConsole {
    fn attached(&mut self) -> bool {
        true
    }

    fn set_cursor(&mut self, col: u8, row: u8) -> HwResult<()> {
        if usize::from(col) >= CONSOLE_COLS || usize::from(row) >= CONSOLE_ROWS {
            return Err(Box::new(HwError::Cursor { col, row }));
        }
        self.col = col;
        self.row = row;
        Ok(())
    }

    fn print(&mut self, text: &str) -> HwResult<()> {
        let Ok(mut screen) = self.screen.lock() else {
            return Ok(());
        };
        let row = &mut screen[usize::from(self.row)];
        for byte in text.bytes() {
            let col = usize::from(self.col);
            if col >= CONSOLE_COLS {
                break;
            }
            row[col] = byte;
            self.col += 1;
        }
        Ok(())
    }

    fn clear(&mut self) -> HwResult<()> {
        if let Ok(mut screen) = self.screen.lock() {
            *screen = [[b' '; CONSOLE_COLS]; CONSOLE_ROWS];
        }
        self.col = 0;
        self.row = 0;
        Ok(())
    }

    fn buttons(&mut self) -> u8 {
        self.buttons.load(Ordering::Relaxed)
    }
}

/// Entropy from a free-running high-resolution timer. Non-cryptographic;
/// the contract is only that the low digits are visually unpredictable at
/// the moment a human lands a hit.
#[derive(Debug)]
pub struct TimerEntropy {
    epoch: Instant,
}

impl Default for TimerEntropy {
    fn default() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl TimerEntropy {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Entropy for TimerEntropy {
    fn sample(&mut self) -> u32 {
        self.epoch.elapsed().as_micros() as u32
    }
}
