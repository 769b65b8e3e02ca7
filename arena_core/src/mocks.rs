//! Test and helper fakes for arena_core

use std::collections::HashMap;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};

use arena_traits::{
    Console, Direction, EdgeCallback, EdgeNotifier, Entropy, Field, HwResult, KnobLamp, LineId,
    Lamp, Rgb,
};

/// In-memory edge notifier. Tests drive it with `set_level` and `trigger`.
pub struct FakeNotifier {
    levels: Mutex<HashMap<LineId, bool>>,
    callbacks: Mutex<HashMap<LineId, EdgeCallback>>,
    error_mask: AtomicU8,
}

impl FakeNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            levels: Mutex::new(HashMap::new()),
            callbacks: Mutex::new(HashMap::new()),
            error_mask: AtomicU8::new(0),
        })
    }

    pub fn set_level(&self, line: LineId, high: bool) {
        if let Ok(mut levels) = self.levels.lock() {
            levels.insert(line, high);
        }
    }

    /// Fire the edge callback for `line`, if any. An edge on an unsubscribed
    /// line sets the group's spurious bit, like the real controller.
    pub fn trigger(&self, line: LineId) {
        let mut callbacks = match self.callbacks.lock() {
            Ok(guard) => guard,
            Err(_) => return,
        };
        match callbacks.get_mut(&line) {
            Some(cb) => cb(),
            None => {
                self.error_mask.fetch_or(1 << (line / 8), Ordering::Relaxed);
            }
        }
    }

    /// Set the line level and fire its callback in one step.
    pub fn edge(&self, line: LineId, high: bool) {
        self.set_level(line, high);
        self.trigger(line);
    }
}

impl EdgeNotifier for FakeNotifier {
    fn subscribe(&self, line: LineId, callback: EdgeCallback) -> bool {
        let Ok(mut callbacks) = self.callbacks.lock() else {
            return false;
        };
        let group = line / 8;
        let had = callbacks.keys().any(|&l| l / 8 == group);
        callbacks.insert(line, callback);
        had
    }

    fn unsubscribe(&self, line: LineId) -> bool {
        let Ok(mut callbacks) = self.callbacks.lock() else {
            return false;
        };
        let group = line / 8;
        callbacks.remove(&line);
        !callbacks.keys().any(|&l| l / 8 == group)
    }

    fn level(&self, line: LineId) -> bool {
        self.levels
            .lock()
            .ok()
            .and_then(|levels| levels.get(&line).copied())
            .unwrap_or(false)
    }

    fn take_error_mask(&self) -> u8 {
        self.error_mask.swap(0, Ordering::Relaxed)
    }
}

/// Field coil spy. The handle lets a test observe calls after the stage has
/// taken ownership of the boxed trait object.
pub struct RecordingField {
    log: Arc<Mutex<Vec<bool>>>,
}

impl RecordingField {
    pub fn new() -> (Self, Arc<Mutex<Vec<bool>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        (Self { log: log.clone() }, log)
    }
}

impl Field for RecordingField {
    fn set_active(&mut self, on: bool) -> HwResult<()> {
        if let Ok(mut log) = self.log.lock() {
            log.push(on);
        }
        Ok(())
    }
}

/// A field coil that always faults, for exercising error propagation.
pub struct FailingField;

impl Field for FailingField {
    fn set_active(&mut self, _on: bool) -> HwResult<()> {
        Err(Box::new(std::io::Error::other("coil driver fault")))
    }
}

/// Saber spy recording fills; pixel writes are accepted and dropped.
pub struct RecordingLamp {
    fills: Arc<Mutex<Vec<Rgb>>>,
}

impl RecordingLamp {
    pub fn new() -> (Self, Arc<Mutex<Vec<Rgb>>>) {
        let fills = Arc::new(Mutex::new(Vec::new()));
        (Self { fills: fills.clone() }, fills)
    }
}

impl Lamp for RecordingLamp {
    fn fill(&mut self, color: Rgb) -> HwResult<()> {
        if let Ok(mut fills) = self.fills.lock() {
            fills.push(color);
        }
        Ok(())
    }

    fn set_pixel(&mut self, _idx: u8, _color: Rgb) -> HwResult<()> {
        Ok(())
    }
}

/// Knob LED spy recording direction indications.
pub struct RecordingKnobLamp {
    shown: Arc<Mutex<Vec<Direction>>>,
}

impl RecordingKnobLamp {
    pub fn new() -> (Self, Arc<Mutex<Vec<Direction>>>) {
        let shown = Arc::new(Mutex::new(Vec::new()));
        (Self { shown: shown.clone() }, shown)
    }
}

impl KnobLamp for RecordingKnobLamp {
    fn indicate(&mut self, dir: Direction) -> HwResult<()> {
        if let Ok(mut shown) = self.shown.lock() {
            shown.push(dir);
        }
        Ok(())
    }

    fn set_blink(&mut self, _on: bool) -> HwResult<()> {
        Ok(())
    }

    fn off(&mut self) -> HwResult<()> {
        Ok(())
    }
}

/// A knob LED that faults on `off()`, for exercising teardown error paths.
pub struct FailingKnobLamp;

impl KnobLamp for FailingKnobLamp {
    fn indicate(&mut self, _dir: Direction) -> HwResult<()> {
        Ok(())
    }

    fn set_blink(&mut self, _on: bool) -> HwResult<()> {
        Ok(())
    }

    fn off(&mut self) -> HwResult<()> {
        Err(Box::new(std::io::Error::other("led driver fault")))
    }
}

/// Console that reports itself absent; every call is a no-op.
pub struct NullConsole;

impl Console for NullConsole {
    fn attached(&mut self) -> bool {
        false
    }

    fn set_cursor(&mut self, _col: u8, _row: u8) -> HwResult<()> {
        Ok(())
    }

    fn print(&mut self, _text: &str) -> HwResult<()> {
        Ok(())
    }

    fn clear(&mut self) -> HwResult<()> {
        Ok(())
    }

    fn buttons(&mut self) -> u8 {
        0
    }
}

/// Entropy source replaying a fixed script; the last value repeats.
pub struct ScriptedEntropy {
    values: Vec<u32>,
    idx: usize,
}

impl ScriptedEntropy {
    pub fn new(values: impl Into<Vec<u32>>) -> Self {
        Self {
            values: values.into(),
            idx: 0,
        }
    }
}

impl Entropy for ScriptedEntropy {
    fn sample(&mut self) -> u32 {
        let value = self.values.get(self.idx).copied().unwrap_or(0);
        if self.idx + 1 < self.values.len() {
            self.idx += 1;
        }
        value
    }
}
