//! Synthetic input injection.

use crate::error::{EngineError, Result};
use crate::events::{Event, EventKind, ScreenBounds};
use rdev::{Button, EventType, Key};
use tracing::warn;

/// Seam between the playback loop and the OS input stack.
pub trait Injector: Send + Sync {
    /// Move the pointer to absolute screen coordinates.
    fn pointer_move(&self, x: i32, y: i32) -> Result<()>;
    /// Press or release a button at the current pointer position.
    fn button(&self, button: Button, pressed: bool) -> Result<()>;
    /// Press or release a key.
    fn key(&self, key: Key, pressed: bool) -> Result<()>;
}

/// Injects through the OS, clamping every coordinate onto the screen.
pub struct SystemInjector {
    bounds: ScreenBounds,
}

impl SystemInjector {
    pub fn new(bounds: ScreenBounds) -> Self {
        Self { bounds }
    }

    fn simulate(&self, event_type: &EventType) -> Result<()> {
        rdev::simulate(event_type).map_err(|e| EngineError::Injection(format!("{:?}", e)))
    }
}

impl Injector for SystemInjector {
    fn pointer_move(&self, x: i32, y: i32) -> Result<()> {
        let (x, y) = self.bounds.clamp(x as f64, y as f64);
        self.simulate(&EventType::MouseMove {
            x: x as f64,
            y: y as f64,
        })
    }

    fn button(&self, button: Button, pressed: bool) -> Result<()> {
        let event = if pressed {
            EventType::ButtonPress(button)
        } else {
            EventType::ButtonRelease(button)
        };
        self.simulate(&event)
    }

    fn key(&self, key: Key, pressed: bool) -> Result<()> {
        let event = if pressed {
            EventType::KeyPress(key)
        } else {
            EventType::KeyRelease(key)
        };
        self.simulate(&event)
    }
}

/// Discards every action. For dry runs and tests.
pub struct NoopInjector;

impl Injector for NoopInjector {
    fn pointer_move(&self, _x: i32, _y: i32) -> Result<()> {
        Ok(())
    }

    fn button(&self, _button: Button, _pressed: bool) -> Result<()> {
        Ok(())
    }

    fn key(&self, _key: Key, _pressed: bool) -> Result<()> {
        Ok(())
    }
}

/// Apply one timeline event. A refused action is logged and swallowed so a
/// single failure cannot throw the rest of the pass off schedule.
///
/// Click replay repositions the pointer to the recorded coordinates before
/// pressing, matching how the click was captured.
pub(crate) fn apply(injector: &dyn Injector, event: &Event) {
    let result = match event.kind {
        EventKind::Move { x, y } => injector.pointer_move(x, y),
        EventKind::Click {
            x,
            y,
            button,
            pressed,
        } => injector
            .pointer_move(x, y)
            .and_then(|_| injector.button(button, pressed)),
        EventKind::KeyPress { key } => injector.key(key, true),
        EventKind::KeyRelease { key } => injector.key(key, false),
    };
    if let Err(e) = result {
        warn!("skipping event at {}ms: {}", event.t, e);
    }
}
