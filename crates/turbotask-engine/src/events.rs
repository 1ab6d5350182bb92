//! Event model shared by capture and playback.
//!
//! Events are stored as flat structs that serialize to compact JSON.

use crate::error::{EngineError, Result};
use rdev::{Button, Key};
use serde::{Deserialize, Serialize};

/// Primary display dimensions. Every captured and injected coordinate is
/// clamped into `[0, width-1] x [0, height-1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenBounds {
    pub width: u32,
    pub height: u32,
}

impl ScreenBounds {
    /// Detect the primary display. Failing here means there is no usable
    /// input environment at all, so callers should abort rather than run
    /// degraded.
    pub fn detect() -> Result<Self> {
        let (width, height) =
            rdev::display_size().map_err(|e| EngineError::NoDisplay(format!("{:?}", e)))?;
        Ok(Self {
            width: width as u32,
            height: height as u32,
        })
    }

    /// Clamp raw coordinates onto the screen.
    pub fn clamp(&self, x: f64, y: f64) -> (i32, i32) {
        let max_x = self.width.saturating_sub(1) as f64;
        let max_y = self.height.saturating_sub(1) as f64;
        (x.clamp(0.0, max_x) as i32, y.clamp(0.0, max_y) as i32)
    }
}

/// Single captured event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Milliseconds since recording start (monotonic clock).
    pub t: u64,
    /// Event type and data
    #[serde(flatten)]
    pub kind: EventKind,
}

/// Event data - simple tagged union
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "e")]
pub enum EventKind {
    /// Pointer move: x, y (clamped screen coordinates)
    #[serde(rename = "m")]
    Move { x: i32, y: i32 },

    /// Button press/release at the pointer position
    #[serde(rename = "c")]
    Click {
        x: i32,
        y: i32,
        button: Button,
        pressed: bool,
    },

    /// Key down
    #[serde(rename = "kd")]
    KeyPress { key: Key },

    /// Key up
    #[serde(rename = "ku")]
    KeyRelease { key: Key },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_in_range() {
        let bounds = ScreenBounds {
            width: 1920,
            height: 1080,
        };
        assert_eq!(bounds.clamp(10.0, 20.0), (10, 20));
    }

    #[test]
    fn clamp_overflow() {
        let bounds = ScreenBounds {
            width: 1920,
            height: 1080,
        };
        assert_eq!(bounds.clamp(5000.0, 2000.0), (1919, 1079));
    }

    #[test]
    fn clamp_negative() {
        let bounds = ScreenBounds {
            width: 1920,
            height: 1080,
        };
        assert_eq!(bounds.clamp(-50.0, -1.0), (0, 0));
    }
}
