//! Recording capture session and raw-event normalization.

use crate::events::{Event, EventKind, ScreenBounds};
use std::time::Instant;

/// One recording session: the slot it feeds and the monotonic clock its
/// offsets are computed against.
///
/// Created when recording starts, dropped when it stops. Raw events arriving
/// while no session exists are never captured, and a session only ever feeds
/// the slot it was created for.
#[derive(Debug)]
pub struct CaptureSession {
    slot: usize,
    started: Instant,
}

impl CaptureSession {
    pub fn new(slot: usize) -> Self {
        Self {
            slot,
            started: Instant::now(),
        }
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Milliseconds since the session opened.
    pub fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    /// Translate a raw listener event into a timeline event.
    ///
    /// `pointer` is the last observed (already clamped) pointer position;
    /// button events carry it because the raw press/release has no
    /// coordinates of its own. Returns None for raw events outside the macro
    /// model (scroll).
    pub fn normalize(
        &self,
        raw: &rdev::EventType,
        pointer: Option<(i32, i32)>,
        bounds: ScreenBounds,
    ) -> Option<Event> {
        let t = self.elapsed_ms();
        let kind = match *raw {
            rdev::EventType::MouseMove { x, y } => {
                let (x, y) = bounds.clamp(x, y);
                EventKind::Move { x, y }
            }
            rdev::EventType::ButtonPress(button) => {
                let (x, y) = pointer.unwrap_or((0, 0));
                EventKind::Click {
                    x,
                    y,
                    button,
                    pressed: true,
                }
            }
            rdev::EventType::ButtonRelease(button) => {
                let (x, y) = pointer.unwrap_or((0, 0));
                EventKind::Click {
                    x,
                    y,
                    button,
                    pressed: false,
                }
            }
            rdev::EventType::KeyPress(key) => EventKind::KeyPress { key },
            rdev::EventType::KeyRelease(key) => EventKind::KeyRelease { key },
            rdev::EventType::Wheel { .. } => return None,
        };
        Some(Event { t, kind })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDS: ScreenBounds = ScreenBounds {
        width: 800,
        height: 600,
    };

    #[test]
    fn moves_are_clamped() {
        let session = CaptureSession::new(0);
        let event = session
            .normalize(
                &rdev::EventType::MouseMove { x: 9000.0, y: -3.0 },
                None,
                BOUNDS,
            )
            .unwrap();
        assert_eq!(event.kind, EventKind::Move { x: 799, y: 0 });
    }

    #[test]
    fn clicks_take_the_tracked_pointer() {
        let session = CaptureSession::new(0);
        let event = session
            .normalize(
                &rdev::EventType::ButtonPress(rdev::Button::Left),
                Some((42, 17)),
                BOUNDS,
            )
            .unwrap();
        assert_eq!(
            event.kind,
            EventKind::Click {
                x: 42,
                y: 17,
                button: rdev::Button::Left,
                pressed: true,
            }
        );
    }

    #[test]
    fn scroll_is_outside_the_model() {
        let session = CaptureSession::new(0);
        assert!(session
            .normalize(
                &rdev::EventType::Wheel {
                    delta_x: 0,
                    delta_y: 3
                },
                None,
                BOUNDS,
            )
            .is_none());
    }
}
