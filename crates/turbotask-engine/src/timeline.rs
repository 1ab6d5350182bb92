//! Per-slot event timeline.

use crate::events::Event;
use std::sync::Arc;

/// Ordered, timestamped event sequence for one slot.
///
/// Offsets are monotonically non-decreasing. The owning slot replaces the
/// whole timeline at the start of every recording; nothing is ever appended
/// to an old one.
#[derive(Debug, Default, Clone)]
pub struct Timeline {
    events: Vec<Event>,
}

impl Timeline {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Append an event. Offsets are kept non-decreasing even if the source
    /// clock misbehaves.
    pub fn push(&mut self, mut event: Event) {
        if let Some(last) = self.events.last() {
            if event.t < last.t {
                event.t = last.t;
            }
        }
        self.events.push(event);
    }

    /// Immutable copy for one playback run. A later recording on the same
    /// slot replaces the timeline without touching snapshots already in
    /// flight.
    pub fn snapshot(&self) -> Arc<[Event]> {
        self.events.clone().into()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Offset of the last event, in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        self.events.last().map_or(0, |e| e.t)
    }
}
