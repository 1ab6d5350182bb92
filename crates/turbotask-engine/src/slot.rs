//! Per-slot macro state.

use crate::timeline::Timeline;
use serde::Serialize;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread;

/// What a slot is doing right now.
///
/// At most one slot is `Recording` across the whole engine; any number may be
/// `Playing` at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotState {
    Idle,
    Recording,
    Playing,
}

/// How many passes a playback run makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatPolicy {
    /// Fixed number of passes, at least 1.
    Count(u32),
    /// Run until a stop signal.
    Forever,
}

impl RepeatPolicy {
    /// Resolve presentation-layer input: a numeric entry plus a "repeat
    /// forever" flag that overrides it. Malformed or non-positive counts
    /// degrade to 1.
    pub fn from_input(count: &str, forever: bool) -> Self {
        if forever {
            return RepeatPolicy::Forever;
        }
        let n = count.trim().parse::<i64>().unwrap_or(1).clamp(1, u32::MAX as i64);
        RepeatPolicy::Count(n as u32)
    }
}

impl Default for RepeatPolicy {
    fn default() -> Self {
        RepeatPolicy::Count(1)
    }
}

/// One macro slot: its state machine position, the captured timeline, and
/// the bookkeeping a playback run needs.
///
/// Slots exist for the life of the engine. The timeline is replaced wholesale
/// at each recording start; the stop flag is replaced at each playback start
/// so a stale stop request cannot leak into a new run.
#[derive(Debug)]
pub(crate) struct Slot {
    pub state: SlotState,
    pub timeline: Timeline,
    /// Pointer position at the moment recording began; playback re-centers
    /// here before each pass.
    pub anchor: Option<(i32, i32)>,
    pub repeat: RepeatPolicy,
    pub stop: Arc<AtomicBool>,
    pub playing: Option<thread::JoinHandle<()>>,
}

impl Slot {
    pub fn new() -> Self {
        Self {
            state: SlotState::Idle,
            timeline: Timeline::new(),
            anchor: None,
            repeat: RepeatPolicy::default(),
            stop: Arc::new(AtomicBool::new(false)),
            playing: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeat_count_verbatim() {
        assert_eq!(RepeatPolicy::from_input("3", false), RepeatPolicy::Count(3));
        assert_eq!(RepeatPolicy::from_input(" 12 ", false), RepeatPolicy::Count(12));
    }

    #[test]
    fn repeat_count_floors_at_one() {
        assert_eq!(RepeatPolicy::from_input("0", false), RepeatPolicy::Count(1));
        assert_eq!(RepeatPolicy::from_input("-5", false), RepeatPolicy::Count(1));
    }

    #[test]
    fn malformed_count_degrades_to_one() {
        assert_eq!(RepeatPolicy::from_input("abc", false), RepeatPolicy::Count(1));
        assert_eq!(RepeatPolicy::from_input("", false), RepeatPolicy::Count(1));
    }

    #[test]
    fn forever_flag_overrides_count() {
        assert_eq!(RepeatPolicy::from_input("7", true), RepeatPolicy::Forever);
        assert_eq!(RepeatPolicy::from_input("junk", true), RepeatPolicy::Forever);
    }
}
