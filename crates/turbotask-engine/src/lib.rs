//! turbotask-engine - hotkey-driven input macro recording and timed replay
//!
//! Captures pointer/keyboard event timelines into a fixed set of slots and
//! replays them with wall-clock timing fidelity. Each slot carries its own
//! repeat policy and optional trigger hotkey; a reserved panic key stops
//! every running playback at once.
//!
//! The engine is driven two ways at the same time: programmatically through
//! [`engine::MacroEngine`]'s operations, and physically through the global
//! hotkey stream. Both funnel into the same per-slot state machine.

pub mod capture;
pub mod engine;
pub mod error;
pub mod events;
pub mod hotkey;
pub mod inject;
pub mod listener;
pub mod slot;
pub mod timeline;

mod playback;

pub use engine::{MacroEngine, SlotStatus, DEFAULT_SLOTS};
pub use error::{EngineError, Result};
pub use events::{Event, EventKind, ScreenBounds};
pub use slot::{RepeatPolicy, SlotState};

pub mod prelude {
    pub use crate::engine::{MacroEngine, SlotStatus, DEFAULT_SLOTS};
    pub use crate::error::{EngineError, Result};
    pub use crate::events::{Event, EventKind, ScreenBounds};
    pub use crate::hotkey::RESERVED_STOP_KEY;
    pub use crate::inject::{Injector, NoopInjector, SystemInjector};
    pub use crate::slot::{RepeatPolicy, SlotState};
    pub use crate::timeline::Timeline;
}
