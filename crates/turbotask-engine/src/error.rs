//! Engine error taxonomy.
//!
//! Per-event failures during capture or playback are logged and swallowed at
//! the point they occur; the variants here surface at the operation
//! boundaries where a caller can act on them.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Input subsystem unavailable or failed mid-listen.
    #[error("input capture failed: {0}")]
    Capture(String),

    /// A single synthetic action was refused by the OS.
    #[error("injection failed: {0}")]
    Injection(String),

    /// Requested hotkey is already bound to another slot.
    #[error("key {key:?} is already in use by slot {owner}")]
    HotkeyConflict { key: rdev::Key, owner: usize },

    /// Slot index outside the fixed slot range.
    #[error("slot {0} does not exist")]
    InvalidSlot(usize),

    /// No usable display at startup.
    #[error("no display available: {0}")]
    NoDisplay(String),
}
