//! Hotkey binding table and key resolution.
//!
//! The table is owned by the engine and only touched under its state lock;
//! there is no ambient global registry.

use crate::error::{EngineError, Result};
use rdev::Key;
use std::collections::HashMap;

/// The panic key. Resolution claims it before bindings or pending
/// assignments are even considered, so it can never be assigned to a slot.
pub const RESERVED_STOP_KEY: Key = Key::Backspace;

/// What a physical key press means right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// The reserved panic key: stop all playback everywhere.
    StopAll,
    /// A binding request is armed for this slot; the press names its key.
    Assign(usize),
    /// The key is bound: toggle that slot.
    Toggle(usize),
    /// Not a hotkey. Eligible for capture if a recording is active.
    Unbound,
}

/// Key-to-slot bindings plus the single pending assignment request.
#[derive(Debug, Default)]
pub struct HotkeyMap {
    bindings: HashMap<Key, usize>,
    pending: Option<usize>,
}

impl HotkeyMap {
    /// Classify a key press. Pure; any resulting mutation (assignment,
    /// toggle) is applied by the caller.
    ///
    /// A panic press does not consume a pending assignment: the operator can
    /// still name the key with their next press.
    pub fn resolve(&self, key: Key) -> KeyAction {
        if key == RESERVED_STOP_KEY {
            return KeyAction::StopAll;
        }
        if let Some(slot) = self.pending {
            return KeyAction::Assign(slot);
        }
        match self.bindings.get(&key) {
            Some(&slot) => KeyAction::Toggle(slot),
            None => KeyAction::Unbound,
        }
    }

    /// Arm the next key press to bind to `slot`. Returns false (and changes
    /// nothing) if another request is already pending.
    pub fn request_assignment(&mut self, slot: usize) -> bool {
        if self.pending.is_some() {
            return false;
        }
        self.pending = Some(slot);
        true
    }

    /// Bind `key` to `slot`, consuming the pending request either way.
    ///
    /// A key owned by a different slot is a conflict: the request is
    /// discarded and both bindings stay as they were. Re-binding a slot's
    /// current key to itself is a re-confirmation. A fresh binding removes
    /// the slot's previous key first, so each slot holds at most one.
    pub fn assign(&mut self, key: Key, slot: usize) -> Result<()> {
        self.pending = None;
        if let Some(&owner) = self.bindings.get(&key) {
            if owner != slot {
                return Err(EngineError::HotkeyConflict { key, owner });
            }
            return Ok(());
        }
        if let Some(old) = self.key_for(slot) {
            self.bindings.remove(&old);
        }
        self.bindings.insert(key, slot);
        Ok(())
    }

    pub fn is_bound(&self, key: Key) -> bool {
        self.bindings.contains_key(&key)
    }

    /// The key currently bound to `slot`, if any.
    pub fn key_for(&self, slot: usize) -> Option<Key> {
        self.bindings
            .iter()
            .find(|(_, &s)| s == slot)
            .map(|(&k, _)| k)
    }

    pub fn pending(&self) -> Option<usize> {
        self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_key_always_stops() {
        let mut map = HotkeyMap::default();
        assert_eq!(map.resolve(RESERVED_STOP_KEY), KeyAction::StopAll);
        map.request_assignment(2);
        assert_eq!(map.resolve(RESERVED_STOP_KEY), KeyAction::StopAll);
        assert_eq!(map.pending(), Some(2));
    }

    #[test]
    fn assignment_flow() {
        let mut map = HotkeyMap::default();
        assert!(map.request_assignment(3));
        assert_eq!(map.resolve(Key::F6), KeyAction::Assign(3));
        map.assign(Key::F6, 3).unwrap();
        assert_eq!(map.pending(), None);
        assert_eq!(map.resolve(Key::F6), KeyAction::Toggle(3));
    }

    #[test]
    fn one_pending_request_at_a_time() {
        let mut map = HotkeyMap::default();
        assert!(map.request_assignment(0));
        assert!(!map.request_assignment(1));
        assert_eq!(map.pending(), Some(0));
    }

    #[test]
    fn conflict_leaves_old_binding_untouched() {
        let mut map = HotkeyMap::default();
        map.request_assignment(0);
        map.assign(Key::KeyK, 0).unwrap();
        map.request_assignment(2);
        let err = map.assign(Key::KeyK, 2).unwrap_err();
        assert!(matches!(
            err,
            EngineError::HotkeyConflict { owner: 0, .. }
        ));
        assert_eq!(map.key_for(0), Some(Key::KeyK));
        assert_eq!(map.key_for(2), None);
        assert_eq!(map.pending(), None);
    }

    #[test]
    fn reconfirming_own_key_is_accepted() {
        let mut map = HotkeyMap::default();
        map.assign(Key::KeyK, 0).unwrap();
        map.assign(Key::KeyK, 0).unwrap();
        assert_eq!(map.key_for(0), Some(Key::KeyK));
    }

    #[test]
    fn rebinding_clears_previous_key() {
        let mut map = HotkeyMap::default();
        map.assign(Key::F1, 1).unwrap();
        map.assign(Key::F2, 1).unwrap();
        assert!(!map.is_bound(Key::F1));
        assert_eq!(map.key_for(1), Some(Key::F2));
    }

    #[test]
    fn unbound_key_is_ignored() {
        let map = HotkeyMap::default();
        assert_eq!(map.resolve(Key::KeyQ), KeyAction::Unbound);
    }
}
