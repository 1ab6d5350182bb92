//! The macro engine: slot controllers, hotkey routing, and the dispatcher
//! thread that turns the raw input stream into state transitions.

use crate::capture::CaptureSession;
use crate::error::{EngineError, Result};
use crate::events::ScreenBounds;
use crate::hotkey::{HotkeyMap, KeyAction, RESERVED_STOP_KEY};
use crate::inject::{Injector, SystemInjector};
use crate::listener;
use crate::playback;
use crate::slot::{RepeatPolicy, Slot, SlotState};
use crate::timeline::Timeline;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Fixed slot count when the presentation layer does not choose one.
pub const DEFAULT_SLOTS: usize = 5;

/// Dispatcher wake-up cadence while the raw channel is quiet.
const POLL: Duration = Duration::from_millis(50);

/// Per-slot view for the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct SlotStatus {
    pub slot: usize,
    pub state: SlotState,
    pub events: usize,
    pub duration_ms: u64,
    pub hotkey: Option<String>,
    pub repeat: RepeatPolicy,
}

struct EngineState {
    slots: Vec<Slot>,
    hotkeys: HotkeyMap,
    /// Present exactly while some slot is Recording; doubles as the global
    /// recording-exclusivity flag.
    capture: Option<CaptureSession>,
    /// Last pointer position seen by the listener, already clamped. Anchors
    /// are taken from here at recording start.
    pointer: Option<(i32, i32)>,
}

struct EngineInner {
    bounds: ScreenBounds,
    injector: Arc<dyn Injector>,
    shutdown: AtomicBool,
    state: Mutex<EngineState>,
}

/// Owns every slot, the hotkey table, and the dispatcher thread. All shared
/// state lives behind one lock inside; the public operations are the whole
/// surface the presentation layer needs.
pub struct MacroEngine {
    inner: Arc<EngineInner>,
    dispatcher: Mutex<Option<thread::JoinHandle<()>>>,
}

impl MacroEngine {
    /// Start against the real OS: detect the display, install the global
    /// listener, inject through the system. Fails fast when there is no
    /// usable display rather than running degraded.
    pub fn start(slots: usize) -> Result<Self> {
        let bounds = ScreenBounds::detect()?;
        let raw = listener::start_system_listener()?;
        let injector: Arc<dyn Injector> = Arc::new(SystemInjector::new(bounds));
        Ok(Self::with_parts(slots, bounds, injector, raw))
    }

    /// Assemble an engine from explicit parts: a raw-event source and an
    /// injector. This is the seam tests and embedders drive synthetic input
    /// through.
    pub fn with_parts(
        slots: usize,
        bounds: ScreenBounds,
        injector: Arc<dyn Injector>,
        raw: Receiver<rdev::EventType>,
    ) -> Self {
        let inner = Arc::new(EngineInner {
            bounds,
            injector,
            shutdown: AtomicBool::new(false),
            state: Mutex::new(EngineState {
                slots: (0..slots).map(|_| Slot::new()).collect(),
                hotkeys: HotkeyMap::default(),
                capture: None,
                pointer: None,
            }),
        });
        let dispatcher = {
            let inner = inner.clone();
            thread::spawn(move || dispatch_loop(&inner, raw))
        };
        info!(slots, width = bounds.width, height = bounds.height, "engine started");
        Self {
            inner,
            dispatcher: Mutex::new(Some(dispatcher)),
        }
    }

    /// Begin or end recording on `slot`, mirroring what its hotkey does: an
    /// Idle slot starts recording (rejected silently while another slot
    /// records), a Recording slot stops and auto-plays what it captured, a
    /// Playing slot has its run stopped.
    pub fn toggle_recording(&self, slot: usize) -> Result<()> {
        let mut state = self.inner.state.lock();
        check_slot(&state, slot)?;
        toggle_locked(&self.inner, &mut state, slot);
        Ok(())
    }

    /// Arm the engine to bind the next physical key press to `slot`. A
    /// request already pending for another slot stays in force.
    pub fn set_hotkey_request(&self, slot: usize) -> Result<()> {
        let mut state = self.inner.state.lock();
        check_slot(&state, slot)?;
        if !state.hotkeys.request_assignment(slot) {
            debug!(slot, "binding request already pending, ignoring");
        }
        Ok(())
    }

    pub fn set_repeat_policy(&self, slot: usize, policy: RepeatPolicy) -> Result<()> {
        let mut state = self.inner.state.lock();
        check_slot(&state, slot)?;
        state.slots[slot].repeat = policy;
        Ok(())
    }

    pub fn repeat_policy(&self, slot: usize) -> Result<RepeatPolicy> {
        let state = self.inner.state.lock();
        check_slot(&state, slot)?;
        Ok(state.slots[slot].repeat)
    }

    /// Signal every playback run to halt at its next event boundary.
    /// Idempotent; safe with zero runs active. Recording is not affected.
    pub fn stop_all(&self) {
        let mut state = self.inner.state.lock();
        stop_all_locked(&mut state);
    }

    /// Snapshot of every slot for display.
    pub fn status(&self) -> Vec<SlotStatus> {
        let state = self.inner.state.lock();
        state
            .slots
            .iter()
            .enumerate()
            .map(|(i, slot)| SlotStatus {
                slot: i,
                state: slot.state,
                events: slot.timeline.len(),
                duration_ms: slot.timeline.duration_ms(),
                hotkey: state.hotkeys.key_for(i).map(|k| format!("{:?}", k)),
                repeat: slot.repeat,
            })
            .collect()
    }

    /// Stop everything and release the dispatcher. Reachable from any state
    /// and idempotent; playback threads are joined so no injection outlives
    /// the engine.
    pub fn shutdown(&self) {
        if self.inner.shutdown.swap(true, Ordering::SeqCst) {
            return;
        }
        let handles: Vec<_> = {
            let mut state = self.inner.state.lock();
            stop_all_locked(&mut state);
            state.capture = None;
            for slot in state.slots.iter_mut() {
                if slot.state == SlotState::Recording {
                    slot.state = SlotState::Idle;
                }
            }
            state.slots.iter_mut().filter_map(|s| s.playing.take()).collect()
        };
        for handle in handles {
            let _ = handle.join();
        }
        if let Some(handle) = self.dispatcher.lock().take() {
            let _ = handle.join();
        }
        info!("engine shut down");
    }
}

impl Drop for MacroEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn check_slot(state: &EngineState, slot: usize) -> Result<()> {
    if slot >= state.slots.len() {
        return Err(EngineError::InvalidSlot(slot));
    }
    Ok(())
}

fn dispatch_loop(inner: &Arc<EngineInner>, raw: Receiver<rdev::EventType>) {
    while !inner.shutdown.load(Ordering::SeqCst) {
        match raw.recv_timeout(POLL) {
            Ok(event) => dispatch(inner, &event),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

/// Route one raw event: pointer tracking first, then hotkey resolution, and
/// only what neither consumed reaches the active capture session. Press and
/// release of hotkeys never reach a timeline, so a stop press cannot leave a
/// stray key event at the head of the next recording.
fn dispatch(inner: &Arc<EngineInner>, raw: &rdev::EventType) {
    let mut state = inner.state.lock();

    if let rdev::EventType::MouseMove { x, y } = *raw {
        state.pointer = Some(inner.bounds.clamp(x, y));
    }

    match *raw {
        rdev::EventType::KeyPress(key) => match state.hotkeys.resolve(key) {
            KeyAction::StopAll => {
                info!("panic key pressed, stopping all playback");
                stop_all_locked(&mut state);
                return;
            }
            KeyAction::Assign(slot) => {
                match state.hotkeys.assign(key, slot) {
                    Ok(()) => info!(slot, ?key, "hotkey bound"),
                    Err(e) => warn!("{}", e),
                }
                return;
            }
            KeyAction::Toggle(slot) => {
                toggle_locked(inner, &mut state, slot);
                return;
            }
            KeyAction::Unbound => {}
        },
        rdev::EventType::KeyRelease(key) => {
            if key == RESERVED_STOP_KEY || state.hotkeys.is_bound(key) {
                return;
            }
        }
        _ => {}
    }

    capture_raw(inner, &mut state, raw);
}

fn capture_raw(inner: &EngineInner, state: &mut EngineState, raw: &rdev::EventType) {
    let captured = match state.capture.as_ref() {
        Some(session) => session
            .normalize(raw, state.pointer, inner.bounds)
            .map(|event| (session.slot(), event)),
        None => return,
    };
    if let Some((slot, event)) = captured {
        state.slots[slot].timeline.push(event);
    }
}

fn toggle_locked(inner: &Arc<EngineInner>, state: &mut EngineState, slot: usize) {
    match state.slots[slot].state {
        SlotState::Idle => start_recording_locked(state, slot),
        SlotState::Recording => stop_recording_locked(inner, state, slot),
        SlotState::Playing => {
            // Per-slot stop: the toggle halts the run instead of opening a
            // recording on top of it.
            debug!(slot, "toggle while playing, stopping that run");
            state.slots[slot].stop.store(true, Ordering::SeqCst);
        }
    }
}

fn start_recording_locked(state: &mut EngineState, slot: usize) {
    if state.capture.is_some() {
        debug!(slot, "another slot is recording, ignoring");
        return;
    }
    // Running playback would be captured right back into the fresh timeline.
    stop_all_locked(state);
    let anchor = state.pointer;
    let s = &mut state.slots[slot];
    s.timeline = Timeline::new();
    s.anchor = anchor;
    s.state = SlotState::Recording;
    state.capture = Some(CaptureSession::new(slot));
    info!(slot, "recording started");
}

fn stop_recording_locked(inner: &Arc<EngineInner>, state: &mut EngineState, slot: usize) {
    state.capture = None;
    state.slots[slot].state = SlotState::Idle;
    let events = state.slots[slot].timeline.len();
    info!(slot, events, "recording stopped");
    // The operator's natural next step is checking what was captured, so a
    // non-empty recording replays immediately under the slot's repeat policy.
    if events > 0 {
        start_playback_locked(inner, state, slot);
    }
}

fn start_playback_locked(inner: &Arc<EngineInner>, state: &mut EngineState, slot: usize) {
    let s = &mut state.slots[slot];
    if s.state != SlotState::Idle || s.timeline.is_empty() {
        return;
    }
    let Some(anchor) = s.anchor else {
        debug!(slot, "no anchor position, skipping playback");
        return;
    };
    // The previous run has already left Playing, so this join is immediate.
    if let Some(handle) = s.playing.take() {
        let _ = handle.join();
    }
    s.stop = Arc::new(AtomicBool::new(false));
    s.state = SlotState::Playing;
    let events = s.timeline.snapshot();
    let repeat = s.repeat;
    let stop = s.stop.clone();
    let engine = inner.clone();
    info!(slot, events = events.len(), ?repeat, "playback started");
    s.playing = Some(thread::spawn(move || {
        playback::run(&events, anchor, repeat, &stop, engine.injector.as_ref());
        let mut state = engine.state.lock();
        if state.slots[slot].state == SlotState::Playing {
            state.slots[slot].state = SlotState::Idle;
        }
        debug!(slot, "playback finished");
    }));
}

fn stop_all_locked(state: &mut EngineState) {
    for slot in &state.slots {
        slot.stop.store(true, Ordering::SeqCst);
    }
}
