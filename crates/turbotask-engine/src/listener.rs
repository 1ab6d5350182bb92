//! Global input listener thread.

use crate::error::{EngineError, Result};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use std::thread;
use tracing::{error, warn};

/// Raw events buffered between the OS callback and the dispatcher. Capture
/// never blocks the callback path; on overflow the event is dropped.
const RAW_CHANNEL_CAPACITY: usize = 4096;

/// Spawn the process-wide input listener.
///
/// The OS grants one global listener per process, so hotkey resolution and
/// recording capture consume this single stream; the dispatcher routes each
/// event to exactly one of them. The listen loop has no teardown, so the
/// thread runs for the life of the process and the handle is detached.
pub fn start_system_listener() -> Result<Receiver<rdev::EventType>> {
    let (tx, rx) = bounded(RAW_CHANNEL_CAPACITY);
    thread::Builder::new()
        .name("input-listener".into())
        .spawn(move || {
            if let Err(e) = rdev::listen(move |event| forward(&tx, event.event_type)) {
                error!("input listener failed: {:?}", e);
            }
        })
        .map_err(|e| EngineError::Capture(format!("{}", e)))?;
    Ok(rx)
}

fn forward(tx: &Sender<rdev::EventType>, raw: rdev::EventType) {
    match tx.try_send(raw) {
        Ok(()) => {}
        Err(TrySendError::Full(_)) => warn!("input queue full, dropping event"),
        Err(TrySendError::Disconnected(_)) => {}
    }
}
