//! Timed replay of a captured timeline.

use crate::events::Event;
use crate::inject::{self, Injector};
use crate::slot::RepeatPolicy;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

/// Pause after re-centering the pointer on the anchor, giving the
/// environment time to register the move before the timed pass begins. The
/// pass clock starts after this settle so the first inter-event gap keeps
/// its recorded length.
const SETTLE: Duration = Duration::from_millis(50);

/// Replay `events` through `injector`, repeating per `policy` until the stop
/// flag is observed.
///
/// Each pass re-centers the pointer on the anchor, then schedules every
/// event at `pass_start + offset`. The remaining wait is recomputed against
/// a monotonic clock at every event, so sleep imprecision never accumulates
/// across a pass. The stop flag is read before each event and between
/// passes; once set, the rest of the pass is abandoned and no new pass
/// starts.
pub(crate) fn run(
    events: &[Event],
    anchor: (i32, i32),
    policy: RepeatPolicy,
    stop: &AtomicBool,
    injector: &dyn Injector,
) {
    if events.is_empty() {
        return;
    }
    let mut pass = 0u32;
    'passes: loop {
        if let RepeatPolicy::Count(n) = policy {
            if pass >= n {
                break;
            }
        }
        if stop.load(Ordering::SeqCst) {
            break;
        }
        if let Err(e) = injector.pointer_move(anchor.0, anchor.1) {
            debug!("anchor move failed: {}", e);
        }
        thread::sleep(SETTLE);
        let start = Instant::now();
        for event in events {
            if stop.load(Ordering::SeqCst) {
                break 'passes;
            }
            let due = Duration::from_millis(event.t);
            let elapsed = start.elapsed();
            if due > elapsed {
                thread::sleep(due - elapsed);
            }
            inject::apply(injector, event);
        }
        pass += 1;
    }
}
