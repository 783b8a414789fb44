// crates/orrery-core/src/clock.rs

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

/// Longest single sleep taken between cycles, so a shutdown request is seen
/// promptly without polling in a tight loop.
pub const SLEEP_SLICE: Duration = Duration::from_millis(250);

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
    fn sleep(&mut self, d: Duration);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn sleep(&mut self, d: Duration) {
        std::thread::sleep(d);
    }
}

/// Cooperative shutdown flag, honored at cycle boundaries only.
#[derive(Clone, Debug, Default)]
pub struct ShutdownSignal {
    requested: Arc<AtomicBool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

/// Sleep `total` in slices of at most [`SLEEP_SLICE`], returning early once
/// shutdown is requested. Returns true if the full interval elapsed.
pub fn sleep_until_next_cycle<C: Clock>(
    clock: &mut C,
    total: Duration,
    shutdown: &ShutdownSignal,
) -> bool {
    let mut remaining = total;
    while !remaining.is_zero() {
        if shutdown.is_requested() {
            return false;
        }
        let slice = remaining.min(SLEEP_SLICE);
        clock.sleep(slice);
        remaining -= slice;
    }
    !shutdown.is_requested()
}
