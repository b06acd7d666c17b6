use std::time::Instant;

use lazy_static::lazy_static;

lazy_static! {
    static ref PROCESS_EPOCH: Instant = Instant::now();
}

/// Source of monotonic nanosecond timestamps.
///
/// Timestamps are only compared with each other, never with wall clock time.
pub trait Clock: Send + Sync + 'static {
    fn now_nanos(&self) -> u64;
}

/// Monotonic clock anchored at the first use within the process.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_nanos(&self) -> u64 {
        nano_realtime()
    }
}

/// return nanoseconds since the process clock epoch
pub(crate) fn nano_realtime() -> u64 {
    // u64 nanoseconds cover ~584 years of uptime
    PROCESS_EPOCH.elapsed().as_nanos() as u64
}
