use std::time::{Duration, SystemTime};
use libc::{clock_gettime, timespec, CLOCK_MONOTONIC};

/// Converts kernel monotonic timestamps into wall clock time.
#[derive(Copy, Clone, Debug)]
pub struct Clock {
    boot: SystemTime,
}

impl Clock {
    pub fn new() -> Self {
        let mono = Duration::from_nanos(monotonic());
        let boot = SystemTime::now().checked_sub(mono).unwrap_or(SystemTime::UNIX_EPOCH);
        Self { boot }
    }

    pub fn wall(&self, ns: u64) -> SystemTime {
        self.boot + Duration::from_nanos(ns)
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

pub fn monotonic() -> u64 {
    let mut ts = timespec { tv_sec: 0, tv_nsec: 0 };
    unsafe {
        clock_gettime(CLOCK_MONOTONIC, &mut ts);
    }
    ts.tv_sec as u64 * 1_000_000_000 + ts.tv_nsec as u64
}
