use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::thread;
use std::time::Duration;
use log::{debug, warn};

/// Counts events forwarded from the ring buffer and logs one summary per
/// window instead of one line per event.
#[derive(Clone)]
pub struct Stats {
    inner: Arc<Counters>,
}

#[derive(Debug, Default)]
struct Counters {
    timeout:   Duration,
    active:    AtomicBool,
    forwarded: AtomicU32,
    map_full:  AtomicU32,
}

#[derive(Debug, Eq, PartialEq)]
pub struct Summary {
    pub forwarded: u32,
    pub map_full:  u32,
}

impl Stats {
    pub fn new(timeout: Duration) -> Self {
        Self {
            inner: Arc::new(Counters {
                timeout: timeout,
                ..Default::default()
            }),
        }
    }

    pub fn record(&self, map_full: bool) {
        let counters = &self.inner;

        counters.forwarded.fetch_add(1, Ordering::Relaxed);
        if map_full {
            counters.map_full.fetch_add(1, Ordering::Relaxed);
        }

        if counters.active.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_ok() {
            let stats = self.clone();
            let spawn = thread::Builder::new().name("ringbuf-stats".into()).spawn(move || {
                thread::sleep(stats.inner.timeout);
                stats.report();
            });

            if let Err(e) = spawn {
                warn!("failed to start ring buffer stats timer: {}", e);
                counters.active.store(false, Ordering::Release);
            }
        }
    }

    /// Emits and resets the current window, reopening the gate.
    pub fn report(&self) -> Summary {
        let counters = &self.inner;

        let summary = Summary {
            forwarded: counters.forwarded.swap(0, Ordering::AcqRel),
            map_full:  counters.map_full.swap(0, Ordering::AcqRel),
        };

        match summary.map_full {
            0 => debug!("received {} flows via ring buffer", summary.forwarded),
            n => debug!("received {} flows via ring buffer, {} with map full; consider raising the cache max flows",
                        summary.forwarded, n),
        }

        counters.active.store(false, Ordering::Release);

        summary
    }

    pub fn pending(&self) -> bool {
        self.inner.active.load(Ordering::Acquire)
    }
}
