//! Wall-clock seam used for daily cycle detection and resource regeneration.

use std::cell::Cell;
use std::time::{SystemTime, UNIX_EPOCH};

pub trait Clock {
    fn now_unix_ms(&self) -> u64;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix_ms(&self) -> u64 {
        SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |elapsed| elapsed.as_millis() as u64)
    }
}

/// Manually driven clock for tests and offline simulation.
#[derive(Debug, Default)]
pub struct FixedClock {
    now: Cell<u64>,
}

impl FixedClock {
    pub fn new(now_unix_ms: u64) -> Self {
        Self { now: Cell::new(now_unix_ms) }
    }

    pub fn set(&self, now_unix_ms: u64) {
        self.now.set(now_unix_ms);
    }

    pub fn advance(&self, delta_ms: u64) {
        self.now.set(self.now.get().saturating_add(delta_ms));
    }
}

impl Clock for FixedClock {
    fn now_unix_ms(&self) -> u64 {
        self.now.get()
    }
}

impl<K: Clock + ?Sized> Clock for &K {
    fn now_unix_ms(&self) -> u64 {
        (**self).now_unix_ms()
    }
}
