//! Time sources for history timestamps.

use std::time::{SystemTime, UNIX_EPOCH};

/// Source of transfer timestamps.
pub trait Clock: Send + Sync {
    fn now(&mut self) -> u64;
}

/// Logical time: every reading is one tick past the previous one, so
/// timestamp order matches operation order.
#[derive(Debug, Clone, Default)]
pub struct LogicalClock {
    tick: u64,
}

impl LogicalClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for LogicalClock {
    fn now(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }
}

/// Wall-clock seconds since the Unix epoch. Never goes backwards relative to
/// its own previous reading.
#[derive(Debug, Clone, Default)]
pub struct SystemClock {
    last: u64,
}

impl Clock for SystemClock {
    fn now(&mut self) -> u64 {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        self.last = self.last.max(secs);
        self.last
    }
}
