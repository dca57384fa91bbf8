//! Identifier allocation.

use serde::{Deserialize, Serialize};

/// Hands out strictly increasing values starting at 1. A value is never
/// handed out twice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdAllocator {
    next: u64,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The value the next call to [`allocate`](Self::allocate) will return.
    pub fn peek(&self) -> u64 {
        self.next
    }

    pub fn allocate(&mut self) -> u64 {
        let value = self.next;
        self.next += 1;
        value
    }
}
