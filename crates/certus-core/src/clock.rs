use std::sync::atomic::{AtomicU64, Ordering};

use crate::types::Height;

/// Source of the host ledger's monotonically increasing height counter.
///
/// The registry only ever reads the height; advancing it is the host's job.
pub trait ClockSource: Send + Sync {
    /// Current height of the host chain.
    fn height(&self) -> Height;
}

/// Manually driven clock for tests and single-process deployments, where the
/// caller plays the role of the host chain.
pub struct ManualClock {
    height: AtomicU64,
}

impl ManualClock {
    /// Create a clock starting at the given height.
    pub fn new(start: Height) -> Self {
        Self {
            height: AtomicU64::new(start),
        }
    }

    /// Advance the clock by a number of heights.
    pub fn advance(&self, heights: u64) {
        self.height.fetch_add(heights, Ordering::SeqCst);
    }

    /// Jump the clock to an absolute height.
    pub fn set(&self, height: Height) {
        self.height.store(height, Ordering::SeqCst);
    }
}

impl ClockSource for ManualClock {
    fn height(&self) -> Height {
        self.height.load(Ordering::SeqCst)
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(0)
    }
}
