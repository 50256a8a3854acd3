//! Throttled progress reporting for long-running operations.
//!
//! Downloads, extraction and script execution tick on every unit of work;
//! only ticks at least one interval apart reach the log. Dropped ticks are
//! gone, there is no buffering.

use std::time::{Duration, Instant};
use tracing::info;

/// Default minimum gap between two emitted progress lines
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(10);

/// Lossy progress emitter, one per operation
#[derive(Debug, Clone)]
pub struct ProgressMeter {
    interval: Duration,
    last_emit: Option<Instant>,
}

impl Default for ProgressMeter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressMeter {
    /// Creates a meter with the default 10 second interval.
    pub fn new() -> Self {
        Self::with_interval(DEFAULT_INTERVAL)
    }

    /// Creates a meter with a custom interval.
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            last_emit: None,
        }
    }

    /// Emits `msg` if the interval has elapsed since the last emission.
    ///
    /// Returns whether the message was emitted. The first tick always is.
    pub fn tick(&mut self, msg: &str) -> bool {
        self.tick_with(|| msg.to_string())
    }

    /// Like [`tick`](Self::tick), building the message only when it is emitted.
    pub fn tick_with<F>(&mut self, msg: F) -> bool
    where
        F: FnOnce() -> String,
    {
        let now = Instant::now();
        let due = self
            .last_emit
            .is_none_or(|last| now.duration_since(last) >= self.interval);
        if due {
            self.last_emit = Some(now);
            info!("{}", msg());
        }
        due
    }
}
