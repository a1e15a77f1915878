//! Message processing timing statistics.
//!
//! Overview
//! --------
//! Collects per-message processing-time samples from completed dispatch calls
//! and converts a remaining time budget into an estimated message capacity.
//! Samples live for one poll cycle; the poller resets them at the start of
//! each invocation.
//!
//! Concurrency
//! -----------
//! Single owner (the dispatcher) mutates this on one sequential call path, so
//! no locking. Overlapping poll invocations each get their own instance.

use std::time::Duration;
use tracing::info;

#[derive(Debug, Default)]
pub struct ProcessingStats {
    /// Per-message average values in milliseconds, one entry per message so
    /// larger batches weight the running mean proportionally.
    samples: Vec<u64>,
}

impl ProcessingStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one processor call that handled `num_messages` in `duration`.
    /// Every message in the batch is assumed to take an equal share of the
    /// call's wall-clock time.
    pub fn record(&mut self, duration: Duration, num_messages: usize) {
        assert!(num_messages > 0, "num_messages must be > 0");
        let total_ms = duration.as_millis() as u64;
        let per_message_average = total_ms / num_messages as u64;
        info!(
            num_messages,
            total_ms, per_message_average, "recorded processing sample"
        );
        self.samples
            .extend(std::iter::repeat(per_message_average).take(num_messages));
    }

    pub fn has_samples(&self) -> bool {
        !self.samples.is_empty()
    }

    /// Estimated number of messages that can be processed within `remaining`,
    /// based on the mean of recorded samples.
    ///
    /// Panics if no samples have been recorded; callers must check
    /// `has_samples` first (the dispatcher substitutes an unbounded sentinel).
    pub fn estimated_capacity(&self, remaining: Duration) -> usize {
        assert!(
            self.has_samples(),
            "cannot estimate capacity without timing samples"
        );
        let mean = self.samples.iter().sum::<u64>() as f64 / self.samples.len() as f64;
        let capacity = (remaining.as_millis() as f64 / mean) as usize;
        info!(
            capacity,
            remaining_ms = remaining.as_millis() as u64,
            samples = self.samples.len(),
            "estimated capacity"
        );
        capacity
    }

    pub fn reset(&mut self) {
        self.samples.clear();
    }
}
