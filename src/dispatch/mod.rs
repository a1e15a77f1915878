//! Dispatcher: processor invocation, timing, and queue reconciliation.
//!
//! Overview
//! --------
//! Sends a batch to the remote processor, measures the call with the injected
//! clock, records the timing sample, then reconciles the queue from the
//! per-message dispositions: successes are deleted, retries and errors are
//! re-driven with a delivery delay. Also answers capacity queries against a
//! cutoff instant on behalf of the poll loop.
//!
//! Error Model
//! -----------
//! - Empty batch is caller misuse (`InvalidArgument`); no remote call is made.
//! - An invocation-level processor fault is logged and absorbed: no sample is
//!   recorded and no queue state is touched, so the whole batch reappears
//!   after its visibility timeout and one bad batch never aborts the poll.
//! - Queue reconciliation failures propagate to the poller.

use std::collections::HashMap;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::errors::PollerError;
use crate::processor::MessageProcessor;
use crate::queue::MessageQueue;
use crate::stats::ProcessingStats;
use crate::types::{Disposition, Message, MessageResult, RetryRequest};
use crate::util::time::Clock;

/// Default delivery delay for `Retry` dispositions without an explicit delay.
pub const DEFAULT_RETRY_DELAY_IN_SECONDS: u32 = 10;

/// Default delivery delay for `Error` dispositions. Shorter than the retry
/// default: an unexpected fault is often transient and worth re-attempting
/// quickly, under the queue's own redrive-policy ceiling.
pub const DEFAULT_ERROR_RETRY_DELAY_IN_SECONDS: u32 = 2;

pub struct Dispatcher<Q, P, C> {
    queue: Q,
    processor: P,
    clock: C,
    stats: ProcessingStats,
    retry_delay_secs: u32,
    error_retry_delay_secs: u32,
}

impl<Q, P, C> Dispatcher<Q, P, C>
where
    Q: MessageQueue<Error = PollerError> + Send + Sync,
    P: MessageProcessor<Error = PollerError> + Send + Sync,
    C: Clock,
{
    pub fn new(queue: Q, processor: P, clock: C) -> Self {
        Self {
            queue,
            processor,
            clock,
            stats: ProcessingStats::new(),
            retry_delay_secs: DEFAULT_RETRY_DELAY_IN_SECONDS,
            error_retry_delay_secs: DEFAULT_ERROR_RETRY_DELAY_IN_SECONDS,
        }
    }

    /// Override the default retry delays (independently configurable).
    pub fn with_retry_delays(mut self, retry_delay_secs: u32, error_retry_delay_secs: u32) -> Self {
        self.retry_delay_secs = retry_delay_secs;
        self.error_retry_delay_secs = error_retry_delay_secs;
        self
    }

    /// Process one batch and reconcile the queue from its outcomes.
    pub async fn dispatch(&mut self, batch: &[Message]) -> Result<(), PollerError> {
        if batch.is_empty() {
            return Err(PollerError::InvalidArgument(
                "batch cannot be empty".into(),
            ));
        }

        let start = self.clock.now();
        let results = match self.processor.invoke(batch).await {
            Ok(results) => {
                let elapsed = self.clock.now().duration_since(start);
                self.stats.record(elapsed, batch.len());
                results
            }
            Err(e) => {
                // Leave the batch untouched; visibility timeout re-drives it.
                warn!(error = %e, count = batch.len(), "processor invocation failed, leaving batch on queue");
                return Ok(());
            }
        };

        let by_id: HashMap<&str, &Message> = batch
            .iter()
            .map(|m| (m.message_id.as_str(), m))
            .collect();

        let mut to_delete: Vec<Message> = Vec::new();
        let mut to_retry: Vec<RetryRequest> = Vec::new();
        let mut to_retry_errored: Vec<RetryRequest> = Vec::new();

        for result in &results {
            let Some(&message) = by_id.get(result.message_id.as_str()) else {
                debug!(message_id = %result.message_id, "dropping outcome for unknown message id");
                continue;
            };
            match result.disposition {
                Disposition::Success => to_delete.push(message.clone()),
                Disposition::Retry { delay_secs } => to_retry.push(RetryRequest {
                    message: message.clone(),
                    delay_secs: delay_secs.unwrap_or(self.retry_delay_secs),
                }),
                Disposition::Error { delay_secs } => to_retry_errored.push(RetryRequest {
                    message: message.clone(),
                    delay_secs: delay_secs.unwrap_or(self.error_retry_delay_secs),
                }),
            }
        }

        self.delete_messages(&to_delete).await?;
        self.retry_messages(&to_retry).await?;
        self.log_errored(&results);
        self.retry_messages(&to_retry_errored).await?;

        Ok(())
    }

    async fn delete_messages(&self, messages: &[Message]) -> Result<(), PollerError> {
        if messages.is_empty() {
            return Ok(());
        }
        info!(count = messages.len(), "deleting successful messages from the queue");
        self.queue.delete(messages).await
    }

    async fn retry_messages(&self, requests: &[RetryRequest]) -> Result<(), PollerError> {
        if requests.is_empty() {
            return Ok(());
        }
        info!(count = requests.len(), "re-driving messages with a delivery delay");
        self.queue.retry(requests).await
    }

    fn log_errored(&self, results: &[MessageResult]) {
        let errored: Vec<&str> = results
            .iter()
            .filter(|r| matches!(r.disposition, Disposition::Error { .. }))
            .map(|r| r.message_id.as_str())
            .collect();
        if !errored.is_empty() {
            info!(count = errored.len(), message_ids = ?errored, "messages encountered errors during processing");
        }
    }

    /// Clear timing samples; called once at the start of each poll cycle.
    pub fn reset(&mut self) {
        self.stats.reset();
    }

    /// Estimated number of messages processable before `cutoff`, or
    /// `usize::MAX` when no timing data exists yet so the first cycle always
    /// attempts a full-size receive.
    pub fn estimated_capacity(&self, cutoff: Instant) -> usize {
        if !self.stats.has_samples() {
            info!("no processing stats yet, returning unbounded capacity");
            return usize::MAX;
        }
        let remaining = cutoff.saturating_duration_since(self.clock.now());
        self.stats.estimated_capacity(remaining)
    }
}
