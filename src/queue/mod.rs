//! Queue abstraction
//!
//! Overview
//! --------
//! Minimal trait representing the message queue the poller drains. Concrete
//! implementations include SQS (`crate::sqs`). The queue's visibility-timeout
//! mechanism is the only concurrency control relied upon against other
//! consumers.

use crate::types::{Message, RetryRequest};

#[async_trait::async_trait]
pub trait MessageQueue {
    type Error;

    /// Receive up to `max_messages` messages (further clamped by the
    /// transport's own batch limit). May long-poll for a bounded wait; never
    /// blocks indefinitely.
    async fn receive(&self, max_messages: usize) -> Result<Vec<Message>, Self::Error>;

    /// Delete successfully processed messages. Idempotent per entry: an
    /// already-deleted or expired message must not fail the batch.
    async fn delete(&self, messages: &[Message]) -> Result<(), Self::Error>;

    /// Delay each message's next delivery by its resolved retry delay.
    async fn retry(&self, requests: &[RetryRequest]) -> Result<(), Self::Error>;
}
