//! Core data model
//!
//! Overview
//! --------
//! Messages pulled from the queue, per-message processing dispositions
//! returned by the processor, and resolved retry requests handed back to the
//! queue. Serde derives here follow the camelCase wire names used on the
//! processor request payload.

use serde::{Deserialize, Serialize};

/// One unit of work from the queue. The receipt handle is the opaque
/// acknowledgment token required to delete the message or change its
/// visibility; it is only valid for the current delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub message_id: String,
    pub receipt_handle: String,
    pub body: String,
}

/// Classification of a single message's processing result.
///
/// Modeled as a tagged enum rather than a status field plus nullable delay so
/// reconciliation is exhaustiveness-checked at compile time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Fully processed; delete from the queue.
    Success,
    /// Cannot be processed right now but expected to succeed later; optional
    /// explicit delay before the next delivery.
    Retry { delay_secs: Option<u32> },
    /// Processing hit an unexpected fault; re-driven with a short backoff.
    Error { delay_secs: Option<u32> },
}

/// Outcome for one message, correlated to the batch by `message_id` rather
/// than by position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageResult {
    pub message_id: String,
    pub disposition: Disposition,
}

/// A message paired with its resolved retry delay in seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryRequest {
    pub message: Message,
    pub delay_secs: u32,
}
