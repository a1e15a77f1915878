//! SQS integration (aws-sdk-sqs implementation of `MessageQueue`).

use aws_sdk_sqs::types::{
    ChangeMessageVisibilityBatchRequestEntry, DeleteMessageBatchRequestEntry,
};
use aws_sdk_sqs::Client as SqsClient;
use tracing::warn;

use crate::errors::PollerError;
use crate::queue::MessageQueue;
use crate::types::{Message, RetryRequest};

/// SQS caps a single receive/delete/visibility batch at 10 entries.
pub const MAX_BATCH_SIZE: usize = 10;

const WAIT_TIME_SECONDS: i32 = 10;

#[derive(Clone)]
pub struct SqsQueue {
    client: SqsClient,
    queue_url: String,
}

impl SqsQueue {
    pub fn new(client: SqsClient, queue_url: &str) -> Self {
        Self {
            client,
            queue_url: queue_url.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl MessageQueue for SqsQueue {
    type Error = PollerError;

    async fn receive(&self, max_messages: usize) -> Result<Vec<Message>, Self::Error> {
        let count = max_messages.min(MAX_BATCH_SIZE) as i32;
        let output = self
            .client
            .receive_message()
            .queue_url(&self.queue_url)
            .wait_time_seconds(WAIT_TIME_SECONDS)
            .max_number_of_messages(count)
            .send()
            .await
            .map_err(|e| PollerError::Queue(e.to_string()))?;

        let mut out = Vec::new();
        for m in output.messages() {
            let (Some(message_id), Some(receipt_handle)) = (m.message_id(), m.receipt_handle())
            else {
                warn!("skipping received message without id or receipt handle");
                continue;
            };
            out.push(Message {
                message_id: message_id.to_string(),
                receipt_handle: receipt_handle.to_string(),
                body: m.body().unwrap_or_default().to_string(),
            });
        }
        Ok(out)
    }

    async fn delete(&self, messages: &[Message]) -> Result<(), Self::Error> {
        if messages.is_empty() {
            return Ok(());
        }
        let mut req = self.client.delete_message_batch().queue_url(&self.queue_url);
        for message in messages {
            let entry = DeleteMessageBatchRequestEntry::builder()
                .id(&message.message_id)
                .receipt_handle(&message.receipt_handle)
                .build()
                .map_err(|e| PollerError::Queue(e.to_string()))?;
            req = req.entries(entry);
        }
        let output = req
            .send()
            .await
            .map_err(|e| PollerError::Queue(e.to_string()))?;

        // Deletes are idempotent from the poller's point of view: an entry
        // that already expired or was deleted is logged, never fatal.
        for failed in output.failed() {
            warn!(
                id = failed.id(),
                code = failed.code(),
                message = failed.message().unwrap_or_default(),
                "delete entry failed"
            );
        }
        Ok(())
    }

    async fn retry(&self, requests: &[RetryRequest]) -> Result<(), Self::Error> {
        if requests.is_empty() {
            return Ok(());
        }
        let mut req = self
            .client
            .change_message_visibility_batch()
            .queue_url(&self.queue_url);
        for retry in requests {
            let entry = ChangeMessageVisibilityBatchRequestEntry::builder()
                .id(&retry.message.message_id)
                .receipt_handle(&retry.message.receipt_handle)
                .visibility_timeout(retry.delay_secs as i32)
                .build()
                .map_err(|e| PollerError::Queue(e.to_string()))?;
            req = req.entries(entry);
        }
        let output = req
            .send()
            .await
            .map_err(|e| PollerError::Queue(e.to_string()))?;

        for failed in output.failed() {
            warn!(
                id = failed.id(),
                code = failed.code(),
                message = failed.message().unwrap_or_default(),
                "visibility change entry failed"
            );
        }
        Ok(())
    }
}
