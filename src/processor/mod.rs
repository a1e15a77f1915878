//! Remote processor boundary (trait + Lambda implementation).
//!
//! Overview
//! --------
//! The processor is a stateless remote function that takes a batch of
//! messages and returns one disposition per message, correlated by
//! `messageId`. This module owns the JSON wire contract and maps everything
//! the SDK can surface into `PollerError` variants at the boundary:
//! a transport failure or an explicit function-error marker on the reply is
//! an invocation fault, distinct from per-message `ERROR` dispositions.
//!
//! Wire contract
//! -------------
//! Request:  `{"messages":[{"messageId","receiptHandle","body"}, ...]}`
//! Response: `{"messageResults":[{"messageId","status":"SUCCESS|RETRY|ERROR",
//!            "retryDelayInSeconds"?}, ...]}`

use aws_sdk_lambda::primitives::Blob;
use aws_sdk_lambda::types::InvocationType;
use aws_sdk_lambda::Client as LambdaClient;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::PollerError;
use crate::types::{Disposition, Message, MessageResult};

#[async_trait::async_trait]
pub trait MessageProcessor {
    type Error;

    /// Process one non-empty batch. Returns per-message outcomes; an `Err` is
    /// an invocation-level fault and means no outcome exists for any message.
    async fn invoke(&self, batch: &[Message]) -> Result<Vec<MessageResult>, Self::Error>;
}

#[derive(Serialize)]
struct ProcessorRequest<'a> {
    messages: &'a [Message],
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProcessorResponse {
    message_results: Vec<WireResult>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireResult {
    message_id: String,
    status: WireStatus,
    #[serde(default)]
    retry_delay_in_seconds: Option<u32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum WireStatus {
    Success,
    Retry,
    Error,
}

impl From<WireResult> for MessageResult {
    fn from(w: WireResult) -> Self {
        let disposition = match w.status {
            WireStatus::Success => Disposition::Success,
            WireStatus::Retry => Disposition::Retry {
                delay_secs: w.retry_delay_in_seconds,
            },
            WireStatus::Error => Disposition::Error {
                delay_secs: w.retry_delay_in_seconds,
            },
        };
        MessageResult {
            message_id: w.message_id,
            disposition,
        }
    }
}

/// Parse a processor response payload into per-message results.
pub fn parse_processor_response(payload: &[u8]) -> Result<Vec<MessageResult>, PollerError> {
    let response: ProcessorResponse =
        serde_json::from_slice(payload).map_err(|e| PollerError::Decode(e.to_string()))?;
    Ok(response
        .message_results
        .into_iter()
        .map(MessageResult::from)
        .collect())
}

/// Serialize the request payload sent to the processor function.
pub fn build_processor_request(batch: &[Message]) -> Result<Vec<u8>, PollerError> {
    serde_json::to_vec(&ProcessorRequest { messages: batch })
        .map_err(|e| PollerError::Decode(e.to_string()))
}

/// Synchronous-invoke proxy for the processor Lambda function.
#[derive(Clone)]
pub struct LambdaProcessor {
    client: LambdaClient,
    function_name: String,
}

impl LambdaProcessor {
    pub fn new(client: LambdaClient, function_name: &str) -> Self {
        Self {
            client,
            function_name: function_name.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl MessageProcessor for LambdaProcessor {
    type Error = PollerError;

    async fn invoke(&self, batch: &[Message]) -> Result<Vec<MessageResult>, Self::Error> {
        info!(
            function = %self.function_name,
            count = batch.len(),
            "invoking message processor"
        );
        let payload = build_processor_request(batch)?;

        let result = self
            .client
            .invoke()
            .function_name(&self.function_name)
            .invocation_type(InvocationType::RequestResponse)
            .payload(Blob::new(payload))
            .send()
            .await
            .map_err(|e| PollerError::Invocation(e.to_string()))?;

        if let Some(function_error) = result.function_error() {
            let detail = result
                .payload()
                .map(|b| String::from_utf8_lossy(b.as_ref()).into_owned())
                .unwrap_or_default();
            return Err(PollerError::Invocation(format!(
                "function error {function_error}: {detail}"
            )));
        }

        let payload = result
            .payload()
            .ok_or_else(|| PollerError::Invocation("empty response payload".into()))?;
        parse_processor_response(payload.as_ref())
    }
}
