//! Error types for sqs-poller
//!
//! Overview
//! --------
//! Canonical error enumeration used across the queue, processor, and dispatch
//! layers. Keep variants stable and descriptive; prefer mapping external
//! libraries into these variants at module boundaries.
//!
//! Usage
//! -----
//! - Convert low-level errors at the edge (e.g., SQS/Lambda SDK errors).
//! - Avoid leaking third-party error types across crate boundaries.
//! - An `Invocation` fault means the processor call itself failed; it is
//!   distinct from a per-message `Error` disposition, which is data, not an
//!   error (see `types::Disposition`).
//!
//! Concurrency / Logging
//! ---------------------
//! Errors are `Send + Sync` and implement Display via `thiserror`.
//! Use `tracing` for context at call sites (`error!(...);`).
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PollerError {
    /// Caller misuse (e.g. empty batch submitted to dispatch). Not retried.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("configuration error: {0}")]
    Config(String),

    /// Receive/delete/visibility failures from the queue transport.
    #[error("queue operation failed: {0}")]
    Queue(String),

    /// The processor invocation itself failed (transport error or explicit
    /// function-level error marker), as opposed to a per-message outcome.
    #[error("processor invocation fault: {0}")]
    Invocation(String),

    /// Failed to parse the processor's response payload.
    #[error("processor response decode error: {0}")]
    Decode(String),

    #[error("unknown error: {0}")]
    Unknown(#[from] Box<dyn std::error::Error + Send + Sync>),
}
