//! sqs-poller: worker entrypoint
//!
//! Overview
//! --------
//! Drives the time-budgeted poll loop on a fixed schedule: each tick receives
//! batches from SQS, hands them to the processor Lambda, and reconciles the
//! queue from the per-message outcomes until the budget or the queue runs
//! out.
//!
//! Responsibilities
//! ----------------
//! - Initialize logging, configuration, and the SQS/Lambda clients.
//! - Run one poll per tick with graceful shutdown on ctrl-c.
//!
//! Error Model
//! -----------
//! - Initialization failures are fatal.
//! - Everything inside a poll is logged and recovered there; a poll never
//!   returns an error.

use std::time::Duration;

use aws_config::BehaviorVersion;
use tokio::signal;
use tracing::info;
use tracing_error::ErrorLayer;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sqs_poller::config::load_config;
use sqs_poller::dispatch::Dispatcher;
use sqs_poller::poll::Poller;
use sqs_poller::processor::LambdaProcessor;
use sqs_poller::sqs::SqsQueue;
use sqs_poller::util::time::SystemClock;

pub fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().compact())
        .with(ErrorLayer::default())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    info!("poller starting");

    let config = load_config().expect("failed to load config");

    let aws_cfg = aws_config::defaults(BehaviorVersion::latest()).load().await;
    let sqs = aws_sdk_sqs::Client::new(&aws_cfg);
    let lambda = aws_sdk_lambda::Client::new(&aws_cfg);

    let queue = SqsQueue::new(sqs, &config.queue_url);
    let processor = LambdaProcessor::new(lambda, &config.processor_function_name);
    let dispatcher = Dispatcher::new(queue.clone(), processor, SystemClock)
        .with_retry_delays(config.retry_delay_secs, config.error_retry_delay_secs);
    let mut poller = Poller::with_dispatcher(queue, dispatcher, SystemClock);

    tokio::select! {
        _ = run_loop(&mut poller, &config) => {},
        _ = signal::ctrl_c() => {
            info!("shutdown requested");
        }
    }

    Ok(())
}

async fn run_loop(
    poller: &mut Poller<SqsQueue, LambdaProcessor, SystemClock>,
    cfg: &sqs_poller::config::Config,
) {
    let mut ticker = tokio::time::interval(Duration::from_secs(cfg.poll_interval_secs));
    loop {
        ticker.tick().await;
        poller.poll(cfg.poll_budget_ms).await;
    }
}
