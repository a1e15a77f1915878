//! Poll loop: drains the queue under a caller-imposed time budget.
//!
//! Overview
//! --------
//! Each poll computes an absolute cutoff from the remaining time budget minus
//! a fixed safety buffer, resets the dispatcher's statistics, then repeats
//! capacity-estimate → receive → dispatch until the queue is idle or the
//! estimate reaches zero. The loop never sleeps between iterations; each
//! iteration's cost is bounded by one receive plus one processor round trip.
//!
//! Cancellation is cooperative: the deadline is checked at the top of each
//! iteration only, so one in-flight call may overrun the nominal cutoff. The
//! safety buffer exists to leave headroom for that overrun before the host's
//! hard timeout.

use std::time::Duration;

use tracing::{error, info};

use crate::dispatch::Dispatcher;
use crate::errors::PollerError;
use crate::processor::MessageProcessor;
use crate::queue::MessageQueue;
use crate::util::time::Clock;

/// Headroom reserved so the host's own hard timeout never fires mid-operation.
pub const TIMEOUT_BUFFER: Duration = Duration::from_millis(5000);

pub struct Poller<Q, P, C> {
    queue: Q,
    dispatcher: Dispatcher<Q, P, C>,
    clock: C,
}

impl<Q, P, C> Poller<Q, P, C>
where
    Q: MessageQueue<Error = PollerError> + Clone + Send + Sync,
    P: MessageProcessor<Error = PollerError> + Send + Sync,
    C: Clock + Clone,
{
    pub fn new(queue: Q, processor: P, clock: C) -> Self {
        let dispatcher = Dispatcher::new(queue.clone(), processor, clock.clone());
        Self {
            queue,
            dispatcher,
            clock,
        }
    }

    pub fn with_dispatcher(queue: Q, dispatcher: Dispatcher<Q, P, C>, clock: C) -> Self {
        Self {
            queue,
            dispatcher,
            clock,
        }
    }

    /// Drive receive → dispatch cycles until the queue is idle or the time
    /// budget (minus the safety buffer) is exhausted. Errors below this level
    /// are logged and end the current poll; the next scheduled poll starts
    /// fresh.
    pub async fn poll(&mut self, remaining_time_ms: u64) {
        let budget = Duration::from_millis(remaining_time_ms).saturating_sub(TIMEOUT_BUFFER);
        let cutoff = self.clock.now() + budget;
        self.dispatcher.reset();

        loop {
            let capacity = self.dispatcher.estimated_capacity(cutoff);
            if capacity == 0 {
                info!("time budget exhausted, ending poll");
                return;
            }

            let to_process = match self.queue.receive(capacity).await {
                Ok(messages) => messages,
                Err(e) => {
                    error!(error = %e, "receive failed, ending poll");
                    return;
                }
            };

            if to_process.is_empty() {
                info!("no messages received from queue, returning until next polling cycle");
                return;
            }

            if let Err(e) = self.dispatcher.dispatch(&to_process).await {
                error!(error = %e, "dispatch failed, ending poll");
                return;
            }
        }
    }
}
