//! Poll-loop tests: deadline handling, receive sizing, and termination.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use sqs_poller::errors::PollerError;
use sqs_poller::poll::Poller;
use sqs_poller::processor::MessageProcessor;
use sqs_poller::queue::MessageQueue;
use sqs_poller::types::{Disposition, Message, MessageResult, RetryRequest};
use sqs_poller::util::time::Clock;

/// ---- Fakes -----

#[derive(Clone)]
struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl ManualClock {
    fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }
    fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap()
    }
}

#[derive(Clone, Default)]
struct FakeQueue {
    receives: Arc<Mutex<VecDeque<Vec<Message>>>>,
    requested: Arc<Mutex<Vec<usize>>>,
    deletes: Arc<Mutex<Vec<Vec<Message>>>>,
    retries: Arc<Mutex<Vec<Vec<RetryRequest>>>>,
}

impl FakeQueue {
    fn script_receive(&self, messages: Vec<Message>) {
        self.receives.lock().unwrap().push_back(messages);
    }
}

#[async_trait]
impl MessageQueue for FakeQueue {
    type Error = PollerError;

    async fn receive(&self, max_messages: usize) -> Result<Vec<Message>, Self::Error> {
        self.requested.lock().unwrap().push(max_messages);
        Ok(self
            .receives
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected receive"))
    }

    async fn delete(&self, messages: &[Message]) -> Result<(), Self::Error> {
        self.deletes.lock().unwrap().push(messages.to_vec());
        Ok(())
    }

    async fn retry(&self, requests: &[RetryRequest]) -> Result<(), Self::Error> {
        self.retries.lock().unwrap().push(requests.to_vec());
        Ok(())
    }
}

/// Succeeds every message; advances the shared clock by a fixed amount per
/// invocation to simulate processing time.
#[derive(Clone)]
struct EchoProcessor {
    clock: ManualClock,
    takes: Duration,
    invoked_sizes: Arc<Mutex<Vec<usize>>>,
}

#[async_trait]
impl MessageProcessor for EchoProcessor {
    type Error = PollerError;

    async fn invoke(&self, batch: &[Message]) -> Result<Vec<MessageResult>, Self::Error> {
        self.invoked_sizes.lock().unwrap().push(batch.len());
        self.clock.advance(self.takes);
        Ok(batch
            .iter()
            .map(|m| MessageResult {
                message_id: m.message_id.clone(),
                disposition: Disposition::Success,
            })
            .collect())
    }
}

fn batch(prefix: &str, n: usize) -> Vec<Message> {
    (0..n)
        .map(|i| Message {
            message_id: format!("{prefix}-{i}"),
            receipt_handle: format!("rh-{prefix}-{i}"),
            body: String::new(),
        })
        .collect()
}

fn fixture(takes: Duration) -> (FakeQueue, EchoProcessor, ManualClock) {
    let clock = ManualClock::new();
    let queue = FakeQueue::default();
    let processor = EchoProcessor {
        clock: clock.clone(),
        takes,
        invoked_sizes: Default::default(),
    };
    (queue, processor, clock)
}

/// ---- Tests ----

#[tokio::test]
async fn capacity_shrinks_until_budget_runs_out() {
    // 6000ms budget minus the 5000ms safety buffer leaves a 1000ms window;
    // each processor call burns 900ms.
    let (queue, processor, clock) = fixture(Duration::from_millis(900));
    queue.script_receive(batch("first", 10));
    queue.script_receive(batch("second", 1));

    let mut poller = Poller::new(queue.clone(), processor.clone(), clock);
    poller.poll(6000).await;

    // First cycle has no samples, so the request is unbounded (the transport
    // clamps it); the second is capacity-limited to one message; the third
    // estimate is zero and no receive happens.
    assert_eq!(*queue.requested.lock().unwrap(), vec![usize::MAX, 1]);
    assert_eq!(*processor.invoked_sizes.lock().unwrap(), vec![10, 1]);

    let deletes = queue.deletes.lock().unwrap();
    assert_eq!(deletes.len(), 2);
    assert_eq!(deletes[0].len(), 10);
    assert_eq!(deletes[1].len(), 1);
    assert!(queue.retries.lock().unwrap().is_empty());
}

#[tokio::test]
async fn idle_queue_ends_poll_after_one_receive() {
    let (queue, processor, clock) = fixture(Duration::from_millis(100));
    queue.script_receive(Vec::new());

    let mut poller = Poller::new(queue.clone(), processor.clone(), clock);
    poller.poll(60_000).await;

    assert_eq!(queue.requested.lock().unwrap().len(), 1);
    assert!(processor.invoked_sizes.lock().unwrap().is_empty());
    assert!(queue.deletes.lock().unwrap().is_empty());
}

#[tokio::test]
async fn expired_budget_stops_after_sentinel_cycle() {
    // A budget at or below the safety buffer leaves a zero-length window. The
    // first cycle still receives (unbounded sentinel, no samples yet); the
    // first recorded sample then drives the estimate to zero.
    let (queue, processor, clock) = fixture(Duration::from_millis(50));
    queue.script_receive(batch("only", 3));

    let mut poller = Poller::new(queue.clone(), processor.clone(), clock);
    poller.poll(3000).await;

    assert_eq!(queue.requested.lock().unwrap().len(), 1);
    assert_eq!(*processor.invoked_sizes.lock().unwrap(), vec![3]);
}

#[tokio::test]
async fn each_poll_starts_with_fresh_statistics() {
    let (queue, processor, clock) = fixture(Duration::from_millis(900));
    queue.script_receive(batch("a", 2));
    queue.script_receive(batch("b", 2));

    let mut poller = Poller::new(queue.clone(), processor.clone(), clock);
    poller.poll(6000).await;
    poller.poll(6000).await;

    // Both polls open with the unbounded sentinel request: the second poll's
    // reset discarded the first poll's samples.
    assert_eq!(
        *queue.requested.lock().unwrap(),
        vec![usize::MAX, usize::MAX]
    );
}
