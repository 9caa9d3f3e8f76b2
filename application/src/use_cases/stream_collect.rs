//! Streaming collection with an early majority signal
//!
//! Calls every candidate concurrently (no retry) and reports progress as a
//! stream of [`CollectorEvent`]s. Once `ceil(N/2)` candidates have
//! succeeded, a single [`CollectorEvent::MajorityReached`] carries a snapshot
//! so the caller can move on while the stragglers finish in the background.
//!
//! ```text
//! spawn ──► coordinating task ──► FuturesUnordered<invoke>
//!                │
//!                └─ mpsc ──► CollectorHandle::next_event()
//!                             └─ finish_in_background(forward) ─► JoinHandle<Vec<T>>
//! ```
//!
//! Straggling calls are never cancelled, even when nobody is listening.

use crate::ports::worker_gateway::{InvokeRequest, WorkerGateway, WorkerReply};
use crate::use_cases::shared::invoke_with_timeout;
use council_domain::council::policy::FIRST_ATTEMPT_TIMEOUT_SECS;
use council_domain::{
    ChatMessage, FeatureFlags, JudgmentRecord, ResponseRecord, WorkerId, majority_threshold,
    parse_ranking,
};
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// A record type a stage produces from a worker reply
pub trait StageRecord: Clone + Send + 'static {
    fn from_reply(worker: &WorkerId, reply: WorkerReply) -> Self;

    /// Stand-in for a worker that never answered; `None` omits it.
    fn unanswered(worker: &WorkerId) -> Option<Self>;
}

impl StageRecord for ResponseRecord {
    fn from_reply(worker: &WorkerId, reply: WorkerReply) -> Self {
        ResponseRecord::answered(
            worker.clone(),
            reply.content,
            reply.elapsed_time,
            reply.usage,
            reply.cost,
        )
    }

    fn unanswered(worker: &WorkerId) -> Option<Self> {
        Some(ResponseRecord::no_response(worker.clone()))
    }
}

impl StageRecord for JudgmentRecord {
    fn from_reply(worker: &WorkerId, reply: WorkerReply) -> Self {
        let parsed_ranking = parse_ranking(&reply.content);
        JudgmentRecord {
            judge: worker.clone(),
            raw_text: reply.content,
            parsed_ranking,
            elapsed_time: reply.elapsed_time,
            cost: reply.cost,
        }
    }

    fn unanswered(_worker: &WorkerId) -> Option<Self> {
        None
    }
}

/// Progress of one streamed stage
#[derive(Debug, Clone)]
pub enum CollectorEvent<T> {
    /// `completed` counts settled calls, successful or not
    ModelComplete {
        worker: WorkerId,
        record: T,
        completed: usize,
        total: usize,
    },
    ModelFailed {
        worker: WorkerId,
        completed: usize,
        total: usize,
    },
    /// Emitted at most once; `completed` counts successes
    MajorityReached {
        results: Vec<T>,
        completed: usize,
        total: usize,
    },
    /// Always the last event
    StageComplete { results: Vec<T> },
}

/// Streamed fan-out over a candidate list
pub struct StreamCollector<G: WorkerGateway + 'static> {
    gateway: Arc<G>,
    timeout: Duration,
}

impl<G: WorkerGateway + 'static> StreamCollector<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            timeout: Duration::from_secs_f64(FIRST_ATTEMPT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Start calling every candidate; progress is read from the handle.
    pub fn spawn<T: StageRecord>(
        &self,
        candidates: Vec<WorkerId>,
        messages: Arc<[ChatMessage]>,
        features: FeatureFlags,
    ) -> CollectorHandle<T> {
        let (tx, rx) = mpsc::unbounded_channel();
        let gateway = Arc::clone(&self.gateway);
        let timeout = self.timeout;

        tokio::spawn(async move {
            collect_stream(gateway, candidates, messages, timeout, features, tx).await;
        });

        CollectorHandle { events: rx }
    }
}

async fn collect_stream<G: WorkerGateway + 'static, T: StageRecord>(
    gateway: Arc<G>,
    candidates: Vec<WorkerId>,
    messages: Arc<[ChatMessage]>,
    timeout: Duration,
    features: FeatureFlags,
    tx: mpsc::UnboundedSender<CollectorEvent<T>>,
) {
    let total = candidates.len();
    let threshold = majority_threshold(total);

    let mut pending: FuturesUnordered<_> = candidates
        .iter()
        .enumerate()
        .map(|(index, worker)| {
            let gateway = Arc::clone(&gateway);
            let request =
                InvokeRequest::new(worker.clone(), Arc::clone(&messages), timeout, features);
            async move { (index, invoke_with_timeout(gateway.as_ref(), request).await) }
        })
        .collect();

    let mut results: Vec<Option<T>> = vec![None; total];
    let mut settled = 0;
    let mut succeeded = 0;
    let mut majority_sent = false;

    // Send errors only mean the consumer went away; keep draining anyway.
    while let Some((index, outcome)) = pending.next().await {
        settled += 1;
        let worker = &candidates[index];

        match outcome {
            Ok(reply) => {
                debug!("Worker {} completed ({}/{})", worker, settled, total);
                let record = T::from_reply(worker, reply);
                results[index] = Some(record.clone());
                succeeded += 1;
                let _ = tx.send(CollectorEvent::ModelComplete {
                    worker: worker.clone(),
                    record,
                    completed: settled,
                    total,
                });

                if !majority_sent && threshold.is_some_and(|t| succeeded >= t) {
                    majority_sent = true;
                    let snapshot = results.iter().flatten().cloned().collect();
                    let _ = tx.send(CollectorEvent::MajorityReached {
                        results: snapshot,
                        completed: succeeded,
                        total,
                    });
                }
            }
            Err(e) => {
                warn!("Worker {} failed: {}", worker, e);
                let _ = tx.send(CollectorEvent::ModelFailed {
                    worker: worker.clone(),
                    completed: settled,
                    total,
                });
            }
        }
    }

    let results = candidates
        .iter()
        .zip(results)
        .filter_map(|(worker, record)| record.or_else(|| T::unanswered(worker)))
        .collect();
    let _ = tx.send(CollectorEvent::StageComplete { results });
}

/// Consumer side of a streamed stage
pub struct CollectorHandle<T> {
    events: mpsc::UnboundedReceiver<CollectorEvent<T>>,
}

impl<T: StageRecord> CollectorHandle<T> {
    /// Next progress event; `None` once the stream is over.
    pub async fn next_event(&mut self) -> Option<CollectorEvent<T>> {
        self.events.recv().await
    }

    /// Keep draining in a background task, passing every event to `forward`.
    ///
    /// The task resolves to the final results, or `None` if the stream ended
    /// without a [`CollectorEvent::StageComplete`].
    pub fn finish_in_background<F>(mut self, mut forward: F) -> JoinHandle<Option<Vec<T>>>
    where
        F: FnMut(&CollectorEvent<T>) + Send + 'static,
    {
        tokio::spawn(async move {
            while let Some(event) = self.events.recv().await {
                forward(&event);
                if let CollectorEvent::StageComplete { results } = event {
                    return Some(results);
                }
            }
            None
        })
    }
}
