//! Batch dispatch with one adaptive retry round
//!
//! Every candidate is called concurrently. Candidates whose first call
//! failed get exactly one more call, with a deadline derived from how long
//! the successful calls of the same batch took.

use crate::ports::worker_gateway::{InvokeRequest, WorkerGateway, WorkerReply};
use crate::use_cases::shared::invoke_with_timeout;
use council_domain::council::policy::FIRST_ATTEMPT_TIMEOUT_SECS;
use council_domain::{ChatMessage, FeatureFlags, ResponseRecord, WorkerId, retry_timeout};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Concurrent fan-out over a candidate list
pub struct Dispatcher<G: WorkerGateway + 'static> {
    gateway: Arc<G>,
    first_attempt_timeout: Duration,
}

impl<G: WorkerGateway + 'static> Dispatcher<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            first_attempt_timeout: Duration::from_secs_f64(FIRST_ATTEMPT_TIMEOUT_SECS),
        }
    }

    pub fn with_first_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.first_attempt_timeout = timeout;
        self
    }

    /// Call every candidate once and wait for all of them.
    ///
    /// The result is positionally aligned with `candidates`; `None` marks a
    /// failed, timed out or panicked call. Never fails as a whole.
    pub async fn dispatch_round(
        &self,
        candidates: &[WorkerId],
        messages: Arc<[ChatMessage]>,
        timeout: Duration,
        features: FeatureFlags,
    ) -> Vec<Option<WorkerReply>> {
        let mut join_set = JoinSet::new();

        for (index, worker) in candidates.iter().enumerate() {
            let gateway = Arc::clone(&self.gateway);
            let request =
                InvokeRequest::new(worker.clone(), Arc::clone(&messages), timeout, features);

            join_set.spawn(async move {
                let result = invoke_with_timeout(gateway.as_ref(), request).await;
                (index, result)
            });
        }

        let mut replies: Vec<Option<WorkerReply>> = vec![None; candidates.len()];

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, Ok(reply))) => {
                    debug!("Worker {} responded", candidates[index]);
                    replies[index] = Some(reply);
                }
                Ok((index, Err(e))) => {
                    warn!("Worker {} failed: {}", candidates[index], e);
                }
                Err(e) => {
                    warn!("Task join error: {}", e);
                }
            }
        }

        replies
    }

    /// Collect answers from every candidate, retrying failures once.
    ///
    /// Output is in candidate order. A worker that fails first and then
    /// answers contributes two records: the "might retry" placeholder and the
    /// second-attempt answer.
    pub async fn collect(
        &self,
        candidates: &[WorkerId],
        messages: Arc<[ChatMessage]>,
        features: FeatureFlags,
    ) -> Vec<ResponseRecord> {
        let first = self
            .dispatch_round(
                candidates,
                Arc::clone(&messages),
                self.first_attempt_timeout,
                features,
            )
            .await;

        let failed: Vec<WorkerId> = candidates
            .iter()
            .zip(&first)
            .filter(|(_, reply)| reply.is_none())
            .map(|(worker, _)| worker.clone())
            .collect();

        let mut retried = HashMap::new();
        if !failed.is_empty() {
            let successful_elapsed: Vec<f64> = first
                .iter()
                .flatten()
                .filter_map(|reply| reply.elapsed_time)
                .collect();
            let timeout = retry_timeout(&successful_elapsed);
            info!(
                "Retrying {} failed worker(s) with a {:.1}s timeout",
                failed.len(),
                timeout
            );

            let second = self
                .dispatch_round(&failed, messages, Duration::from_secs_f64(timeout), features)
                .await;
            retried = failed
                .into_iter()
                .zip(second)
                .filter_map(|(worker, reply)| reply.map(|r| (worker, r)))
                .collect();
        }

        merge_attempts(candidates, first, retried)
    }
}

/// Interleave first-round answers, placeholders and retried answers.
fn merge_attempts(
    candidates: &[WorkerId],
    first: Vec<Option<WorkerReply>>,
    mut retried: HashMap<WorkerId, WorkerReply>,
) -> Vec<ResponseRecord> {
    let mut records = Vec::with_capacity(candidates.len());

    for (worker, reply) in candidates.iter().zip(first) {
        match reply {
            Some(reply) => records.push(ResponseRecord::answered(
                worker.clone(),
                reply.content,
                reply.elapsed_time,
                reply.usage,
                reply.cost,
            )),
            None => {
                records.push(ResponseRecord::might_retry(worker.clone()));
                if let Some(reply) = retried.remove(worker) {
                    records.push(ResponseRecord::second_attempt(
                        worker.clone(),
                        &reply.content,
                        reply.elapsed_time,
                        reply.usage,
                        reply.cost,
                    ));
                }
            }
        }
    }

    records
}
