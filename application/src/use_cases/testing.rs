//! Scripted gateway and recording sinks for use case tests.

use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use crate::ports::events::CouncilEventSink;
use crate::ports::worker_gateway::{GatewayError, InvokeRequest, WorkerGateway, WorkerReply};
use async_trait::async_trait;
use council_domain::{CouncilEvent, WorkerId};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

/// What a worker does on one call
pub(crate) enum Script {
    Reply {
        content: String,
        elapsed: Option<f64>,
        cost: Option<f64>,
        delay: Duration,
    },
    Fail,
    /// Never answers within any test deadline
    Hang,
}

impl Script {
    pub(crate) fn reply(content: &str, elapsed: f64) -> Self {
        Script::Reply {
            content: content.to_string(),
            elapsed: Some(elapsed),
            cost: None,
            delay: Duration::ZERO,
        }
    }

    pub(crate) fn reply_after(content: &str, delay_ms: u64) -> Self {
        Script::Reply {
            content: content.to_string(),
            elapsed: Some(delay_ms as f64 / 1000.0),
            cost: None,
            delay: Duration::from_millis(delay_ms),
        }
    }

    pub(crate) fn costed(content: &str, cost: f64) -> Self {
        Script::Reply {
            content: content.to_string(),
            elapsed: Some(1.0),
            cost: Some(cost),
            delay: Duration::ZERO,
        }
    }

    pub(crate) fn unmeasured(content: &str) -> Self {
        Script::Reply {
            content: content.to_string(),
            elapsed: None,
            cost: None,
            delay: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub worker: WorkerId,
    pub timeout: Duration,
    pub prompt: String,
    pub web_search: bool,
}

/// Gateway that plays back per-worker scripts in call order.
///
/// A worker with an exhausted (or missing) script fails immediately.
#[derive(Default)]
pub(crate) struct ScriptedGateway {
    scripts: Mutex<HashMap<String, VecDeque<Script>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedGateway {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn script(self, worker: &str, steps: Vec<Script>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(worker.to_string(), steps.into());
        self
    }

    pub(crate) fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn calls_for(&self, worker: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.worker.as_str() == worker)
            .collect()
    }
}

#[async_trait]
impl WorkerGateway for ScriptedGateway {
    async fn invoke(&self, request: InvokeRequest) -> Result<WorkerReply, GatewayError> {
        self.calls.lock().unwrap().push(RecordedCall {
            worker: request.worker.clone(),
            timeout: request.timeout,
            prompt: request
                .messages
                .iter()
                .map(|m| m.content.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
            web_search: request.features.web_search,
        });

        let step = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(request.worker.as_str())
            .and_then(|queue| queue.pop_front());

        match step {
            Some(Script::Reply {
                content,
                elapsed,
                cost,
                delay,
            }) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                Ok(WorkerReply {
                    content,
                    elapsed_time: elapsed,
                    usage: None,
                    cost,
                })
            }
            Some(Script::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(GatewayError::Timeout)
            }
            Some(Script::Fail) | None => Err(GatewayError::RequestFailed(format!(
                "scripted failure for {}",
                request.worker
            ))),
        }
    }
}

/// Sink that keeps every event it sees
#[derive(Default)]
pub(crate) struct RecordingSink {
    events: Mutex<Vec<CouncilEvent>>,
}

impl RecordingSink {
    pub(crate) fn events(&self) -> Vec<CouncilEvent> {
        self.events.lock().unwrap().clone()
    }

    pub(crate) fn types(&self) -> Vec<&'static str> {
        self.events().iter().map(|e| e.event_type()).collect()
    }

    pub(crate) fn count(&self, event_type: &str) -> usize {
        self.types().iter().filter(|t| **t == event_type).count()
    }
}

impl CouncilEventSink for RecordingSink {
    fn emit(&self, event: &CouncilEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Logger that keeps every persisted event
#[derive(Default)]
pub(crate) struct RecordingLogger {
    events: Mutex<Vec<(String, serde_json::Value)>>,
}

impl RecordingLogger {
    pub(crate) fn events(&self) -> Vec<(String, serde_json::Value)> {
        self.events.lock().unwrap().clone()
    }
}

impl ConversationLogger for RecordingLogger {
    fn log(&self, event: ConversationEvent) {
        self.events
            .lock()
            .unwrap()
            .push((event.event_type.to_string(), event.payload));
    }
}
