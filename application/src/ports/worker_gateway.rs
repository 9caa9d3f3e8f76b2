//! Worker gateway port
//!
//! Defines the single capability the council engine consumes: invoke one
//! worker with a message list and get back its reply. Implementations
//! (adapters) live in the infrastructure layer.

use async_trait::async_trait;
use council_domain::{ChatMessage, FeatureFlags, TokenUsage, WorkerId};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while invoking a worker
///
/// The engine treats every variant the same way ("no response"); the
/// distinction only matters for logs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

/// One invocation of one worker
#[derive(Debug, Clone)]
pub struct InvokeRequest {
    pub worker: WorkerId,
    /// Shared across every call of a stage
    pub messages: Arc<[ChatMessage]>,
    pub timeout: Duration,
    pub features: FeatureFlags,
}

impl InvokeRequest {
    pub fn new(
        worker: WorkerId,
        messages: Arc<[ChatMessage]>,
        timeout: Duration,
        features: FeatureFlags,
    ) -> Self {
        Self {
            worker,
            messages,
            timeout,
            features,
        }
    }
}

/// A worker's successful reply
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkerReply {
    pub content: String,
    /// Seconds; filled in by the engine when the adapter does not report it
    pub elapsed_time: Option<f64>,
    pub usage: Option<TokenUsage>,
    pub cost: Option<f64>,
}

impl WorkerReply {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn with_elapsed_time(mut self, seconds: f64) -> Self {
        self.elapsed_time = Some(seconds);
        self
    }

    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = Some(usage);
        self
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = Some(cost);
        self
    }
}

/// Gateway for worker invocation
///
/// Treated as a black box: the engine never inspects transport errors and
/// never retries beyond its own single retry round.
#[async_trait]
pub trait WorkerGateway: Send + Sync {
    /// Invoke `request.worker` and wait for its full reply.
    async fn invoke(&self, request: InvokeRequest) -> Result<WorkerReply, GatewayError>;
}
