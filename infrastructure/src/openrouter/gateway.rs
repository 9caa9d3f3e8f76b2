//! OpenRouter Worker Gateway implementation

use super::protocol::{
    ChatCompletionRequest, ChatCompletionResponse, GenerationResponse, Plugin, WEB_PLUGIN,
    error_message,
};
use crate::config::FileOpenRouterConfig;
use async_trait::async_trait;
use council_application::ports::worker_gateway::{
    GatewayError, InvokeRequest, WorkerGateway, WorkerReply,
};
use council_domain::WorkerId;
use council_domain::council::aggregate::round2;
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Timeout of the best-effort cost lookup
const COST_LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Slack left between the cost lookup and the caller's deadline
const COST_LOOKUP_MARGIN: Duration = Duration::from_millis(250);

/// Worker gateway backed by OpenRouter
pub struct OpenRouterGateway {
    client: reqwest::Client,
    api_key: String,
    api_url: String,
    generation_url: String,
    /// `None` disables the cost lookup
    cost_delay: Option<Duration>,
    /// Workers that get the web plugin when web search is requested
    browse_capable: HashSet<WorkerId>,
}

impl OpenRouterGateway {
    /// Create a gateway with default endpoints.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_settings(api_key, &FileOpenRouterConfig::default())
    }

    /// Create a gateway from configuration, reading the key from the
    /// configured environment variable.
    pub fn from_config(config: &FileOpenRouterConfig) -> Result<Self, GatewayError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                GatewayError::ConnectionError(format!("{} is not set", config.api_key_env))
            })?;

        info!("OpenRouterGateway initialized ({})", config.api_url);
        Ok(Self::with_settings(api_key, config))
    }

    fn with_settings(api_key: impl Into<String>, config: &FileOpenRouterConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            api_url: config.api_url.clone(),
            generation_url: config.generation_url.clone(),
            cost_delay: config
                .fetch_cost
                .then(|| Duration::from_millis(config.cost_delay_ms)),
            browse_capable: HashSet::new(),
        }
    }

    pub fn with_browse_capable(mut self, workers: HashSet<WorkerId>) -> Self {
        self.browse_capable = workers;
        self
    }

    pub fn with_endpoints(
        mut self,
        api_url: impl Into<String>,
        generation_url: impl Into<String>,
    ) -> Self {
        self.api_url = api_url.into();
        self.generation_url = generation_url.into();
        self
    }

    pub fn without_cost_lookup(mut self) -> Self {
        self.cost_delay = None;
        self
    }

    fn plugins_for(&self, request: &InvokeRequest) -> Vec<Plugin> {
        if request.features.web_search && self.browse_capable.contains(&request.worker) {
            vec![Plugin { id: WEB_PLUGIN }]
        } else {
            Vec::new()
        }
    }

    fn build_body<'a>(&self, request: &'a InvokeRequest) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: request.worker.as_str(),
            messages: &request.messages,
            plugins: self.plugins_for(request),
        }
    }

    /// Cost of a generation in dollars, `None` when unavailable.
    ///
    /// Runs within `budget` so a completed answer never misses the caller's
    /// deadline; when the budget cannot cover `delay` the lookup is skipped.
    async fn lookup_cost(
        &self,
        generation_id: &str,
        delay: Duration,
        budget: Duration,
    ) -> Option<f64> {
        if budget <= delay {
            debug!(
                "Skipping cost lookup for {}: {:?} left of the call budget",
                generation_id, budget
            );
            return None;
        }

        let lookup = async {
            // Stats show up shortly after the completion.
            tokio::time::sleep(delay).await;

            let response = self
                .client
                .get(format!("{}?id={}", self.generation_url, generation_id))
                .bearer_auth(&self.api_key)
                .timeout(COST_LOOKUP_TIMEOUT)
                .send()
                .await;

            match response {
                Ok(r) if r.status().is_success() => match r.json::<GenerationResponse>().await {
                    Ok(stats) => stats.data.and_then(|d| d.total_cost),
                    Err(e) => {
                        debug!("Unreadable generation stats for {}: {}", generation_id, e);
                        None
                    }
                },
                Ok(r) => {
                    debug!("Generation stats for {} returned {}", generation_id, r.status());
                    None
                }
                Err(e) => {
                    warn!("Error fetching generation cost: {}", e);
                    None
                }
            }
        };

        match tokio::time::timeout(budget, lookup).await {
            Ok(cost) => cost,
            Err(_) => {
                debug!("Cost lookup for {} ran out of budget", generation_id);
                None
            }
        }
    }
}

fn map_transport_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout
    } else if e.is_connect() {
        GatewayError::ConnectionError(e.to_string())
    } else {
        GatewayError::RequestFailed(e.to_string())
    }
}

#[async_trait]
impl WorkerGateway for OpenRouterGateway {
    async fn invoke(&self, request: InvokeRequest) -> Result<WorkerReply, GatewayError> {
        debug!(
            "Querying {} ({} message(s))",
            request.worker,
            request.messages.len()
        );
        let started = Instant::now();

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .timeout(request.timeout)
            .json(&self.build_body(&request))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::RequestFailed(format!(
                "HTTP {}: {}",
                status.as_u16(),
                error_message(&body)
            )));
        }

        let payload: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;
        let elapsed = round2(started.elapsed().as_secs_f64());

        let generation_id = payload.id.clone();
        let usage = payload.usage.clone();
        let content = payload.into_content().ok_or_else(|| {
            GatewayError::MalformedResponse("response has no message content".to_string())
        })?;

        let cost = match (generation_id, self.cost_delay) {
            (Some(id), Some(delay)) => {
                let budget = request
                    .timeout
                    .saturating_sub(started.elapsed())
                    .saturating_sub(COST_LOOKUP_MARGIN);
                self.lookup_cost(&id, delay, budget).await.map(round2)
            }
            _ => None,
        };

        Ok(WorkerReply {
            content,
            elapsed_time: Some(elapsed),
            usage,
            cost,
        })
    }
}
