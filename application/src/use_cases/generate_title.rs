//! Generate Title use case
//!
//! Asks a small model for a short conversation title. Never fails: any
//! error yields the default title.

use crate::ports::worker_gateway::{InvokeRequest, WorkerGateway};
use crate::use_cases::shared::{invoke_with_timeout, user_prompt};
use council_domain::council::policy::TITLE_TIMEOUT_SECS;
use council_domain::prompt::DEFAULT_TITLE;
use council_domain::{FeatureFlags, PromptTemplate, WorkerId};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub struct GenerateTitleUseCase<G: WorkerGateway + 'static> {
    gateway: Arc<G>,
    model: WorkerId,
    timeout: Duration,
}

impl<G: WorkerGateway + 'static> GenerateTitleUseCase<G> {
    pub fn new(gateway: Arc<G>, model: WorkerId) -> Self {
        Self {
            gateway,
            model,
            timeout: Duration::from_secs_f64(TITLE_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn execute(&self, question: &str) -> String {
        let request = InvokeRequest::new(
            self.model.clone(),
            user_prompt(PromptTemplate::title_prompt(question)),
            self.timeout,
            FeatureFlags::none(),
        );

        match invoke_with_timeout(self.gateway.as_ref(), request).await {
            Ok(reply) => {
                let title = PromptTemplate::clean_title(&reply.content);
                debug!("Generated title: {}", title);
                title
            }
            Err(e) => {
                warn!("Title generation with {} failed: {}", self.model, e);
                DEFAULT_TITLE.to_string()
            }
        }
    }
}
