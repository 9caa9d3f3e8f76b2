//! Council configuration from TOML (`[council]` section)

use super::ConfigIssue;
use council_application::CouncilTimeouts;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// Council used when the config file names none
pub const DEFAULT_COUNCIL: [&str; 4] = [
    "openai/gpt-5.1",
    "google/gemini-3-pro-preview",
    "anthropic/claude-sonnet-4.5",
    "x-ai/grok-4",
];

/// Chairman used when none is configured or the configured one is unknown
pub const DEFAULT_CHAIRMAN: &str = "google/gemini-3-pro-preview";

/// Raw council configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCouncilConfig {
    /// Base council, in dispatch order
    pub models: Vec<String>,
    /// Chairman model (must be a known model)
    pub chairman: Option<String>,
    /// Model for the title side task
    pub title_model: Option<String>,
    /// Models excluded from the active council
    pub disabled: Vec<String>,
    /// Chairman template with `{user_query}`, `{stage1_text}`, `{stage2_text}`
    pub chairman_prompt: Option<String>,
    /// Advance stages on a majority instead of waiting for every worker
    pub quorum: bool,
    /// Per-call timeout of first attempts and judges, in seconds
    pub timeout_secs: Option<f64>,
    /// Chairman timeout in seconds
    pub chairman_timeout_secs: Option<f64>,
    /// Title timeout in seconds
    pub title_timeout_secs: Option<f64>,
}

impl Default for FileCouncilConfig {
    fn default() -> Self {
        Self {
            models: DEFAULT_COUNCIL.iter().map(|m| m.to_string()).collect(),
            chairman: None,
            title_model: None,
            disabled: Vec::new(),
            chairman_prompt: None,
            quorum: false,
            timeout_secs: None,
            chairman_timeout_secs: None,
            title_timeout_secs: None,
        }
    }
}

impl FileCouncilConfig {
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        let mut seen = HashSet::new();
        for model in &self.models {
            let model = model.trim();
            if model.is_empty() {
                issues.push(ConfigIssue::error(
                    "council.models",
                    "model name cannot be empty",
                ));
            } else if !seen.insert(model) {
                issues.push(ConfigIssue::error(
                    "council.models",
                    format!("duplicate model '{}' in council.models", model),
                ));
            }
        }

        for (field, value) in [
            ("council.timeout_secs", self.timeout_secs),
            ("council.chairman_timeout_secs", self.chairman_timeout_secs),
            ("council.title_timeout_secs", self.title_timeout_secs),
        ] {
            if let Some(secs) = value
                && positive_secs(Some(secs)).is_none()
            {
                issues.push(ConfigIssue::error(
                    field,
                    format!("timeout must be a positive number of seconds, got {}", secs),
                ));
            }
        }

        issues
    }

    /// Timeouts with configured overrides applied.
    ///
    /// Invalid values are reported by [`validate`](Self::validate) and
    /// ignored here.
    pub fn timeouts(&self) -> CouncilTimeouts {
        let mut timeouts = CouncilTimeouts::default();
        if let Some(d) = positive_secs(self.timeout_secs) {
            timeouts = timeouts.with_first_attempt(d);
        }
        if let Some(d) = positive_secs(self.chairman_timeout_secs) {
            timeouts = timeouts.with_chairman(d);
        }
        if let Some(d) = positive_secs(self.title_timeout_secs) {
            timeouts = timeouts.with_title(d);
        }
        timeouts
    }
}

/// A strictly positive duration; `None` for values `Duration` cannot hold.
fn positive_secs(value: Option<f64>) -> Option<Duration> {
    value
        .and_then(|s| Duration::try_from_secs_f64(s).ok())
        .filter(|d| !d.is_zero())
}
