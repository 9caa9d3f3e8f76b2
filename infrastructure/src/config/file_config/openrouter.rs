//! OpenRouter configuration from TOML (`[openrouter]` section)

use super::ConfigIssue;
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_GENERATION_URL: &str = "https://openrouter.ai/api/v1/generation";
pub const DEFAULT_API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// Raw OpenRouter configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOpenRouterConfig {
    /// Chat completions endpoint
    pub api_url: String,
    /// Generation stats endpoint used for cost lookup
    pub generation_url: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Look up the cost of every generation
    pub fetch_cost: bool,
    /// Delay before the cost lookup, in milliseconds
    pub cost_delay_ms: u64,
}

impl Default for FileOpenRouterConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            generation_url: DEFAULT_GENERATION_URL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            fetch_cost: true,
            cost_delay_ms: 500,
        }
    }
}

impl FileOpenRouterConfig {
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        for (field, url) in [
            ("openrouter.api_url", &self.api_url),
            ("openrouter.generation_url", &self.generation_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                issues.push(ConfigIssue::error(
                    field,
                    format!("'{}' is not an http(s) URL", url),
                ));
            }
        }
        if self.api_key_env.trim().is_empty() {
            issues.push(ConfigIssue::error(
                "openrouter.api_key_env",
                "environment variable name cannot be empty",
            ));
        }
        issues
    }
}
