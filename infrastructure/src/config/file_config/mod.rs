//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.
//!
//! ```toml
//! [council]
//! models = ["openai/gpt-5.1", "x-ai/grok-4"]
//! chairman = "google/gemini-3-pro-preview"
//! disabled = ["x-ai/grok-4"]
//!
//! [[registry]]
//! id = "perplexity/sonar-pro"
//! capabilities = { can_browse = true }
//!
//! [openrouter]
//! api_key_env = "OPENROUTER_API_KEY"
//!
//! [output]
//! format = "full"
//! ```

mod council;
mod logging;
mod openrouter;
mod output;
mod registry;

pub use council::{DEFAULT_CHAIRMAN, DEFAULT_COUNCIL, FileCouncilConfig};
pub use logging::FileLoggingConfig;
pub use openrouter::FileOpenRouterConfig;
pub use output::{FileOutputConfig, FileOutputFormat};
pub use registry::{FileCapabilities, FileRegistryEntry};

use council_domain::{CouncilConfig, FeatureFlags, WorkerId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How bad a configuration issue is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The configuration cannot work.
    Error,
    /// The configuration works but something is ignored or replaced.
    Warning,
}

/// A detected issue in the configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigIssue {
    pub severity: Severity,
    /// Dotted path of the offending field (e.g. `council.models`)
    pub field: String,
    pub message: String,
}

impl ConfigIssue {
    fn error(field: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            field: field.to_string(),
            message: message.into(),
        }
    }

    fn warning(field: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Council membership and chairman
    pub council: FileCouncilConfig,
    /// Additional models with capability metadata
    pub registry: Vec<FileRegistryEntry>,
    /// OpenRouter endpoint settings
    pub openrouter: FileOpenRouterConfig,
    /// Output settings
    pub output: FileOutputConfig,
    /// Diagnostic and run logs
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = self.council.validate();

        let mut seen = HashSet::new();
        for entry in &self.registry {
            let id = entry.id.trim();
            if id.is_empty() {
                issues.push(ConfigIssue::error("registry.id", "registry entry missing 'id'"));
            } else if !seen.insert(id) {
                issues.push(ConfigIssue::error(
                    "registry.id",
                    format!("duplicate model '{}' in registry", id),
                ));
            }
        }

        if let Some(chairman) = &self.council.chairman
            && !self.all_models().iter().any(|m| m.as_str() == chairman)
        {
            issues.push(ConfigIssue::warning(
                "council.chairman",
                format!(
                    "chairman '{}' is not a known model, falling back to '{}'",
                    chairman, DEFAULT_CHAIRMAN
                ),
            ));
        }

        issues.extend(self.openrouter.validate());
        issues
    }

    /// Base council models plus registry additions, without duplicates.
    pub fn all_models(&self) -> Vec<WorkerId> {
        let mut seen = HashSet::new();
        self.council
            .models
            .iter()
            .map(String::as_str)
            .chain(self.registry.iter().map(|e| e.id.as_str()))
            .map(str::trim)
            .filter(|id| !id.is_empty() && seen.insert(*id))
            .map(WorkerId::new)
            .collect()
    }

    /// Models that may answer with the web search plugin.
    pub fn browse_capable(&self) -> HashSet<WorkerId> {
        self.registry
            .iter()
            .filter(|e| e.capabilities.can_browse)
            .map(|e| WorkerId::new(e.id.trim()))
            .collect()
    }

    /// Models flagged as coding specialists.
    pub fn coding_capable(&self) -> HashSet<WorkerId> {
        self.registry
            .iter()
            .filter(|e| e.capabilities.coding)
            .map(|e| WorkerId::new(e.id.trim()))
            .collect()
    }

    /// Active candidate set for a run with `features`.
    ///
    /// Disabled models are dropped. Coding specialists only take part in
    /// coding mode, or when web search is on and they can browse.
    pub fn select_candidates(&self, features: FeatureFlags) -> Vec<WorkerId> {
        let coding = self.coding_capable();
        let browse = self.browse_capable();

        self.all_models()
            .into_iter()
            .filter(|m| !self.council.disabled.iter().any(|d| d.trim() == m.as_str()))
            .filter(|m| {
                features.coding_mode
                    || !coding.contains(m)
                    || (features.web_search && browse.contains(m))
            })
            .collect()
    }

    /// Configured chairman when it is a known model, the default otherwise.
    pub fn chairman(&self) -> WorkerId {
        match &self.council.chairman {
            Some(chairman) if self.all_models().iter().any(|m| m.as_str() == chairman) => {
                WorkerId::new(chairman.as_str())
            }
            _ => WorkerId::new(DEFAULT_CHAIRMAN),
        }
    }

    /// Immutable configuration snapshot for one run.
    pub fn council_snapshot(&self, features: FeatureFlags) -> CouncilConfig {
        let mut config = CouncilConfig::new(self.select_candidates(features), self.chairman());
        if let Some(model) = &self.council.title_model {
            config = config.with_title_model(WorkerId::new(model.as_str()));
        }
        if let Some(prompt) = &self.council.chairman_prompt {
            config = config.with_chairman_prompt(prompt.as_str());
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_domain::OutputFormat;

    const SAMPLE: &str = r#"
[council]
models = ["openai/gpt-5.1", "anthropic/claude-sonnet-4.5", "x-ai/grok-4"]
chairman = "anthropic/claude-sonnet-4.5"
disabled = ["x-ai/grok-4"]

[[registry]]
id = "perplexity/sonar-pro"
notes = "search"
capabilities = { can_browse = true }

[[registry]]
id = "openai/gpt-5.1-codex"
capabilities = { coding = true }

[[registry]]
id = "qwen/qwen3-coder"
capabilities = { coding = true, web_search = true }

[output]
format = "full"
color = false
"#;

    fn sample() -> FileConfig {
        toml::from_str(SAMPLE).unwrap()
    }

    fn ids(models: &[WorkerId]) -> Vec<&str> {
        models.iter().map(|m| m.as_str()).collect()
    }

    #[test]
    fn test_deserialize_full_config() {
        let config = sample();
        assert_eq!(config.council.models.len(), 3);
        assert_eq!(config.registry.len(), 3);
        assert!(config.registry[0].capabilities.can_browse);
        assert!(config.registry[2].capabilities.can_browse);
        assert_eq!(config.output.format, Some(OutputFormat::Full));
        assert!(!config.output.color);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert_eq!(config.council.models.len(), DEFAULT_COUNCIL.len());
        assert_eq!(config.chairman().as_str(), DEFAULT_CHAIRMAN);
        assert!(config.registry.is_empty());
    }

    #[test]
    fn test_candidates_skip_disabled_and_coding() {
        let candidates = sample().select_candidates(FeatureFlags::none());
        assert_eq!(
            ids(&candidates),
            vec!["openai/gpt-5.1", "anthropic/claude-sonnet-4.5", "perplexity/sonar-pro"]
        );
    }

    #[test]
    fn test_coding_mode_includes_coding_models() {
        let candidates = sample().select_candidates(FeatureFlags::none().with_coding_mode(true));
        assert!(ids(&candidates).contains(&"openai/gpt-5.1-codex"));
        assert!(ids(&candidates).contains(&"qwen/qwen3-coder"));
    }

    #[test]
    fn test_web_search_includes_browsing_coding_models() {
        let candidates = sample().select_candidates(FeatureFlags::none().with_web_search(true));
        assert!(ids(&candidates).contains(&"qwen/qwen3-coder"));
        assert!(!ids(&candidates).contains(&"openai/gpt-5.1-codex"));
    }

    #[test]
    fn test_unknown_chairman_falls_back() {
        let mut config = sample();
        config.council.chairman = Some("unknown/model".to_string());
        assert_eq!(config.chairman().as_str(), DEFAULT_CHAIRMAN);

        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);
        assert_eq!(issues[0].field, "council.chairman");
    }

    #[test]
    fn test_duplicate_registry_entry_is_error() {
        let config: FileConfig = toml::from_str(
            r#"
[[registry]]
id = "a/b"

[[registry]]
id = "a/b"
"#,
        )
        .unwrap();
        let issues = config.validate();
        assert!(issues.iter().any(|i| i.is_error() && i.field == "registry.id"));
    }

    #[test]
    fn test_registry_overlap_with_council_is_merged() {
        let config: FileConfig = toml::from_str(
            r#"
[council]
models = ["a/one", "a/two"]

[[registry]]
id = "a/two"
capabilities = { can_browse = true }
"#,
        )
        .unwrap();
        assert_eq!(ids(&config.all_models()), vec!["a/one", "a/two"]);
        assert!(config.browse_capable().contains(&WorkerId::new("a/two")));
    }

    #[test]
    fn test_snapshot() {
        let mut config = sample();
        config.council.title_model = Some("openai/gpt-5-mini".to_string());
        config.council.chairman_prompt = Some("Answer {user_query}".to_string());

        let snapshot = config.council_snapshot(FeatureFlags::none());
        assert_eq!(snapshot.chairman.as_str(), "anthropic/claude-sonnet-4.5");
        assert_eq!(snapshot.title_model.as_str(), "openai/gpt-5-mini");
        assert_eq!(snapshot.chairman_prompt.as_deref(), Some("Answer {user_query}"));
        assert_eq!(snapshot.council.len(), 3);
        assert!(snapshot.validate().is_ok());
    }
}
