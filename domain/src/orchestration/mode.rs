//! Execution mode and per-run feature flags.

use serde::{Deserialize, Serialize};

/// How the pipeline advances between stages
///
/// | Mode | Stage 1 | Stage 2 | Advances on |
/// |------|---------|---------|-------------|
/// | `Batch` | dispatch + one retry round | single round | every call settled |
/// | `QuorumAccelerated` | streamed, no retry | streamed | `ceil(N/2)` successes |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    #[default]
    Batch,
    QuorumAccelerated,
}

impl ExecutionMode {
    pub fn as_str(&self) -> &str {
        match self {
            ExecutionMode::Batch => "batch",
            ExecutionMode::QuorumAccelerated => "quorum_accelerated",
        }
    }

    pub fn is_quorum(&self) -> bool {
        matches!(self, ExecutionMode::QuorumAccelerated)
    }
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Feature flags forwarded to the worker invocation capability
///
/// The council engine never interprets them; the gateway decides what
/// `web_search` means for a given worker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlags {
    pub web_search: bool,
    pub coding_mode: bool,
}

impl FeatureFlags {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_web_search(mut self, enabled: bool) -> Self {
        self.web_search = enabled;
        self
    }

    pub fn with_coding_mode(mut self, enabled: bool) -> Self {
        self.coding_mode = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mode_is_batch() {
        assert_eq!(ExecutionMode::default(), ExecutionMode::Batch);
        assert!(!ExecutionMode::Batch.is_quorum());
        assert!(ExecutionMode::QuorumAccelerated.is_quorum());
    }

    #[test]
    fn test_mode_serializes_snake_case() {
        let json = serde_json::to_string(&ExecutionMode::QuorumAccelerated).unwrap();
        assert_eq!(json, "\"quorum_accelerated\"");
    }

    #[test]
    fn test_feature_flag_builders() {
        let flags = FeatureFlags::none().with_web_search(true);
        assert!(flags.web_search);
        assert!(!flags.coding_mode);
    }
}
