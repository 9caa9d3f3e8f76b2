//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw logging configuration from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Diagnostic log file (tracing output)
    pub file: Option<PathBuf>,
    /// JSONL file receiving one record per finished run
    pub runs_file: Option<PathBuf>,
}

impl FileLoggingConfig {
    /// Where finished runs are persisted; defaults to the user data dir.
    pub fn runs_path(&self) -> Option<PathBuf> {
        self.runs_file.clone().or_else(|| {
            dirs::data_dir().map(|d| d.join("llm-council").join("runs.jsonl"))
        })
    }
}
