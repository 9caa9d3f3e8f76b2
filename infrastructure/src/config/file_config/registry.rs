//! Model registry from TOML (`[[registry]]` entries)
//!
//! Registry entries add models to the council and describe what they can do.

use serde::{Deserialize, Serialize};

/// One registry entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRegistryEntry {
    pub id: String,
    pub notes: Option<String>,
    pub expensive: Option<bool>,
    pub capabilities: FileCapabilities,
}

/// Capability flags of a registry entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCapabilities {
    /// Can answer with live web results
    #[serde(alias = "web_search")]
    pub can_browse: bool,
    /// Coding specialist
    pub coding: bool,
}
