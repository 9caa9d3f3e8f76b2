//! Output format value object

use serde::{Deserialize, Serialize};

/// How a finished council run is rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Every stage, rankings table and costs
    Full,
    /// Only the chairman's answer (default)
    #[default]
    Synthesis,
    /// The whole outcome as JSON
    Json,
}
