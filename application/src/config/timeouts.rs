//! Council timeouts — per-call deadlines of each stage.
//!
//! Defaults come from the domain policy. The retry round has no entry here:
//! its deadline is derived from the first round of the same batch.

use council_domain::council::policy::{
    CHAIRMAN_TIMEOUT_SECS, FIRST_ATTEMPT_TIMEOUT_SECS, TITLE_TIMEOUT_SECS,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-call deadlines of the council stages.
///
/// | Call | Default |
/// |------|---------|
/// | stage-1 first attempt, stage-2 judges | 120 s |
/// | chairman | 120 s |
/// | title | 30 s |
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CouncilTimeouts {
    pub first_attempt: Duration,
    pub chairman: Duration,
    pub title: Duration,
}

impl Default for CouncilTimeouts {
    fn default() -> Self {
        Self {
            first_attempt: Duration::from_secs_f64(FIRST_ATTEMPT_TIMEOUT_SECS),
            chairman: Duration::from_secs_f64(CHAIRMAN_TIMEOUT_SECS),
            title: Duration::from_secs_f64(TITLE_TIMEOUT_SECS),
        }
    }
}

impl CouncilTimeouts {
    // ==================== Builder Methods ====================

    pub fn with_first_attempt(mut self, timeout: Duration) -> Self {
        self.first_attempt = timeout;
        self
    }

    pub fn with_chairman(mut self, timeout: Duration) -> Self {
        self.chairman = timeout;
        self
    }

    pub fn with_title(mut self, timeout: Duration) -> Self {
        self.title = timeout;
        self
    }
}
