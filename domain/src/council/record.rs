//! Records produced by the council stages.
//!
//! - [`ResponseRecord`] - one worker's stage-1 answer (or a placeholder)
//! - [`JudgmentRecord`] - one judge's stage-2 verdict with its parsed ranking
//! - [`ChairmanResult`] - the stage-3 synthesis
//!
//! All records are immutable once produced.

use crate::core::worker::WorkerId;
use crate::council::label::Label;
use serde::{Deserialize, Serialize};

/// Content of the placeholder emitted when a batch first attempt fails.
pub const FIRST_ATTEMPT_PLACEHOLDER: &str = "No response. Might retry.";

/// Content of the placeholder for a worker that never answered in stream mode.
pub const NO_RESPONSE_PLACEHOLDER: &str = "No response.";

/// Prefix prepended to a response that only arrived on the retry round.
pub const SECOND_ATTEMPT_PREFIX: &str =
    "Model did not reply on the first attempt. This is the second attempt\n";

/// Chairman content substituted when synthesis fails.
pub const CHAIRMAN_FALLBACK: &str = "Error: Unable to generate final synthesis.";

/// Chairman content reported when every stage-1 worker failed.
pub const TOTAL_FAILURE_MESSAGE: &str = "All models failed to respond. Please try again.";

/// Worker name used on the synthetic total-failure result.
pub const TOTAL_FAILURE_WORKER: &str = "error";

/// Token usage as reported by the provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u64>,
}

/// Which attempt produced a [`ResponseRecord`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attempt {
    /// Answered on the first call
    First,
    /// Failed first, answered on the retry round
    Second,
    /// No answer; content is a fixed placeholder and metadata is empty
    Placeholder,
}

/// A worker's stage-1 answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub worker: WorkerId,
    pub content: String,
    pub elapsed_time: Option<f64>,
    pub usage: Option<TokenUsage>,
    pub cost: Option<f64>,
    pub attempt: Attempt,
}

impl ResponseRecord {
    /// A response that arrived on the first attempt.
    pub fn answered(
        worker: WorkerId,
        content: impl Into<String>,
        elapsed_time: Option<f64>,
        usage: Option<TokenUsage>,
        cost: Option<f64>,
    ) -> Self {
        Self {
            worker,
            content: content.into(),
            elapsed_time,
            usage,
            cost,
            attempt: Attempt::First,
        }
    }

    /// A response that only arrived on the retry round.
    pub fn second_attempt(
        worker: WorkerId,
        content: &str,
        elapsed_time: Option<f64>,
        usage: Option<TokenUsage>,
        cost: Option<f64>,
    ) -> Self {
        Self {
            worker,
            content: format!("{}{}", SECOND_ATTEMPT_PREFIX, content),
            elapsed_time,
            usage,
            cost,
            attempt: Attempt::Second,
        }
    }

    /// Placeholder left behind by a failed first attempt (batch mode).
    pub fn might_retry(worker: WorkerId) -> Self {
        Self::placeholder(worker, FIRST_ATTEMPT_PLACEHOLDER)
    }

    /// Placeholder for a worker that never answered (stream mode).
    pub fn no_response(worker: WorkerId) -> Self {
        Self::placeholder(worker, NO_RESPONSE_PLACEHOLDER)
    }

    fn placeholder(worker: WorkerId, content: &str) -> Self {
        Self {
            worker,
            content: content.to_string(),
            elapsed_time: None,
            usage: None,
            cost: None,
            attempt: Attempt::Placeholder,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.attempt == Attempt::Placeholder
    }
}

/// A judge's stage-2 verdict
///
/// `parsed_ranking` is untrusted: it may be empty, repeat labels, or name
/// labels that do not exist. It is only resolved during aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgmentRecord {
    pub judge: WorkerId,
    pub raw_text: String,
    pub parsed_ranking: Vec<Label>,
    pub elapsed_time: Option<f64>,
    pub cost: Option<f64>,
}

/// The chairman's stage-3 synthesis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChairmanResult {
    pub worker: WorkerId,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    /// Whether a custom chairman template was used
    #[serde(default)]
    pub custom_instructions: bool,
}

impl ChairmanResult {
    /// Fallback used when the chairman call fails.
    pub fn fallback(worker: WorkerId, custom_instructions: bool) -> Self {
        Self {
            worker,
            content: CHAIRMAN_FALLBACK.to_string(),
            elapsed_time: None,
            cost: None,
            custom_instructions,
        }
    }

    /// Synthetic result for a run where no worker answered stage 1.
    pub fn total_failure() -> Self {
        Self {
            worker: WorkerId::new(TOTAL_FAILURE_WORKER),
            content: TOTAL_FAILURE_MESSAGE.to_string(),
            elapsed_time: None,
            cost: None,
            custom_instructions: false,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.content == CHAIRMAN_FALLBACK || self.content == TOTAL_FAILURE_MESSAGE
    }
}

/// Count records that carry a real answer.
pub fn count_answered(records: &[ResponseRecord]) -> usize {
    records.iter().filter(|r| !r.is_placeholder()).count()
}
