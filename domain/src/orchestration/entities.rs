//! Orchestration domain entities
//!
//! - [`CouncilConfig`] - immutable snapshot of who answers and who chairs
//! - [`CouncilStage`] - the stage-transition state machine
//! - [`CouncilRun`] - one run tracking its current stage

use crate::core::error::DomainError;
use crate::core::question::Question;
use crate::core::worker::WorkerId;
use crate::orchestration::mode::ExecutionMode;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Default title-generation worker (fast and cheap).
pub const DEFAULT_TITLE_MODEL: &str = "google/gemini-2.5-flash";

/// Stage of a council run
///
/// ```text
/// CollectingResponses ──► CollectingRankings ──► Synthesizing ──► Done
///        │
///        └──► Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouncilStage {
    CollectingResponses,
    CollectingRankings,
    Synthesizing,
    Done,
    Failed,
}

impl CouncilStage {
    pub fn as_str(&self) -> &str {
        match self {
            CouncilStage::CollectingResponses => "collecting_responses",
            CouncilStage::CollectingRankings => "collecting_rankings",
            CouncilStage::Synthesizing => "synthesizing",
            CouncilStage::Done => "done",
            CouncilStage::Failed => "failed",
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            CouncilStage::CollectingResponses => "Stage 1: Collecting Responses",
            CouncilStage::CollectingRankings => "Stage 2: Peer Rankings",
            CouncilStage::Synthesizing => "Stage 3: Synthesis",
            CouncilStage::Done => "Done",
            CouncilStage::Failed => "Failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, CouncilStage::Done | CouncilStage::Failed)
    }

    /// Whether `self -> next` is a legal transition.
    pub fn can_transition_to(&self, next: CouncilStage) -> bool {
        matches!(
            (self, next),
            (
                CouncilStage::CollectingResponses,
                CouncilStage::CollectingRankings
            ) | (CouncilStage::CollectingResponses, CouncilStage::Failed)
                | (CouncilStage::CollectingRankings, CouncilStage::Synthesizing)
                | (CouncilStage::Synthesizing, CouncilStage::Done)
        )
    }
}

impl std::fmt::Display for CouncilStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Immutable configuration snapshot for one run (Entity)
///
/// Produced by the configuration layer before the run starts and never
/// re-read mid-run, so a run is deterministic with respect to its
/// candidate set and chairman.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouncilConfig {
    /// Active candidate set, in dispatch order
    pub council: Vec<WorkerId>,
    /// Worker that synthesizes the final answer
    pub chairman: WorkerId,
    /// Worker used for the title side task
    pub title_model: WorkerId,
    /// Chairman template override with `{user_query}`, `{stage1_text}`,
    /// `{stage2_text}` placeholders
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chairman_prompt: Option<String>,
}

impl CouncilConfig {
    pub fn new(council: Vec<WorkerId>, chairman: WorkerId) -> Self {
        Self {
            council,
            chairman,
            title_model: WorkerId::new(DEFAULT_TITLE_MODEL),
            chairman_prompt: None,
        }
    }

    pub fn with_title_model(mut self, model: WorkerId) -> Self {
        self.title_model = model;
        self
    }

    pub fn with_chairman_prompt(mut self, prompt: impl Into<String>) -> Self {
        let prompt = prompt.into();
        self.chairman_prompt = if prompt.trim().is_empty() {
            None
        } else {
            Some(prompt)
        };
        self
    }

    /// Validate the candidate set: no duplicates.
    ///
    /// An empty council is valid; the run then fails at stage 1.
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut seen = HashSet::new();
        for worker in &self.council {
            if !seen.insert(worker) {
                return Err(DomainError::DuplicateWorker(worker.to_string()));
            }
        }
        Ok(())
    }
}

/// Represents a single council run (Entity)
///
/// Owns the stage state machine; every transition goes through
/// [`CouncilRun::advance`].
#[derive(Debug, Clone)]
pub struct CouncilRun {
    id: String,
    question: Question,
    mode: ExecutionMode,
    stage: CouncilStage,
}

impl CouncilRun {
    pub fn new(id: impl Into<String>, question: Question, mode: ExecutionMode) -> Self {
        Self {
            id: id.into(),
            question,
            mode,
            stage: CouncilStage::CollectingResponses,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn question(&self) -> &Question {
        &self.question
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    pub fn stage(&self) -> CouncilStage {
        self.stage
    }

    /// Move to `next`, rejecting illegal transitions.
    pub fn advance(&mut self, next: CouncilStage) -> Result<(), DomainError> {
        if !self.stage.can_transition_to(next) {
            return Err(DomainError::InvalidTransition {
                from: self.stage.as_str().to_string(),
                to: next.as_str().to_string(),
            });
        }
        self.stage = next;
        Ok(())
    }
}
