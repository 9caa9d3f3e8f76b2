//! Events produced while a council run progresses.
//!
//! Serialized with a `type` tag so transport layers can forward them as-is
//! (e.g. one SSE `data:` line per event). Real-time ordering of the
//! per-model events is non-deterministic and only meant for progress
//! reporting; every `*_majority` and `*_complete` payload is in candidate
//! order.

use crate::core::worker::WorkerId;
use crate::council::record::{ChairmanResult, JudgmentRecord, ResponseRecord};
use crate::orchestration::value_objects::RunMetadata;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CouncilEvent {
    Stage1Start {
        total: usize,
    },
    Stage1ModelComplete {
        worker: WorkerId,
        record: ResponseRecord,
        completed: usize,
        total: usize,
    },
    Stage1ModelFailed {
        worker: WorkerId,
        completed: usize,
        total: usize,
    },
    Stage1Majority {
        results: Vec<ResponseRecord>,
        completed: usize,
        total: usize,
    },
    Stage1Complete {
        results: Vec<ResponseRecord>,
    },
    AllModelsFailed {
        result: ChairmanResult,
    },
    Stage2Start {
        total: usize,
    },
    Stage2ModelComplete {
        worker: WorkerId,
        record: JudgmentRecord,
        completed: usize,
        total: usize,
    },
    Stage2ModelFailed {
        worker: WorkerId,
        completed: usize,
        total: usize,
    },
    Stage2Majority {
        results: Vec<JudgmentRecord>,
        metadata: RunMetadata,
        completed: usize,
        total: usize,
    },
    Stage2Complete {
        results: Vec<JudgmentRecord>,
        metadata: RunMetadata,
    },
    Stage3Start,
    Stage3Complete {
        result: ChairmanResult,
    },
    TitleComplete {
        title: String,
    },
    TimingComplete {
        elapsed_running_time: f64,
        total_cost: f64,
        web_search: bool,
        quick_mode: bool,
        coding_mode: bool,
    },
    Complete,
    Error {
        message: String,
    },
}

impl CouncilEvent {
    /// The `type` tag this event serializes with.
    pub fn event_type(&self) -> &'static str {
        match self {
            CouncilEvent::Stage1Start { .. } => "stage1_start",
            CouncilEvent::Stage1ModelComplete { .. } => "stage1_model_complete",
            CouncilEvent::Stage1ModelFailed { .. } => "stage1_model_failed",
            CouncilEvent::Stage1Majority { .. } => "stage1_majority",
            CouncilEvent::Stage1Complete { .. } => "stage1_complete",
            CouncilEvent::AllModelsFailed { .. } => "all_models_failed",
            CouncilEvent::Stage2Start { .. } => "stage2_start",
            CouncilEvent::Stage2ModelComplete { .. } => "stage2_model_complete",
            CouncilEvent::Stage2ModelFailed { .. } => "stage2_model_failed",
            CouncilEvent::Stage2Majority { .. } => "stage2_majority",
            CouncilEvent::Stage2Complete { .. } => "stage2_complete",
            CouncilEvent::Stage3Start => "stage3_start",
            CouncilEvent::Stage3Complete { .. } => "stage3_complete",
            CouncilEvent::TitleComplete { .. } => "title_complete",
            CouncilEvent::TimingComplete { .. } => "timing_complete",
            CouncilEvent::Complete => "complete",
            CouncilEvent::Error { .. } => "error",
        }
    }

    /// Serialize as a single JSON line.
    pub fn to_json_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(
                r#"{{"type":"error","message":"unserializable {} event: {}"}}"#,
                self.event_type(),
                e
            )
        })
    }
}
