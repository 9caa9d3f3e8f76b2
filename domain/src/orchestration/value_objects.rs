//! Orchestration value objects - immutable result types for council runs.
//!
//! - [`RunMetadata`] - label map and aggregate rankings exposed once per run
//! - [`CouncilOutcome`] - complete result containing all stages

use crate::council::aggregate::{AggregateEntry, aggregate_rankings, round2};
use crate::council::label::LabelMap;
use crate::council::record::{ChairmanResult, JudgmentRecord, ResponseRecord};
use crate::orchestration::mode::{ExecutionMode, FeatureFlags};
use serde::Serialize;

/// Aggregate view of a run's peer rankings
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunMetadata {
    pub label_to_model: LabelMap,
    pub aggregate_rankings: Vec<AggregateEntry>,
}

impl RunMetadata {
    /// Recompute the aggregate from records.
    pub fn compute(
        judgments: &[JudgmentRecord],
        label_map: &LabelMap,
        responses: &[ResponseRecord],
    ) -> Self {
        Self {
            label_to_model: label_map.clone(),
            aggregate_rankings: aggregate_rankings(judgments, label_map, responses),
        }
    }
}

/// Complete result of a council run
#[derive(Debug, Clone, Serialize)]
pub struct CouncilOutcome {
    /// The original question
    pub question: String,
    pub mode: ExecutionMode,
    pub features: FeatureFlags,
    /// Stage 1: every record, placeholders included
    pub stage1: Vec<ResponseRecord>,
    /// Stage 2: successful judgments in judge order
    pub stage2: Vec<JudgmentRecord>,
    /// Stage 3: chairman synthesis (or the total-failure result)
    pub stage3: ChairmanResult,
    pub metadata: RunMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Wall-clock seconds for the whole run
    pub elapsed_running_time: f64,
    /// Stage-1 plus stage-2 cost
    pub total_cost: f64,
}

impl CouncilOutcome {
    /// Whether the run short-circuited because no worker answered.
    pub fn is_failed(&self) -> bool {
        self.stage1.iter().all(|r| r.is_placeholder())
    }

    /// Iterate over stage-1 records that carry a real answer.
    pub fn answered_responses(&self) -> impl Iterator<Item = &ResponseRecord> {
        self.stage1.iter().filter(|r| !r.is_placeholder())
    }
}

/// Sum of stage-1 and stage-2 costs, rounded to two decimals.
pub fn total_cost(stage1: &[ResponseRecord], stage2: &[JudgmentRecord]) -> f64 {
    let stage1_cost: f64 = stage1.iter().filter_map(|r| r.cost).sum();
    let stage2_cost: f64 = stage2.iter().filter_map(|j| j.cost).sum();
    round2(stage1_cost + stage2_cost)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::worker::WorkerId;
    use crate::council::label::Label;

    #[test]
    fn test_total_cost_ignores_missing() {
        let stage1 = vec![
            ResponseRecord::answered(WorkerId::new("m1"), "a", None, None, Some(0.5)),
            ResponseRecord::might_retry(WorkerId::new("m2")),
        ];
        let stage2 = vec![JudgmentRecord {
            judge: WorkerId::new("m1"),
            raw_text: String::new(),
            parsed_ranking: vec![],
            elapsed_time: None,
            cost: Some(0.25),
        }];
        assert_eq!(total_cost(&stage1, &stage2), 0.75);
        assert_eq!(total_cost(&[], &[]), 0.0);
    }

    #[test]
    fn test_metadata_compute() {
        let responses = vec![
            ResponseRecord::answered(WorkerId::new("m1"), "a", Some(1.0), None, None),
            ResponseRecord::answered(WorkerId::new("m2"), "b", Some(2.0), None, None),
        ];
        let map = LabelMap::from_records(&responses);
        let judgments = vec![JudgmentRecord {
            judge: WorkerId::new("m1"),
            raw_text: "FINAL RANKING:\n1. Response B\n2. Response A".to_string(),
            parsed_ranking: vec![Label::new("Response B"), Label::new("Response A")],
            elapsed_time: Some(1.0),
            cost: None,
        }];
        let metadata = RunMetadata::compute(&judgments, &map, &responses);
        assert_eq!(metadata.aggregate_rankings.len(), 2);
        assert_eq!(metadata.aggregate_rankings[0].worker.as_str(), "m2");

        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["label_to_model"]["Response A"], "m1");
    }
}
