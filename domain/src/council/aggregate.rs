//! Rank aggregation across judges.
//!
//! Turns every judge's parsed ranking into a per-worker average position,
//! and rolls up the time and cost each worker spent across both stages.
//! The result is derived data: it is recomputed from the records on every
//! run and never treated as a source of truth.

use crate::core::worker::WorkerId;
use crate::council::label::LabelMap;
use crate::council::record::{JudgmentRecord, ResponseRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One worker's aggregate standing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateEntry {
    pub worker: WorkerId,
    /// Mean 1-based position across all rankings it appeared in (lower is better)
    pub average_rank: f64,
    /// Number of positions received
    pub rankings_count: usize,
    /// Stage-1 time (every record, retries included) plus stage-2 judging time
    pub total_elapsed_time: f64,
    /// Stage-1 cost (every record, retries included) plus stage-2 judging cost
    pub total_cost: f64,
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Default, Clone, Copy)]
struct Spend {
    elapsed: f64,
    cost: f64,
}

impl Spend {
    fn add(&mut self, elapsed: Option<f64>, cost: Option<f64>) {
        self.elapsed += elapsed.unwrap_or(0.0);
        self.cost += cost.unwrap_or(0.0);
    }
}

/// Aggregate judge rankings into a best-first list.
///
/// - Positions are 1-based within each judge's `parsed_ranking`.
/// - Labels the [`LabelMap`] cannot resolve are dropped silently.
/// - Workers that received no position are absent from the output.
/// - Ordering is a stable sort on `average_rank` alone, so equal averages keep
///   the order in which workers first received a position.
pub fn aggregate_rankings(
    judgments: &[JudgmentRecord],
    label_map: &LabelMap,
    responses: &[ResponseRecord],
) -> Vec<AggregateEntry> {
    let mut order: Vec<WorkerId> = Vec::new();
    let mut positions: HashMap<WorkerId, Vec<usize>> = HashMap::new();

    for judgment in judgments {
        for (index, label) in judgment.parsed_ranking.iter().enumerate() {
            let Some(worker) = label_map.resolve(label) else {
                continue;
            };
            let entry = positions.entry(worker.clone()).or_insert_with(|| {
                order.push(worker.clone());
                Vec::new()
            });
            entry.push(index + 1);
        }
    }

    let mut spend: HashMap<&WorkerId, Spend> = HashMap::new();
    for record in responses {
        spend
            .entry(&record.worker)
            .or_default()
            .add(record.elapsed_time, record.cost);
    }
    for judgment in judgments {
        spend
            .entry(&judgment.judge)
            .or_default()
            .add(judgment.elapsed_time, judgment.cost);
    }

    let mut aggregate: Vec<AggregateEntry> = order
        .into_iter()
        .filter_map(|worker| {
            let worker_positions = positions.get(&worker)?;
            if worker_positions.is_empty() {
                return None;
            }
            let sum: usize = worker_positions.iter().sum();
            let mean = sum as f64 / worker_positions.len() as f64;
            let totals = spend.get(&worker).copied().unwrap_or_default();
            Some(AggregateEntry {
                average_rank: round2(mean),
                rankings_count: worker_positions.len(),
                total_elapsed_time: round2(totals.elapsed),
                total_cost: round2(totals.cost),
                worker,
            })
        })
        .collect();

    aggregate.sort_by(|a, b| a.average_rank.total_cmp(&b.average_rank));
    aggregate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::council::label::Label;

    fn judgment(judge: &str, ranking: &[&str]) -> JudgmentRecord {
        JudgmentRecord {
            judge: WorkerId::new(judge),
            raw_text: String::new(),
            parsed_ranking: ranking.iter().map(|l| Label::new(*l)).collect(),
            elapsed_time: None,
            cost: None,
        }
    }

    fn two_worker_map() -> LabelMap {
        [
            (Label::new("Response A"), WorkerId::new("m1")),
            (Label::new("Response B"), WorkerId::new("m2")),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_split_vote_averages_to_one_and_a_half() {
        let judgments = vec![
            judgment("j1", &["Response B", "Response A"]),
            judgment("j2", &["Response A", "Response B"]),
        ];
        let aggregate = aggregate_rankings(&judgments, &two_worker_map(), &[]);

        assert_eq!(aggregate.len(), 2);
        for entry in &aggregate {
            assert_eq!(entry.average_rank, 1.5);
            assert_eq!(entry.rankings_count, 2);
        }
        // Tie keeps first-accumulation order: m2 was ranked first by j1.
        assert_eq!(aggregate[0].worker.as_str(), "m2");
        assert_eq!(aggregate[1].worker.as_str(), "m1");
    }

    #[test]
    fn test_unranked_worker_is_absent() {
        let map: LabelMap = [
            (Label::new("Response A"), WorkerId::new("m1")),
            (Label::new("Response B"), WorkerId::new("m2")),
            (Label::new("Response C"), WorkerId::new("m3")),
        ]
        .into_iter()
        .collect();
        let judgments = vec![judgment("j1", &["Response A", "Response B"])];
        let aggregate = aggregate_rankings(&judgments, &map, &[]);

        assert_eq!(aggregate.len(), 2);
        assert!(aggregate.iter().all(|e| e.worker.as_str() != "m3"));
    }

    #[test]
    fn test_unknown_labels_are_dropped_but_keep_positions() {
        let judgments = vec![judgment("j1", &["Response Q", "Response B", "Response A"])];
        let aggregate = aggregate_rankings(&judgments, &two_worker_map(), &[]);

        assert_eq!(aggregate[0].worker.as_str(), "m2");
        assert_eq!(aggregate[0].average_rank, 2.0);
        assert_eq!(aggregate[1].worker.as_str(), "m1");
        assert_eq!(aggregate[1].average_rank, 3.0);
    }

    #[test]
    fn test_empty_rankings_produce_empty_aggregate() {
        let judgments = vec![judgment("j1", &[])];
        assert!(aggregate_rankings(&judgments, &two_worker_map(), &[]).is_empty());
        assert!(aggregate_rankings(&[], &two_worker_map(), &[]).is_empty());
    }

    #[test]
    fn test_sorted_ascending_by_average_rank() {
        let judgments = vec![
            judgment("j1", &["Response A", "Response B"]),
            judgment("j2", &["Response B", "Response A"]),
            judgment("j3", &["Response B", "Response A"]),
        ];
        let aggregate = aggregate_rankings(&judgments, &two_worker_map(), &[]);

        assert_eq!(aggregate[0].worker.as_str(), "m2");
        assert_eq!(aggregate[0].average_rank, 1.33);
        assert_eq!(aggregate[1].worker.as_str(), "m1");
        assert_eq!(aggregate[1].average_rank, 1.67);
    }

    #[test]
    fn test_time_and_cost_roll_up_both_stages() {
        let responses = vec![
            ResponseRecord::might_retry(WorkerId::new("m1")),
            ResponseRecord::second_attempt(WorkerId::new("m1"), "late", Some(4.0), None, Some(0.5)),
            ResponseRecord::answered(WorkerId::new("m2"), "ok", Some(2.0), None, Some(0.25)),
        ];
        let mut j1 = judgment("m1", &["Response A", "Response B"]);
        j1.elapsed_time = Some(1.5);
        j1.cost = Some(0.1);
        let mut j2 = judgment("m2", &["Response A", "Response B"]);
        j2.elapsed_time = Some(3.0);

        let aggregate = aggregate_rankings(&[j1, j2], &two_worker_map(), &responses);
        let m1 = aggregate.iter().find(|e| e.worker.as_str() == "m1").unwrap();
        let m2 = aggregate.iter().find(|e| e.worker.as_str() == "m2").unwrap();

        assert_eq!(m1.total_elapsed_time, 5.5);
        assert_eq!(m1.total_cost, 0.6);
        assert_eq!(m2.total_elapsed_time, 5.0);
        assert_eq!(m2.total_cost, 0.25);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.0 / 3.0), 0.33);
        assert_eq!(round2(2.0 / 3.0), 0.67);
        assert_eq!(round2(1.5), 1.5);
    }
}
