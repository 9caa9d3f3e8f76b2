//! Run Council use case
//!
//! Drives one council run through its stages:
//!
//! ```text
//! CollectingResponses ──► CollectingRankings ──► Synthesizing ──► Done
//!        │ (no answers)
//!        └──► Failed
//! ```
//!
//! In [`ExecutionMode::Batch`] every stage waits for all of its calls. In
//! [`ExecutionMode::QuorumAccelerated`] stages 1 and 2 advance on a majority
//! snapshot while the remaining calls drain in the background; the drains
//! are joined just before the run is persisted.

use crate::config::CouncilTimeouts;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::events::{CouncilEventSink, NoEvents};
use crate::ports::worker_gateway::{InvokeRequest, WorkerGateway};
use crate::use_cases::dispatch::Dispatcher;
use crate::use_cases::generate_title::GenerateTitleUseCase;
use crate::use_cases::shared::{invoke_with_timeout, user_prompt};
use crate::use_cases::stream_collect::{
    CollectorEvent, CollectorHandle, StageRecord, StreamCollector,
};
use council_domain::council::record::count_answered;
use council_domain::orchestration::value_objects::total_cost;
use council_domain::prompt::DEFAULT_TITLE;
use council_domain::{
    ChairmanResult, ChatMessage, CouncilConfig, CouncilEvent, CouncilOutcome, CouncilRun,
    CouncilStage, DomainError, ExecutionMode, FeatureFlags, JudgmentRecord, LabelMap,
    PromptTemplate, Question, ResponseRecord, RunMetadata, WorkerId,
};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Errors that can occur before or during a council run
///
/// Worker failures are never errors; they degrade into placeholders,
/// omitted judgments or the chairman fallback.
#[derive(Error, Debug)]
pub enum RunCouncilError {
    #[error("Invalid council configuration: {0}")]
    InvalidConfig(DomainError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] DomainError),
}

/// Input for the RunCouncil use case
#[derive(Debug, Clone)]
pub struct RunCouncilInput {
    pub question: Question,
    /// Configuration snapshot taken before the run starts
    pub config: CouncilConfig,
    pub mode: ExecutionMode,
    /// Forwarded to stage-1 calls only
    pub features: FeatureFlags,
    /// Run the title side task concurrently with the stages
    pub generate_title: bool,
}

impl RunCouncilInput {
    pub fn new(question: Question, config: CouncilConfig) -> Self {
        Self {
            question,
            config,
            mode: ExecutionMode::default(),
            features: FeatureFlags::default(),
            generate_title: false,
        }
    }

    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_features(mut self, features: FeatureFlags) -> Self {
        self.features = features;
        self
    }

    pub fn with_title(mut self, enabled: bool) -> Self {
        self.generate_title = enabled;
        self
    }
}

type Drain<T> = JoinHandle<Option<Vec<T>>>;

/// What stage 1 hands to the rest of the pipeline
struct Stage1Output {
    /// Records the judges and the chairman see
    ranking_input: Vec<ResponseRecord>,
    background: Option<Drain<ResponseRecord>>,
}

struct Stage2Output {
    judgments: Vec<JudgmentRecord>,
    background: Option<Drain<JudgmentRecord>>,
}

/// Use case for running a council
pub struct RunCouncilUseCase<G: WorkerGateway + 'static> {
    gateway: Arc<G>,
    timeouts: CouncilTimeouts,
    logger: Arc<dyn ConversationLogger>,
}

impl<G: WorkerGateway + 'static> RunCouncilUseCase<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            timeouts: CouncilTimeouts::default(),
            logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_timeouts(mut self, timeouts: CouncilTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Execute the use case without event reporting
    pub async fn execute(&self, input: RunCouncilInput) -> Result<CouncilOutcome, RunCouncilError> {
        self.execute_with_events(input, Arc::new(NoEvents)).await
    }

    /// Execute the use case, reporting progress to `events`
    pub async fn execute_with_events(
        &self,
        input: RunCouncilInput,
        events: Arc<dyn CouncilEventSink>,
    ) -> Result<CouncilOutcome, RunCouncilError> {
        input
            .config
            .validate()
            .map_err(RunCouncilError::InvalidConfig)?;

        let started = Instant::now();
        let run_id = format!("run-{}", chrono::Utc::now().format("%Y%m%dT%H%M%S%.3fZ"));
        let mut run = CouncilRun::new(run_id, input.question.clone(), input.mode);

        info!(
            "Starting council run {} ({}, {} workers, chairman {})",
            run.id(),
            run.mode(),
            input.config.council.len(),
            input.config.chairman
        );

        let title_task = input.generate_title.then(|| self.spawn_title(&input));

        // Stage 1
        info!("{}", run.stage());
        let stage1 = match run.mode() {
            ExecutionMode::Batch => self.stage1_batch(&input, &events).await,
            ExecutionMode::QuorumAccelerated => self.stage1_quorum(&input, &events).await,
        };

        if count_answered(&stage1.ranking_input) == 0 {
            warn!("All workers failed to respond");
            run.advance(CouncilStage::Failed)?;
            let stage3 = ChairmanResult::total_failure();
            events.emit(&CouncilEvent::AllModelsFailed {
                result: stage3.clone(),
            });

            let stage1_full = join_drain(stage1.background, stage1.ranking_input).await;
            return Ok(self
                .finish(
                    &run,
                    &input,
                    &events,
                    started,
                    title_task,
                    stage1_full,
                    Vec::new(),
                    stage3,
                    RunMetadata::default(),
                )
                .await);
        }

        // Stage 2
        run.advance(CouncilStage::CollectingRankings)?;
        info!("{}", run.stage());
        let ranking_input = stage1.ranking_input;
        let label_map = LabelMap::from_records(&ranking_input);
        let stage2 = self
            .stage2(&input, &events, &ranking_input, &label_map)
            .await;

        // Stage 3
        run.advance(CouncilStage::Synthesizing)?;
        info!("{}", run.stage());
        events.emit(&CouncilEvent::Stage3Start);
        let stage3 = self
            .synthesize(&input, &ranking_input, &stage2.judgments)
            .await;
        events.emit(&CouncilEvent::Stage3Complete {
            result: stage3.clone(),
        });
        run.advance(CouncilStage::Done)?;

        let stage1_full = join_drain(stage1.background, ranking_input).await;
        let stage2_full = join_drain(stage2.background, stage2.judgments).await;
        let metadata = RunMetadata::compute(&stage2_full, &label_map, &stage1_full);

        Ok(self
            .finish(
                &run,
                &input,
                &events,
                started,
                title_task,
                stage1_full,
                stage2_full,
                stage3,
                metadata,
            )
            .await)
    }

    fn spawn_title(&self, input: &RunCouncilInput) -> JoinHandle<String> {
        let use_case =
            GenerateTitleUseCase::new(Arc::clone(&self.gateway), input.config.title_model.clone())
                .with_timeout(self.timeouts.title);
        let question = input.question.content().to_string();
        tokio::spawn(async move { use_case.execute(&question).await })
    }

    async fn stage1_batch(
        &self,
        input: &RunCouncilInput,
        events: &Arc<dyn CouncilEventSink>,
    ) -> Stage1Output {
        events.emit(&CouncilEvent::Stage1Start {
            total: input.config.council.len(),
        });

        let results = Dispatcher::new(Arc::clone(&self.gateway))
            .with_first_attempt_timeout(self.timeouts.first_attempt)
            .collect(
                &input.config.council,
                stage1_messages(input),
                input.features,
            )
            .await;

        events.emit(&CouncilEvent::Stage1Complete {
            results: results.clone(),
        });
        Stage1Output {
            ranking_input: results,
            background: None,
        }
    }

    async fn stage1_quorum(
        &self,
        input: &RunCouncilInput,
        events: &Arc<dyn CouncilEventSink>,
    ) -> Stage1Output {
        let council = input.config.council.clone();
        events.emit(&CouncilEvent::Stage1Start {
            total: council.len(),
        });

        let handle: CollectorHandle<ResponseRecord> = self.collector().spawn(
            council.clone(),
            stage1_messages(input),
            input.features,
        );

        match advance_on_majority(handle, events, stage1_event).await {
            Some((ranking_input, background)) => Stage1Output {
                ranking_input,
                background,
            },
            None => Stage1Output {
                ranking_input: council
                    .into_iter()
                    .map(ResponseRecord::no_response)
                    .collect(),
                background: None,
            },
        }
    }

    async fn stage2(
        &self,
        input: &RunCouncilInput,
        events: &Arc<dyn CouncilEventSink>,
        ranking_input: &[ResponseRecord],
        label_map: &LabelMap,
    ) -> Stage2Output {
        // Only workers that answered get to judge
        let judges: Vec<WorkerId> = input
            .config
            .council
            .iter()
            .filter(|w| label_map.label_of(w).is_some())
            .cloned()
            .collect();
        let messages = user_prompt(PromptTemplate::ranking_prompt(
            input.question.content(),
            ranking_input,
            label_map,
        ));

        events.emit(&CouncilEvent::Stage2Start {
            total: judges.len(),
        });

        match input.mode {
            ExecutionMode::Batch => {
                let replies = Dispatcher::new(Arc::clone(&self.gateway))
                    .dispatch_round(
                        &judges,
                        messages,
                        self.timeouts.first_attempt,
                        FeatureFlags::none(),
                    )
                    .await;
                let judgments: Vec<JudgmentRecord> = judges
                    .iter()
                    .zip(replies)
                    .filter_map(|(judge, reply)| {
                        reply.map(|r| JudgmentRecord::from_reply(judge, r))
                    })
                    .collect();

                events.emit(&CouncilEvent::Stage2Complete {
                    results: judgments.clone(),
                    metadata: RunMetadata::compute(&judgments, label_map, ranking_input),
                });
                Stage2Output {
                    judgments,
                    background: None,
                }
            }
            ExecutionMode::QuorumAccelerated => {
                let handle: CollectorHandle<JudgmentRecord> =
                    self.collector()
                        .spawn(judges, messages, FeatureFlags::none());

                let label_map = label_map.clone();
                let responses = ranking_input.to_vec();
                let to_event = move |event: &CollectorEvent<JudgmentRecord>| {
                    stage2_event(event, &label_map, &responses)
                };

                match advance_on_majority(handle, events, to_event).await {
                    Some((judgments, background)) => Stage2Output {
                        judgments,
                        background,
                    },
                    None => Stage2Output {
                        judgments: Vec::new(),
                        background: None,
                    },
                }
            }
        }
    }

    async fn synthesize(
        &self,
        input: &RunCouncilInput,
        responses: &[ResponseRecord],
        judgments: &[JudgmentRecord],
    ) -> ChairmanResult {
        let chairman = input.config.chairman.clone();
        let custom_instructions = input.config.chairman_prompt.is_some();
        let prompt = PromptTemplate::chairman_prompt(
            input.question.content(),
            responses,
            judgments,
            input.config.chairman_prompt.as_deref(),
        );
        let request = InvokeRequest::new(
            chairman.clone(),
            user_prompt(prompt),
            self.timeouts.chairman,
            FeatureFlags::none(),
        );

        match invoke_with_timeout(self.gateway.as_ref(), request).await {
            Ok(reply) => ChairmanResult {
                worker: chairman,
                content: reply.content,
                elapsed_time: reply.elapsed_time,
                cost: reply.cost,
                custom_instructions,
            },
            Err(e) => {
                warn!("Chairman {} failed: {}", chairman, e);
                ChairmanResult::fallback(chairman, custom_instructions)
            }
        }
    }

    /// Join the title task, persist the run and emit the closing events.
    #[allow(clippy::too_many_arguments)]
    async fn finish(
        &self,
        run: &CouncilRun,
        input: &RunCouncilInput,
        events: &Arc<dyn CouncilEventSink>,
        started: Instant,
        title_task: Option<JoinHandle<String>>,
        stage1: Vec<ResponseRecord>,
        stage2: Vec<JudgmentRecord>,
        stage3: ChairmanResult,
        metadata: RunMetadata,
    ) -> CouncilOutcome {
        let title = match title_task {
            Some(task) => {
                let title = task.await.unwrap_or_else(|e| {
                    warn!("Title task failed: {}", e);
                    DEFAULT_TITLE.to_string()
                });
                events.emit(&CouncilEvent::TitleComplete {
                    title: title.clone(),
                });
                Some(title)
            }
            None => None,
        };

        let outcome = CouncilOutcome {
            question: run.question().content().to_string(),
            mode: run.mode(),
            features: input.features,
            total_cost: total_cost(&stage1, &stage2),
            stage1,
            stage2,
            stage3,
            metadata,
            title,
            elapsed_running_time: started.elapsed().as_secs_f64(),
        };

        match serde_json::to_value(&outcome) {
            Ok(payload) => self
                .logger
                .log(ConversationEvent::new("council_run", payload)),
            Err(e) => warn!("Failed to serialize council run: {}", e),
        }

        events.emit(&CouncilEvent::TimingComplete {
            elapsed_running_time: outcome.elapsed_running_time,
            total_cost: outcome.total_cost,
            web_search: input.features.web_search,
            quick_mode: run.mode().is_quorum(),
            coding_mode: input.features.coding_mode,
        });
        events.emit(&CouncilEvent::Complete);

        if outcome.stage3.is_fallback() {
            warn!("Council run {} finished without a synthesis", run.id());
        }
        info!(
            "Council run {} finished in {:.1}s (cost {:.2})",
            run.id(),
            outcome.elapsed_running_time,
            outcome.total_cost
        );
        outcome
    }

    fn collector(&self) -> StreamCollector<G> {
        StreamCollector::new(Arc::clone(&self.gateway)).with_timeout(self.timeouts.first_attempt)
    }
}

fn stage1_messages(input: &RunCouncilInput) -> Arc<[ChatMessage]> {
    user_prompt(input.question.content().to_string())
}

/// Forward streamed events until a majority (or the end of the stage).
///
/// On a majority the handle keeps draining in the background, still
/// forwarding every event. Returns `None` if the stream ended abnormally.
async fn advance_on_majority<T, F>(
    mut handle: CollectorHandle<T>,
    events: &Arc<dyn CouncilEventSink>,
    to_event: F,
) -> Option<(Vec<T>, Option<Drain<T>>)>
where
    T: StageRecord,
    F: Fn(&CollectorEvent<T>) -> CouncilEvent + Send + 'static,
{
    loop {
        let Some(event) = handle.next_event().await else {
            warn!("Collector stream ended without a final result");
            return None;
        };
        events.emit(&to_event(&event));

        match event {
            CollectorEvent::MajorityReached { results, .. } => {
                debug!("Majority reached with {} result(s)", results.len());
                let sink = Arc::clone(events);
                let background =
                    handle.finish_in_background(move |event| sink.emit(&to_event(event)));
                return Some((results, Some(background)));
            }
            CollectorEvent::StageComplete { results } => return Some((results, None)),
            _ => {}
        }
    }
}

/// Wait for a background drain, falling back to what is already known.
async fn join_drain<T>(background: Option<Drain<T>>, known: Vec<T>) -> Vec<T> {
    let Some(task) = background else {
        return known;
    };
    match task.await {
        Ok(Some(results)) => results,
        Ok(None) => known,
        Err(e) => {
            warn!("Background collection failed: {}", e);
            known
        }
    }
}

fn stage1_event(event: &CollectorEvent<ResponseRecord>) -> CouncilEvent {
    match event {
        CollectorEvent::ModelComplete {
            worker,
            record,
            completed,
            total,
        } => CouncilEvent::Stage1ModelComplete {
            worker: worker.clone(),
            record: record.clone(),
            completed: *completed,
            total: *total,
        },
        CollectorEvent::ModelFailed {
            worker,
            completed,
            total,
        } => CouncilEvent::Stage1ModelFailed {
            worker: worker.clone(),
            completed: *completed,
            total: *total,
        },
        CollectorEvent::MajorityReached {
            results,
            completed,
            total,
        } => CouncilEvent::Stage1Majority {
            results: results.clone(),
            completed: *completed,
            total: *total,
        },
        CollectorEvent::StageComplete { results } => CouncilEvent::Stage1Complete {
            results: results.clone(),
        },
    }
}

fn stage2_event(
    event: &CollectorEvent<JudgmentRecord>,
    label_map: &LabelMap,
    responses: &[ResponseRecord],
) -> CouncilEvent {
    match event {
        CollectorEvent::ModelComplete {
            worker,
            record,
            completed,
            total,
        } => CouncilEvent::Stage2ModelComplete {
            worker: worker.clone(),
            record: record.clone(),
            completed: *completed,
            total: *total,
        },
        CollectorEvent::ModelFailed {
            worker,
            completed,
            total,
        } => CouncilEvent::Stage2ModelFailed {
            worker: worker.clone(),
            completed: *completed,
            total: *total,
        },
        CollectorEvent::MajorityReached {
            results,
            completed,
            total,
        } => CouncilEvent::Stage2Majority {
            results: results.clone(),
            metadata: RunMetadata::compute(results, label_map, responses),
            completed: *completed,
            total: *total,
        },
        CollectorEvent::StageComplete { results } => CouncilEvent::Stage2Complete {
            results: results.clone(),
            metadata: RunMetadata::compute(results, label_map, responses),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::testing::{RecordingLogger, RecordingSink, Script, ScriptedGateway};
    use council_domain::Attempt;
    use council_domain::council::record::{CHAIRMAN_FALLBACK, TOTAL_FAILURE_MESSAGE};
    use std::time::Duration;

    fn config(council: &[&str]) -> CouncilConfig {
        CouncilConfig::new(
            council.iter().map(|w| WorkerId::new(*w)).collect(),
            WorkerId::new("chair"),
        )
        .with_title_model(WorkerId::new("titler"))
    }

    fn input(council: &[&str]) -> RunCouncilInput {
        RunCouncilInput::new(Question::new("What is Rust?").unwrap(), config(council))
    }

    fn use_case(gateway: ScriptedGateway) -> (Arc<ScriptedGateway>, RunCouncilUseCase<ScriptedGateway>) {
        let gateway = Arc::new(gateway);
        let use_case = RunCouncilUseCase::new(Arc::clone(&gateway)).with_timeouts(
            CouncilTimeouts::default()
                .with_first_attempt(Duration::from_secs(2))
                .with_chairman(Duration::from_secs(2))
                .with_title(Duration::from_secs(2)),
        );
        (gateway, use_case)
    }

    const RANK_BAC: &str = "B is best.\n\nFINAL RANKING:\n1. Response B\n2. Response A\n3. Response C";

    #[tokio::test]
    async fn test_batch_full_run() {
        let (gateway, use_case) = use_case(
            ScriptedGateway::new()
                .script("m1", vec![Script::costed("A answer", 0.1), Script::costed(RANK_BAC, 0.01)])
                .script("m2", vec![Script::costed("B answer", 0.2), Script::reply(RANK_BAC, 1.0)])
                .script("m3", vec![Script::reply("C answer", 1.0), Script::reply(RANK_BAC, 1.0)])
                .script("chair", vec![Script::reply("Final synthesis", 2.0)]),
        );
        let sink = Arc::new(RecordingSink::default());

        let outcome = use_case
            .execute_with_events(input(&["m1", "m2", "m3"]), sink.clone())
            .await
            .unwrap();

        assert_eq!(outcome.stage1.len(), 3);
        assert_eq!(outcome.stage2.len(), 3);
        assert_eq!(outcome.stage3.content, "Final synthesis");
        assert!(!outcome.is_failed());
        assert!(outcome.title.is_none());
        assert_eq!(outcome.total_cost, 0.31);

        let ranked: Vec<_> = outcome
            .metadata
            .aggregate_rankings
            .iter()
            .map(|e| e.worker.as_str())
            .collect();
        assert_eq!(ranked, vec!["m2", "m1", "m3"]);
        assert_eq!(outcome.metadata.aggregate_rankings[0].average_rank, 1.0);

        assert_eq!(
            sink.types(),
            vec![
                "stage1_start",
                "stage1_complete",
                "stage2_start",
                "stage2_complete",
                "stage3_start",
                "stage3_complete",
                "timing_complete",
                "complete",
            ]
        );

        let ranking_prompt = &gateway.calls_for("m1")[1].prompt;
        assert!(ranking_prompt.contains("Response A:\nA answer"));
        assert!(!ranking_prompt.contains("m2"));
        let chair_prompt = &gateway.calls_for("chair")[0].prompt;
        assert!(chair_prompt.contains("Model: m1"));
    }

    #[tokio::test]
    async fn test_all_workers_fail() {
        let (gateway, use_case) = use_case(
            ScriptedGateway::new()
                .script("m1", vec![Script::Fail, Script::Fail])
                .script("m2", vec![Script::Fail, Script::Fail]),
        );
        let sink = Arc::new(RecordingSink::default());

        let outcome = use_case
            .execute_with_events(input(&["m1", "m2"]), sink.clone())
            .await
            .unwrap();

        assert!(outcome.is_failed());
        assert_eq!(outcome.stage3.worker.as_str(), "error");
        assert_eq!(outcome.stage3.content, TOTAL_FAILURE_MESSAGE);
        assert!(outcome.stage2.is_empty());
        assert!(outcome.metadata.aggregate_rankings.is_empty());
        assert!(gateway.calls_for("chair").is_empty());

        let types = sink.types();
        assert!(types.contains(&"all_models_failed"));
        assert!(!types.contains(&"stage2_start"));
        assert_eq!(types.last(), Some(&"complete"));
    }

    #[tokio::test]
    async fn test_empty_council_fails() {
        let (gateway, use_case) = use_case(ScriptedGateway::new());
        let outcome = use_case.execute(input(&[])).await.unwrap();
        assert!(outcome.is_failed());
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_chairman_failure_falls_back() {
        let (_, use_case) = use_case(
            ScriptedGateway::new()
                .script("m1", vec![Script::reply("A", 1.0), Script::reply(RANK_BAC, 1.0)])
                .script("chair", vec![Script::Fail]),
        );
        let sink = Arc::new(RecordingSink::default());

        let outcome = use_case
            .execute_with_events(input(&["m1"]), sink.clone())
            .await
            .unwrap();

        assert_eq!(outcome.stage3.content, CHAIRMAN_FALLBACK);
        assert_eq!(outcome.stage3.worker.as_str(), "chair");
        assert_eq!(sink.count("stage3_complete"), 1);
        assert_eq!(sink.types().last(), Some(&"complete"));
    }

    #[tokio::test]
    async fn test_only_answering_workers_judge() {
        let (gateway, use_case) = use_case(
            ScriptedGateway::new()
                .script("m1", vec![Script::reply("A", 1.0), Script::reply(RANK_BAC, 1.0)])
                .script("m2", vec![Script::Fail, Script::Fail])
                .script("chair", vec![Script::reply("done", 1.0)]),
        );

        let outcome = use_case.execute(input(&["m1", "m2"])).await.unwrap();

        // first attempt and retry only
        assert_eq!(gateway.calls_for("m2").len(), 2);
        assert_eq!(outcome.stage2.len(), 1);
        assert_eq!(outcome.stage1.len(), 2);
        assert_eq!(outcome.metadata.label_to_model.len(), 1);
    }

    #[tokio::test]
    async fn test_second_attempt_is_labelled_and_judges() {
        let (gateway, use_case) = use_case(
            ScriptedGateway::new()
                .script("m1", vec![Script::reply("A", 1.0), Script::reply(RANK_BAC, 1.0)])
                .script(
                    "m2",
                    vec![Script::Fail, Script::reply("B", 1.0), Script::reply(RANK_BAC, 1.0)],
                )
                .script("chair", vec![Script::reply("done", 1.0)]),
        );

        let outcome = use_case.execute(input(&["m1", "m2"])).await.unwrap();

        let attempts: Vec<_> = outcome.stage1.iter().map(|r| r.attempt).collect();
        assert_eq!(
            attempts,
            vec![Attempt::First, Attempt::Placeholder, Attempt::Second]
        );
        assert_eq!(gateway.calls_for("m2").len(), 3);
        assert_eq!(outcome.stage2.len(), 2);
        let label = outcome
            .metadata
            .label_to_model
            .label_of(&WorkerId::new("m2"))
            .unwrap();
        assert_eq!(label.as_str(), "Response B");
    }

    #[tokio::test]
    async fn test_quorum_advances_on_majority() {
        let (gateway, use_case) = use_case(
            ScriptedGateway::new()
                .script(
                    "m1",
                    vec![Script::reply_after("A", 1), Script::reply_after(RANK_BAC, 1)],
                )
                .script(
                    "m2",
                    vec![Script::reply_after("B", 10), Script::reply_after(RANK_BAC, 60)],
                )
                .script("m3", vec![Script::reply_after("C", 250)])
                .script("chair", vec![Script::reply("fast synthesis", 1.0)]),
        );
        let sink = Arc::new(RecordingSink::default());

        let outcome = use_case
            .execute_with_events(
                input(&["m1", "m2", "m3"]).with_mode(ExecutionMode::QuorumAccelerated),
                sink.clone(),
            )
            .await
            .unwrap();

        // m3 was not part of the majority snapshot, so it never judged
        assert_eq!(gateway.calls_for("m3").len(), 1);
        assert_eq!(outcome.stage3.content, "fast synthesis");

        // background drains were joined before persisting
        assert_eq!(outcome.stage1.len(), 3);
        assert!(outcome.stage1.iter().all(|r| !r.is_placeholder()));
        assert_eq!(outcome.stage2.len(), 2);
        assert_eq!(outcome.metadata.label_to_model.len(), 2);

        // the chairman only saw the snapshot
        let chair_prompt = &gateway.calls_for("chair")[0].prompt;
        assert!(!chair_prompt.contains("Model: m3"));

        assert_eq!(sink.count("stage1_majority"), 1);
        assert_eq!(sink.count("stage2_majority"), 1);
        assert_eq!(sink.count("stage1_complete"), 1);
        assert_eq!(sink.count("stage2_complete"), 1);
        assert_eq!(sink.count("stage1_model_complete"), 3);
        assert_eq!(sink.types().last(), Some(&"complete"));

        let timing = sink
            .events()
            .into_iter()
            .find_map(|e| match e {
                CouncilEvent::TimingComplete { quick_mode, .. } => Some(quick_mode),
                _ => None,
            });
        assert_eq!(timing, Some(true));
    }

    #[tokio::test]
    async fn test_quorum_without_majority_waits_for_stage() {
        let (gateway, use_case) = use_case(
            ScriptedGateway::new()
                .script("m1", vec![Script::reply("A", 1.0), Script::reply(RANK_BAC, 1.0)])
                .script("m2", vec![Script::Fail])
                .script("m3", vec![Script::Fail])
                .script("chair", vec![Script::reply("synthesis", 1.0)]),
        );
        let sink = Arc::new(RecordingSink::default());

        let outcome = use_case
            .execute_with_events(
                input(&["m1", "m2", "m3"]).with_mode(ExecutionMode::QuorumAccelerated),
                sink.clone(),
            )
            .await
            .unwrap();

        // one success out of three never reaches ceil(3/2)
        assert_eq!(sink.count("stage1_majority"), 0);
        assert_eq!(sink.count("stage1_complete"), 1);
        assert_eq!(sink.count("stage1_model_failed"), 2);

        // no retry round in quorum mode, and failed workers do not judge
        assert_eq!(gateway.calls_for("m1").len(), 2);
        assert_eq!(gateway.calls_for("m2").len(), 1);
        assert_eq!(gateway.calls_for("m3").len(), 1);

        assert_eq!(outcome.stage1.len(), 3);
        assert_eq!(outcome.stage1.iter().filter(|r| r.is_placeholder()).count(), 2);
        assert_eq!(outcome.metadata.label_to_model.len(), 1);
        assert_eq!(outcome.stage2.len(), 1);
        assert_eq!(outcome.stage3.content, "synthesis");
        assert!(!outcome.is_failed());
    }

    #[tokio::test]
    async fn test_quorum_all_fail() {
        let (_, use_case) = use_case(
            ScriptedGateway::new()
                .script("m1", vec![Script::Fail])
                .script("m2", vec![Script::Fail]),
        );
        let sink = Arc::new(RecordingSink::default());

        let outcome = use_case
            .execute_with_events(
                input(&["m1", "m2"]).with_mode(ExecutionMode::QuorumAccelerated),
                sink.clone(),
            )
            .await
            .unwrap();

        assert!(outcome.is_failed());
        assert_eq!(sink.count("stage1_model_failed"), 2);
        assert_eq!(sink.count("stage1_majority"), 0);
        assert_eq!(sink.count("all_models_failed"), 1);
    }

    #[tokio::test]
    async fn test_title_generated_concurrently() {
        let (_, use_case) = use_case(
            ScriptedGateway::new()
                .script("m1", vec![Script::reply("A", 1.0), Script::reply(RANK_BAC, 1.0)])
                .script("chair", vec![Script::reply("done", 1.0)])
                .script("titler", vec![Script::reply("\"Rust Overview\"", 0.3)]),
        );
        let sink = Arc::new(RecordingSink::default());

        let outcome = use_case
            .execute_with_events(input(&["m1"]).with_title(true), sink.clone())
            .await
            .unwrap();

        assert_eq!(outcome.title.as_deref(), Some("Rust Overview"));
        assert_eq!(sink.count("title_complete"), 1);
    }

    #[tokio::test]
    async fn test_title_failure_uses_default() {
        let (_, use_case) = use_case(
            ScriptedGateway::new()
                .script("m1", vec![Script::reply("A", 1.0), Script::reply(RANK_BAC, 1.0)])
                .script("chair", vec![Script::reply("done", 1.0)]),
        );

        let outcome = use_case
            .execute(input(&["m1"]).with_title(true))
            .await
            .unwrap();
        assert_eq!(outcome.title.as_deref(), Some(DEFAULT_TITLE));
    }

    #[tokio::test]
    async fn test_web_search_only_reaches_stage1() {
        let (gateway, use_case) = use_case(
            ScriptedGateway::new()
                .script("m1", vec![Script::reply("A", 1.0), Script::reply(RANK_BAC, 1.0)])
                .script("chair", vec![Script::reply("done", 1.0)]),
        );

        use_case
            .execute(input(&["m1"]).with_features(FeatureFlags::none().with_web_search(true)))
            .await
            .unwrap();

        let calls = gateway.calls_for("m1");
        assert!(calls[0].web_search);
        assert!(!calls[1].web_search);
        assert!(!gateway.calls_for("chair")[0].web_search);
    }

    #[tokio::test]
    async fn test_custom_chairman_prompt() {
        let (gateway, use_case) = use_case(
            ScriptedGateway::new()
                .script("m1", vec![Script::reply("A", 1.0), Script::reply(RANK_BAC, 1.0)])
                .script("chair", vec![Script::reply("done", 1.0)]),
        );
        let mut run_input = input(&["m1"]);
        run_input.config = run_input
            .config
            .with_chairman_prompt("Q={user_query} {unknown}");

        let outcome = use_case.execute(run_input).await.unwrap();

        assert!(outcome.stage3.custom_instructions);
        assert_eq!(
            gateway.calls_for("chair")[0].prompt,
            "Q=What is Rust? {unknown}"
        );
    }

    #[tokio::test]
    async fn test_duplicate_workers_rejected() {
        let (gateway, use_case) = use_case(ScriptedGateway::new());
        let result = use_case.execute(input(&["m1", "m1"])).await;
        assert!(matches!(result, Err(RunCouncilError::InvalidConfig(_))));
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_run_is_persisted() {
        let gateway = Arc::new(
            ScriptedGateway::new()
                .script("m1", vec![Script::reply("A", 1.0), Script::reply(RANK_BAC, 1.0)])
                .script("chair", vec![Script::reply("done", 1.0)]),
        );
        let logger = Arc::new(RecordingLogger::default());
        let use_case = RunCouncilUseCase::new(gateway).with_logger(logger.clone());

        use_case.execute(input(&["m1"])).await.unwrap();

        let logged = logger.events();
        assert_eq!(logged.len(), 1);
        assert_eq!(logged[0].0, "council_run");
        assert_eq!(logged[0].1["stage3"]["content"], "done");
        assert_eq!(logged[0].1["metadata"]["label_to_model"]["Response A"], "m1");
    }
}
