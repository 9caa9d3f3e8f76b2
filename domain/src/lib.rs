//! Domain layer for llm-council
//!
//! This crate contains the core records, algorithms and entities of a
//! council run. It has no dependencies on infrastructure or presentation
//! concerns and performs no I/O.
//!
//! # Core Concepts
//!
//! ## Council
//!
//! A council is the active set of answering workers for a run. A run has
//! three stages:
//!
//! - **Collect**: every worker answers the question independently
//! - **Rank**: every worker that answered ranks the anonymized answers
//! - **Synthesize**: a chairman combines answers and rankings
//!
//! ## Trust score
//!
//! Judge verdicts are free text. [`parse_ranking`] extracts an ordered label
//! list, and [`aggregate_rankings`] turns all lists into an average rank per
//! worker (lower is better).

pub mod config;
pub mod core;
pub mod council;
pub mod orchestration;
pub mod prompt;

// Re-export commonly used types
pub use config::OutputFormat;
pub use core::{
    error::DomainError,
    message::{ChatMessage, Role},
    question::Question,
    worker::WorkerId,
};
pub use council::{
    AggregateEntry, Attempt, ChairmanResult, JudgmentRecord, Label, LabelMap, ResponseRecord,
    TokenUsage, aggregate_rankings, majority_threshold, parse_ranking, retry_timeout,
};
pub use orchestration::{
    entities::{CouncilConfig, CouncilRun, CouncilStage},
    event::CouncilEvent,
    mode::{ExecutionMode, FeatureFlags},
    value_objects::{CouncilOutcome, RunMetadata},
};
pub use prompt::PromptTemplate;
