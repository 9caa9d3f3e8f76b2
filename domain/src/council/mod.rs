//! Council domain
//!
//! Pure data and algorithms behind the three council stages. No I/O.
//!
//! ```text
//! stage 1: question ──► workers ──► ResponseRecord*
//!                                      │ LabelMap (anonymize)
//! stage 2: ranking prompt ──► judges ──► JudgmentRecord* ──► parse_ranking
//!                                      │
//!                          aggregate_rankings ──► AggregateEntry*
//! stage 3: chairman ──► ChairmanResult
//! ```

pub mod aggregate;
pub mod label;
pub mod policy;
pub mod ranking;
pub mod record;

pub use aggregate::{AggregateEntry, aggregate_rankings};
pub use label::{Label, LabelMap};
pub use policy::{majority_threshold, retry_timeout};
pub use ranking::parse_ranking;
pub use record::{Attempt, ChairmanResult, JudgmentRecord, ResponseRecord, TokenUsage};
