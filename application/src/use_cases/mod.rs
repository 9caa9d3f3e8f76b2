//! Use cases (application services)
//!
//! - [`Dispatcher`](dispatch::Dispatcher) — batch fan-out with one retry round
//! - [`StreamCollector`](stream_collect::StreamCollector) — streamed fan-out with a majority signal
//! - [`RunCouncilUseCase`](run_council::RunCouncilUseCase) — the three-stage pipeline
//! - [`GenerateTitleUseCase`](generate_title::GenerateTitleUseCase) — title side task

pub mod dispatch;
pub mod generate_title;
pub mod run_council;
pub(crate) mod shared;
pub mod stream_collect;

#[cfg(test)]
pub(crate) mod testing;
