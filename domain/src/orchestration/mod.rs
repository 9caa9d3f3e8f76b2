//! Council orchestration domain
//!
//! Run configuration, the stage state machine, execution modes, events
//! and the final outcome of a run.

pub mod entities;
pub mod event;
pub mod mode;
pub mod value_objects;
