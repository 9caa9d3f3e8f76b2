//! Application-level configuration.
//!
//! - [`CouncilTimeouts`] — per-call deadlines of the council stages

pub mod timeouts;

pub use timeouts::CouncilTimeouts;
