//! Core domain concepts shared across all subdomains.
//!
//! - [`worker::WorkerId`] — opaque identifier of an answering/judging worker
//! - [`question::Question`] — a validated question to pose to the council
//! - [`message::ChatMessage`] — a single message sent to a worker
//! - [`error::DomainError`] — domain-level errors

pub mod error;
pub mod message;
pub mod question;
pub mod string;
pub mod worker;
