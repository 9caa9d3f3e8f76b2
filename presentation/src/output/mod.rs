//! Result formatting and event streaming

pub mod console;
pub mod event_stream;
pub mod formatter;
