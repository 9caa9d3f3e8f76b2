//! Application layer for llm-council
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::CouncilTimeouts;
pub use ports::{
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    events::{CompositeEventSink, CouncilEventSink, NoEvents},
    worker_gateway::{GatewayError, InvokeRequest, WorkerGateway, WorkerReply},
};
pub use use_cases::dispatch::Dispatcher;
pub use use_cases::generate_title::GenerateTitleUseCase;
pub use use_cases::run_council::{RunCouncilError, RunCouncilInput, RunCouncilUseCase};
pub use use_cases::stream_collect::{CollectorEvent, CollectorHandle, StageRecord, StreamCollector};
