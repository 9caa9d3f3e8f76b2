//! Infrastructure layer for llm-council
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod logging;
pub mod openrouter;

// Re-export commonly used types
pub use config::{
    ConfigIssue, ConfigLoader, FileConfig, FileCouncilConfig, FileLoggingConfig,
    FileOpenRouterConfig, FileOutputConfig, FileOutputFormat, Severity,
};
pub use logging::JsonlConversationLogger;
pub use openrouter::OpenRouterGateway;
