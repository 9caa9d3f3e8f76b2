//! OpenRouter adapter
//!
//! Implements the [`WorkerGateway`](council_application::WorkerGateway) port
//! over OpenRouter's OpenAI-compatible chat completions API.
//!
//! ```text
//! InvokeRequest ──► POST /chat/completions ──► WorkerReply
//!                                   │ id
//!                                   └──► GET /generation?id= ──► cost (best effort)
//! ```

pub mod gateway;
pub mod protocol;

pub use gateway::OpenRouterGateway;
