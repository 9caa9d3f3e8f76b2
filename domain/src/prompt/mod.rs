//! Prompt domain
//!
//! Templates for the ranking, chairman and title prompts of the council flow.

mod template;

pub use template::{DEFAULT_TITLE, MAX_TITLE_CHARS, PromptTemplate};
