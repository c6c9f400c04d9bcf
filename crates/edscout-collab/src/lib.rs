//! EdScout Collaborator Backends
//!
//! Production implementations of the `edscout-core` collaborator traits:
//! - Tavily web search as the context provider
//! - OpenAI chat completions for category scoring, gate review, report
//!   rendering, and verdict narration
//!
//! All HTTP and prompt/parsing details live here; the core engine only sees
//! the trait seams.

pub mod openai;
pub mod tavily;

pub use openai::{OpenAiClient, OpenAiConfig};
pub use tavily::{TavilyClient, TavilyConfig, MAX_CONTEXT_CHARS};
