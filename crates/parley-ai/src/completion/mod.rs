//! Chat completion client.
//!
//! Single-shot request/response calls against the provider's
//! `/chat/completions` endpoint, with an SSE streaming mode that yields
//! incremental text fragments.

mod api;
mod client;
mod options;

pub use api::{collect_fragments, prompt_messages, Completion, FragmentStream};
pub use client::{CompletionClient, DEFAULT_MODEL};
pub use options::CompletionOptions;
