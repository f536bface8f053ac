//! Text-generation collaborator: client, prompt context and answer parsing

pub mod client;
pub mod context;
pub mod parser;

pub use client::{with_timeout, CompletionRequest, LlmClient, TextGenerator};
pub use context::BlockContext;
pub use parser::{parse_routing_answer, RoutingAnswer};
