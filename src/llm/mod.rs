//! Decision oracle backed by a language model

pub mod client;
pub mod context;
pub mod oracle;
pub mod parser;

pub use client::{Completion, LlmClient, Provider};
pub use context::{AgentView, WorldView};
pub use oracle::{consult, ChoiceRequest, ConversationRequest, DecisionOracle, LlmOracle, NullOracle};
pub use parser::ConversationReply;
