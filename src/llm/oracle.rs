//! The decision oracle: an external, possibly slow and unreliable source of
//! choices and dialogue
//!
//! The simulation only ever talks to the `DecisionOracle` trait. Every call is
//! wrapped in `consult`, which bounds it with a timeout; callers treat any
//! error as "no answer" and carry on.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::error::{CivError, Result};
use crate::llm::client::{Completion, LlmClient};
use crate::llm::context::{AgentView, WorldView};
use crate::llm::parser::{self, ConversationReply};

/// Everything the oracle needs to pick an action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChoiceRequest {
    pub agent: AgentView,
    pub world: WorldView,
    pub actions: Vec<String>,
    /// Free text from an operator; None when the simulation asks on its own
    pub instruction: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationRequest {
    pub speaker: AgentView,
    pub listener: AgentView,
    /// Most recent lines last
    pub history: Vec<String>,
    pub world: WorldView,
    pub actions: Vec<String>,
}

#[allow(async_fn_in_trait)]
pub trait DecisionOracle {
    /// One action name from `request.actions`, or None for no action
    async fn choose_action(&self, request: &ChoiceRequest) -> Result<Option<String>>;

    /// The speaker's next line. None means they stay silent this turn.
    async fn converse(&self, request: &ConversationRequest) -> Result<Option<ConversationReply>>;
}

/// Run an oracle call under a deadline
pub async fn consult<T>(timeout_ms: u64, call: impl Future<Output = Result<T>>) -> Result<T> {
    match tokio::time::timeout(Duration::from_millis(timeout_ms), call).await {
        Ok(result) => result,
        Err(_) => Err(CivError::OracleTimeout),
    }
}

/// Never answers. Used when no model is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullOracle;

impl DecisionOracle for NullOracle {
    async fn choose_action(&self, _request: &ChoiceRequest) -> Result<Option<String>> {
        Ok(None)
    }

    async fn converse(&self, _request: &ConversationRequest) -> Result<Option<ConversationReply>> {
        Ok(None)
    }
}

/// Choices should be steady, dialogue may wander
const CHOICE_TEMPERATURE: f32 = 0.2;
const DIALOGUE_TEMPERATURE: f32 = 0.9;
/// Replies are a short JSON object
const REPLY_TOKENS: u32 = 512;

/// Oracle backed by a language model
pub struct LlmOracle {
    client: LlmClient,
}

impl LlmOracle {
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }

    pub fn from_env() -> Result<Self> {
        Ok(Self::new(LlmClient::from_env()?))
    }
}

fn action_list(actions: &[String]) -> String {
    actions.iter().map(|a| format!("- {}", a)).collect::<Vec<_>>().join("\n")
}

impl DecisionOracle for LlmOracle {
    async fn choose_action(&self, request: &ChoiceRequest) -> Result<Option<String>> {
        let mut prompt = format!(
            "WORLD:\n{}\n\nYOU:\n{}\n\nACTIONS:\n{}",
            request.world.summary(),
            request.agent.summary(),
            action_list(&request.actions)
        );
        if let Some(instruction) = &request.instruction {
            prompt.push_str(&format!("\n\nINSTRUCTION:\n{}", instruction));
        }
        prompt.push_str("\n\nChoose one action as JSON:");

        let completion = Completion {
            system: parser::CHOOSE_SYSTEM_PROMPT,
            prompt,
            temperature: CHOICE_TEMPERATURE,
            max_tokens: REPLY_TOKENS,
        };
        let response = self.client.complete(&completion).await?;
        parser::parse_choice(&response)
    }

    async fn converse(&self, request: &ConversationRequest) -> Result<Option<ConversationReply>> {
        let history = if request.history.is_empty() {
            "(nothing said yet)".to_string()
        } else {
            request.history.join("\n")
        };
        let prompt = format!(
            "WORLD:\n{}\n\nYOU:\n{}\n\nTALKING WITH:\n{}\n\nSO FAR:\n{}\n\nACTIONS:\n{}\n\nReply as JSON:",
            request.world.summary(),
            request.speaker.summary(),
            request.listener.summary(),
            history,
            action_list(&request.actions)
        );

        let completion = Completion {
            system: parser::CONVERSE_SYSTEM_PROMPT,
            prompt,
            temperature: DIALOGUE_TEMPERATURE,
            max_tokens: REPLY_TOKENS,
        };
        let response = self.client.complete(&completion).await?;
        parser::parse_reply(&response).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_consult_times_out() {
        let slow = async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok::<_, CivError>(1)
        };
        assert!(matches!(consult(10, slow).await, Err(CivError::OracleTimeout)));
    }

    #[tokio::test]
    async fn test_consult_passes_result_through() {
        assert_eq!(consult(1000, async { Ok::<_, CivError>(7) }).await.unwrap(), 7);
    }

    #[test]
    fn test_action_list_format() {
        assert_eq!(action_list(&["Rest".into(), "Eat Food".into()]), "- Rest\n- Eat Food");
    }
}
