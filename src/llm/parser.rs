//! Turn oracle replies into action names and dialogue
//!
//! The model is asked for a small JSON object. Anything around the object
//! is ignored; a reply with no usable object is an error, which callers
//! treat the same as a timeout.

use serde::{Deserialize, Serialize};

use crate::core::error::{CivError, Result};

/// A conversation turn: something said and, optionally, something done
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationReply {
    pub dialogue: String,
    #[serde(default)]
    pub action: Option<String>,
}

#[derive(Deserialize)]
struct ChoiceReply {
    action: Option<String>,
}

/// Extract JSON object from a reply (handles surrounding text)
pub(crate) fn extract_json(response: &str) -> Result<&str> {
    let start = response
        .find('{')
        .ok_or_else(|| CivError::Oracle("No JSON found in response".into()))?;
    let end = response
        .rfind('}')
        .ok_or_else(|| CivError::Oracle("No closing brace found in response".into()))?;
    if end < start {
        return Err(CivError::Oracle("Unbalanced JSON in response".into()));
    }
    Ok(&response[start..=end])
}

/// Action name from a `{"action": ...}` reply. Null or blank means no action.
pub fn parse_choice(response: &str) -> Result<Option<String>> {
    let json = extract_json(response)?;
    let reply: ChoiceReply = serde_json::from_str(json)
        .map_err(|e| CivError::Oracle(format!("Failed to parse choice: {} - Response: {}", e, response)))?;
    Ok(reply.action.map(|a| a.trim().to_string()).filter(|a| !a.is_empty()))
}

/// Dialogue and optional action from a conversation reply
pub fn parse_reply(response: &str) -> Result<ConversationReply> {
    let json = extract_json(response)?;
    let mut reply: ConversationReply = serde_json::from_str(json)
        .map_err(|e| CivError::Oracle(format!("Failed to parse reply: {} - Response: {}", e, response)))?;
    reply.dialogue = reply.dialogue.trim().to_string();
    reply.action = reply.action.map(|a| a.trim().to_string()).filter(|a| !a.is_empty());
    if reply.dialogue.is_empty() {
        return Err(CivError::Oracle("Reply has no dialogue".into()));
    }
    Ok(reply)
}

pub(crate) const CHOOSE_SYSTEM_PROMPT: &str = r#"You decide what one villager in a small simulated society does next.
You are given who they are, the state of the village and a list of actions.
Pick exactly one action from the list, written exactly as listed.
If the instruction you were given matches no action, answer with null.

OUTPUT FORMAT (JSON only, no explanation):
{"action": "Action Name"}
or
{"action": null}
"#;

pub(crate) const CONVERSE_SYSTEM_PROMPT: &str = r#"You voice one villager talking with another in a small simulated society.
Write the villager's next line, in character, one or two sentences.
They may also act: if so, name one action from the list exactly as listed.
Walking away ends the conversation.

OUTPUT FORMAT (JSON only, no explanation):
{"dialogue": "what they say", "action": "Action Name" or null}
"#;
