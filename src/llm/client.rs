//! HTTP transport for the language model behind the decision oracle
//!
//! Knows two wire dialects: the Anthropic messages API and the
//! OpenAI-compatible chat API most local servers expose. The oracle decides
//! what to ask and how creative the answer may be; this module only moves
//! one `Completion` over the wire and hands back the reply text.

use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};

use crate::core::error::{CivError, Result};

const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
const DEFAULT_MODEL: &str = "claude-3-haiku-20240307";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Which request and response shape the endpoint speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Anthropic,
    OpenAiCompatible,
}

impl Provider {
    pub fn for_endpoint(endpoint: &str) -> Self {
        if endpoint.contains("anthropic.com") {
            Provider::Anthropic
        } else {
            Provider::OpenAiCompatible
        }
    }

    /// Where the reply text sits in a successful response
    fn reply_pointer(self) -> &'static str {
        match self {
            Provider::Anthropic => "/content/0/text",
            Provider::OpenAiCompatible => "/choices/0/message/content",
        }
    }
}

/// One question for the model
#[derive(Debug, Clone, PartialEq)]
pub struct Completion<'a> {
    pub system: &'a str,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

pub struct LlmClient {
    http: Client,
    api_key: String,
    endpoint: String,
    model: String,
    provider: Provider,
}

impl LlmClient {
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        Self {
            http: Client::new(),
            api_key: api_key.into(),
            provider: Provider::for_endpoint(&endpoint),
            endpoint,
            model: model.into(),
        }
    }

    /// `LLM_API_KEY` is required; `LLM_API_URL` and `LLM_MODEL` fall back to
    /// the Anthropic endpoint and a small fast model
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("LLM_API_KEY").map_err(|_| CivError::Oracle("LLM_API_KEY not set".into()))?;
        let endpoint = std::env::var("LLM_API_URL").unwrap_or_else(|_| DEFAULT_ENDPOINT.into());
        let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());
        Ok(Self::new(api_key, endpoint, model))
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    /// Request body in the endpoint's dialect
    fn body(&self, completion: &Completion<'_>) -> Value {
        match self.provider {
            Provider::Anthropic => json!({
                "model": self.model,
                "max_tokens": completion.max_tokens,
                "temperature": completion.temperature,
                "system": completion.system,
                "messages": [{ "role": "user", "content": completion.prompt }],
            }),
            Provider::OpenAiCompatible => json!({
                "model": self.model,
                "max_tokens": completion.max_tokens,
                "temperature": completion.temperature,
                "messages": [
                    { "role": "system", "content": completion.system },
                    { "role": "user", "content": completion.prompt },
                ],
            }),
        }
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.provider {
            Provider::Anthropic => request
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION),
            Provider::OpenAiCompatible => request.bearer_auth(&self.api_key),
        }
    }

    /// Send one completion and return the reply text
    pub async fn complete(&self, completion: &Completion<'_>) -> Result<String> {
        tracing::debug!(
            model = %self.model,
            prompt_len = completion.prompt.len(),
            temperature = completion.temperature,
            "oracle request"
        );
        let request = self.authorize(self.http.post(&self.endpoint)).json(&self.body(completion));
        let response = request.send().await.map_err(|e| CivError::Oracle(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(CivError::Oracle(format!("{} from model endpoint: {}", status, detail)));
        }
        let payload: Value = response.json().await.map_err(|e| CivError::Oracle(e.to_string()))?;
        reply_text(self.provider, &payload)
    }
}

fn reply_text(provider: Provider, payload: &Value) -> Result<String> {
    payload
        .pointer(provider.reply_pointer())
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| CivError::Oracle("model returned no text".into()))
}
