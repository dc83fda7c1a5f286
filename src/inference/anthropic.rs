use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use geobee_schema::anthropic::{AnthropicMessage, AnthropicRequest, AnthropicResponse};

use super::provider::{InferenceProvider, InferenceRequest, parse_json_text};
use super::transport::Transport;
use crate::error::InferenceError;

pub(crate) const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

const ANTHROPIC_VERSION: &str = "2023-06-01";

const MODEL_BY_POWER: (&str, &str) = ("claude-3-haiku-20240307", "claude-3-5-sonnet-20241022");

/// The wire format requires `max_tokens`; requests that leave the bound
/// unset get this.
const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Adapter for the Anthropics messages protocol.
///
/// JSON mode here is advisory: the schema is injected as a top-level
/// `system` instruction rather than enforced structurally, unlike the
/// OpenAI-compatible adapter's strict `json_schema` mode.
pub struct AnthropicProvider {
    base_url: String,
    api_key: Option<String>,
    transport: Arc<dyn Transport>,
}

impl AnthropicProvider {
    pub fn new(base_url: String, api_key: Option<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            transport,
        }
    }

    fn headers(&self) -> Vec<(String, String)> {
        let mut headers = vec![(
            "anthropic-version".to_string(),
            ANTHROPIC_VERSION.to_string(),
        )];
        if let Some(key) = &self.api_key {
            headers.push(("x-api-key".to_string(), key.clone()));
        }
        headers
    }

    async fn post_messages(
        &self,
        request: &InferenceRequest,
        expect_json: bool,
    ) -> Result<String, InferenceError> {
        let url = format!("{}/v1/messages", self.base_url);

        // The minimal contract used here has no system role; the system
        // instruction rides in front of the user text instead.
        let content = match &request.system_instruction {
            Some(instruction) => format!("{instruction}\n\n{}", request.prompt),
            None => request.prompt.clone(),
        };

        let system = if expect_json {
            request.schema.as_ref().map(|schema| {
                format!("You must respond with valid JSON matching this schema: {schema}")
            })
        } else {
            None
        };

        let payload = AnthropicRequest {
            model: request.model_or(MODEL_BY_POWER.0, MODEL_BY_POWER.1),
            max_tokens: request.max_output_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            messages: vec![AnthropicMessage::user(content)],
            temperature: request.temperature,
            system,
        };

        let body = serde_json::to_value(&payload).map_err(|err| {
            InferenceError::provider_call_caused("Anthropics request encoding failed", err)
        })?;
        let reply = self.transport.post_json(&url, &self.headers(), body).await?;

        if !reply.is_success() {
            return Err(InferenceError::provider_call(format!(
                "Anthropics request failed ({}): {}",
                reply.status, reply.body
            )));
        }

        let response: AnthropicResponse = serde_json::from_str(&reply.body).map_err(|err| {
            InferenceError::provider_call_caused("Anthropics response decoding failed", err)
        })?;

        match response.first_text() {
            Some(text) if !text.is_empty() => Ok(text.to_string()),
            _ => Err(InferenceError::response_parse(
                "provider returned empty response",
            )),
        }
    }
}

#[async_trait]
impl InferenceProvider for AnthropicProvider {
    async fn generate_text(&self, request: InferenceRequest) -> Result<String, InferenceError> {
        self.post_messages(&request, false).await
    }

    async fn generate_json(&self, request: InferenceRequest) -> Result<Value, InferenceError> {
        let text = self.post_messages(&request, true).await?;
        parse_json_text(&text)
    }
}
