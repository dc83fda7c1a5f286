use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;

use geobee_schema::openai::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ResponseFormat,
};

use super::provider::{InferenceProvider, InferenceRequest, parse_json_text};
use super::transport::Transport;
use crate::error::InferenceError;

/// Baked-in fallback models. Shared by every backend behind this
/// adapter, including LM Studio; the routed model normally shadows them.
const MODEL_BY_POWER: (&str, &str) = ("claude-haiku-4-5-20251001", "claude-sonnet-4-5-20250929");

fn generic_json_schema() -> Value {
    json!({"type": "object", "additionalProperties": true})
}

/// Adapter for OpenAI-chat-completions-compatible backends. Two
/// configured provider kinds share it with different default endpoints.
pub struct OpenaiCompatProvider {
    base_url: String,
    api_key: Option<String>,
    transport: Arc<dyn Transport>,
}

impl OpenaiCompatProvider {
    pub fn new(base_url: String, api_key: Option<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            transport,
        }
    }

    fn headers(&self) -> Vec<(String, String)> {
        match &self.api_key {
            Some(key) => vec![("Authorization".to_string(), format!("Bearer {key}"))],
            None => Vec::new(),
        }
    }

    async fn post_chat_completions(
        &self,
        request: &InferenceRequest,
        expect_json: bool,
    ) -> Result<String, InferenceError> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let mut messages = Vec::with_capacity(2);
        if let Some(instruction) = &request.system_instruction {
            messages.push(ChatMessage::system(instruction.clone()));
        }
        messages.push(ChatMessage::user(request.prompt.clone()));

        let response_format = expect_json.then(|| {
            let schema = request.schema.clone().unwrap_or_else(generic_json_schema);
            ResponseFormat::json_schema("inference_response", schema)
        });

        let payload = ChatCompletionRequest {
            model: request.model_or(MODEL_BY_POWER.0, MODEL_BY_POWER.1),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_output_tokens,
            response_format,
        };

        let body = serde_json::to_value(&payload).map_err(|err| {
            InferenceError::provider_call_caused("chat completions encoding failed", err)
        })?;
        let reply = self.transport.post_json(&url, &self.headers(), body).await?;

        if !reply.is_success() {
            return Err(InferenceError::provider_call(format!(
                "OpenAI-compatible request failed ({}): {}",
                reply.status, reply.body
            )));
        }

        let response: ChatCompletionResponse =
            serde_json::from_str(&reply.body).map_err(|err| {
                InferenceError::provider_call_caused("chat completions decoding failed", err)
            })?;

        let text = response.message_text();
        if text.is_empty() {
            return Err(InferenceError::response_parse(
                "provider returned empty response text",
            ));
        }
        Ok(text)
    }
}

#[async_trait]
impl InferenceProvider for OpenaiCompatProvider {
    async fn generate_text(&self, request: InferenceRequest) -> Result<String, InferenceError> {
        self.post_chat_completions(&request, false).await
    }

    async fn generate_json(&self, request: InferenceRequest) -> Result<Value, InferenceError> {
        let text = self.post_chat_completions(&request, true).await?;
        parse_json_text(&text)
    }
}
