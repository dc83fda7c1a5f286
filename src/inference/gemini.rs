use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use geobee_schema::gemini::{Content, GeminiGenerateRequest, GeminiResponseBody, GenerationConfig};

use super::provider::{InferenceProvider, InferenceRequest, parse_json_text};
use super::transport::Transport;
use crate::error::InferenceError;

pub(crate) const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

const MODEL_BY_POWER: (&str, &str) = ("gemini-3-flash-preview", "gemini-3-flash-preview");

/// Adapter for the Google-style generative API (`generateContent`).
pub struct GeminiProvider {
    api_key: Option<String>,
    base_url: String,
    transport: Arc<dyn Transport>,
}

impl GeminiProvider {
    pub fn new(
        api_key: Option<String>,
        base_url: Option<String>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            api_key,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            transport,
        }
    }

    fn headers(&self) -> Vec<(String, String)> {
        match &self.api_key {
            Some(key) => vec![("x-goog-api-key".to_string(), key.clone())],
            None => Vec::new(),
        }
    }

    async fn generate(
        &self,
        request: &InferenceRequest,
        response_mime_type: &str,
        response_schema: Option<Value>,
    ) -> Result<String, InferenceError> {
        let model = request.model_or(MODEL_BY_POWER.0, MODEL_BY_POWER.1);
        let url = format!("{}/v1beta/models/{model}:generateContent", self.base_url);

        let payload = GeminiGenerateRequest {
            contents: vec![Content::from_text(request.prompt.clone())],
            system_instruction: request
                .system_instruction
                .clone()
                .map(Content::from_text),
            generation_config: Some(GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_output_tokens,
                response_mime_type: Some(response_mime_type.to_string()),
                response_schema,
            }),
        };

        let body = serde_json::to_value(&payload).map_err(|err| {
            InferenceError::provider_call_caused("Gemini request encoding failed", err)
        })?;
        let reply = self.transport.post_json(&url, &self.headers(), body).await?;

        if !reply.is_success() {
            return Err(InferenceError::provider_call(format!(
                "Gemini request failed ({}): {}",
                reply.status, reply.body
            )));
        }

        let response: GeminiResponseBody = serde_json::from_str(&reply.body).map_err(|err| {
            InferenceError::provider_call_caused("Gemini response decoding failed", err)
        })?;
        Ok(response.text())
    }
}

#[async_trait]
impl InferenceProvider for GeminiProvider {
    async fn generate_text(&self, request: InferenceRequest) -> Result<String, InferenceError> {
        let text = self.generate(&request, "text/plain", None).await?;
        let text = text.trim();
        if text.is_empty() {
            return Err(InferenceError::response_parse(
                "provider returned empty text response",
            ));
        }
        Ok(text.to_string())
    }

    async fn generate_json(&self, mut request: InferenceRequest) -> Result<Value, InferenceError> {
        let schema = request.schema.take();
        let text = self.generate(&request, "application/json", schema).await?;
        if text.is_empty() {
            return Err(InferenceError::response_parse(
                "provider returned empty JSON response",
            ));
        }
        parse_json_text(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Stage;
    use crate::inference::testing::MockTransport;
    use serde_json::json;

    fn candidate_reply(text: &str) -> Value {
        json!({"candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]})
    }

    #[tokio::test]
    async fn text_generation_normalizes_candidate_parts() {
        let transport = Arc::new(MockTransport::replying(200, candidate_reply("  Paris  ")));
        let provider = GeminiProvider::new(
            Some("k".to_string()),
            None,
            transport.clone() as Arc<dyn Transport>,
        );

        let text = provider
            .generate_text(InferenceRequest::prompt("capital of France"))
            .await
            .unwrap();
        assert_eq!(text, "Paris");

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert!(
            calls[0]
                .url
                .ends_with("/v1beta/models/gemini-3-flash-preview:generateContent")
        );
        assert_eq!(
            calls[0].body["generationConfig"]["responseMimeType"],
            "text/plain"
        );
    }

    #[tokio::test]
    async fn json_generation_passes_schema_through_verbatim() {
        let transport = Arc::new(MockTransport::replying(
            200,
            candidate_reply(r#"{"correct": true}"#),
        ));
        let provider = GeminiProvider::new(None, None, transport.clone() as Arc<dyn Transport>);

        let schema = json!({"type": "object", "properties": {"correct": {"type": "boolean"}}});
        let value = provider
            .generate_json(InferenceRequest::prompt("judge").with_schema(schema.clone()))
            .await
            .unwrap();

        assert_eq!(value, json!({"correct": true}));
        let calls = transport.calls();
        assert_eq!(calls[0].body["generationConfig"]["responseSchema"], schema);
        assert_eq!(
            calls[0].body["generationConfig"]["responseMimeType"],
            "application/json"
        );
    }

    #[tokio::test]
    async fn empty_candidates_classify_as_response_parse() {
        let transport = Arc::new(MockTransport::replying(200, json!({"candidates": []})));
        let provider = GeminiProvider::new(None, None, transport as Arc<dyn Transport>);

        let err = provider
            .generate_text(InferenceRequest::prompt("x"))
            .await
            .unwrap_err();
        assert_eq!(err.stage(), Stage::ResponseParse);
    }

    #[tokio::test]
    async fn upstream_status_classifies_as_provider_call() {
        let transport = Arc::new(MockTransport::replying(429, json!({"error": "quota"})));
        let provider = GeminiProvider::new(None, None, transport as Arc<dyn Transport>);

        let err = provider
            .generate_text(InferenceRequest::prompt("x"))
            .await
            .unwrap_err();
        assert_eq!(err.stage(), Stage::ProviderCall);
        assert!(err.to_string().contains("429"));
    }
}
