use serde::{Deserialize, Serialize};

/// Body for `POST {baseURL}/v1/messages`.
///
/// `max_tokens` is mandatory on this wire format, unlike the other two
/// protocols where the bound is optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicRequest {
    pub model: String,

    pub max_tokens: u32,

    pub messages: Vec<AnthropicMessage>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicMessage {
    pub role: String,
    pub content: String,
}

impl AnthropicMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AnthropicResponse {
    #[serde(default)]
    pub content: Vec<AnthropicContentBlock>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AnthropicContentBlock {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl AnthropicResponse {
    /// First content block's text, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.content.first().and_then(|block| block.text.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn first_text_reads_leading_block() {
        let response: AnthropicResponse = serde_json::from_value(json!({
            "content": [{"type": "text", "text": "answer"}, {"text": "tail"}]
        }))
        .unwrap();

        assert_eq!(response.first_text(), Some("answer"));
    }

    #[test]
    fn request_omits_unset_optionals() {
        let request = AnthropicRequest {
            model: "claude-3-haiku-20240307".to_string(),
            max_tokens: 1024,
            messages: vec![AnthropicMessage::user("hi")],
            temperature: None,
            system: None,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("temperature").is_none());
        assert!(value.get("system").is_none());
    }
}
