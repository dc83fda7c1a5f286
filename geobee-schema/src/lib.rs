pub mod anthropic;
pub mod gemini;
pub mod openai;

pub use anthropic::{AnthropicContentBlock, AnthropicMessage, AnthropicRequest, AnthropicResponse};
pub use gemini::{
    Content, GeminiGenerateRequest, GeminiModel, GeminiModelList, GeminiResponseBody,
    GenerationConfig, Part,
};
pub use openai::{
    ChatChoice, ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ContentPart,
    JsonSchemaFormat, MessageContent, OpenaiModel, OpenaiModelList, ResponseFormat,
};
