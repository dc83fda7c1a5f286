mod chat_completions;
mod model_list;

pub use chat_completions::{
    ChatChoice, ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ContentPart,
    JsonSchemaFormat, MessageContent, ResponseFormat, ResponseMessage,
};
pub use model_list::{OpenaiModel, OpenaiModelList};
