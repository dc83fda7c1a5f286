mod messages;

pub use messages::{AnthropicContentBlock, AnthropicMessage, AnthropicRequest, AnthropicResponse};
