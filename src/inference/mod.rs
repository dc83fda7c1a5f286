mod anthropic;
mod discovery;
mod gemini;
mod openai_compat;
mod provider;
mod registry;
mod service;
mod transport;

/// Transport test doubles, shared by unit and integration tests.
pub mod testing;

pub use anthropic::AnthropicProvider;
pub use discovery::list_provider_models;
pub use gemini::GeminiProvider;
pub use openai_compat::OpenaiCompatProvider;
pub use provider::{InferenceProvider, InferenceRequest};
pub use registry::build_provider;
pub use service::InferenceService;
pub use transport::{HttpReply, HttpTransport, Transport};
