use std::sync::Arc;
use tracing::debug;

use super::anthropic::{self, AnthropicProvider};
use super::gemini::GeminiProvider;
use super::openai_compat::OpenaiCompatProvider;
use super::provider::InferenceProvider;
use super::transport::Transport;
use crate::config::{LocalStore, ProviderKind, ResolvedAppConfig};

const LOCAL_OPENAI_FALLBACK_URL: &str = "http://127.0.0.1:8841";
const LMSTUDIO_FALLBACK_URL: &str = "http://127.0.0.1:1234";

/// Builds a ready-to-use adapter for one provider kind.
///
/// Cheap and re-run on every dispatch so a freshly saved key or endpoint
/// takes effect on the next call without restart. The per-provider
/// secret store wins over the statically resolved credential and
/// endpoint for the same kind.
pub fn build_provider(
    kind: ProviderKind,
    resolved: &ResolvedAppConfig,
    store: &LocalStore,
    transport: Arc<dyn Transport>,
) -> Box<dyn InferenceProvider> {
    let provider = resolved.providers.get(kind);
    let secret = store.provider_secret(kind).unwrap_or_default();

    let api_key = secret.api_key.or_else(|| provider.api_key.clone());
    let base_url = secret.base_url.or_else(|| provider.base_url.clone());

    debug!(
        provider = %kind,
        base_url = base_url.as_deref().unwrap_or("<default>"),
        has_key = api_key.is_some(),
        "Constructing provider adapter"
    );

    match kind {
        ProviderKind::Gemini => Box::new(GeminiProvider::new(api_key, base_url, transport)),
        ProviderKind::LocalOpenaiCompatible => Box::new(OpenaiCompatProvider::new(
            base_url.unwrap_or_else(|| LOCAL_OPENAI_FALLBACK_URL.to_string()),
            api_key,
            transport,
        )),
        ProviderKind::Lmstudio => Box::new(OpenaiCompatProvider::new(
            base_url.unwrap_or_else(|| LMSTUDIO_FALLBACK_URL.to_string()),
            api_key,
            transport,
        )),
        ProviderKind::Anthropics => Box::new(AnthropicProvider::new(
            base_url.unwrap_or_else(|| anthropic::DEFAULT_BASE_URL.to_string()),
            api_key,
            transport,
        )),
    }
}
