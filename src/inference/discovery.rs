use tracing::debug;

use geobee_schema::gemini::GeminiModelList;
use geobee_schema::openai::OpenaiModelList;

use super::gemini;
use super::transport::Transport;
use crate::config::{ProviderKind, ResolvedAppConfig, ResolvedProviderConfig};
use crate::error::InferenceError;

/// Order-preserving dedup that drops empty names.
fn unique_models<I>(models: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = Vec::new();
    for model in models {
        if !model.is_empty() && !seen.contains(&model) {
            seen.push(model);
        }
    }
    seen
}

/// List responses name models path-style (`models/gemini-2.5-pro`);
/// routing works on bare identifiers.
fn normalize_gemini_model_name(name: &str) -> String {
    name.strip_prefix("models/").unwrap_or(name).trim().to_string()
}

async fn list_gemini_models(
    provider: &ResolvedProviderConfig,
    transport: &dyn Transport,
) -> Result<Vec<String>, InferenceError> {
    let Some(api_key) = provider.api_key.as_deref() else {
        return Ok(Vec::new());
    };

    let base = provider
        .base_url
        .clone()
        .unwrap_or_else(|| gemini::DEFAULT_BASE_URL.to_string());
    let url = format!("{}/v1beta/models", base.trim_end_matches('/'));
    let headers = vec![("x-goog-api-key".to_string(), api_key.to_string())];

    let reply = transport.get(&url, &headers).await?;
    if !reply.is_success() {
        return Err(InferenceError::provider_call(format!(
            "model listing failed ({}): {}",
            reply.status, reply.body
        )));
    }

    let list: GeminiModelList = serde_json::from_str(&reply.body).map_err(|err| {
        InferenceError::provider_call_caused("model listing decoding failed", err)
    })?;
    Ok(list
        .models
        .iter()
        .map(|model| normalize_gemini_model_name(&model.name))
        .collect())
}

async fn fetch_openai_compatible_models(
    base_url: &str,
    transport: &dyn Transport,
) -> Result<Vec<String>, InferenceError> {
    let url = format!("{}/v1/models", base_url.trim_end_matches('/'));
    let reply = transport.get(&url, &[]).await?;

    // A reachable endpoint that refuses the listing degrades to an empty
    // remote set rather than an error.
    if !reply.is_success() {
        return Ok(Vec::new());
    }

    let list: OpenaiModelList = serde_json::from_str(&reply.body).map_err(|err| {
        InferenceError::provider_call_caused("model listing decoding failed", err)
    })?;
    Ok(list.model_ids())
}

/// Available model identifiers for one provider kind.
///
/// Never fails and never returns an empty set: remote results merge in
/// front of the provider's two configured defaults, and any failure
/// degrades to those defaults.
pub async fn list_provider_models(
    kind: ProviderKind,
    resolved: &ResolvedAppConfig,
    transport: &dyn Transport,
) -> Vec<String> {
    let provider = resolved.providers.get(kind);
    let fallback = unique_models([provider.models.light.clone(), provider.models.normal.clone()]);

    let remote = match kind {
        ProviderKind::Gemini => {
            if provider.api_key.is_none() {
                // No credential: skip the network entirely.
                return fallback;
            }
            list_gemini_models(provider, transport).await
        }
        _ => {
            let Some(base_url) = provider.base_url.as_deref() else {
                return fallback;
            };
            fetch_openai_compatible_models(base_url, transport).await
        }
    };

    match remote {
        Ok(remote) => {
            let merged = unique_models(remote.into_iter().chain(fallback.iter().cloned()));
            if merged.is_empty() { fallback } else { merged }
        }
        Err(err) => {
            debug!(provider = %kind, error = %err, "Model discovery degraded to fallback");
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RawAppConfig, Secrets, resolve_app_config};
    use crate::inference::testing::MockTransport;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn resolved_with_gemini_key(key: Option<&str>) -> ResolvedAppConfig {
        let mut raw = RawAppConfig::default();
        let secrets = match key {
            Some(key) => Secrets::with_overlay(BTreeMap::from([(
                "GEMINI_API_KEY".to_string(),
                key.to_string(),
            )])),
            None => {
                // Decouple the no-credential case from whatever the host
                // environment exports.
                raw.inference.providers.gemini.api_key_env =
                    Some("GEOBEE_TEST_UNSET_GEMINI_KEY".to_string());
                Secrets::with_overlay(BTreeMap::new())
            }
        };
        resolve_app_config(&raw, &secrets)
    }

    #[tokio::test]
    async fn gemini_without_credential_skips_the_network() {
        let transport = MockTransport::failing();
        let resolved = resolved_with_gemini_key(None);

        let models = list_provider_models(ProviderKind::Gemini, &resolved, &transport).await;

        assert_eq!(models, vec!["gemini-3-flash-preview"]);
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn gemini_merge_strips_prefix_and_dedupes() {
        let transport = MockTransport::replying(
            200,
            json!({"models": [
                {"name": "gemini-2.5-flash"},
                {"name": "models/gemini-2.5-pro"},
                {"name": "models/gemini-2.5-flash"}
            ]}),
        );
        let resolved = resolved_with_gemini_key(Some("k"));

        let models = list_provider_models(ProviderKind::Gemini, &resolved, &transport).await;

        assert_eq!(
            models,
            vec!["gemini-2.5-flash", "gemini-2.5-pro", "gemini-3-flash-preview"]
        );
        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].url.ends_with("/v1beta/models"));
    }

    #[tokio::test]
    async fn gemini_network_failure_degrades_to_fallback() {
        let transport = MockTransport::failing();
        let resolved = resolved_with_gemini_key(Some("k"));

        let models = list_provider_models(ProviderKind::Gemini, &resolved, &transport).await;
        assert_eq!(models, vec!["gemini-3-flash-preview"]);
    }

    #[tokio::test]
    async fn openai_compatible_listing_merges_remote_first() {
        let transport = MockTransport::replying(
            200,
            json!({"data": [{"id": "qwen/qwen3-vl-8b"}, {"id": "phi-4"}]}),
        );
        let resolved = resolved_with_gemini_key(None);

        let models = list_provider_models(ProviderKind::Lmstudio, &resolved, &transport).await;
        assert_eq!(models, vec!["qwen/qwen3-vl-8b", "phi-4"]);
        assert_eq!(transport.calls()[0].url, "http://127.0.0.1:1234/v1/models");
    }

    #[tokio::test]
    async fn openai_compatible_non_success_status_degrades_to_fallback() {
        let transport = MockTransport::replying(503, json!({"error": "down"}));
        let resolved = resolved_with_gemini_key(None);

        let models =
            list_provider_models(ProviderKind::LocalOpenaiCompatible, &resolved, &transport).await;
        assert_eq!(
            models,
            vec!["claude-haiku-4-5-20251001", "claude-sonnet-4-5-20250929"]
        );
        // The endpoint was still consulted once.
        assert_eq!(transport.calls().len(), 1);
    }
}
