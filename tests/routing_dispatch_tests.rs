use std::sync::Arc;

use serde_json::json;

use geobee::config::{
    LocalStore, ProviderKind, ProviderSecretRecord, RawAppConfig, RawRoute, RoutingOverride,
    Secrets,
};
use geobee::inference::testing::MockTransport;
use geobee::inference::{InferenceRequest, InferenceService, Transport};

fn chat_reply(text: &str) -> serde_json::Value {
    json!({"choices": [{"message": {"content": text}}]})
}

fn service_with(
    raw: RawAppConfig,
    store: LocalStore,
    transport: Arc<MockTransport>,
) -> InferenceService {
    InferenceService::with_transport(
        raw,
        Secrets::with_overlay(std::collections::BTreeMap::new()),
        store,
        transport as Arc<dyn Transport>,
    )
}

fn temp_store() -> (tempfile::TempDir, LocalStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path().join("store.json"));
    (dir, store)
}

#[tokio::test]
async fn light_request_routes_to_configured_local_provider() {
    let mut raw = RawAppConfig::default();
    raw.inference.providers.local_openai_compatible.base_url =
        Some("http://127.0.0.1:8841".to_string());

    let (_dir, store) = temp_store();
    let transport = Arc::new(MockTransport::replying(200, chat_reply("ok")));
    let service = service_with(raw, store, transport.clone());

    let text = service
        .generate_text(InferenceRequest::prompt("x").with_power(geobee::config::PowerLevel::Light))
        .await
        .unwrap();
    assert_eq!(text, "ok");

    let calls = transport.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, "POST");
    assert_eq!(calls[0].url, "http://127.0.0.1:8841/v1/chat/completions");
    assert_eq!(calls[0].body["model"], "claude-haiku-4-5-20251001");
}

#[tokio::test]
async fn persisted_override_validates_provider_and_model_independently() {
    let (_dir, store) = temp_store();
    store
        .save_routing_override(&RoutingOverride {
            light: Some(RawRoute {
                provider: Some("openrouter".to_string()),
                model: Some("my-model".to_string()),
            }),
            normal: Some(RawRoute {
                provider: Some("anthropics".to_string()),
                model: Some("claude-3-5-sonnet-20241022".to_string()),
            }),
        })
        .unwrap();

    let transport = Arc::new(MockTransport::replying(200, chat_reply("unused")));
    let service = service_with(RawAppConfig::default(), store, transport);

    let routing = service.effective_routing();
    // Unknown light provider falls back to the default local kind, but
    // the overridden model survives on its own.
    assert_eq!(
        routing.light.provider,
        ProviderKind::LocalOpenaiCompatible
    );
    assert_eq!(routing.light.model, "my-model");
    // Valid normal override is honored verbatim.
    assert_eq!(routing.normal.provider, ProviderKind::Anthropics);
    assert_eq!(routing.normal.model, "claude-3-5-sonnet-20241022");
}

#[tokio::test]
async fn override_with_unknown_provider_and_blank_model_uses_fallback_defaults() {
    let (_dir, store) = temp_store();
    store
        .save_routing_override(&RoutingOverride {
            light: Some(RawRoute {
                provider: Some("openrouter".to_string()),
                model: None,
            }),
            normal: None,
        })
        .unwrap();

    let transport = Arc::new(MockTransport::replying(200, chat_reply("unused")));
    let service = service_with(RawAppConfig::default(), store, transport);

    let routing = service.effective_routing();
    assert_eq!(
        routing.light.provider,
        ProviderKind::LocalOpenaiCompatible
    );
    // No declared model: the resolved provider's light default applies.
    assert_eq!(routing.light.model, "claude-haiku-4-5-20251001");
}

#[tokio::test]
async fn secret_store_credentials_win_over_static_resolution() {
    let (_dir, store) = temp_store();
    store
        .save_routing_override(&RoutingOverride {
            light: None,
            normal: Some(RawRoute {
                provider: Some("anthropics".to_string()),
                model: None,
            }),
        })
        .unwrap();
    store
        .save_provider_secret(
            ProviderKind::Anthropics,
            ProviderSecretRecord {
                api_key: Some("test-anthropic-key".to_string()),
                base_url: Some("https://custom-anthropic.example.com".to_string()),
            },
        )
        .unwrap();

    let transport = Arc::new(MockTransport::replying(
        200,
        json!({"content": [{"text": "reply"}]}),
    ));
    let service = service_with(RawAppConfig::default(), store, transport.clone());

    let text = service
        .generate_text(InferenceRequest::prompt("hello"))
        .await
        .unwrap();
    assert_eq!(text, "reply");

    let call = &transport.calls()[0];
    assert_eq!(call.url, "https://custom-anthropic.example.com/v1/messages");
    assert!(
        call.headers
            .contains(&("x-api-key".to_string(), "test-anthropic-key".to_string()))
    );
    // Blank override model substitutes the provider's normal default.
    assert_eq!(call.body["model"], "claude-3-5-sonnet-20241022");
}

#[tokio::test]
async fn secret_store_without_base_url_keeps_the_default_endpoint() {
    let (_dir, store) = temp_store();
    store
        .save_routing_override(&RoutingOverride {
            light: None,
            normal: Some(RawRoute {
                provider: Some("anthropics".to_string()),
                model: None,
            }),
        })
        .unwrap();
    store
        .save_provider_secret(
            ProviderKind::Anthropics,
            ProviderSecretRecord {
                api_key: Some("test-key".to_string()),
                base_url: None,
            },
        )
        .unwrap();

    let transport = Arc::new(MockTransport::replying(
        200,
        json!({"content": [{"text": "reply"}]}),
    ));
    let service = service_with(RawAppConfig::default(), store, transport.clone());

    service
        .generate_text(InferenceRequest::prompt("hello"))
        .await
        .unwrap();

    let call = &transport.calls()[0];
    assert_eq!(call.url, "https://api.anthropic.com/v1/messages");
    assert!(
        call.headers
            .contains(&("x-api-key".to_string(), "test-key".to_string()))
    );
}

#[tokio::test]
async fn explicit_request_model_wins_over_routing() {
    let (_dir, store) = temp_store();
    let transport = Arc::new(MockTransport::replying(200, chat_reply("ok")));
    let service = service_with(RawAppConfig::default(), store, transport.clone());

    let request = InferenceRequest {
        model: Some("my-finetune".to_string()),
        ..InferenceRequest::prompt("x")
    };
    service.generate_text(request).await.unwrap();

    assert_eq!(transport.calls()[0].body["model"], "my-finetune");
}

#[tokio::test]
async fn static_toml_routing_section_is_honored() {
    let raw = RawAppConfig::from_toml_str(
        r#"
version = 2

[inference.providers.lmstudio]
base_url = "http://192.168.1.50:1234"

[inference.routing.normal]
provider = "lmstudio"
model = ""
"#,
    )
    .unwrap();

    let (_dir, store) = temp_store();
    let transport = Arc::new(MockTransport::replying(200, chat_reply("ok")));
    let service = service_with(raw, store, transport.clone());

    service
        .generate_text(InferenceRequest::prompt("x"))
        .await
        .unwrap();

    let call = &transport.calls()[0];
    assert_eq!(call.url, "http://192.168.1.50:1234/v1/chat/completions");
    // Blank declared model falls back to lmstudio's per-level default.
    assert_eq!(call.body["model"], "qwen/qwen3-vl-8b");
}

#[tokio::test]
async fn classified_failures_propagate_through_dispatch_unchanged() {
    let (_dir, store) = temp_store();
    let transport = Arc::new(MockTransport::failing());
    let service = service_with(RawAppConfig::default(), store, transport);

    let err = service
        .generate_text(InferenceRequest::prompt("x"))
        .await
        .unwrap_err();
    assert_eq!(err.stage(), geobee::Stage::ProviderCall);
}
