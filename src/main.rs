use mimalloc::MiMalloc;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use geobee::config::{LocalStore, RawAppConfig, Secrets};
use geobee::inference::{HttpTransport, InferenceService, Transport, list_provider_models};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const STORE_FILE: &str = "geobee.store.json";

/// Diagnostic entrypoint: resolves the configuration layers, reports the
/// effective routing, and probes model discovery for the routed
/// providers. No game UI lives here.
#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_level(true)
                .with_target(false),
        )
        .init();

    let raw = RawAppConfig::from_optional_toml();
    let secrets = Secrets::from_env();
    let store = LocalStore::new(STORE_FILE);
    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::default());
    let service =
        InferenceService::with_transport(raw, secrets, store, transport.clone());

    let resolved = service.resolved_config();
    let routing = service.effective_routing();

    info!(
        version = resolved.version,
        category = %resolved.gameplay.category,
        question_count = resolved.gameplay.question_count,
        "Resolved configuration"
    );
    info!(
        provider = %routing.light.provider,
        model = %routing.light.model,
        "Effective routing: light"
    );
    info!(
        provider = %routing.normal.provider,
        model = %routing.normal.model,
        "Effective routing: normal"
    );

    // Both levels probe concurrently; the results are independent.
    let (light_models, normal_models) = futures::join!(
        list_provider_models(routing.light.provider, &resolved, transport.as_ref()),
        list_provider_models(routing.normal.provider, &resolved, transport.as_ref()),
    );

    info!(
        provider = %routing.light.provider,
        models = light_models.join(", "),
        "Discovered models: light"
    );
    info!(
        provider = %routing.normal.provider,
        models = normal_models.join(", "),
        "Discovered models: normal"
    );
}
