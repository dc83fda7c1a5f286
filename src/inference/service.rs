use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use super::provider::{InferenceProvider, InferenceRequest};
use super::registry::build_provider;
use super::transport::{HttpTransport, Transport};
use crate::config::{
    LocalStore, RawAppConfig, ResolvedAppConfig, RoutingTable, Secrets, effective_inference_routing,
    resolve_app_config,
};
use crate::error::InferenceError;

/// Routing and dispatch over the provider adapters.
///
/// Holds only the configuration input layers; the merged view and the
/// effective routing table are recomputed on every call, so a change to
/// the static file surroundings, the secret surface, or the persisted
/// store is picked up by the next request with nothing to invalidate.
pub struct InferenceService {
    raw: RawAppConfig,
    secrets: Secrets,
    store: LocalStore,
    transport: Arc<dyn Transport>,
}

impl InferenceService {
    pub fn new(raw: RawAppConfig, secrets: Secrets, store: LocalStore) -> Self {
        Self::with_transport(raw, secrets, store, Arc::new(HttpTransport::default()))
    }

    pub fn with_transport(
        raw: RawAppConfig,
        secrets: Secrets,
        store: LocalStore,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            raw,
            secrets,
            store,
            transport,
        }
    }

    pub fn resolved_config(&self) -> ResolvedAppConfig {
        resolve_app_config(&self.raw, &self.secrets)
    }

    pub fn effective_routing(&self) -> RoutingTable {
        effective_inference_routing(&self.resolved_config(), &self.store)
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    pub fn transport(&self) -> Arc<dyn Transport> {
        self.transport.clone()
    }

    /// Resolves power level and routing, threads the routed model into
    /// the request, and constructs the adapter. A model the caller set
    /// explicitly is left untouched and wins inside the adapter.
    fn route(&self, request: &mut InferenceRequest) -> Box<dyn InferenceProvider> {
        let power = request.power.unwrap_or_default();
        request.power = Some(power);

        let resolved = self.resolved_config();
        let routing = effective_inference_routing(&resolved, &self.store);
        let entry = routing.get(power);

        if request.model.is_none() {
            request.model = Some(entry.model.clone());
        }

        debug!(
            power = power.as_str(),
            provider = %entry.provider,
            model = request.model.as_deref().unwrap_or_default(),
            "Dispatching inference request"
        );

        build_provider(entry.provider, &resolved, &self.store, self.transport.clone())
    }

    /// Generates plain text. Propagates the adapter's classified result
    /// unchanged; no retries, no interception.
    pub async fn generate_text(
        &self,
        mut request: InferenceRequest,
    ) -> Result<String, InferenceError> {
        let provider = self.route(&mut request);
        provider.generate_text(request).await
    }

    /// Generates JSON and decodes it into the caller's type.
    pub async fn generate_json<T: DeserializeOwned>(
        &self,
        request: InferenceRequest,
    ) -> Result<T, InferenceError> {
        let value = self.generate_json_value(request).await?;
        serde_json::from_value(value).map_err(|err| {
            InferenceError::response_parse_caused("provider JSON did not match expected shape", err)
        })
    }

    /// Untyped variant of [`Self::generate_json`].
    pub async fn generate_json_value(
        &self,
        mut request: InferenceRequest,
    ) -> Result<Value, InferenceError> {
        let provider = self.route(&mut request);
        provider.generate_json(request).await
    }
}
