use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::warn;

use super::providers::ProviderKind;
use super::routing::RawRoute;

/// Record key for the user's persisted routing override.
pub const ROUTING_OVERRIDE_KEY: &str = "inference_config_override_v1";

/// Record key for the per-provider secret store.
pub const PROVIDER_SECRETS_KEY: &str = "geobee_provider_config_v1";

/// User-editable subset of the routing table, persisted independently of
/// the static config and validated before merge.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RoutingOverride {
    #[serde(default)]
    pub light: Option<RawRoute>,

    #[serde(default)]
    pub normal: Option<RawRoute>,
}

/// User-entered credentials/endpoint for one provider kind. Replaces the
/// statically resolved `apiKey`/`baseURL` wholesale for that kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProviderSecretRecord {
    #[serde(rename = "apiKey", default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(rename = "baseURL", default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Client-local persistent key-value store over whole JSON-serializable
/// records, the crate's analogue of browser local storage.
///
/// Every read goes back to disk so a record saved by one component is
/// visible to the next call with no cache to invalidate. Corrupt records
/// are a recoverable condition: treated as absent and cleared.
#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_map(&self) -> BTreeMap<String, String> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return BTreeMap::new(),
        };
        match serde_json::from_str(&raw) {
            Ok(map) => map,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "Store file unreadable, starting empty");
                BTreeMap::new()
            }
        }
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(map)?)
    }

    /// Reads one record, deserializing the stored JSON text. A record
    /// that fails to parse is cleared and reported absent.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut map = self.read_map();
        let raw = map.get(key)?;
        match serde_json::from_str(raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(key, error = %err, "Corrupt store record, clearing slot");
                map.remove(key);
                let _ = self.write_map(&map);
                None
            }
        }
    }

    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> io::Result<()> {
        let mut map = self.read_map();
        map.insert(key.to_string(), serde_json::to_string(value)?);
        self.write_map(&map)
    }

    pub fn remove(&self, key: &str) -> io::Result<()> {
        let mut map = self.read_map();
        if map.remove(key).is_some() {
            self.write_map(&map)?;
        }
        Ok(())
    }

    pub fn routing_override(&self) -> Option<RoutingOverride> {
        self.get(ROUTING_OVERRIDE_KEY)
    }

    pub fn save_routing_override(&self, value: &RoutingOverride) -> io::Result<()> {
        self.set(ROUTING_OVERRIDE_KEY, value)
    }

    pub fn provider_secrets(&self) -> BTreeMap<String, ProviderSecretRecord> {
        self.get(PROVIDER_SECRETS_KEY).unwrap_or_default()
    }

    pub fn provider_secret(&self, kind: ProviderKind) -> Option<ProviderSecretRecord> {
        self.provider_secrets().remove(kind.as_str())
    }

    pub fn save_provider_secret(
        &self,
        kind: ProviderKind,
        record: ProviderSecretRecord,
    ) -> io::Result<()> {
        let mut all = self.provider_secrets();
        all.insert(kind.as_str().to_string(), record);
        self.set(PROVIDER_SECRETS_KEY, &all)
    }

    pub fn clear_provider_secrets(&self) -> io::Result<()> {
        self.remove(PROVIDER_SECRETS_KEY)
    }
}
