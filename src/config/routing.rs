use serde::{Deserialize, Serialize};

use super::providers::{ProviderKind, ProviderSet};

/// Two-valued cost/quality routing tier. Every generation request
/// declares one, defaulting to `normal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerLevel {
    Light,
    #[default]
    Normal,
}

impl PowerLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            PowerLevel::Light => "light",
            PowerLevel::Normal => "normal",
        }
    }
}

/// A (provider kind, model) pair bound to one power level.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RouteConfig {
    pub provider: ProviderKind,
    pub model: String,
}

/// The active mapping from power level to route; the single source of
/// truth dispatch consults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RoutingTable {
    pub light: RouteConfig,
    pub normal: RouteConfig,
}

impl RoutingTable {
    pub fn get(&self, level: PowerLevel) -> &RouteConfig {
        match level {
            PowerLevel::Light => &self.light,
            PowerLevel::Normal => &self.normal,
        }
    }
}

/// A declared-but-unvalidated route, as found in the static file's
/// routing section or in the persisted user override. Provider is a raw
/// string so stale or unknown kinds survive until sanitization.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawRoute {
    #[serde(default)]
    pub provider: Option<String>,

    #[serde(default)]
    pub model: Option<String>,
}

/// Validates one declared route against the configured providers.
///
/// Provider and model are validated independently, not as an atomic
/// pair: an unknown provider kind falls back to `fallback.provider`
/// while a non-blank declared model is kept; a blank model substitutes
/// the resolved provider's default model for the level.
pub fn sanitize_route(
    route: Option<&RawRoute>,
    providers: &ProviderSet,
    fallback: &RouteConfig,
    level: PowerLevel,
) -> RouteConfig {
    let provider = route
        .and_then(|r| r.provider.as_deref())
        .and_then(ProviderKind::parse)
        .unwrap_or(fallback.provider);

    let declared_model = route
        .and_then(|r| r.model.as_deref())
        .map(str::trim)
        .filter(|model| !model.is_empty());

    let model = match declared_model {
        Some(model) => model.to_string(),
        None => {
            let defaults = &providers.get(provider).models;
            let per_level = match level {
                PowerLevel::Light => defaults.light.clone(),
                PowerLevel::Normal => defaults.normal.clone(),
            };
            if per_level.is_empty() {
                fallback.model.clone()
            } else {
                per_level
            }
        }
    };

    RouteConfig { provider, model }
}
