mod providers;
mod routing;
mod secrets;
mod store;

pub use providers::{
    CompiledProviderDefaults, ProviderKind, ProviderModels, ProviderSet, RawModelPair,
    RawProviderConfig, ResolvedProviderConfig,
};
pub use routing::{PowerLevel, RawRoute, RouteConfig, RoutingTable, sanitize_route};
pub use secrets::Secrets;
pub use store::{
    LocalStore, PROVIDER_SECRETS_KEY, ProviderSecretRecord, ROUTING_OVERRIDE_KEY, RoutingOverride,
};

use figment::{
    Figment,
    providers::{Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::game::{DifficultyLevel, GameCategory};

const DEFAULT_CONFIG_FILE: &str = "app.config.toml";

const DEFAULT_QUESTION_COUNT: u32 = 10;

/// Static declarative configuration managed by Figment. Every field is
/// optional; compiled-in defaults fill the gaps during resolution.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct RawAppConfig {
    /// Schema version of the file. TOML: `version`.
    #[serde(default)]
    pub version: Option<u32>,

    /// Provider and routing settings. TOML: `inference` table.
    #[serde(default)]
    pub inference: RawInference,

    /// Gameplay defaults. TOML: `gameplay_defaults` table.
    #[serde(default)]
    pub gameplay_defaults: RawGameplayDefaults,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct RawInference {
    #[serde(default)]
    pub providers: RawProviders,

    #[serde(default)]
    pub routing: RawRouting,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct RawProviders {
    #[serde(default)]
    pub gemini: RawProviderConfig,

    #[serde(default)]
    pub local_openai_compatible: RawProviderConfig,

    #[serde(default)]
    pub lmstudio: RawProviderConfig,

    #[serde(default)]
    pub anthropics: RawProviderConfig,
}

impl RawProviders {
    fn get(&self, kind: ProviderKind) -> &RawProviderConfig {
        match kind {
            ProviderKind::Gemini => &self.gemini,
            ProviderKind::LocalOpenaiCompatible => &self.local_openai_compatible,
            ProviderKind::Lmstudio => &self.lmstudio,
            ProviderKind::Anthropics => &self.anthropics,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct RawRouting {
    #[serde(default)]
    pub light: Option<RawRoute>,

    #[serde(default)]
    pub normal: Option<RawRoute>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct RawGameplayDefaults {
    /// TOML: `gameplay_defaults.category` (`History` or `Geography`).
    #[serde(default)]
    pub category: Option<String>,

    /// TOML: `gameplay_defaults.difficulty`
    /// (`HIGH_SCHOOL`, `COLLEGE`, `PROFESSIONAL`).
    #[serde(default)]
    pub difficulty: Option<String>,

    /// TOML: `gameplay_defaults.question_count`. Clamped into `[1, 20]`.
    #[serde(default)]
    pub question_count: Option<i64>,

    /// TOML: `gameplay_defaults.scope`. `*` means no topic restriction.
    #[serde(default)]
    pub scope: Option<String>,
}

impl RawAppConfig {
    /// Builds a Figment merging serde defaults with the config TOML file
    /// when present.
    pub fn figment() -> Figment {
        let figment = Figment::new().merge(Serialized::defaults(RawAppConfig::default()));
        if PathBuf::from(DEFAULT_CONFIG_FILE).is_file() {
            figment.merge(Toml::file(DEFAULT_CONFIG_FILE))
        } else {
            figment
        }
    }

    /// Loads the static layer, tolerating a missing file.
    pub fn from_optional_toml() -> Self {
        Self::figment().extract().unwrap_or_else(|err| {
            panic!("failed to extract configuration (defaults + optional {DEFAULT_CONFIG_FILE}): {err}")
        })
    }

    /// Parses the static layer from TOML text, for hosts that carry the
    /// file content themselves.
    pub fn from_toml_str(raw: &str) -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Serialized::defaults(RawAppConfig::default()))
            .merge(Toml::string(raw))
            .extract()
    }
}

/// Gameplay defaults after coercion. Invalid declared values are never
/// fatal; safe fallbacks are substituted silently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameplayDefaults {
    pub category: GameCategory,
    pub difficulty: DifficultyLevel,
    pub question_count: u32,
    pub scope: String,
}

/// The authoritative merged view: compiled defaults < static file <
/// runtime secret injection. User secret-store overrides apply later, at
/// provider construction (see the registry); the routing override
/// applies in [`effective_inference_routing`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAppConfig {
    pub version: u32,
    pub providers: ProviderSet,
    pub routing: RoutingTable,
    pub gameplay: GameplayDefaults,
}

fn resolve_provider(
    kind: ProviderKind,
    raw: &RawProviderConfig,
    secrets: &Secrets,
) -> ResolvedProviderConfig {
    let compiled = CompiledProviderDefaults::for_kind(kind);

    let base_url = raw
        .base_url
        .clone()
        .or_else(|| compiled.base_url.map(str::to_string));
    let api_key_env = raw
        .api_key_env
        .clone()
        .unwrap_or_else(|| compiled.api_key_env.to_string());

    // The models pair merges per level, never wholesale.
    let models = ProviderModels {
        light: raw
            .models
            .light
            .clone()
            .unwrap_or_else(|| compiled.models.0.to_string()),
        normal: raw
            .models
            .normal
            .clone()
            .unwrap_or_else(|| compiled.models.1.to_string()),
    };

    let api_key = secrets.lookup(&api_key_env);

    ResolvedProviderConfig {
        kind,
        base_url,
        api_key_env: Some(api_key_env),
        api_key,
        models,
    }
}

fn model_for(models: &ProviderModels, level: PowerLevel) -> String {
    match level {
        PowerLevel::Light => models.light.clone(),
        PowerLevel::Normal => models.normal.clone(),
    }
}

/// Routing entry used when the static file declares nothing usable for a
/// level: the designated local provider with its per-level default model.
fn default_route(providers: &ProviderSet, level: PowerLevel) -> RouteConfig {
    let local = providers.get(ProviderKind::LocalOpenaiCompatible);
    RouteConfig {
        provider: local.kind,
        model: model_for(&local.models, level),
    }
}

/// Merges all static layers into the authoritative configuration view.
///
/// Pure in its inputs: the static file content and the secret surface
/// are parameters, so unchanged inputs yield a structurally equal result.
pub fn resolve_app_config(raw: &RawAppConfig, secrets: &Secrets) -> ResolvedAppConfig {
    let providers = ProviderSet {
        gemini: resolve_provider(ProviderKind::Gemini, raw.inference.providers.get(ProviderKind::Gemini), secrets),
        local_openai_compatible: resolve_provider(
            ProviderKind::LocalOpenaiCompatible,
            raw.inference.providers.get(ProviderKind::LocalOpenaiCompatible),
            secrets,
        ),
        lmstudio: resolve_provider(
            ProviderKind::Lmstudio,
            raw.inference.providers.get(ProviderKind::Lmstudio),
            secrets,
        ),
        anthropics: resolve_provider(
            ProviderKind::Anthropics,
            raw.inference.providers.get(ProviderKind::Anthropics),
            secrets,
        ),
    };

    let routing = RoutingTable {
        light: sanitize_route(
            raw.inference.routing.light.as_ref(),
            &providers,
            &default_route(&providers, PowerLevel::Light),
            PowerLevel::Light,
        ),
        normal: sanitize_route(
            raw.inference.routing.normal.as_ref(),
            &providers,
            &default_route(&providers, PowerLevel::Normal),
            PowerLevel::Normal,
        ),
    };

    let gameplay = GameplayDefaults {
        category: raw
            .gameplay_defaults
            .category
            .as_deref()
            .and_then(GameCategory::parse)
            .unwrap_or_default(),
        difficulty: raw
            .gameplay_defaults
            .difficulty
            .as_deref()
            .and_then(DifficultyLevel::parse)
            .unwrap_or_default(),
        question_count: u32::try_from(
            raw.gameplay_defaults
                .question_count
                .unwrap_or(i64::from(DEFAULT_QUESTION_COUNT))
                .clamp(1, 20),
        )
        .unwrap_or(DEFAULT_QUESTION_COUNT),
        scope: raw
            .gameplay_defaults
            .scope
            .clone()
            .unwrap_or_else(|| "*".to_string()),
    };

    ResolvedAppConfig {
        version: raw.version.unwrap_or(1),
        providers,
        routing,
        gameplay,
    }
}

/// Overlays the user's persisted routing override onto the static
/// routing table, validating each level independently.
pub fn effective_inference_routing(
    resolved: &ResolvedAppConfig,
    store: &LocalStore,
) -> RoutingTable {
    let Some(override_record) = store.routing_override() else {
        return resolved.routing.clone();
    };

    RoutingTable {
        light: sanitize_route(
            override_record.light.as_ref(),
            &resolved.providers,
            &resolved.routing.light,
            PowerLevel::Light,
        ),
        normal: sanitize_route(
            override_record.normal.as_ref(),
            &resolved.providers,
            &resolved.routing.normal,
            PowerLevel::Normal,
        ),
    }
}

/// Provider choices the configuration UI offers for one level, paired
/// with each provider's default model for that level.
pub fn inference_level_options(
    resolved: &ResolvedAppConfig,
    level: PowerLevel,
) -> Vec<(ProviderKind, String)> {
    resolved
        .providers
        .iter()
        .map(|provider| (provider.kind, model_for(&provider.models, level)))
        .collect()
}
