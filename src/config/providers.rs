use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of an LLM backend family.
///
/// Two kinds (`local_openai_compatible`, `lmstudio`) share the
/// OpenAI-chat-completions adapter but carry different default endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Gemini,
    LocalOpenaiCompatible,
    Lmstudio,
    Anthropics,
}

impl ProviderKind {
    /// Declaration order; the first entry is the routing fallback of last
    /// resort when no local provider is available.
    pub const ALL: [ProviderKind; 4] = [
        ProviderKind::Gemini,
        ProviderKind::LocalOpenaiCompatible,
        ProviderKind::Lmstudio,
        ProviderKind::Anthropics,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::LocalOpenaiCompatible => "local_openai_compatible",
            ProviderKind::Lmstudio => "lmstudio",
            ProviderKind::Anthropics => "anthropics",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "gemini" => Some(ProviderKind::Gemini),
            "local_openai_compatible" => Some(ProviderKind::LocalOpenaiCompatible),
            "lmstudio" => Some(ProviderKind::Lmstudio),
            "anthropics" => Some(ProviderKind::Anthropics),
            _ => None,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default model identifier per power level.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProviderModels {
    pub light: String,
    pub normal: String,
}

impl ProviderModels {
    pub fn of(light: &str, normal: &str) -> Self {
        Self {
            light: light.to_string(),
            normal: normal.to_string(),
        }
    }
}

/// Compiled-in per-provider defaults, the lowest configuration layer.
pub struct CompiledProviderDefaults {
    pub base_url: Option<&'static str>,
    pub api_key_env: &'static str,
    pub models: (&'static str, &'static str),
}

impl CompiledProviderDefaults {
    pub fn for_kind(kind: ProviderKind) -> Self {
        match kind {
            ProviderKind::Gemini => Self {
                base_url: None,
                api_key_env: "GEMINI_API_KEY",
                models: ("gemini-3-flash-preview", "gemini-3-flash-preview"),
            },
            ProviderKind::LocalOpenaiCompatible => Self {
                base_url: Some("http://127.0.0.1:8841"),
                api_key_env: "LOCAL_OPENAI_API_KEY",
                models: ("claude-haiku-4-5-20251001", "claude-sonnet-4-5-20250929"),
            },
            ProviderKind::Lmstudio => Self {
                base_url: Some("http://127.0.0.1:1234"),
                api_key_env: "LMSTUDIO_API_KEY",
                models: ("qwen/qwen3-vl-8b", "qwen/qwen3-vl-8b"),
            },
            ProviderKind::Anthropics => Self {
                base_url: Some("https://api.anthropic.com"),
                api_key_env: "ANTHROPIC_API_KEY",
                models: ("claude-3-haiku-20240307", "claude-3-5-sonnet-20241022"),
            },
        }
    }
}

/// Static-config fragment for one provider. All fields optional so the
/// TOML file only overrides what it names; `models` deep-merges per
/// level rather than replacing the pair wholesale.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct RawProviderConfig {
    /// TOML: `inference.providers.<kind>.base_url`.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Name of the secret to resolve the live credential from.
    /// TOML: `inference.providers.<kind>.api_key_env`.
    #[serde(default)]
    pub api_key_env: Option<String>,

    /// TOML: `inference.providers.<kind>.models.{light,normal}`.
    #[serde(default)]
    pub models: RawModelPair,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct RawModelPair {
    #[serde(default)]
    pub light: Option<String>,

    #[serde(default)]
    pub normal: Option<String>,
}

/// One provider's merged view: compiled defaults overlaid with the
/// static file, credential resolved from the secret surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProviderConfig {
    pub kind: ProviderKind,
    pub base_url: Option<String>,
    pub api_key_env: Option<String>,
    pub api_key: Option<String>,
    pub models: ProviderModels,
}

/// Merged view of every configured provider, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSet {
    pub gemini: ResolvedProviderConfig,
    pub local_openai_compatible: ResolvedProviderConfig,
    pub lmstudio: ResolvedProviderConfig,
    pub anthropics: ResolvedProviderConfig,
}

impl ProviderSet {
    pub fn get(&self, kind: ProviderKind) -> &ResolvedProviderConfig {
        match kind {
            ProviderKind::Gemini => &self.gemini,
            ProviderKind::LocalOpenaiCompatible => &self.local_openai_compatible,
            ProviderKind::Lmstudio => &self.lmstudio,
            ProviderKind::Anthropics => &self.anthropics,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedProviderConfig> {
        ProviderKind::ALL.iter().map(|kind| self.get(*kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_strings() {
        for kind in ProviderKind::ALL {
            assert_eq!(ProviderKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ProviderKind::parse("openrouter"), None);
    }

    #[test]
    fn kind_serde_uses_snake_case() {
        let json = serde_json::to_string(&ProviderKind::LocalOpenaiCompatible).unwrap();
        assert_eq!(json, r#""local_openai_compatible""#);
    }
}
