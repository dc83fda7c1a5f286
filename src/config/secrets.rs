use std::collections::BTreeMap;

/// Process/runtime secret surface for credential resolution.
///
/// Lookup checks an injected overlay first, then the process
/// environment, so hosts that cannot expose env vars (and tests) can
/// supply secrets explicitly.
#[derive(Debug, Clone, Default)]
pub struct Secrets {
    overlay: BTreeMap<String, String>,
}

impl Secrets {
    /// Environment-only lookup.
    pub fn from_env() -> Self {
        Self::default()
    }

    pub fn with_overlay(overlay: BTreeMap<String, String>) -> Self {
        Self { overlay }
    }

    pub fn lookup(&self, key: &str) -> Option<String> {
        self.overlay
            .get(key)
            .cloned()
            .or_else(|| std::env::var(key).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_wins_over_environment() {
        let secrets = Secrets::with_overlay(BTreeMap::from([(
            "GEOBEE_TEST_SECRET".to_string(),
            "from-overlay".to_string(),
        )]));
        assert_eq!(
            secrets.lookup("GEOBEE_TEST_SECRET").as_deref(),
            Some("from-overlay")
        );
    }

    #[test]
    fn unknown_key_is_none() {
        let secrets = Secrets::from_env();
        assert_eq!(secrets.lookup("GEOBEE_TEST_SECRET_UNSET_7781"), None);
    }
}
