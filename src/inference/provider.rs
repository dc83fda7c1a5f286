use async_trait::async_trait;
use serde_json::Value;

use crate::config::PowerLevel;
use crate::error::InferenceError;

/// One generation request, for either operation of the contract.
/// `schema` is consulted by JSON calls only.
#[derive(Debug, Clone, Default)]
pub struct InferenceRequest {
    pub prompt: String,
    pub system_instruction: Option<String>,
    pub power: Option<PowerLevel>,
    /// Explicit model override. When set it wins over both the routed
    /// model and the adapter's own power-level fallback.
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub max_output_tokens: Option<u32>,
    pub schema: Option<Value>,
}

impl InferenceRequest {
    pub fn prompt(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    pub fn with_system(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn with_power(mut self, power: PowerLevel) -> Self {
        self.power = Some(power);
        self
    }

    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Effective model: the explicit request model, else the adapter's
    /// baked-in default for the power level. The baked-in pair is a
    /// fallback safety net independent of the global routing defaults.
    pub fn model_or(&self, light: &str, normal: &str) -> String {
        self.model.clone().unwrap_or_else(|| {
            match self.power.unwrap_or_default() {
                PowerLevel::Light => light,
                PowerLevel::Normal => normal,
            }
            .to_string()
        })
    }
}

/// The per-provider-kind implementation of the two-operation generation
/// contract. Stateless beyond bound config; a single network attempt per
/// call, every failure classified, nothing swallowed.
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    async fn generate_text(&self, request: InferenceRequest) -> Result<String, InferenceError>;

    /// Like `generate_text` but requests and parses JSON output. Typed
    /// decoding happens at the dispatch layer.
    async fn generate_json(&self, request: InferenceRequest) -> Result<Value, InferenceError>;
}

/// Shared tail of every JSON call: the normalized text must parse.
pub(crate) fn parse_json_text(text: &str) -> Result<Value, InferenceError> {
    serde_json::from_str(text).map_err(|err| {
        InferenceError::response_parse_caused("failed to parse provider JSON response", err)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_model_wins_over_power_default() {
        let request = InferenceRequest {
            model: Some("custom-model".to_string()),
            power: Some(PowerLevel::Light),
            ..InferenceRequest::prompt("x")
        };
        assert_eq!(request.model_or("light-m", "normal-m"), "custom-model");
    }

    #[test]
    fn power_defaults_apply_without_explicit_model() {
        let light = InferenceRequest::prompt("x").with_power(PowerLevel::Light);
        assert_eq!(light.model_or("light-m", "normal-m"), "light-m");

        let unset = InferenceRequest::prompt("x");
        assert_eq!(unset.model_or("light-m", "normal-m"), "normal-m");
    }
}
