use serde::{Deserialize, Serialize};

/// Response body for `GET {baseURL}/v1/models`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OpenaiModelList {
    #[serde(default)]
    pub data: Vec<OpenaiModel>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OpenaiModel {
    #[serde(default)]
    pub id: String,
}

impl OpenaiModelList {
    /// Non-empty, trimmed model identifiers in listing order.
    pub fn model_ids(&self) -> Vec<String> {
        self.data
            .iter()
            .map(|model| model.id.trim().to_string())
            .filter(|id| !id.is_empty())
            .collect()
    }
}
