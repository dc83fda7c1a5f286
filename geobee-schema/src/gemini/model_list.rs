use serde::{Deserialize, Serialize};

/// Response body for `GET /v1beta/models`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GeminiModelList {
    #[serde(default)]
    pub models: Vec<GeminiModel>,
}

/// A single entry in the list response. Names are path-style
/// (`models/gemini-2.5-flash`).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GeminiModel {
    #[serde(default)]
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}
