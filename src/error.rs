use thiserror::Error as ThisError;

type BoxedCause = Box<dyn std::error::Error + Send + Sync>;

/// Pipeline stage at which an inference call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Malformed outgoing request construction. Part of the contract
    /// surface; no adapter currently raises it.
    RequestBuild,
    /// Transport failure or non-success upstream status.
    ProviderCall,
    /// Upstream answered, but normalization yielded empty text or the
    /// text was not valid JSON where JSON was required.
    ResponseParse,
    /// Structural mismatch against the requested schema. Adapters trust
    /// the provider to honor the schema and do not raise this today.
    SchemaValidation,
}

/// Classified failure of a single generation or discovery call.
///
/// Already-classified errors pass through dispatch and the consumer
/// operations unchanged; nothing re-wraps them.
#[derive(Debug, ThisError)]
pub enum InferenceError {
    #[error("request build failed: {message}")]
    RequestBuild {
        message: String,
        #[source]
        source: Option<BoxedCause>,
    },

    #[error("provider call failed: {message}")]
    ProviderCall {
        message: String,
        #[source]
        source: Option<BoxedCause>,
    },

    #[error("response parse failed: {message}")]
    ResponseParse {
        message: String,
        #[source]
        source: Option<BoxedCause>,
    },

    #[error("schema validation failed: {message}")]
    SchemaValidation {
        message: String,
        #[source]
        source: Option<BoxedCause>,
    },
}

impl InferenceError {
    pub fn provider_call(message: impl Into<String>) -> Self {
        Self::ProviderCall {
            message: message.into(),
            source: None,
        }
    }

    pub fn provider_call_caused(message: impl Into<String>, cause: impl Into<BoxedCause>) -> Self {
        Self::ProviderCall {
            message: message.into(),
            source: Some(cause.into()),
        }
    }

    pub fn response_parse(message: impl Into<String>) -> Self {
        Self::ResponseParse {
            message: message.into(),
            source: None,
        }
    }

    pub fn response_parse_caused(message: impl Into<String>, cause: impl Into<BoxedCause>) -> Self {
        Self::ResponseParse {
            message: message.into(),
            source: Some(cause.into()),
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            Self::RequestBuild { .. } => Stage::RequestBuild,
            Self::ProviderCall { .. } => Stage::ProviderCall,
            Self::ResponseParse { .. } => Stage::ResponseParse,
            Self::SchemaValidation { .. } => Stage::SchemaValidation,
        }
    }
}
