use thiserror::Error;

/// Failure reported by a [`crate::model::ModelRuntime`] for one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct InvokeError {
    pub message: String,
}

impl InvokeError {
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            "unknown provider error".to_string()
        } else {
            message
        };
        Self { message }
    }
}

/// Outcome of a failed `generate` call. Every variant carries a non-empty message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    /// The provider (or the transport in front of it) rejected the call.
    #[error("{message}")]
    ProviderCall { message: String },
    /// The provider answered, but not with something we can normalize.
    #[error("{message}")]
    ResponseParse { message: String },
    /// The request envelope could not be encoded.
    #[error("{message}")]
    Envelope { message: String },
}

impl AdapterError {
    pub fn message(&self) -> &str {
        match self {
            AdapterError::ProviderCall { message }
            | AdapterError::ResponseParse { message }
            | AdapterError::Envelope { message } => message,
        }
    }

    /// Stable machine-readable name, used in JSON errors and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            AdapterError::ProviderCall { .. } => "provider_call",
            AdapterError::ResponseParse { .. } => "response_parse",
            AdapterError::Envelope { .. } => "envelope",
        }
    }

    pub(crate) fn parse(message: impl Into<String>) -> Self {
        AdapterError::ResponseParse {
            message: message.into(),
        }
    }
}

impl From<InvokeError> for AdapterError {
    fn from(e: InvokeError) -> Self {
        AdapterError::ProviderCall { message: e.message }
    }
}
