use crate::error::{AdapterError, InvokeError};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

pub mod bedrock;
pub mod envelope;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

/// One user turn, optionally followed by an assistant prefill the model continues from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Conversation {
    pub user: String,
    pub assistant_prefill: Option<String>,
}

impl Conversation {
    /// An empty prefill is treated as no prefill.
    pub fn new(user: impl Into<String>, assistant_prefill: impl Into<String>) -> Self {
        let prefill = assistant_prefill.into();
        Self {
            user: user.into(),
            assistant_prefill: (!prefill.is_empty()).then_some(prefill),
        }
    }

    pub fn messages(&self) -> Vec<Message> {
        let mut messages = vec![Message {
            role: Role::User,
            content: self.user.clone(),
        }];
        if let Some(prefill) = &self.assistant_prefill {
            messages.push(Message {
                role: Role::Assistant,
                content: prefill.clone(),
            });
        }
        messages
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GenerationRequest {
    pub model_id: String,
    pub params: SamplingParams,
    pub system: Option<String>,
    pub conversation: Conversation,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub text: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// Transport to the hosted model service: envelope bytes in, reply bytes out.
#[async_trait::async_trait]
pub trait ModelRuntime: Send + Sync + 'static {
    async fn invoke_model(&self, model_id: &str, body: Vec<u8>) -> Result<Vec<u8>, InvokeError>;
}

/// Turns a [`GenerationRequest`] into exactly one runtime call and normalizes the reply.
pub struct InferenceAdapter<R> {
    runtime: R,
}

impl<R: ModelRuntime> InferenceAdapter<R> {
    pub fn new(runtime: R) -> Self {
        Self { runtime }
    }

    #[tracing::instrument(skip_all, fields(model_id = %request.model_id))]
    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, AdapterError> {
        let envelope = envelope::RequestEnvelope::from_request(request);
        let body = serde_json::to_vec(&envelope).map_err(|e| AdapterError::Envelope {
            message: format!("encode request envelope: {e}"),
        })?;
        log_pretty("request", &body);

        let reply = match self.runtime.invoke_model(&request.model_id, body).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(message = %e.message, "A client error occurred");
                return Err(e.into());
            }
        };
        log_pretty("response", &reply);

        envelope::parse_reply(&reply).inspect_err(|e| {
            error!(message = %e.message(), "Failed to get a valid response from the model");
        })
    }
}

// Best-effort: a body that is not JSON is logged raw.
fn log_pretty(direction: &'static str, body: &[u8]) {
    match serde_json::from_slice::<serde_json::Value>(body)
        .and_then(|v| serde_json::to_string_pretty(&v))
    {
        Ok(pretty) => info!(direction, "\n{pretty}"),
        Err(_) => info!(direction, raw = %String::from_utf8_lossy(body)),
    }
}
