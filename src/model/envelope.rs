//! Wire shapes for the Anthropic messages API as hosted behind the `invoke` endpoint.

use super::{GenerationRequest, GenerationResponse, Message};
use crate::error::AdapterError;
use serde::{Deserialize, Serialize};

pub const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

#[derive(Debug, Serialize)]
pub struct RequestEnvelope<'a> {
    pub anthropic_version: &'static str,
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: u32,
    pub system: &'a str,
    pub messages: Vec<Message>,
}

impl<'a> RequestEnvelope<'a> {
    pub fn from_request(request: &'a GenerationRequest) -> Self {
        let p = request.params;
        Self {
            anthropic_version: ANTHROPIC_VERSION,
            max_tokens: p.max_tokens,
            temperature: p.temperature,
            top_p: p.top_p,
            top_k: p.top_k,
            system: request.system.as_deref().unwrap_or_default(),
            messages: request.conversation.messages(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ReplyEnvelope {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// First content block's text plus the usage counters; anything else is a parse error.
pub fn parse_reply(body: &[u8]) -> Result<GenerationResponse, AdapterError> {
    let reply: ReplyEnvelope = serde_json::from_slice(body)
        .map_err(|e| AdapterError::parse(format!("malformed model reply: {e}")))?;

    let first = reply
        .content
        .into_iter()
        .next()
        .ok_or_else(|| AdapterError::parse("model reply has no content blocks"))?;
    let text = first
        .text
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AdapterError::parse("first content block carries no text"))?;

    Ok(GenerationResponse {
        text,
        input_tokens: reply.usage.input_tokens,
        output_tokens: reply.usage.output_tokens,
    })
}
