use super::ModelRuntime;
use crate::error::InvokeError;
use anyhow::{Context, Result};
use reqwest::{
    header::{HeaderMap, ACCEPT, CONTENT_TYPE},
    Client, StatusCode, Url,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};

struct Inner {
    http: Client,
    endpoint: Url,
    api_key: Option<String>,
}

/// `ModelRuntime` backed by the managed inference service's `invoke` endpoint.
#[derive(Clone)]
pub struct BedrockRuntime {
    inner: Arc<Inner>,
}

impl BedrockRuntime {
    pub fn new(endpoint: &str, api_key: Option<String>) -> Result<Self> {
        let endpoint = Url::parse(endpoint.trim_end_matches('/'))
            .with_context(|| format!("parse model endpoint {endpoint:?}"))?;
        if api_key.is_none() {
            warn!("no bearer token configured; requests will be sent unauthenticated");
        }
        let http = Client::builder().build().context("build http client")?;
        Ok(Self {
            inner: Arc::new(Inner {
                http,
                endpoint,
                api_key,
            }),
        })
    }

    pub fn regional_endpoint(region: &str) -> String {
        format!("https://bedrock-runtime.{region}.amazonaws.com")
    }

    pub fn invoke_url(&self, model_id: &str) -> String {
        // model ids contain ':' which the service expects percent-encoded in the path
        let encoded = model_id.replace('%', "%25").replace(':', "%3A").replace('/', "%2F");
        format!(
            "{}/model/{}/invoke",
            self.inner.endpoint.as_str().trim_end_matches('/'),
            encoded
        )
    }
}

#[async_trait::async_trait]
impl ModelRuntime for BedrockRuntime {
    async fn invoke_model(&self, model_id: &str, body: Vec<u8>) -> Result<Vec<u8>, InvokeError> {
        let url = self.invoke_url(model_id);
        debug!(%url, bytes = body.len(), "invoking model");

        let mut req = self
            .inner
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(body);
        if let Some(key) = &self.inner.api_key {
            req = req.bearer_auth(key);
        }

        let res = req.send().await.map_err(|e| InvokeError::new(e.to_string()))?;
        let status = res.status();
        let headers = res.headers().clone();
        let bytes = res
            .bytes()
            .await
            .map_err(|e| InvokeError::new(format!("read model reply: {e}")))?;

        if !status.is_success() {
            if let Some(kind) = error_type(&headers) {
                warn!(%status, error_type = kind, "model endpoint returned an error");
            } else {
                warn!(%status, "model endpoint returned an error");
            }
            return Err(InvokeError::new(provider_message(status, &bytes)));
        }
        Ok(bytes.to_vec())
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(alias = "Message")]
    message: Option<String>,
}

fn error_type(headers: &HeaderMap) -> Option<&str> {
    let raw = headers.get("x-amzn-errortype")?.to_str().ok()?;
    // e.g. "ThrottlingException:http://internal.amazon.com/coral/..."
    raw.split(':').next().filter(|s| !s.is_empty())
}

/// Human-readable failure text: JSON `message`, else the body, else the status line.
pub(crate) fn provider_message(status: StatusCode, body: &[u8]) -> String {
    if let Ok(ErrorBody { message: Some(m) }) = serde_json::from_slice::<ErrorBody>(body) {
        if !m.trim().is_empty() {
            return m;
        }
    }
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if !text.is_empty() {
        return text.to_string();
    }
    status.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invoke_url_encodes_model_id() {
        let rt = BedrockRuntime::new(&BedrockRuntime::regional_endpoint("us-west-2"), None).unwrap();
        assert_eq!(
            rt.invoke_url("anthropic.claude-3-5-sonnet-20240620-v1:0"),
            "https://bedrock-runtime.us-west-2.amazonaws.com/model/anthropic.claude-3-5-sonnet-20240620-v1%3A0/invoke"
        );
    }

    #[test]
    fn endpoint_override_keeps_its_path_prefix() {
        let rt = BedrockRuntime::new("http://127.0.0.1:9000/proxy/", None).unwrap();
        assert_eq!(
            rt.invoke_url("m:1"),
            "http://127.0.0.1:9000/proxy/model/m%3A1/invoke"
        );
    }

    #[test]
    fn rejects_unparseable_endpoint() {
        assert!(BedrockRuntime::new("not a url", None).is_err());
    }

    #[test]
    fn provider_message_prefers_json_message() {
        let m = provider_message(StatusCode::TOO_MANY_REQUESTS, br#"{"message":"Rate exceeded"}"#);
        assert_eq!(m, "Rate exceeded");
        let m = provider_message(StatusCode::FORBIDDEN, br#"{"Message":"Access denied"}"#);
        assert_eq!(m, "Access denied");
    }

    #[test]
    fn provider_message_falls_back_to_body_then_status() {
        assert_eq!(
            provider_message(StatusCode::BAD_GATEWAY, b" upstream down \n"),
            "upstream down"
        );
        assert_eq!(
            provider_message(StatusCode::SERVICE_UNAVAILABLE, b""),
            "503 Service Unavailable"
        );
    }

    #[test]
    fn error_type_header_is_trimmed() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-amzn-errortype",
            "ThrottlingException:http://internal.amazon.com/coral/com.amazon.bedrock/"
                .parse()
                .unwrap(),
        );
        assert_eq!(error_type(&headers), Some("ThrottlingException"));
    }
}
