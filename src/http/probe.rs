use crate::config::ServiceEndpoint;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[cfg(test)]
use mockall::automock;

/// Failure of a single probe request
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProbeError {
    #[error("invalid service address '{0}'")]
    InvalidAddress(String),
    #[error("could not build HTTP client: {0}")]
    Client(String),
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
    #[error("request to {url} timed out after {seconds}s")]
    Timeout { url: String, seconds: u64 },
    #[error("{code} {body}")]
    Status { code: u16, body: String },
    #[error("could not decode response: {0}")]
    Decode(String),
}

impl ProbeError {
    pub fn is_permission_denied(&self) -> bool {
        match self {
            ProbeError::Status { code, body } => {
                let body = body.to_lowercase();
                *code == 403 || body.contains("permission denied") || body.contains("invalid token")
            }
            _ => false,
        }
    }

    /// JSON body of a non-success response, when it has one
    pub fn status_body_json(&self) -> Option<Value> {
        match self {
            ProbeError::Status { body, .. } => serde_json::from_str(body).ok(),
            _ => None,
        }
    }
}

/// Something that can GET a path from a service admin API and decode it
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Probe: Send + Sync {
    async fn fetch(&self, path: &str) -> Result<Value, ProbeError>;
}

/// Probe backed by a reqwest client with a bounded per-request timeout
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: Client,
    base_url: String,
    token_header: &'static str,
    token: Option<String>,
    timeout: Duration,
}

impl HttpProbe {
    pub fn new(
        endpoint: &ServiceEndpoint,
        token_header: &'static str,
        timeout: Duration,
    ) -> Result<Self, ProbeError> {
        let base_url = endpoint.address.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|_| ProbeError::InvalidAddress(endpoint.address.clone()))?;

        let client = Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(endpoint.skip_verify)
            .build()
            .map_err(|e| ProbeError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            token_header,
            token: endpoint.token.clone(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn transport_error(&self, url: &str, err: reqwest::Error) -> ProbeError {
        if err.is_timeout() {
            return ProbeError::Timeout {
                url: url.to_string(),
                seconds: self.timeout.as_secs(),
            };
        }
        let mut message = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            message = format!("{message}: {cause}");
            source = cause.source();
        }
        ProbeError::Transport {
            url: url.to_string(),
            message,
        }
    }
}

#[async_trait]
impl Probe for HttpProbe {
    async fn fetch(&self, path: &str) -> Result<Value, ProbeError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let mut request = self.client.get(&url);
        if let Some(token) = &self.token {
            request = request.header(self.token_header, token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.transport_error(&url, e))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(&url, e))?;

        if !status.is_success() {
            return Err(ProbeError::Status {
                code: status.as_u16(),
                body: body.trim().to_string(),
            });
        }

        decode_body(&body)
    }
}

/// Empty bodies decode to null; plain text is kept as a JSON string
pub fn decode_body(body: &str) -> Result<Value, ProbeError> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Ok(Value::Null);
    }
    match serde_json::from_str(trimmed) {
        Ok(value) => Ok(value),
        Err(e) if trimmed.starts_with('{') || trimmed.starts_with('[') => {
            Err(ProbeError::Decode(e.to_string()))
        }
        Err(_) => Ok(Value::String(trimmed.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn endpoint(address: &str, token: Option<&str>) -> ServiceEndpoint {
        ServiceEndpoint {
            address: address.to_string(),
            token: token.map(str::to_string),
            skip_verify: false,
        }
    }

    #[test]
    fn decode_body_shapes() {
        assert_eq!(decode_body("").unwrap(), Value::Null);
        assert_eq!(decode_body("\"10.0.0.1:4647\"").unwrap(), json!("10.0.0.1:4647"));
        assert_eq!(decode_body("10.0.0.1:4647\n").unwrap(), json!("10.0.0.1:4647"));
        assert_eq!(decode_body("{\"a\":1}").unwrap(), json!({"a": 1}));
        assert!(matches!(decode_body("{broken"), Err(ProbeError::Decode(_))));
    }

    #[test]
    fn rejects_unparseable_address() {
        let err = HttpProbe::new(&endpoint("not a url", None), "X-Vault-Token", Duration::from_secs(1))
            .unwrap_err();
        assert_eq!(err, ProbeError::InvalidAddress("not a url".to_string()));
    }

    #[test]
    fn permission_denied_detection() {
        let forbidden = ProbeError::Status { code: 403, body: "{\"errors\":[\"permission denied\"]}".into() };
        let missing = ProbeError::Status { code: 404, body: "{\"errors\":[]}".into() };
        assert!(forbidden.is_permission_denied());
        assert!(!missing.is_permission_denied());
        assert_eq!(missing.status_body_json(), Some(json!({"errors": []})));
        assert_eq!(missing.to_string(), "404 {\"errors\":[]}");
    }

    #[tokio::test]
    async fn fetch_sends_token_header_and_decodes_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/status/peers"))
            .and(header("X-Consul-Token", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(["10.0.0.1:8300"])))
            .mount(&server)
            .await;

        let probe = HttpProbe::new(
            &endpoint(&server.uri(), Some("secret")),
            "X-Consul-Token",
            Duration::from_secs(2),
        )
        .unwrap();
        let value = probe.fetch("/v1/status/peers").await.unwrap();
        assert_eq!(value, json!(["10.0.0.1:8300"]));
    }

    #[tokio::test]
    async fn fetch_reports_status_failures() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/operator/license"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Unexpected response code: 500"))
            .mount(&server)
            .await;

        let probe = HttpProbe::new(&endpoint(&server.uri(), None), "X-Consul-Token", Duration::from_secs(2))
            .unwrap();
        let err = probe.fetch("/v1/operator/license").await.unwrap_err();
        assert_eq!(
            err,
            ProbeError::Status { code: 500, body: "Unexpected response code: 500".to_string() }
        );
    }

    #[tokio::test]
    async fn fetch_times_out_as_a_probe_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let probe = HttpProbe::new(&endpoint(&server.uri(), None), "X-Nomad-Token", Duration::from_secs(1))
            .unwrap();
        let err = probe.fetch("/v1/jobs").await.unwrap_err();
        assert!(matches!(err, ProbeError::Timeout { seconds: 1, .. }));
    }

    #[tokio::test]
    async fn unreachable_service_is_a_transport_error() {
        let probe = HttpProbe::new(&endpoint("http://127.0.0.1:1", None), "X-Nomad-Token", Duration::from_secs(2))
            .unwrap();
        let err = probe.fetch("/v1/jobs").await.unwrap_err();
        assert!(matches!(err, ProbeError::Transport { .. } | ProbeError::Timeout { .. }));
    }
}
