use crate::config::QualpaySettings;
use crate::endpoint::Endpoint;
use reqwest::Method;

pub const SANDBOX_BASE_URL: &str = "https://api-test.qualpay.com/";
pub const PRODUCTION_BASE_URL: &str = "https://api.qualpay.com/";

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request timed out in flight. The outcome is unknown: the gateway
    /// may or may not have processed it, so callers must not retry blindly.
    #[error("gateway request timed out; transaction outcome unknown")]
    Timeout,
    #[error("failed to reach gateway: {0}")]
    Connect(String),
    #[error("gateway returned an unreadable response: {0}")]
    Decode(String),
}

#[derive(Debug, Clone)]
pub struct HttpCall {
    pub endpoint: Endpoint,
    pub body: Option<serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

/// Seam between the operations facade and the wire. The production
/// implementation talks HTTP; tests substitute a recording mock.
#[async_trait::async_trait]
pub trait QualpayTransport: Send + Sync {
    async fn execute(&self, call: HttpCall) -> Result<HttpReply, TransportError>;
}

pub struct HttpTransport {
    base_url: String,
    security_key: String,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(settings: &QualpaySettings) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .min_tls_version(reqwest::tls::Version::TLS_1_2)
            .timeout(std::time::Duration::from_millis(settings.request_timeout_ms))
            .build()?;

        Ok(Self {
            base_url: if settings.use_sandbox {
                SANDBOX_BASE_URL.to_string()
            } else {
                PRODUCTION_BASE_URL.to_string()
            },
            security_key: settings.security_key.clone(),
            client,
        })
    }
}

#[async_trait::async_trait]
impl QualpayTransport for HttpTransport {
    async fn execute(&self, call: HttpCall) -> Result<HttpReply, TransportError> {
        let url = format!("{}{}", self.base_url, call.endpoint.path());
        let method = call.endpoint.method();

        let mut request = self
            .client
            .request(method.clone(), &url)
            // Basic auth from the security key alone, empty password slot.
            .basic_auth(&self.security_key, Some(""))
            .header(reqwest::header::ACCEPT, "application/json");
        if method != Method::GET {
            if let Some(body) = &call.body {
                request = request.json(body);
            }
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout
            } else {
                TransportError::Connect(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        // Error replies still carry a typed body; hand it back for the
        // facade to interpret rather than failing on the status alone.
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))?;

        tracing::debug!(path = %call.endpoint.path(), status, "gateway call completed");

        Ok(HttpReply { status, body })
    }
}
