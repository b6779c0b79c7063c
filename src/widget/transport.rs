//! Backend transport.
//!
//! The widget posts exactly one [`ChatRequest`] per submission and looks only
//! at the status code and raw body of the reply; classification and JSON
//! parsing happen in [`ChatWidget`](super::ChatWidget).

use reqwest::StatusCode;
use url::Url;

use super::error::TransportError;
use super::message::ChatRequest;

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReply {
    pub status: StatusCode,
    pub body: String,
}

impl RawReply {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Something that can deliver a chat request to the backend.
#[async_trait::async_trait]
pub trait ChatTransport: Send + Sync {
    async fn post(&self, request: &ChatRequest) -> Result<RawReply, TransportError>;
}

/// `reqwest`-backed transport posting JSON to `<base_url><chat_path>`.
#[derive(Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    endpoint: Url,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("endpoint", &self.endpoint.as_str())
            .finish()
    }
}

impl HttpTransport {
    /// Build a transport for the given backend.
    pub fn new(base_url: &str, chat_path: &str) -> Result<Self, TransportError> {
        Self::with_client(reqwest::Client::new(), base_url, chat_path)
    }

    pub fn with_client(
        http: reqwest::Client,
        base_url: &str,
        chat_path: &str,
    ) -> Result<Self, TransportError> {
        let endpoint = Url::parse(base_url)?.join(chat_path)?;
        Ok(Self { http, endpoint })
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl ChatTransport for HttpTransport {
    async fn post(&self, request: &ChatRequest) -> Result<RawReply, TransportError> {
        tracing::debug!(
            name: "widget.transport.post",
            endpoint = %self.endpoint,
            message_length = request.message.len(),
            "Posting chat request"
        );

        let resp = self
            .http
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    TransportError::Unavailable(e.to_string())
                } else {
                    TransportError::Http(e)
                }
            })?;

        let status = resp.status();
        let body = resp.text().await?;
        Ok(RawReply { status, body })
    }
}
