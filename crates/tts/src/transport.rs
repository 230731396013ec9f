use std::time::Duration;

use async_trait::async_trait;
use http::{HeaderMap, StatusCode, header::CONTENT_TYPE};
use reqwest::Client;

use crate::{error::TtsError, request::EncodedRequest};

/// Hard ceiling on any single request, regardless of per-request timeouts
const MAX_REQUEST_TIMEOUT: Duration = Duration::from_secs(600);

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Status, headers, and body of an HTTP exchange, whatever the status code
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RawResponse {
    /// The `Content-Type` header, if present and valid ASCII
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Connection-level failure: timeout, DNS, refusal, or a broken body stream
#[derive(Debug, thiserror::Error)]
#[error("Connection error for {url}: {message}")]
pub struct TransportError {
    pub url: String,
    pub message: String,
    pub timed_out: bool,
    /// Partial error body, if the remote end sent one before failing
    pub body: Option<String>,
}

impl TransportError {
    fn from_reqwest(url: &str, err: &reqwest::Error) -> Self {
        Self {
            url: url.to_owned(),
            message: err.to_string(),
            timed_out: err.is_timeout(),
            body: None,
        }
    }
}

/// Executes an encoded request and returns the raw response
///
/// Non-2xx statuses are valid responses; only connection-level failures
/// are errors.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &EncodedRequest) -> Result<RawResponse, TransportError>;
}

/// `reqwest` backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Build a transport with bounded connect and total timeouts
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized
    pub fn new() -> crate::error::Result<Self> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(MAX_REQUEST_TIMEOUT)
            .pool_idle_timeout(Some(Duration::from_secs(5)))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| TtsError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    pub const fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &EncodedRequest) -> Result<RawResponse, TransportError> {
        let mut builder = self
            .client
            .post(&request.url)
            .header(CONTENT_TYPE, request.content_type)
            .body(request.body.clone());

        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }

        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let mut response = builder.send().await.map_err(|e| {
            tracing::warn!("request to {} failed: {e}", request.url);
            TransportError::from_reqwest(&request.url, &e)
        })?;

        let status = response.status();
        let headers = response.headers().clone();

        let mut body = Vec::new();

        loop {
            match response.chunk().await {
                Ok(Some(chunk)) => body.extend_from_slice(&chunk),
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(
                        received = body.len(),
                        "reading response body from {} failed: {e}",
                        request.url
                    );

                    let mut err = TransportError::from_reqwest(&request.url, &e);
                    err.body = (!body.is_empty()).then(|| String::from_utf8_lossy(&body).into_owned());
                    return Err(err);
                }
            }
        }

        tracing::debug!(
            status = status.as_u16(),
            bytes = body.len(),
            "received response from {}",
            request.url
        );

        Ok(RawResponse { status, headers, body })
    }
}
