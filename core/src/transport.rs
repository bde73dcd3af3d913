//! Shared HTTP transport.
//!
//! # Design
//! `Transport` holds the base URL and a `reqwest::Client` and nothing else,
//! so a single instance is shared by every request builder and may serve
//! any number of concurrent calls. Each call is bound to the caller's
//! `CancellationToken`; firing it drops the in-flight request future.

use bytes::Bytes;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ApiError, Error, Result};
use crate::http::{HttpRequest, HttpResponse};

#[derive(Debug, Clone)]
pub struct Transport {
    base_url: String,
    client: reqwest::Client,
}

impl Transport {
    /// Wrap an existing client. `base_url` is not checked until a request
    /// is built against it.
    pub fn new(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }

    /// Build a client from `config`.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.as_str());
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = config.connect_timeout() {
            builder = builder.connect_timeout(timeout);
        }
        Ok(Self::new(config.base_url.clone(), builder.build()?))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Join `segments` onto the base URL.
    ///
    /// Empty segments are skipped, so no doubled slashes are produced. Each
    /// remaining segment is percent-encoded as a single path segment,
    /// including any `/` it contains.
    pub fn endpoint<'a, I>(&self, segments: I) -> Result<Url>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|()| Error::InvalidBaseUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments.into_iter().filter(|segment| !segment.is_empty()));
        Ok(url)
    }

    /// Send `request` and return the body of a 2xx response.
    ///
    /// Non-2xx responses become [`Error::Api`], or [`Error::MalformedError`]
    /// when the body is not an error document. Network failures are
    /// returned as [`Error::Transport`] and cancellation as
    /// [`Error::Cancelled`].
    pub async fn execute(&self, request: HttpRequest, cancel: &CancellationToken) -> Result<Bytes> {
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!("request cancelled");
                return Err(Error::Cancelled);
            }
            response = self.send(request) => response?,
        };
        into_body(response)
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        tracing::debug!(method = ?request.method, url = %request.url, "sending request");

        let mut builder = self.client.request(request.method.to_reqwest(), request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        tracing::debug!(status, bytes = body.len(), "received response");

        Ok(HttpResponse { status, body })
    }
}

/// Split a buffered response into its body or the normalized error.
fn into_body(response: HttpResponse) -> Result<Bytes> {
    if response.is_success() {
        return Ok(response.body);
    }
    let err = ApiError::from_response(response.status, &response.body).map_err(Error::MalformedError)?;
    tracing::debug!(code = err.http_code, reason = %err.http_reason, "api error");
    Err(Error::Api(err))
}
