//! Plain-data HTTP request and response types.
//!
//! # Design
//! Requests are described as data before they reach the transport. Request
//! options (see [`crate::pages::RequestOption`]) mutate an `HttpRequest`
//! in place, so callers can attach headers or retarget a request without
//! touching `reqwest` types. The transport converts the final value into a
//! live request at dispatch time.

use bytes::Bytes;
use url::Url;

/// HTTP method for a request. Every endpoint covered here is a `GET`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
}

impl HttpMethod {
    pub(crate) fn to_reqwest(self) -> reqwest::Method {
        match self {
            HttpMethod::Get => reqwest::Method::GET,
        }
    }
}

/// An HTTP request described as plain data.
///
/// Built by the resource builders in [`crate::pages`], then handed to every
/// registered request option before [`crate::Transport::execute`] sends it.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    /// A bare `GET` for `url` with no headers.
    pub fn get(url: Url) -> Self {
        Self {
            method: HttpMethod::Get,
            url,
            headers: Vec::new(),
        }
    }

    /// Append a header. Duplicate names are sent as repeated headers.
    pub fn header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// A fully buffered HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
