//! Error types for the Wikimedia REST client.
//!
//! # Design
//! Failures fall into four kinds, reported by [`Error::kind`]: building the
//! request URL, the transport itself (network, timeout, cancellation), an
//! error document returned by the API, and bodies that are not the JSON we
//! expected. Only [`ApiError`] carries server-provided detail; callers
//! branch on it with [`Error::is_api`] and treat everything else as fatal.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the transport and resource builders.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The configured base URL could not be parsed.
    #[error("invalid base url: {0}")]
    Url(#[from] url::ParseError),

    /// The base URL parsed but cannot carry path segments (e.g. `mailto:`).
    #[error("base url cannot be a base: {0}")]
    InvalidBaseUrl(String),

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The caller's cancellation token fired while the request was in flight.
    #[error("request cancelled")]
    Cancelled,

    /// The API answered with a non-2xx status and a well-formed error body.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A 2xx body did not match the expected JSON shape.
    #[error("server did not return valid JSON: {0}")]
    Decode(#[source] serde_json::Error),

    /// A non-2xx body was not a Wikimedia error document.
    #[error("response body is not valid error JSON: {0}")]
    MalformedError(#[source] serde_json::Error),
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Request,
    Transport,
    Api,
    Decode,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Url(_) | Error::InvalidBaseUrl(_) => ErrorKind::Request,
            Error::Transport(_) | Error::Cancelled => ErrorKind::Transport,
            Error::Api(_) => ErrorKind::Api,
            Error::Decode(_) | Error::MalformedError(_) => ErrorKind::Decode,
        }
    }

    /// True for any API error, whatever its status or messages.
    pub fn is_api(&self) -> bool {
        self.kind() == ErrorKind::Api
    }

    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            Error::Api(err) => Some(err),
            _ => None,
        }
    }
}

/// Error document returned by the REST API for any non-2xx response.
///
/// Details are keyed by language code, e.g.
///
/// ```json
/// {
///   "messageTranslations": { "en": "The specified title does not exist" },
///   "httpCode": 404,
///   "httpReason": "Not Found"
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(rename = "httpCode", default)]
    pub http_code: u16,
    #[serde(rename = "httpReason", default)]
    pub http_reason: String,
    #[serde(rename = "messageTranslations", default)]
    pub message_translations: BTreeMap<String, String>,
}

impl ApiError {
    /// Parse an error body received with `status`.
    ///
    /// A missing `httpCode` is taken from `status`, and a missing
    /// `httpReason` from the status' canonical reason phrase.
    pub fn from_response(status: u16, body: &[u8]) -> std::result::Result<Self, serde_json::Error> {
        let mut err: ApiError = serde_json::from_slice(body)?;
        if err.http_code == 0 {
            err.http_code = status;
        }
        if err.http_reason.is_empty() {
            if let Some(reason) = reqwest::StatusCode::from_u16(err.http_code)
                .ok()
                .and_then(|code| code.canonical_reason())
            {
                err.http_reason = reason.to_string();
            }
        }
        Ok(err)
    }

    /// Message for `lang`, if the server provided one.
    pub fn message(&self, lang: &str) -> Option<&str> {
        self.message_translations.get(lang).map(String::as_str)
    }
}

impl fmt::Display for ApiError {
    // Pairs are written in language-code order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.http_code)?;
        for (i, (lang, message)) in self.message_translations.iter().enumerate() {
            if i != 0 {
                f.write_str(";")?;
            }
            write!(f, "{lang}:{message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}
