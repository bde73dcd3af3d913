//! Client configuration.

use std::time::Duration;

use serde::Deserialize;

/// Public Wikimedia API gateway.
pub const DEFAULT_BASE_URL: &str = "https://api.wikimedia.org";

/// Settings used to build a [`crate::Transport`].
///
/// Every field has a default, so a partial document deserializes:
///
/// ```
/// use wikimedia_core::ClientConfig;
///
/// let config: ClientConfig =
///     serde_json::from_str(r#"{"base_url": "https://en.wikipedia.org/w/rest.php"}"#).unwrap();
/// assert_eq!(config.request_timeout_ms, 30_000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Root that `core/v1/...` paths are joined onto.
    pub base_url: String,

    /// Whole-request timeout in milliseconds. Zero disables it.
    pub request_timeout_ms: u64,

    /// Connect timeout in milliseconds. Zero disables it.
    pub connect_timeout_ms: u64,

    /// Sent as `User-Agent`. Wikimedia asks API clients to identify
    /// themselves with a contact address.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_ms: 30_000,
            connect_timeout_ms: 10_000,
            user_agent: concat!("wikimedia-core/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = millis(timeout);
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_ms = millis(timeout);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub(crate) fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_ms > 0).then(|| Duration::from_millis(self.request_timeout_ms))
    }

    pub(crate) fn connect_timeout(&self) -> Option<Duration> {
        (self.connect_timeout_ms > 0).then(|| Duration::from_millis(self.connect_timeout_ms))
    }
}

/// Saturates instead of truncating durations past `u64::MAX` ms.
fn millis(timeout: Duration) -> u64 {
    u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX)
}
