//! Entry point for the Wikimedia REST API.

use std::sync::Arc;

use crate::config::ClientConfig;
use crate::error::Result;
use crate::pages::{GetMedia, GetPage};
use crate::transport::Transport;

/// Hands out request builders that share one [`Transport`].
///
/// Cloning is cheap and clones share the same connection pool.
#[derive(Debug, Clone)]
pub struct WikimediaClient {
    transport: Arc<Transport>,
}

impl WikimediaClient {
    pub fn new(transport: Transport) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Ok(Self::new(Transport::from_config(config)?))
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Page metadata: `core/v1/{project}/{language}/page/{title}/bare`.
    pub fn get_page(
        &self,
        project: impl Into<String>,
        language: impl Into<String>,
        title: impl Into<String>,
    ) -> GetPage {
        GetPage::new(self.transport.clone(), project, language, title)
    }

    /// Media files on a page: `core/v1/{project}/{language}/page/{title}/links/media`.
    pub fn get_media(
        &self,
        project: impl Into<String>,
        language: impl Into<String>,
        title: impl Into<String>,
    ) -> GetMedia {
        GetMedia::new(self.transport.clone(), project, language, title)
    }
}
