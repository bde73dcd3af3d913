//! Request builders for the `core/v1/{project}/{language}/page/{title}/...`
//! endpoints.
//!
//! A builder is created from the facade, optionally given request options,
//! then resolved with a cancellation token:
//!
//! ```no_run
//! # async fn demo() -> wikimedia_core::Result<()> {
//! use tokio_util::sync::CancellationToken;
//! use wikimedia_core::{ClientConfig, WikimediaClient};
//!
//! let client = WikimediaClient::from_config(&ClientConfig::default())?;
//! let page = client
//!     .get_page("wikipedia", "en", "Earth")
//!     .resolve(&CancellationToken::new())
//!     .await?;
//! println!("{} (rev {})", page.title, page.latest.id);
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::http::HttpRequest;
use crate::transport::Transport;
use crate::types::{MediaFile, MediaFiles, Page};

/// Mutation applied to a request after it is built and before it is sent.
pub type RequestOption = Box<dyn Fn(&mut HttpRequest) + Send + Sync>;

/// Box a closure as a [`RequestOption`].
pub fn option<F>(f: F) -> RequestOption
where
    F: Fn(&mut HttpRequest) + Send + Sync + 'static,
{
    Box::new(f)
}

/// One endpoint under `.../page/{title}/`.
pub trait Endpoint {
    /// Path segments after the title.
    const SUFFIX: &'static [&'static str];

    /// Shape of a 2xx body.
    type Body: DeserializeOwned;

    /// What `resolve` returns.
    type Output;

    fn output(body: Self::Body) -> Self::Output;
}

/// `.../page/{title}/bare`: page metadata without content.
#[derive(Debug, Clone, Copy)]
pub enum Bare {}

impl Endpoint for Bare {
    const SUFFIX: &'static [&'static str] = &["bare"];
    type Body = Page;
    type Output = Page;

    fn output(body: Page) -> Page {
        body
    }
}

/// `.../page/{title}/links/media`: media files used on the page.
#[derive(Debug, Clone, Copy)]
pub enum LinksMedia {}

impl Endpoint for LinksMedia {
    const SUFFIX: &'static [&'static str] = &["links", "media"];
    type Body = MediaFiles;
    type Output = Vec<MediaFile>;

    fn output(body: MediaFiles) -> Vec<MediaFile> {
        body.files
    }
}

pub type GetPage = PageRequest<Bare>;
pub type GetMedia = PageRequest<LinksMedia>;

/// A pending request for one page endpoint.
///
/// `project`, `language` and `title` are passed through as path segments
/// without validation; empty values are dropped from the path and left for
/// the server to reject.
pub struct PageRequest<E> {
    transport: Arc<Transport>,
    options: Vec<RequestOption>,

    /// Project name, e.g. `wikipedia`, `commons`, `wiktionary`.
    pub project: String,

    /// Language code, e.g. `en`. Must be empty for multilingual projects
    /// such as `commons`.
    pub language: String,

    /// Page title, unescaped.
    pub title: String,

    endpoint: PhantomData<fn() -> E>,
}

impl<E: Endpoint> PageRequest<E> {
    pub(crate) fn new(
        transport: Arc<Transport>,
        project: impl Into<String>,
        language: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            options: Vec::new(),
            project: project.into(),
            language: language.into(),
            title: title.into(),
            endpoint: PhantomData,
        }
    }

    /// Set the request options, replacing any set earlier. They run in
    /// iteration order.
    pub fn with_options<I>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = RequestOption>,
    {
        self.options = options.into_iter().collect();
        self
    }

    /// The request that `resolve` would send, with options applied.
    pub fn build(&self) -> Result<HttpRequest> {
        let mut segments = vec![
            "core",
            "v1",
            self.project.as_str(),
            self.language.as_str(),
            "page",
            self.title.as_str(),
        ];
        segments.extend_from_slice(E::SUFFIX);
        let url = self.transport.endpoint(segments)?;

        let mut request = HttpRequest::get(url);
        for option in &self.options {
            option(&mut request);
        }
        Ok(request)
    }

    /// Send the request and decode the response.
    pub async fn resolve(&self, cancel: &CancellationToken) -> Result<E::Output> {
        let request = self.build()?;
        let body = self.transport.execute(request, cancel).await?;
        decode::<E>(&body)
    }
}

fn decode<E: Endpoint>(body: &Bytes) -> Result<E::Output> {
    let body: E::Body = serde_json::from_slice(body).map_err(Error::Decode)?;
    Ok(E::output(body))
}

impl<E> fmt::Debug for PageRequest<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageRequest")
            .field("project", &self.project)
            .field("language", &self.language)
            .field("title", &self.title)
            .field("options", &self.options.len())
            .finish()
    }
}
