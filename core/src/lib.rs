//! Typed async client for the Wikimedia REST API.
//!
//! # Overview
//! [`WikimediaClient`] hands out request builders for the `core/v1` page
//! endpoints. Each builder assembles a plain-data [`HttpRequest`], lets the
//! caller mutate it through request options, sends it through the shared
//! [`Transport`] and decodes the JSON body into typed structs.
//!
//! # Design
//! - `Transport` holds only the base URL and a `reqwest::Client`, so one
//!   instance serves any number of concurrent calls.
//! - Every call takes a `CancellationToken`; cancelling it aborts the
//!   request and yields [`Error::Cancelled`].
//! - Non-2xx responses are normalized into [`ApiError`]. Use
//!   [`Error::is_api`] to tell them apart from transport and decode
//!   failures.
//! - Nothing is retried or cached.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod pages;
pub mod transport;
pub mod types;

pub use client::WikimediaClient;
pub use config::ClientConfig;
pub use error::{ApiError, Error, ErrorKind, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use pages::{option, GetMedia, GetPage, PageRequest, RequestOption};
pub use transport::Transport;
pub use types::{FileRevision, License, MediaFile, MediaVariant, Page, Revision, User};
