//! DTOs for the `core/v1` page endpoints.
//!
//! # Design
//! These types mirror the REST API's JSON and are defined independently of
//! the mock-server crate; integration tests catch schema drift. Timestamps
//! stay as strings because the API may send `null`, and `duration` is kept
//! as an opaque JSON value since its shape varies by media type.

use serde::{Deserialize, Serialize};

/// Metadata for a single page, as returned by `.../page/{title}/bare`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub id: u64,
    pub key: String,
    pub title: String,
    pub latest: Revision,
    pub content_model: String,
    pub license: License,
    pub html_url: String,
}

/// The latest revision of a page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    pub id: u64,
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    pub url: String,
    pub title: String,
}

/// A media file linked from a page, as returned by `.../links/media`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaFile {
    pub title: String,
    pub file_description_url: String,
    pub latest: FileRevision,
    pub preferred: MediaVariant,
    pub original: MediaVariant,
}

/// The latest edit of a media file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRevision {
    pub timestamp: Option<String>,
    pub user: User,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
}

/// One rendering of a media file. `preferred` is the size the site picks
/// for display, `original` is the uploaded file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaVariant {
    #[serde(rename = "mediatype")]
    pub media_type: String,
    /// Size in bytes; the API omits it for most derived renderings.
    #[serde(rename = "size", default)]
    pub size_bytes: Option<u64>,
    /// Pixel dimensions; `None` for audio.
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub duration: serde_json::Value,
    pub url: String,
}

/// Envelope of the media endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaFiles {
    pub files: Vec<MediaFile>,
}
