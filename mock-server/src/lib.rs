use std::{collections::HashMap, sync::Arc, time::Duration};

use axum::{
    extract::{Path, State},
    http::{HeaderMap, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::Mutex};

pub use axum::http::StatusCode;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Page {
    pub id: u64,
    pub key: String,
    pub title: String,
    pub latest: LatestRevision,
    pub content_model: String,
    pub license: License,
    pub html_url: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LatestRevision {
    pub id: u64,
    pub timestamp: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct License {
    pub url: String,
    pub title: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MediaFile {
    pub title: String,
    pub file_description_url: String,
    pub latest: LatestEdit,
    pub preferred: Image,
    pub original: Image,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LatestEdit {
    pub timestamp: Option<String>,
    pub user: User,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Image {
    pub mediatype: String,
    pub size: Option<u64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub duration: Option<f64>,
    pub url: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MediaFiles {
    pub files: Vec<MediaFile>,
}

/// Error document in the shape the REST API uses for every non-2xx reply.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(rename = "httpCode")]
    pub http_code: u16,
    #[serde(rename = "httpReason")]
    pub http_reason: String,
    #[serde(rename = "messageTranslations")]
    pub message_translations: HashMap<String, String>,
}

impl ErrorBody {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            http_code: 404,
            http_reason: "Not Found".to_string(),
            message_translations: HashMap::from([("en".to_string(), message.into())]),
        }
    }
}

/// A request as seen by the server.
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub path: String,
    pub headers: HeaderMap,
}

/// Handle onto the requests an app has served, in arrival order.
#[derive(Clone, Debug, Default)]
pub struct RequestLog(Arc<Mutex<Vec<RecordedRequest>>>);

impl RequestLog {
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.0.lock().await.clone()
    }

    async fn record(&self, uri: &Uri, headers: &HeaderMap) {
        self.0.lock().await.push(RecordedRequest {
            path: uri.path().to_string(),
            headers: headers.clone(),
        });
    }
}

/// `(project, language, title)`; `language` is empty for multilingual
/// projects such as `commons`.
type PageKey = (String, String, String);

fn key(project: &str, language: &str, title: &str) -> PageKey {
    (project.to_string(), language.to_string(), title.to_string())
}

/// In-memory contents of the fake API.
#[derive(Clone, Debug, Default)]
pub struct MockApi {
    pages: HashMap<PageKey, Page>,
    media: HashMap<PageKey, Vec<MediaFile>>,
    raw: HashMap<String, (StatusCode, String)>,
    delay: Duration,
    log: RequestLog,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with an English Wikipedia "Earth" page and its media.
    pub fn demo() -> Self {
        let earth = Page {
            id: 9228,
            key: "Earth".to_string(),
            title: "Earth".to_string(),
            latest: LatestRevision {
                id: 1180234823,
                timestamp: Some("2023-10-12T14:31:32Z".to_string()),
            },
            content_model: "wikitext".to_string(),
            license: License {
                url: "https://creativecommons.org/licenses/by-sa/4.0/deed.en".to_string(),
                title: "Creative Commons Attribution-Share Alike 4.0".to_string(),
            },
            html_url: "https://en.wikipedia.org/w/rest.php/v1/page/Earth/html".to_string(),
        };
        Self::new()
            .with_page("wikipedia", "en", earth)
            .with_media("wikipedia", "en", "Earth", vec![commons_logo()])
    }

    pub fn with_page(mut self, project: &str, language: &str, page: Page) -> Self {
        self.pages.insert(key(project, language, &page.key), page);
        self
    }

    pub fn with_media(mut self, project: &str, language: &str, title: &str, files: Vec<MediaFile>) -> Self {
        self.media.insert(key(project, language, title), files);
        self
    }

    /// Answer requests for exactly `path` with `status` and `body`,
    /// bypassing the stored pages.
    pub fn with_raw(mut self, path: &str, status: StatusCode, body: impl Into<String>) -> Self {
        self.raw.insert(path.to_string(), (status, body.into()));
        self
    }

    /// Sleep for `delay` before answering any request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn request_log(&self) -> RequestLog {
        self.log.clone()
    }
}

/// The file used by the demo store: `Commons-logo.svg` with a thumbnail
/// rendering and the original upload.
pub fn commons_logo() -> MediaFile {
    MediaFile {
        title: "Commons-logo.svg".to_string(),
        file_description_url: "//en.wikipedia.org/wiki/File:Commons-logo.svg".to_string(),
        latest: LatestEdit {
            timestamp: None,
            user: User {
                id: 1,
                name: "u".to_string(),
            },
        },
        preferred: Image {
            mediatype: "DRAWING".to_string(),
            size: None,
            width: Some(446),
            height: Some(599),
            duration: None,
            url: "//upload.wikimedia.org/wikipedia/en/thumb/4/4a/Commons-logo.svg/446px-Commons-logo.svg.png"
                .to_string(),
        },
        original: Image {
            mediatype: "DRAWING".to_string(),
            size: Some(932),
            width: Some(1024),
            height: Some(1376),
            duration: None,
            url: "//upload.wikimedia.org/wikipedia/en/4/4a/Commons-logo.svg".to_string(),
        },
    }
}

type Db = Arc<MockApi>;

pub fn app() -> Router {
    app_with(MockApi::demo())
}

pub fn app_with(api: MockApi) -> Router {
    Router::new()
        .route("/core/v1/{project}/{language}/page/{title}/bare", get(get_page))
        .route("/core/v1/{project}/page/{title}/bare", get(get_page_multilingual))
        .route("/core/v1/{project}/{language}/page/{title}/links/media", get(get_media))
        .route("/core/v1/{project}/page/{title}/links/media", get(get_media_multilingual))
        .fallback(no_match)
        .with_state(Arc::new(api))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with(listener: TcpListener, api: MockApi) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(api)).await
}

/// Shared prelude of every handler: log, delay, then raw overrides.
async fn intercept(db: &MockApi, uri: &Uri, headers: &HeaderMap) -> Option<Response> {
    db.log.record(uri, headers).await;
    if !db.delay.is_zero() {
        tokio::time::sleep(db.delay).await;
    }
    db.raw
        .get(uri.path())
        .map(|(status, body)| (*status, body.clone()).into_response())
}

fn missing_title() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody::not_found("The specified title does not exist")),
    )
        .into_response()
}

async fn serve_page(db: Db, key: PageKey, uri: Uri, headers: HeaderMap) -> Response {
    if let Some(response) = intercept(&db, &uri, &headers).await {
        return response;
    }
    match db.pages.get(&key) {
        Some(page) => Json(page.clone()).into_response(),
        None => missing_title(),
    }
}

async fn serve_media(db: Db, key: PageKey, uri: Uri, headers: HeaderMap) -> Response {
    if let Some(response) = intercept(&db, &uri, &headers).await {
        return response;
    }
    match db.media.get(&key) {
        Some(files) => Json(MediaFiles { files: files.clone() }).into_response(),
        None if db.pages.contains_key(&key) => Json(MediaFiles { files: Vec::new() }).into_response(),
        None => missing_title(),
    }
}

async fn get_page(
    State(db): State<Db>,
    Path((project, language, title)): Path<(String, String, String)>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    serve_page(db, (project, language, title), uri, headers).await
}

async fn get_page_multilingual(
    State(db): State<Db>,
    Path((project, title)): Path<(String, String)>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    serve_page(db, (project, String::new(), title), uri, headers).await
}

async fn get_media(
    State(db): State<Db>,
    Path((project, language, title)): Path<(String, String, String)>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    serve_media(db, (project, language, title), uri, headers).await
}

async fn get_media_multilingual(
    State(db): State<Db>,
    Path((project, title)): Path<(String, String)>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    serve_media(db, (project, String::new(), title), uri, headers).await
}

async fn no_match(State(db): State<Db>, uri: Uri, headers: HeaderMap) -> Response {
    if let Some(response) = intercept(&db, &uri, &headers).await {
        return response;
    }
    let message = format!(
        "The requested relative path ({}) did not match any known handler",
        uri.path()
    );
    (StatusCode::NOT_FOUND, Json(ErrorBody::not_found(message))).into_response()
}
