//! End-to-end tests against the fake REST API.
//!
//! # Design
//! Each test starts `mock-server` on a random port with its own store and
//! drives the real client over HTTP, so request building, transport,
//! error normalization and decoding are exercised together.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use mock_server::{commons_logo, MockApi, RequestLog, StatusCode};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use url::Url;
use wikimedia_core::{
    option, ClientConfig, Error, ErrorKind, FileRevision, License, MediaFile, MediaVariant, Page,
    Revision, User, WikimediaClient,
};

const USER_AGENT: &str = "wikimedia-core-tests/0.1 (tests@example.org)";

async fn serve(api: MockApi) -> (SocketAddr, RequestLog) {
    let log = api.request_log();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_server::run_with(listener, api));
    (addr, log)
}

fn client(base_url: &str) -> WikimediaClient {
    let config = ClientConfig::new(base_url)
        .with_user_agent(USER_AGENT)
        .with_request_timeout(Duration::from_secs(5));
    WikimediaClient::from_config(&config).unwrap()
}

fn client_for(addr: SocketAddr) -> WikimediaClient {
    client(&format!("http://{addr}"))
}

#[tokio::test]
async fn page_decodes_every_field() {
    let (addr, log) = serve(MockApi::demo()).await;

    let page = client_for(addr)
        .get_page("wikipedia", "en", "Earth")
        .resolve(&CancellationToken::new())
        .await
        .unwrap();

    let expected = Page {
        id: 9228,
        key: "Earth".to_string(),
        title: "Earth".to_string(),
        latest: Revision {
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
    assert_eq!(page, expected);

    let requests = log.requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "/core/v1/wikipedia/en/page/Earth/bare");
    assert_eq!(requests[0].headers["user-agent"], USER_AGENT);
}

#[tokio::test]
async fn demo_server_serves_earth() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_server::run(listener));

    let client = client_for(addr);
    let page = client
        .get_page("wikipedia", "en", "Earth")
        .resolve(&CancellationToken::new())
        .await
        .unwrap();
    let files = client
        .get_media("wikipedia", "en", "Earth")
        .resolve(&CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(page.id, 9228);
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].original.size_bytes, Some(932));
}

#[tokio::test]
async fn media_decodes_commons_logo() {
    let api = MockApi::new().with_media("project", "lang", "title", vec![commons_logo()]);
    let (addr, log) = serve(api).await;

    let files = client_for(addr)
        .get_media("project", "lang", "title")
        .resolve(&CancellationToken::new())
        .await
        .unwrap();

    let expected = MediaFile {
        title: "Commons-logo.svg".to_string(),
        file_description_url: "//en.wikipedia.org/wiki/File:Commons-logo.svg".to_string(),
        latest: FileRevision {
            timestamp: None,
            user: User {
                id: 1,
                name: "u".to_string(),
            },
        },
        preferred: MediaVariant {
            media_type: "DRAWING".to_string(),
            size_bytes: None,
            width: Some(446),
            height: Some(599),
            duration: serde_json::Value::Null,
            url: "//upload.wikimedia.org/wikipedia/en/thumb/4/4a/Commons-logo.svg/446px-Commons-logo.svg.png"
                .to_string(),
        },
        original: MediaVariant {
            media_type: "DRAWING".to_string(),
            size_bytes: Some(932),
            width: Some(1024),
            height: Some(1376),
            duration: serde_json::Value::Null,
            url: "//upload.wikimedia.org/wikipedia/en/4/4a/Commons-logo.svg".to_string(),
        },
    };
    assert_eq!(files, vec![expected]);

    let requests = log.requests().await;
    assert_eq!(requests[0].path, "/core/v1/project/lang/page/title/links/media");
}

#[tokio::test]
async fn media_with_audio_file_decodes() {
    let audio = mock_server::MediaFile {
        title: "Beep.ogg".to_string(),
        file_description_url: "//commons.wikimedia.org/wiki/File:Beep.ogg".to_string(),
        preferred: mock_server::Image {
            mediatype: "AUDIO".to_string(),
            duration: Some(3.2),
            url: "//upload.wikimedia.org/wikipedia/commons/b/b0/Beep.ogg".to_string(),
            ..Default::default()
        },
        original: mock_server::Image {
            mediatype: "AUDIO".to_string(),
            size: Some(20480),
            duration: Some(3.2),
            url: "//upload.wikimedia.org/wikipedia/commons/b/b0/Beep.ogg".to_string(),
            ..Default::default()
        },
        ..Default::default()
    };
    let api = MockApi::new().with_media("wikipedia", "en", "Sound", vec![commons_logo(), audio]);
    let (addr, _) = serve(api).await;

    let files = client_for(addr)
        .get_media("wikipedia", "en", "Sound")
        .resolve(&CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(files.len(), 2);
    assert_eq!(files[0].title, "Commons-logo.svg");
    let audio = &files[1];
    assert_eq!(audio.preferred.width, None);
    assert_eq!(audio.preferred.height, None);
    assert_eq!(audio.original.size_bytes, Some(20480));
    assert_eq!(audio.original.duration, serde_json::json!(3.2));
}

#[tokio::test]
async fn media_may_be_empty() {
    let api = MockApi::new().with_media("wikipedia", "en", "Blank", Vec::new());
    let (addr, _) = serve(api).await;

    let files = client_for(addr)
        .get_media("wikipedia", "en", "Blank")
        .resolve(&CancellationToken::new())
        .await
        .unwrap();
    assert!(files.is_empty());
}

#[tokio::test]
async fn missing_page_is_api_error() {
    let (addr, _) = serve(MockApi::demo()).await;

    let err = client_for(addr)
        .get_page("wikipedia", "en", "Mars")
        .resolve(&CancellationToken::new())
        .await
        .unwrap_err();

    assert!(err.is_api());
    let api = err.as_api().unwrap();
    assert_eq!(api.http_code, 404);
    assert_eq!(api.http_reason, "Not Found");
    assert_eq!(api.message("en"), Some("The specified title does not exist"));
    assert_eq!(err.to_string(), "404: en:The specified title does not exist");
}

#[tokio::test]
async fn api_error_carries_every_translation() {
    let body = r#"{"httpCode":429,"httpReason":"Too Many Requests","messageTranslations":{"en":"slow down","fr":"ralentissez"}}"#;
    let api = MockApi::new().with_raw(
        "/core/v1/wikipedia/en/page/Earth/bare",
        StatusCode::TOO_MANY_REQUESTS,
        body,
    );
    let (addr, _) = serve(api).await;

    let err = client_for(addr)
        .get_page("wikipedia", "en", "Earth")
        .resolve(&CancellationToken::new())
        .await
        .unwrap_err();

    let api = err.as_api().unwrap();
    assert_eq!(api.http_code, 429);
    assert_eq!(api.message("fr"), Some("ralentissez"));
    assert_eq!(err.to_string(), "429: en:slow down;fr:ralentissez");
}

#[tokio::test]
async fn all_empty_parameters_reach_server_collapsed() {
    let (addr, log) = serve(MockApi::demo()).await;

    let err = client_for(addr)
        .get_page("", "", "")
        .resolve(&CancellationToken::new())
        .await
        .unwrap_err();

    assert!(err.is_api());
    assert_eq!(log.requests().await[0].path, "/core/v1/page/bare");
}

#[tokio::test]
async fn non_json_error_body_is_decode_error() {
    let api = MockApi::new().with_raw(
        "/core/v1/wikipedia/en/page/Earth/links/media",
        StatusCode::BAD_GATEWAY,
        "<html>Bad Gateway</html>",
    );
    let (addr, _) = serve(api).await;

    let err = client_for(addr)
        .get_media("wikipedia", "en", "Earth")
        .resolve(&CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::MalformedError(_)));
    assert_eq!(err.kind(), ErrorKind::Decode);
    assert!(!err.is_api());
}

#[tokio::test]
async fn malformed_success_body_is_decode_error() {
    let api = MockApi::new().with_raw(
        "/core/v1/wikipedia/en/page/Earth/bare",
        StatusCode::OK,
        r#"{"id": "nine"}"#,
    );
    let (addr, _) = serve(api).await;

    let err = client_for(addr)
        .get_page("wikipedia", "en", "Earth")
        .resolve(&CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Decode(_)));
    assert!(!err.is_api());
}

#[tokio::test]
async fn options_see_built_request_and_can_retarget_it() {
    let (addr, log) = serve(MockApi::demo()).await;
    let target: Url = format!("http://{addr}/core/v1/wikipedia/en/page/Earth/bare")
        .parse()
        .unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = seen.clone();

    let page = client("http://placeholder.invalid")
        .get_page("", "", "")
        .with_options([
            option(move |r| recorder.lock().unwrap().push(r.url.path().to_string())),
            option(move |r| r.url = target.clone()),
        ])
        .resolve(&CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(page.key, "Earth");
    assert_eq!(*seen.lock().unwrap(), ["/core/v1/page/bare"]);
    assert_eq!(log.requests().await.len(), 1);
}

#[tokio::test]
async fn second_with_options_replaces_first() {
    let (addr, log) = serve(MockApi::demo()).await;
    let retarget = |path: &'static str| {
        let url: Url = format!("http://{addr}{path}").parse().unwrap();
        option(move |r| r.url = url.clone())
    };

    let files = client("http://placeholder.invalid")
        .get_media("project", "lang", "title")
        .with_options([retarget("/core/v1/wikipedia/en/page/Mars/links/media")])
        .with_options([retarget("/core/v1/wikipedia/en/page/Earth/links/media")])
        .resolve(&CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(files.len(), 1);
    let requests = log.requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "/core/v1/wikipedia/en/page/Earth/links/media");
}

#[tokio::test]
async fn header_option_reaches_server() {
    let (addr, log) = serve(MockApi::demo()).await;

    client_for(addr)
        .get_page("wikipedia", "en", "Earth")
        .with_options([option(|r| {
            r.header("Api-User-Agent", "integration-suite");
        })])
        .resolve(&CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(log.requests().await[0].headers["api-user-agent"], "integration-suite");
}

#[tokio::test]
async fn resolving_twice_sends_twice() {
    let (addr, log) = serve(MockApi::demo()).await;
    let request = client_for(addr).get_page("wikipedia", "en", "Earth");
    let cancel = CancellationToken::new();

    let first = request.resolve(&cancel).await.unwrap();
    let second = request.resolve(&cancel).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(log.requests().await.len(), 2);
}

#[tokio::test]
async fn cancellation_aborts_in_flight_request() {
    let api = MockApi::demo().with_delay(Duration::from_secs(10));
    let (addr, _) = serve(api).await;
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let err = client_for(addr)
        .get_page("wikipedia", "en", "Earth")
        .resolve(&cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Cancelled));
    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[tokio::test]
async fn configured_timeout_is_transport_error() {
    let api = MockApi::demo().with_delay(Duration::from_secs(10));
    let (addr, _) = serve(api).await;
    let config = ClientConfig::new(format!("http://{addr}"))
        .with_request_timeout(Duration::from_millis(100));

    let err = WikimediaClient::from_config(&config)
        .unwrap()
        .get_page("wikipedia", "en", "Earth")
        .resolve(&CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        Error::Transport(inner) => assert!(inner.is_timeout()),
        other => panic!("expected transport timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn connection_refused_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client_for(addr)
        .get_page("wikipedia", "en", "Earth")
        .resolve(&CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Transport(_)));
    assert!(!err.is_api());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_resolves_share_one_client() {
    let (addr, log) = serve(MockApi::demo()).await;
    let client = client_for(addr);
    let cancel = CancellationToken::new();

    let mut tasks = Vec::new();
    for i in 0..8 {
        let client = client.clone();
        let cancel = cancel.clone();
        tasks.push(tokio::spawn(async move {
            if i % 2 == 0 {
                client
                    .get_page("wikipedia", "en", "Earth")
                    .resolve(&cancel)
                    .await
                    .map(|page| page.id)
            } else {
                client
                    .get_media("wikipedia", "en", "Earth")
                    .resolve(&cancel)
                    .await
                    .map(|files| files.len() as u64)
            }
        }));
    }

    for (i, task) in tasks.into_iter().enumerate() {
        let value = task.await.unwrap().unwrap();
        assert_eq!(value, if i % 2 == 0 { 9228 } else { 1 });
    }
    assert_eq!(log.requests().await.len(), 8);
}
