use std::sync::Arc;
use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use article_reader::api::ArticleApi;
use article_reader::loader::{ArticleLoader, FallbackReason, ReaderOutcome, ViewScope};
use article_reader::reader::{render, HttpImageProbe, ReaderItemKind};
use article_reader::store::{SqliteStore, Store};

const ARTICLE_JSON: &str = r#"{
    "url": "https://resolved.example.com/story",
    "title": "Big News",
    "author": "A. Writer",
    "image": "https://img.example.com/hero.jpg",
    "content": "<h1>Big News</h1><p>Big News</p><p>The story begins with a paragraph that is long enough to count.</p><p>Advertisement</p><ol><li>first point</li><li>second point</li></ol><p>It ends with another paragraph.</p>",
    "is_article": true,
    "duration": 180
}"#;

fn loader(server: &MockServer, store: Arc<SqliteStore>) -> ArticleLoader {
    let api = ArticleApi::new(&server.uri(), Some("t".into()), Duration::from_secs(2)).unwrap();
    ArticleLoader::new(store, Arc::new(api))
}

#[tokio::test]
async fn open_fetches_caches_and_projects() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/parse"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(ARTICLE_JSON, "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(SqliteStore::in_memory().unwrap());
    let loader = loader(&server, store.clone());
    let scope = ViewScope::new();
    let url = "https://short.example.com/abc?ref=feed";

    let ReaderOutcome::Ready(view) = loader.open(url, false, &scope.token()).await.unwrap() else {
        panic!("expected reader view");
    };

    let kinds: Vec<ReaderItemKind> = view.projection.items().iter().map(|i| i.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ReaderItemKind::HeaderImage,
            ReaderItemKind::Title,
            ReaderItemKind::Paragraph,
            ReaderItemKind::OrderedListItem,
            ReaderItemKind::OrderedListItem,
            ReaderItemKind::Paragraph,
        ]
    );
    for (index, item) in view.projection.items().iter().enumerate() {
        assert_eq!(item.position, index);
    }

    let text = render::render_text(&view.projection);
    assert!(text.contains("1. first point"));
    assert!(!text.contains("Advertisement"));

    // Cached under the requested url without its query string
    assert!(store
        .get_article("https://short.example.com/abc")
        .unwrap()
        .is_some());

    // Second open is served from the cache; the mock expects one call
    let again = loader.open(url, false, &scope.token()).await.unwrap();
    assert!(matches!(again, ReaderOutcome::Ready(_)));
}

#[tokio::test]
async fn backend_outage_falls_back_to_external_viewer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/parse"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let store = Arc::new(SqliteStore::in_memory().unwrap());
    let loader = loader(&server, store.clone());
    let scope = ViewScope::new();

    let outcome = loader
        .open("https://x.example.com/a", false, &scope.token())
        .await
        .unwrap();
    let ReaderOutcome::ExternalViewer { url, reason, .. } = outcome else {
        panic!("expected fallback");
    };
    assert_eq!(url, "https://x.example.com/a");
    assert!(matches!(reason, FallbackReason::FetchFailed(_)));
    assert!(store.get_all_articles().unwrap().is_empty());
}

#[tokio::test]
async fn slow_backend_is_cancelled_with_scope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/parse"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(ARTICLE_JSON, "application/json")
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let store = Arc::new(SqliteStore::in_memory().unwrap());
    let loader = Arc::new(loader(&server, store));
    let scope = ViewScope::new();
    let token = scope.token();

    let task = {
        let loader = loader.clone();
        tokio::spawn(async move { loader.open("https://x.example.com/a", false, &token).await })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    drop(scope);

    let result = tokio::time::timeout(Duration::from_secs(2), task)
        .await
        .expect("cancellation should be prompt")
        .unwrap();
    assert!(result.is_err());
}

#[tokio::test]
async fn tiny_images_are_hidden_after_probe() {
    let server = MockServer::start().await;

    // 1x1 GIF
    let pixel: Vec<u8> = vec![
        0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x01, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, 0xff, 0xff,
        0xff, 0x00, 0x00, 0x00, 0x21, 0xf9, 0x04, 0x01, 0x00, 0x00, 0x00, 0x00, 0x2c, 0x00, 0x00,
        0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x02, 0x02, 0x44, 0x01, 0x00, 0x3b,
    ];
    Mock::given(method("GET"))
        .and(path("/pixel.gif"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(pixel))
        .mount(&server)
        .await;

    let body = format!(
        r#"{{"url":"https://x/a","title":"T","is_article":true,
            "content":"<p>Opening paragraph that is comfortably long enough to be kept by the filter, with a few extra words.</p><img src='{}/pixel.gif'><p>Closing paragraph.</p>"}}"#,
        server.uri()
    );
    Mock::given(method("GET"))
        .and(path("/parse"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
        .mount(&server)
        .await;

    let store = Arc::new(SqliteStore::in_memory().unwrap());
    let probe = HttpImageProbe::new(Duration::from_secs(2)).unwrap();
    let loader = loader(&server, store).with_probe(Arc::new(probe));
    let scope = ViewScope::new();

    let ReaderOutcome::Ready(mut view) = loader
        .open("https://x/a", false, &scope.token())
        .await
        .unwrap()
    else {
        panic!("expected reader view");
    };

    let image_position = 3;
    assert_eq!(view.projection.kind(image_position), Some(ReaderItemKind::InlineImage));
    assert!(view.projection.layout(image_position).unwrap().visible);

    let changes = loader
        .verify_images(&mut view.projection, &scope.token())
        .await
        .unwrap();
    assert_eq!(changes.len(), 1);
    assert!(!view.projection.layout(image_position).unwrap().visible);
}
