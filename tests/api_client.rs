use std::time::Duration;

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use article_reader::api::{ArticleApi, ArticleService};

fn api(server: &MockServer, token: Option<&str>) -> ArticleApi {
    ArticleApi::new(
        &server.uri(),
        token.map(String::from),
        Duration::from_secs(2),
    )
    .expect("build api client")
}

#[tokio::test]
async fn parse_sends_url_and_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/parse"))
        .and(query_param("url", "https://news.example.com/a?x=1"))
        .and(query_param("api_token", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"url":"https://news.example.com/a","title":"A","content":"<p>Body</p>","is_article":true,"duration":120}"#,
            "application/json",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let article = api(&server, Some("secret"))
        .parse("https://news.example.com/a?x=1", false)
        .await
        .unwrap()
        .expect("article");

    assert_eq!(article.title.as_deref(), Some("A"));
    assert_eq!(article.duration, 120);
    assert!(article.is_article);
}

#[tokio::test]
async fn parse_passes_no_cache_flag() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/parse"))
        .and(query_param("no_cache", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"url":"https://x/a","is_article":false}"#,
            "application/json",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let article = api(&server, None)
        .parse("https://x/a", true)
        .await
        .unwrap()
        .unwrap();
    assert!(!article.is_article);
}

#[tokio::test]
async fn parse_null_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/parse"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("null", "application/json"))
        .mount(&server)
        .await;

    let result = api(&server, None).parse("https://x/a", false).await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn parse_server_error_is_err() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/parse"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    assert!(api(&server, None).parse("https://x/a", false).await.is_err());
}

#[tokio::test]
async fn trending_returns_articles_with_urls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/trending"))
        .and(query_param("api_token", "t"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"[
                {"url":"https://x/1","title":"One","is_article":true},
                {"title":"No url"},
                {"url":"https://x/2","title":"Two","is_article":true}
            ]"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let articles = api(&server, Some("t")).trending().await.unwrap();
    let urls: Vec<&str> = articles.iter().map(|a| a.url.as_str()).collect();
    assert_eq!(urls, vec!["https://x/1", "https://x/2"]);
}

#[tokio::test]
async fn prepare_hits_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/prepare"))
        .and(query_param("url", "https://x/a"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    api(&server, None).prepare("https://x/a").await.unwrap();
}
