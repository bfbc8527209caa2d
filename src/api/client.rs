use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use crate::api::{ArticlePayload, ArticleService};
use crate::app::Result;
use crate::domain::Article;

pub const DEFAULT_BASE_URL: &str = "https://klinkerapps-article.herokuapp.com/";

const TOKEN_PARAM: &str = "api_token";

/// reqwest-backed [`ArticleService`].
pub struct ArticleApi {
    client: Client,
    base_url: Url,
    api_token: Option<String>,
}

impl ArticleApi {
    pub fn new(base_url: &str, api_token: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .user_agent(concat!("article-reader/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Self::with_client(client, base_url, api_token)
    }

    pub fn with_client(client: Client, base_url: &str, api_token: Option<String>) -> Result<Self> {
        // Url::join replaces the last segment unless the base ends in '/'
        let base_url = if base_url.ends_with('/') {
            Url::parse(base_url)?
        } else {
            Url::parse(&format!("{}/", base_url))?
        };

        Ok(Self {
            client,
            base_url,
            api_token: api_token.filter(|t| !t.is_empty()),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build a request url for `path`, appending the token after `params`.
    fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> Result<Url> {
        let mut url = self.base_url.join(path)?;

        {
            let mut query = url.query_pairs_mut();
            for (key, value) in params {
                query.append_pair(key, value);
            }
            if let Some(token) = &self.api_token {
                query.append_pair(TOKEN_PARAM, token);
            }
        }

        // An empty query_pairs_mut still leaves a bare '?'
        if url.query() == Some("") {
            url.set_query(None);
        }

        Ok(url)
    }

    async fn get_text(&self, url: Url) -> Result<String> {
        let response = self.client.get(url).send().await?;
        response.error_for_status_ref()?;
        Ok(response.text().await?)
    }
}

#[async_trait]
impl ArticleService for ArticleApi {
    async fn parse(&self, url: &str, no_cache: bool) -> Result<Option<Article>> {
        let mut params = vec![("url", url)];
        if no_cache {
            params.push(("no_cache", "true"));
        }

        let body = self.get_text(self.endpoint("parse", &params)?).await?;
        if body.trim().is_empty() {
            debug!("Backend returned an empty body for {}", url);
            return Ok(None);
        }

        let payload: Option<ArticlePayload> = serde_json::from_str(&body)?;
        Ok(payload.map(|p| p.into_article(url)))
    }

    async fn trending(&self) -> Result<Vec<Article>> {
        let body = self.get_text(self.endpoint("trending", &[])?).await?;
        let payloads: Option<Vec<ArticlePayload>> = serde_json::from_str(&body)?;

        let articles: Vec<Article> = payloads
            .unwrap_or_default()
            .into_iter()
            .filter_map(|payload| match payload.url.clone() {
                Some(url) => Some(payload.into_article(&url)),
                None => {
                    warn!("Skipping trending entry without a url");
                    None
                }
            })
            .collect();

        debug!("Fetched {} trending articles", articles.len());
        Ok(articles)
    }

    async fn prepare(&self, url: &str) -> Result<()> {
        self.get_text(self.endpoint("prepare", &[("url", url)])?)
            .await?;
        Ok(())
    }
}
