//! Fetch-or-cache loading and content parsing for article views.
//!
//! ```text
//! url → cache hit? ─no→ backend parse → cache insert
//!          │
//!          └→ Article → select + filter (blocking pool) → ArticleProjection
//! ```
//!
//! Both steps run under a [`CancelToken`]; parsing never starts before an
//! article with content is available.

mod scope;

use std::fmt;
use std::sync::Arc;

use tokio::task;
use tracing::{debug, info, warn};

use crate::api::ArticleService;
use crate::app::{ArticleError, Result};
use crate::content::{
    decode_image_url, filter_content, is_remote_image, select_content, ContentNode,
};
use crate::domain::Article;
use crate::reader::{
    verify_image_sizes, ArticleProjection, CachedImageProbe, ImageProbe, ImageThresholds,
    InsertRange, VisibilityChange,
};
use crate::store::{SqliteStore, Store};

pub use scope::{CancelToken, ViewScope};

/// Why an article is handed to an external viewer instead of the reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// The backend had nothing for the url
    NotFound,
    /// The backend could not be reached or answered with an error
    FetchFailed(String),
    /// The backend flagged the page as not being an article
    NotAnArticle,
    /// Marked as an article but without any body
    NoContent,
    /// The extraction did not pass the substance threshold
    TooThin,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::NotFound => write!(f, "nothing could be parsed"),
            FallbackReason::FetchFailed(e) => write!(f, "fetch failed: {}", e),
            FallbackReason::NotAnArticle => write!(f, "not an article"),
            FallbackReason::NoContent => write!(f, "article has no content"),
            FallbackReason::TooThin => write!(f, "too little readable text"),
        }
    }
}

/// A projection with its content already appended.
#[derive(Debug)]
pub struct ReaderView {
    pub projection: ArticleProjection,
    /// Where the content items were inserted
    pub inserted: InsertRange,
}

#[derive(Debug)]
pub enum ReaderOutcome {
    Ready(ReaderView),
    ExternalViewer {
        url: String,
        article: Option<Article>,
        reason: FallbackReason,
    },
}

impl ReaderOutcome {
    fn fallback(url: &str, article: Option<Article>, reason: FallbackReason) -> Self {
        info!("Falling back to external viewer for {}: {:?}", url, reason);
        ReaderOutcome::ExternalViewer {
            url: url.to_string(),
            article,
            reason,
        }
    }
}

/// What [`ArticleLoader::preload`] managed to prepare.
#[derive(Debug)]
pub struct PreloadReport {
    pub article: Option<Article>,
    /// Node count after filtering, `None` if there was nothing to parse
    pub content_nodes: Option<usize>,
    /// Images whose size is now cached for the reader
    pub images_sized: usize,
}

pub struct ArticleLoader {
    store: Arc<SqliteStore>,
    api: Arc<dyn ArticleService>,
    probe: Option<Arc<CachedImageProbe>>,
    thresholds: ImageThresholds,
}

impl ArticleLoader {
    pub fn new(store: Arc<SqliteStore>, api: Arc<dyn ArticleService>) -> Self {
        Self {
            store,
            api,
            probe: None,
            thresholds: ImageThresholds::default(),
        }
    }

    /// Enable image-size verification with `probe`.
    ///
    /// Sizes are cached per url, so images checked by [`preload`](Self::preload)
    /// are not downloaded again when the view verifies them.
    pub fn with_probe(mut self, probe: Arc<dyn ImageProbe>) -> Self {
        self.probe = Some(Arc::new(CachedImageProbe::new(probe)));
        self
    }

    pub fn with_thresholds(mut self, thresholds: ImageThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Load the article for `url`, from the cache when possible.
    ///
    /// A backend result is cached under the url that was asked for, not the
    /// one the backend resolved it to, so later lookups by the same url hit.
    /// `no_cache` skips the local lookup and asks the backend to re-parse;
    /// an existing row then gets its content replaced.
    pub async fn load_article(&self, url: &str, no_cache: bool) -> Result<Option<Article>> {
        let cached = self.cached_article(url).await;

        if let Some(article) = &cached {
            if !no_cache {
                debug!("Cache hit for {}", url);
                return Ok(cached);
            }
            debug!("Ignoring cached copy {} of {}", article.id, url);
        } else {
            debug!("Cache miss for {}", url);
        }

        let Some(mut article) = self.api.parse(url, no_cache).await? else {
            return Ok(None);
        };
        article.url = url.to_string();

        match cached {
            Some(existing) => {
                article.id = existing.id;
                article.saved = existing.saved;
                article.inserted_at = existing.inserted_at;
                self.write_cache(article.clone(), |store, a| {
                    store.update_article_content(a).map(|_| a.id)
                })
                .await;
            }
            None => {
                if let Some(id) = self
                    .write_cache(article.clone(), |store, a| store.insert_article(a))
                    .await
                {
                    article.id = id;
                }
            }
        }

        Ok(Some(article))
    }

    /// Select and filter the article body on the blocking pool.
    pub async fn parse_content(&self, article: &Article) -> Result<Option<Vec<ContentNode>>> {
        let Some(html) = article.content.clone() else {
            return Ok(None);
        };
        let article = article.clone();

        task::spawn_blocking(move || filter_content(select_content(&html), &article))
            .await
            .map_err(|e| ArticleError::Other(format!("Content parser failed: {}", e)))
    }

    /// Fetch, parse and project `url` for a reader view.
    pub async fn open(&self, url: &str, no_cache: bool, token: &CancelToken) -> Result<ReaderOutcome> {
        let article = match token.run(self.load_article(url, no_cache)).await? {
            Ok(Some(article)) => article,
            Ok(None) => return Ok(ReaderOutcome::fallback(url, None, FallbackReason::NotFound)),
            Err(e) => {
                warn!("Failed to load {}: {}", url, e);
                return Ok(ReaderOutcome::fallback(
                    url,
                    None,
                    FallbackReason::FetchFailed(e.to_string()),
                ));
            }
        };

        self.project(article, token).await
    }

    /// Turn a loaded article into a reader view.
    pub async fn project(&self, article: Article, token: &CancelToken) -> Result<ReaderOutcome> {
        let url = article.url.clone();

        if !article.is_article {
            return Ok(ReaderOutcome::fallback(&url, Some(article), FallbackReason::NotAnArticle));
        }
        if !article.has_readable_content() {
            return Ok(ReaderOutcome::fallback(&url, Some(article), FallbackReason::NoContent));
        }

        let Some(nodes) = token.run(self.parse_content(&article)).await?? else {
            return Ok(ReaderOutcome::fallback(&url, Some(article), FallbackReason::TooThin));
        };

        let mut projection = ArticleProjection::with_thresholds(article, self.thresholds);
        let inserted = projection.append_content(nodes)?;
        debug!(
            "Projected {} items for {} ({} leading)",
            projection.len(),
            url,
            projection.leading_count()
        );

        Ok(ReaderOutcome::Ready(ReaderView {
            projection,
            inserted,
        }))
    }

    /// Check inline image sizes, hiding the ones that are too small.
    ///
    /// Does nothing without a probe.
    pub async fn verify_images(
        &self,
        projection: &mut ArticleProjection,
        token: &CancelToken,
    ) -> Result<Vec<VisibilityChange>> {
        let Some(probe) = self.probe.clone() else {
            return Ok(Vec::new());
        };

        token.run(verify_image_sizes(projection, probe)).await
    }

    /// Load and parse `url` ahead of time so a later view opens instantly.
    ///
    /// With a probe configured, inline image sizes are looked up now and
    /// cached for [`verify_images`](Self::verify_images).
    pub async fn preload(&self, url: &str) -> Result<PreloadReport> {
        let Some(article) = self.load_article(url, false).await? else {
            return Ok(PreloadReport {
                article: None,
                content_nodes: None,
                images_sized: 0,
            });
        };

        let nodes = if article.has_readable_content() {
            self.parse_content(&article).await?
        } else {
            None
        };

        // Only inline images are size-checked by the reader
        let images: Vec<String> = nodes
            .iter()
            .flatten()
            .filter(|n| n.is_image())
            .map(|n| decode_image_url(n.src.as_deref()))
            .filter(|url| is_remote_image(url))
            .collect();

        let images_sized = match &self.probe {
            Some(probe) => {
                let mut sized = 0;
                for image in &images {
                    match probe.probe(image).await {
                        Ok(_) => sized += 1,
                        Err(e) => debug!("Could not size {}: {}", image, e),
                    }
                }
                sized
            }
            None => 0,
        };

        Ok(PreloadReport {
            content_nodes: nodes.as_ref().map(Vec::len),
            article: Some(article),
            images_sized,
        })
    }

    /// Ask the backend to parse `url` on its side.
    pub async fn prepare(&self, url: &str) -> Result<()> {
        self.api.prepare(url).await
    }

    pub async fn trending(&self) -> Result<Vec<Article>> {
        self.api.trending().await
    }

    /// Cache lookup; any store failure counts as a miss.
    async fn cached_article(&self, url: &str) -> Option<Article> {
        let store = self.store.clone();
        let url = url.to_string();

        let lookup = task::spawn_blocking(move || {
            let session = store.session()?;
            session.get_article(&url)
        })
        .await;

        match lookup {
            Ok(Ok(article)) => article,
            Ok(Err(e)) => {
                warn!("Cache lookup failed, treating as miss: {}", e);
                None
            }
            Err(e) => {
                warn!("Cache lookup task failed: {}", e);
                None
            }
        }
    }

    /// Run a cache write; failures are logged and swallowed.
    async fn write_cache<F>(&self, article: Article, write: F) -> Option<i64>
    where
        F: FnOnce(&SqliteStore, &Article) -> Result<i64> + Send + 'static,
    {
        let store = self.store.clone();
        let result = task::spawn_blocking(move || {
            let session = store.session()?;
            write(&*session, &article)
        })
        .await;

        match result {
            Ok(Ok(id)) => Some(id),
            Ok(Err(e)) => {
                warn!("Failed to cache article: {}", e);
                None
            }
            Err(e) => {
                warn!("Cache write task failed: {}", e);
                None
            }
        }
    }
}
