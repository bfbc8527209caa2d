//! Client for the remote article parsing service.

pub mod client;
pub mod payload;

use async_trait::async_trait;

use crate::app::Result;
use crate::domain::Article;

pub use client::{ArticleApi, DEFAULT_BASE_URL};
pub use payload::ArticlePayload;

/// Operations offered by the parsing backend.
///
/// Every request is authenticated by the implementation; callers never pass
/// the API token themselves.
#[async_trait]
pub trait ArticleService: Send + Sync {
    /// Parse the page at `url`. `Ok(None)` means the backend had nothing
    /// for it.
    ///
    /// With `no_cache` set the backend re-parses instead of serving its own
    /// cached copy.
    async fn parse(&self, url: &str, no_cache: bool) -> Result<Option<Article>>;

    /// Articles currently popular on the backend.
    async fn trending(&self) -> Result<Vec<Article>>;

    /// Ask the backend to parse and cache `url` ahead of time.
    async fn prepare(&self, url: &str) -> Result<()>;
}
