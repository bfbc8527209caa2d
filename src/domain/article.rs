use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::content::remove_url_parameters;

/// A parsed article, either fresh from the backend or loaded from the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub alias: Option<String>,
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub source: Option<String>,
    pub domain: Option<String>,
    /// Estimated reading time in seconds
    pub duration: i64,
    pub inserted_at: DateTime<Utc>,
    pub is_article: bool,
    pub saved: bool,
    pub source_id: Option<i64>,
}

impl Article {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            id: 0,
            alias: None,
            url: url.into(),
            title: None,
            description: None,
            image: None,
            content: None,
            author: None,
            source: None,
            domain: None,
            duration: 0,
            inserted_at: Utc::now(),
            is_article: true,
            saved: false,
            source_id: None,
        }
    }

    /// The key this article is cached under.
    pub fn cache_key(&self) -> &str {
        remove_url_parameters(&self.url)
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.url)
    }

    /// Whether there is anything worth handing to the content pipeline.
    pub fn has_readable_content(&self) -> bool {
        self.is_article && self.content.as_deref().is_some_and(|c| !c.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_strips_query() {
        let article = Article::new("https://example.com/post?utm_source=feed&x=1");
        assert_eq!(article.cache_key(), "https://example.com/post");
    }

    #[test]
    fn test_display_title_falls_back_to_url() {
        let mut article = Article::new("https://example.com/post");
        assert_eq!(article.display_title(), "https://example.com/post");

        article.title = Some("A Title".into());
        assert_eq!(article.display_title(), "A Title");
    }

    #[test]
    fn test_has_readable_content() {
        let mut article = Article::new("https://example.com/post");
        assert!(!article.has_readable_content());

        article.content = Some("   ".into());
        assert!(!article.has_readable_content());

        article.content = Some("<p>Body</p>".into());
        assert!(article.has_readable_content());

        article.is_article = false;
        assert!(!article.has_readable_content());
    }
}
