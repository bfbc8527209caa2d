use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::domain::Article;

/// Article as the backend serializes it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArticlePayload {
    pub alias: Option<String>,
    pub url: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub source: Option<String>,
    pub domain: Option<String>,
    pub duration: i64,
    pub is_article: bool,
}

impl ArticlePayload {
    /// Convert into a fresh, unsaved article.
    ///
    /// `requested_url` is used when the payload carries no url of its own.
    pub fn into_article(self, requested_url: &str) -> Article {
        Article {
            id: 0,
            alias: self.alias,
            url: self.url.unwrap_or_else(|| requested_url.to_string()),
            title: self.title,
            description: self.description,
            image: self.image,
            content: self.content,
            author: self.author,
            source: self.source,
            domain: self.domain,
            duration: self.duration,
            inserted_at: Utc::now(),
            is_article: self.is_article,
            saved: false,
            source_id: None,
        }
    }
}
