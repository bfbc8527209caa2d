pub mod session;
pub mod sqlite;

use chrono::{DateTime, Utc};

use crate::app::Result;
use crate::domain::{Article, CategoryCounts, Source};

pub use session::StoreSession;
pub use sqlite::SqliteStore;

pub trait Store {
    // Article operations
    fn insert_article(&self, article: &Article) -> Result<i64>;
    fn get_article(&self, url: &str) -> Result<Option<Article>>;
    fn update_saved_state(&self, article: &Article) -> Result<()>;
    fn update_article_content(&self, article: &Article) -> Result<()>;
    fn get_all_articles(&self) -> Result<Vec<Article>>;
    fn get_saved_articles(&self) -> Result<Vec<Article>>;
    fn get_articles_for_source(&self, remote_source_id: i64) -> Result<Vec<Article>>;
    fn delete_article(&self, id: i64) -> Result<()>;

    // Category operations
    fn insert_category(&self, name: &str) -> Result<i64>;
    fn get_category_id(&self, name: &str) -> Result<Option<i64>>;
    fn get_category_counts(&self, since: DateTime<Utc>) -> Result<CategoryCounts>;

    fn category_exists(&self, name: &str) -> Result<bool> {
        Ok(self.get_category_id(name)?.is_some())
    }

    // Source operations
    fn insert_source(&self, source: &Source) -> Result<i64>;
    fn delete_source(&self, name: &str) -> Result<()>;
    fn get_sources(&self) -> Result<Vec<Source>>;

    fn clear_tables(&self) -> Result<()>;
}
