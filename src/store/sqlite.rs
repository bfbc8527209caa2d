use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use rusqlite_migration::{Migrations, M};
use tracing::{debug, warn};

use crate::app::{ArticleError, Result};
use crate::content::remove_url_parameters;
use crate::domain::{Article, Category, CategoryCounts, Source};
use crate::store::{Store, StoreSession};

const ARTICLE_COLUMNS: &str = "a._id, a.alias, a.url, a.title, a.description, a.image, \
     a.author, a.source, a.domain, a.duration, a.inserted_at, a.is_article, a.saved, a.source_id";

enum Location {
    File(PathBuf),
    Memory,
}

/// SQLite article cache.
///
/// File-backed stores only hold a connection while at least one session is
/// open; `open`/`close` calls nest and share that one connection. In-memory
/// stores keep theirs for their whole lifetime since closing would lose the
/// data.
pub struct SqliteStore {
    location: Location,
    conn: Mutex<Option<Connection>>,
    open_count: AtomicUsize,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let location = Location::File(path.as_ref().to_path_buf());
        // Fail early on an unusable path or schema; the connection itself
        // is not kept until a session opens.
        Self::connect(&location)?;

        Ok(Self {
            location,
            conn: Mutex::new(None),
            open_count: AtomicUsize::new(0),
        })
    }

    pub fn in_memory() -> Result<Self> {
        let location = Location::Memory;
        let conn = Self::connect(&location)?;

        Ok(Self {
            location,
            conn: Mutex::new(Some(conn)),
            open_count: AtomicUsize::new(0),
        })
    }

    /// Start a session that closes itself when dropped.
    pub fn session(&self) -> Result<StoreSession<'_>> {
        StoreSession::new(self)
    }

    /// Open the store, creating the connection if this is the first opener.
    ///
    /// Every call must be paired with a [`close`](Self::close).
    pub fn open(&self) -> Result<()> {
        let mut conn = self.lock()?;

        if self.open_count.fetch_add(1, Ordering::SeqCst) == 0 && conn.is_none() {
            match Self::connect(&self.location) {
                Ok(c) => {
                    debug!("Opened article cache");
                    *conn = Some(c);
                }
                Err(e) => {
                    self.open_count.fetch_sub(1, Ordering::SeqCst);
                    return Err(e);
                }
            }
        }

        Ok(())
    }

    /// Release one session; the last close tears down the connection.
    pub fn close(&self) {
        let mut conn = match self.conn.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let previous = self.open_count.load(Ordering::SeqCst);
        if previous == 0 {
            warn!("Article cache closed more times than it was opened");
            return;
        }
        self.open_count.store(previous - 1, Ordering::SeqCst);

        if previous == 1 && matches!(self.location, Location::File(_)) {
            conn.take();
            debug!("Closed article cache");
        }
    }

    pub fn is_open(&self) -> bool {
        self.conn.lock().map(|c| c.is_some()).unwrap_or(false)
    }

    pub fn open_sessions(&self) -> usize {
        self.open_count.load(Ordering::SeqCst)
    }

    fn connect(location: &Location) -> Result<Connection> {
        let mut conn = match location {
            Location::File(path) => Connection::open(path)?,
            Location::Memory => Connection::open_in_memory()?,
        };

        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../migrations/001-initial/up.sql"
        ))]);
        migrations.to_latest(&mut conn)?;

        Ok(conn)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<Connection>>> {
        self.conn.lock().map_err(|e| {
            ArticleError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(1),
                Some(e.to_string()),
            ))
        })
    }

    fn with_conn<T>(&self, f: impl FnOnce(&mut Connection) -> Result<T>) -> Result<T> {
        let mut guard = self.lock()?;
        let conn = guard
            .as_mut()
            .ok_or_else(|| ArticleError::Other("Article cache is not open".into()))?;
        f(conn)
    }

    fn article_from_row(row: &Row<'_>) -> rusqlite::Result<Article> {
        Ok(Article {
            id: row.get(0)?,
            alias: row.get(1)?,
            url: row.get(2)?,
            title: row.get(3)?,
            description: row.get(4)?,
            image: row.get(5)?,
            author: row.get(6)?,
            source: row.get(7)?,
            domain: row.get(8)?,
            duration: row.get::<_, Option<i64>>(9)?.unwrap_or(0),
            inserted_at: DateTime::from_timestamp_millis(row.get(10)?).unwrap_or_else(Utc::now),
            is_article: row.get::<_, i32>(11)? != 0,
            saved: row.get::<_, i32>(12)? != 0,
            source_id: row.get(13)?,
            content: row.get(14)?,
        })
    }

    fn query_articles(&self, filter: &str, params: &[&dyn rusqlite::ToSql]) -> Result<Vec<Article>> {
        self.with_conn(|conn| {
            // Listings skip the content join; bodies can be large.
            let sql = format!(
                "SELECT {ARTICLE_COLUMNS}, NULL FROM article a {filter} ORDER BY a.inserted_at DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let articles = stmt
                .query_map(params, Self::article_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(articles)
        })
    }
}

impl Store for SqliteStore {
    fn insert_article(&self, article: &Article) -> Result<i64> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;

            tx.execute(
                "INSERT INTO article (alias, url, title, description, image, author, source, domain,
                     duration, inserted_at, is_article, saved, source_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                params![
                    article.alias,
                    remove_url_parameters(&article.url),
                    article.title,
                    article.description,
                    article.image,
                    article.author,
                    article.source,
                    article.domain,
                    article.duration,
                    article.inserted_at.timestamp_millis(),
                    article.is_article,
                    article.saved,
                    article.source_id
                ],
            )?;
            let id = tx.last_insert_rowid();

            tx.execute(
                "INSERT INTO content (article_id, content) VALUES (?1, ?2)",
                params![id, article.content],
            )?;

            tx.commit()?;
            Ok(id)
        })
    }

    fn get_article(&self, url: &str) -> Result<Option<Article>> {
        let url = remove_url_parameters(url);

        self.with_conn(|conn| {
            let article = conn
                .query_row(
                    &format!(
                        "SELECT {ARTICLE_COLUMNS}, c.content
                         FROM article a LEFT OUTER JOIN content c ON a._id = c.article_id
                         WHERE a.url = ?1 ORDER BY a._id LIMIT 1"
                    ),
                    params![url],
                    Self::article_from_row,
                )
                .optional()?;
            Ok(article)
        })
    }

    fn update_saved_state(&self, article: &Article) -> Result<()> {
        self.with_conn(|conn| {
            let updated = conn.execute(
                "UPDATE article SET saved = ?1 WHERE _id = ?2",
                params![article.saved, article.id],
            )?;
            if updated == 0 {
                return Err(ArticleError::ArticleNotFound(article.url.clone()));
            }
            Ok(())
        })
    }

    fn update_article_content(&self, article: &Article) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE content SET content = ?1 WHERE article_id = ?2",
                params![article.content, article.id],
            )?;
            Ok(())
        })
    }

    fn get_all_articles(&self) -> Result<Vec<Article>> {
        self.query_articles("", &[])
    }

    fn get_saved_articles(&self) -> Result<Vec<Article>> {
        self.query_articles("WHERE a.saved = 1", &[])
    }

    fn get_articles_for_source(&self, remote_source_id: i64) -> Result<Vec<Article>> {
        self.query_articles("WHERE a.source_id = ?1", &[&remote_source_id])
    }

    fn delete_article(&self, id: i64) -> Result<()> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM article WHERE _id = ?1", params![id])?;
            tx.execute("DELETE FROM content WHERE article_id = ?1", params![id])?;
            tx.commit()?;
            Ok(())
        })
    }

    fn insert_category(&self, name: &str) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute("INSERT INTO category (name) VALUES (?1)", params![name])?;
            Ok(conn.last_insert_rowid())
        })
    }

    fn get_category_id(&self, name: &str) -> Result<Option<i64>> {
        self.with_conn(|conn| {
            let id = conn
                .query_row(
                    "SELECT _id FROM category WHERE name = ?1",
                    params![name],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(id)
        })
    }

    fn get_category_counts(&self, since: DateTime<Utc>) -> Result<CategoryCounts> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT c.name, COUNT(c._id) AS count
                 FROM article a
                 JOIN source s ON a.source_id = s.remote_id
                 JOIN category c ON s.category_id = c._id
                 WHERE a.inserted_at > ?1 AND a.source_id NOT NULL
                 GROUP BY c._id
                 ORDER BY count DESC",
            )?;

            let categories = stmt
                .query_map(params![since.timestamp_millis()], |row| {
                    Ok(Category {
                        name: row.get(0)?,
                        article_count: row.get(1)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(CategoryCounts::new(categories))
        })
    }

    fn insert_source(&self, source: &Source) -> Result<i64> {
        self.with_conn(|conn| {
            // Category lookup and insert share one lock and transaction
            let tx = conn.transaction()?;

            let existing: Option<i64> = tx
                .query_row(
                    "SELECT _id FROM category WHERE name = ?1",
                    params![source.category_name],
                    |row| row.get(0),
                )
                .optional()?;
            let category_id = match existing {
                Some(id) => id,
                None => {
                    tx.execute(
                        "INSERT INTO category (name) VALUES (?1)",
                        params![source.category_name],
                    )?;
                    tx.last_insert_rowid()
                }
            };

            tx.execute(
                "INSERT INTO source (name, image_url, remote_id, category_id) VALUES (?1, ?2, ?3, ?4)",
                params![source.name, source.image_url, source.remote_id, category_id],
            )?;
            let id = tx.last_insert_rowid();

            tx.commit()?;
            Ok(id)
        })
    }

    fn delete_source(&self, name: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM source WHERE name = ?1", params![name])?;
            Ok(())
        })
    }

    fn get_sources(&self) -> Result<Vec<Source>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT s._id, s.name, s.image_url, s.remote_id, c._id, c.name
                 FROM source s LEFT OUTER JOIN category c ON s.category_id = c._id
                 ORDER BY s.name ASC",
            )?;

            let sources = stmt
                .query_map([], |row| {
                    Ok(Source {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        image_url: row.get(2)?,
                        remote_id: row.get(3)?,
                        category_id: row.get(4)?,
                        category_name: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(sources)
        })
    }

    fn clear_tables(&self) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute_batch(
                "DELETE FROM content; DELETE FROM article; DELETE FROM category; DELETE FROM source;",
            )?;
            Ok(())
        })
    }
}
