use std::path::PathBuf;
use std::sync::Arc;

use crate::api::{ArticleApi, ArticleService};
use crate::app::error::{ArticleError, Result};
use crate::config::Config;
use crate::favorites::{BroadcastNotifier, Favorites};
use crate::loader::ArticleLoader;
use crate::reader::HttpImageProbe;
use crate::store::SqliteStore;

pub struct AppContext {
    pub config: Config,
    pub store: Arc<SqliteStore>,
    pub api: Arc<dyn ArticleService>,
    pub loader: ArticleLoader,
    pub notifier: Arc<BroadcastNotifier>,
    pub favorites: Favorites,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        let db_path = match &config.store.db_path {
            Some(p) => p.clone(),
            None => Self::default_db_path()?,
        };

        let store = Arc::new(SqliteStore::new(&db_path)?);
        Self::with_store(config, store)
    }

    pub fn in_memory(config: Config) -> Result<Self> {
        let store = Arc::new(SqliteStore::in_memory()?);
        Self::with_store(config, store)
    }

    fn with_store(config: Config, store: Arc<SqliteStore>) -> Result<Self> {
        let api: Arc<dyn ArticleService> = Arc::new(ArticleApi::new(
            &config.api.base_url,
            config.api.resolved_token(),
            config.api.timeout(),
        )?);

        let mut loader = ArticleLoader::new(store.clone(), api.clone())
            .with_thresholds(config.reader.thresholds());
        if config.reader.verify_image_sizes {
            loader = loader.with_probe(Arc::new(HttpImageProbe::new(config.api.timeout())?));
        }

        let notifier = Arc::new(BroadcastNotifier::default());
        let favorites = Favorites::new(store.clone(), notifier.clone());

        Ok(Self {
            config,
            store,
            api,
            loader,
            notifier,
            favorites,
        })
    }

    fn default_db_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| ArticleError::Config("Could not find data directory".into()))?;
        let app_dir = data_dir.join("article-reader");
        std::fs::create_dir_all(&app_dir)?;
        Ok(app_dir.join("articles.db"))
    }
}
