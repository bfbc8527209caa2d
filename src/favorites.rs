use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::app::Result;
use crate::domain::Article;
use crate::store::{SqliteStore, Store};

/// Announced after an article's saved flag has been persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedEvent {
    pub article: Article,
}

/// Receives saved-state changes.
pub trait SavedNotifier: Send + Sync {
    fn notify(&self, event: SavedEvent);
}

/// Fans saved events out to any number of subscribers.
pub struct BroadcastNotifier {
    tx: broadcast::Sender<SavedEvent>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SavedEvent> {
        self.tx.subscribe()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(16)
    }
}

impl SavedNotifier for BroadcastNotifier {
    fn notify(&self, event: SavedEvent) {
        // No subscribers is fine
        if self.tx.send(event).is_err() {
            debug!("Saved event dropped, nobody is listening");
        }
    }
}

pub struct Favorites {
    store: Arc<SqliteStore>,
    notifier: Arc<dyn SavedNotifier>,
}

impl Favorites {
    pub fn new(store: Arc<SqliteStore>, notifier: Arc<dyn SavedNotifier>) -> Self {
        Self { store, notifier }
    }

    /// Persist `saved` on the article, then announce it.
    ///
    /// Nothing is announced when the write fails, including when the
    /// article has no cached row yet.
    pub fn set_saved(&self, article: &mut Article, saved: bool) -> Result<()> {
        article.saved = saved;

        {
            let session = self.store.session()?;
            session.update_saved_state(article)?;
        }

        info!(
            "{} {}",
            if saved { "Saved" } else { "Unsaved" },
            article.display_title()
        );
        self.notifier.notify(SavedEvent {
            article: article.clone(),
        });
        Ok(())
    }

    /// Flip the saved flag; returns the new state.
    pub fn toggle(&self, article: &mut Article) -> Result<bool> {
        let saved = !article.saved;
        self.set_saved(article, saved)?;
        Ok(saved)
    }
}
