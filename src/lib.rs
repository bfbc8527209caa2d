//! # article-reader
//!
//! Turns web pages into clean, positionally addressed reader views.
//!
//! ## Architecture
//!
//! ```text
//! url → Store (cache) / ArticleService (backend) → select → filter → ArticleProjection → render
//! ```
//!
//! - [`content`]: HTML selection, boilerplate filtering, image url cleanup
//! - [`reader`]: Reader items, layout rules and image-size verification
//! - [`store`]: SQLite article cache with shared sessions
//! - [`api`]: Client for the parsing backend
//! - [`loader`]: Cancellable fetch-or-cache loading
//!
//! ## Quick Start
//!
//! ```bash
//! # Read an article
//! article-reader read https://example.com/story
//!
//! # Cache one for later
//! article-reader preload https://example.com/story
//!
//! # Saved articles
//! article-reader list --saved
//! ```

/// Backend client.
///
/// - [`ArticleService`](api::ArticleService): parse, trending, prepare
/// - [`ArticleApi`](api::ArticleApi): reqwest implementation that appends
///   the API token to every request
pub mod api;

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together all components:
/// store, backend client, loader, favorites.
pub mod app;

/// Command-line interface using clap.
pub mod cli;

/// Configuration loaded from `~/.config/article-reader/config.toml`.
pub mod config;

/// HTML content normalization.
pub mod content;

/// Core domain models.
///
/// - [`Article`](domain::Article): Parsed article, cached by query-stripped url
/// - [`Source`](domain::Source) and [`Category`](domain::Category)
pub mod domain;

/// Saving articles and announcing saved-state changes.
pub mod favorites;

/// Fetch-or-cache loading scoped to a view.
pub mod loader;

/// Reader items, layout hints and rendering.
pub mod reader;

/// SQLite persistence layer.
///
/// - [`Store`](store::Store): Trait defining storage operations
/// - [`SqliteStore`](store::SqliteStore): SQLite implementation
/// - [`StoreSession`](store::StoreSession): Guard keeping the connection open
pub mod store;
