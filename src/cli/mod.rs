pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "article-reader")]
#[command(about = "Read web articles as clean text", long_about = None)]
pub struct Cli {
    /// Use this config file instead of the default one
    #[arg(short, long, global = true)]
    pub config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show an article in reader form
    Read {
        /// URL of the page to read
        url: String,
        /// Ignore cached copies, locally and on the backend
        #[arg(long)]
        no_cache: bool,
    },
    /// Fetch and cache an article and its images for later
    Preload {
        url: String,
    },
    /// Ask the backend to parse an article ahead of time
    Prepare {
        url: String,
    },
    /// List articles trending on the backend
    Trending,
    /// List cached articles
    List {
        /// Only saved articles
        #[arg(long)]
        saved: bool,
        /// Only articles from this source (remote id)
        #[arg(long, conflicts_with = "saved")]
        source: Option<i64>,
    },
    /// Save a cached article
    Save {
        url: String,
    },
    /// Remove a cached article from the saved list
    Unsave {
        url: String,
    },
    /// Delete an article from the cache
    Delete {
        url: String,
    },
    /// List sources
    Sources,
    /// Add a source, creating its category if needed
    AddSource {
        name: String,
        /// Remote id the backend uses for this source
        remote_id: i64,
        /// Category name
        category: String,
        /// Source icon
        #[arg(long, default_value = "")]
        image_url: String,
    },
    /// Article counts per category
    Categories {
        /// Only count articles cached within this many days
        #[arg(long, default_value_t = 7)]
        since: i64,
    },
}
