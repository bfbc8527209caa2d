use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use article_reader::app::AppContext;
use article_reader::cli::{commands, Cli, Commands};
use article_reader::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let ctx = AppContext::new(config)?;

    match cli.command {
        Commands::Read { url, no_cache } => {
            commands::read(&ctx, &url, no_cache).await?;
        }
        Commands::Preload { url } => {
            commands::preload(&ctx, &url).await?;
        }
        Commands::Prepare { url } => {
            commands::prepare(&ctx, &url).await?;
        }
        Commands::Trending => {
            commands::trending(&ctx).await?;
        }
        Commands::List { saved, source } => {
            commands::list_articles(&ctx, saved, source)?;
        }
        Commands::Save { url } => {
            commands::set_saved(&ctx, &url, true)?;
        }
        Commands::Unsave { url } => {
            commands::set_saved(&ctx, &url, false)?;
        }
        Commands::Delete { url } => {
            commands::delete_article(&ctx, &url)?;
        }
        Commands::Sources => {
            commands::list_sources(&ctx)?;
        }
        Commands::AddSource {
            name,
            remote_id,
            category,
            image_url,
        } => {
            commands::add_source(&ctx, &name, remote_id, &category, &image_url)?;
        }
        Commands::Categories { since } => {
            commands::list_categories(&ctx, since)?;
        }
    }

    Ok(())
}
