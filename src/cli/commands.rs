use chrono::{Duration, Utc};

use crate::app::{AppContext, ArticleError, Result};
use crate::domain::{Article, Source};
use crate::loader::{ReaderOutcome, ViewScope};
use crate::reader::render;
use crate::store::Store;

pub async fn read(ctx: &AppContext, url: &str, no_cache: bool) -> Result<()> {
    let scope = ViewScope::new();
    let token = scope.token();

    match ctx.loader.open(url, no_cache, &token).await? {
        ReaderOutcome::Ready(mut view) => {
            let changes = ctx.loader.verify_images(&mut view.projection, &token).await?;
            let hidden = changes.iter().filter(|c| !c.visible).count();

            print!("{}", render::render_text(&view.projection));

            let article = view.projection.article();
            if article.duration > 0 {
                println!("\n{} min read", (article.duration + 59) / 60);
            }
            if hidden > 0 {
                println!("{} small images hidden", hidden);
            }
        }
        ReaderOutcome::ExternalViewer { url, reason, .. } => {
            println!("Can't show {} as an article: {}", url, reason);
            if ctx.config.reader.open_browser_on_fallback {
                open::that(&url)?;
            } else {
                println!("Open it in a browser instead");
            }
        }
    }

    Ok(())
}

pub async fn preload(ctx: &AppContext, url: &str) -> Result<()> {
    let report = ctx.loader.preload(url).await?;

    match report.article {
        Some(article) => {
            println!("Cached: {}", article.display_title());
            match report.content_nodes {
                Some(count) => println!("  {} content blocks", count),
                None => println!("  nothing readable"),
            }
            println!("  {} image sizes checked", report.images_sized);
        }
        None => println!("Nothing to preload for {}", url),
    }

    Ok(())
}

pub async fn prepare(ctx: &AppContext, url: &str) -> Result<()> {
    ctx.loader.prepare(url).await?;
    println!("Backend is preparing {}", url);
    Ok(())
}

pub async fn trending(ctx: &AppContext) -> Result<()> {
    let articles = ctx.loader.trending().await?;

    if articles.is_empty() {
        println!("Nothing trending");
        return Ok(());
    }

    for article in articles {
        print_article(&article);
    }

    Ok(())
}

pub fn list_articles(ctx: &AppContext, saved: bool, source: Option<i64>) -> Result<()> {
    let session = ctx.store.session()?;
    let articles = match (saved, source) {
        (true, _) => session.get_saved_articles()?,
        (false, Some(remote_id)) => session.get_articles_for_source(remote_id)?,
        (false, None) => session.get_all_articles()?,
    };

    if articles.is_empty() {
        println!("No articles");
        return Ok(());
    }

    for article in articles {
        let marker = if article.saved { "★" } else { " " };
        println!(
            "{} {} {}",
            marker,
            article.inserted_at.format("%Y-%m-%d"),
            article.display_title()
        );
        println!("  {}", article.url);
    }

    Ok(())
}

pub fn set_saved(ctx: &AppContext, url: &str, saved: bool) -> Result<()> {
    let mut article = cached_article(ctx, url)?;
    ctx.favorites.set_saved(&mut article, saved)?;

    if saved {
        println!("Saved: {}", article.display_title());
    } else {
        println!("Unsaved: {}", article.display_title());
    }
    Ok(())
}

pub fn delete_article(ctx: &AppContext, url: &str) -> Result<()> {
    let article = cached_article(ctx, url)?;
    ctx.store.session()?.delete_article(article.id)?;
    println!("Deleted: {}", article.display_title());
    Ok(())
}

pub fn list_sources(ctx: &AppContext) -> Result<()> {
    let sources = ctx.store.session()?.get_sources()?;

    if sources.is_empty() {
        println!("No sources");
        return Ok(());
    }

    for source in sources {
        println!("{} [{}] ({})", source.name, source.remote_id, source.category_name);
    }

    Ok(())
}

pub fn add_source(
    ctx: &AppContext,
    name: &str,
    remote_id: i64,
    category: &str,
    image_url: &str,
) -> Result<()> {
    let session = ctx.store.session()?;

    if session.get_sources()?.iter().any(|s| s.remote_id == remote_id) {
        println!("Source already exists: {}", remote_id);
        return Ok(());
    }

    session.insert_source(&Source::new(name, image_url, remote_id, category))?;
    println!("Added source: {} ({})", name, category);
    Ok(())
}

pub fn list_categories(ctx: &AppContext, since_days: i64) -> Result<()> {
    let since = Utc::now() - Duration::days(since_days);
    let counts = ctx.store.session()?.get_category_counts(since)?;

    if counts.categories.is_empty() {
        println!("No categorized articles in the last {} days", since_days);
        return Ok(());
    }

    for category in &counts.categories {
        println!("{:>5}  {}", category.article_count, category.name);
    }
    println!("{:>5}  total", counts.total);
    Ok(())
}

fn cached_article(ctx: &AppContext, url: &str) -> Result<Article> {
    ctx.store
        .session()?
        .get_article(url)?
        .ok_or_else(|| ArticleError::ArticleNotFound(url.to_string()))
}

fn print_article(article: &Article) {
    let source = article
        .source
        .as_deref()
        .or(article.domain.as_deref())
        .unwrap_or("");
    println!("{}  {}", article.display_title(), source);
    println!("  {}", article.url);
}
