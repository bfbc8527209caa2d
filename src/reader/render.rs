//! Plain-text rendering of a projection, one block per visible row.

use crate::reader::item::{ReaderItem, ReaderItemKind};
use crate::reader::projection::ArticleProjection;

const IMAGE_PLACEHOLDER: &str = "[no header image]";

/// Render a single row, or `None` when it is hidden or has nothing to show.
pub fn render_item(projection: &ArticleProjection, item: &ReaderItem) -> Option<String> {
    if !item.layout.visible {
        return None;
    }

    let text = || {
        projection
            .node(item.position)
            .map(|node| node.text.trim().to_string())
            .unwrap_or_default()
    };

    let rendered = match item.kind {
        ReaderItemKind::HeaderImage => match projection.header_image_url() {
            Some(url) => format!("[image: {}]", url),
            None => IMAGE_PLACEHOLDER.to_string(),
        },
        ReaderItemKind::Title => render_title(projection),
        ReaderItemKind::Paragraph | ReaderItemKind::Other => text(),
        ReaderItemKind::InlineImage => format!("[image: {}]", projection.image_url(item.position)?),
        ReaderItemKind::Heading(level) => {
            format!("{} {}", "#".repeat(usize::from(level.clamp(1, 6))), text())
        }
        ReaderItemKind::Blockquote => text()
            .lines()
            .map(|line| format!("> {}", line))
            .collect::<Vec<_>>()
            .join("\n"),
        ReaderItemKind::Preformatted => projection
            .node(item.position)
            .map(|node| node.text.clone())
            .unwrap_or_default(),
        ReaderItemKind::UnorderedListItem => format!("  • {}", text()),
        // Numbered by the caller, which knows the surrounding run
        ReaderItemKind::OrderedListItem => text(),
    };

    Some(rendered)
}

/// Render the whole projection as terminal text.
pub fn render_text(projection: &ArticleProjection) -> String {
    let mut out = String::new();
    let mut ordinal = 0;

    for item in projection.items() {
        if item.kind == ReaderItemKind::OrderedListItem {
            ordinal += 1;
        } else {
            ordinal = 0;
        }

        let Some(mut block) = render_item(projection, &item) else {
            continue;
        };
        if item.kind == ReaderItemKind::OrderedListItem {
            block = format!("  {}. {}", ordinal, block);
        }

        if item.layout.extra_top_margin {
            out.push('\n');
        }
        out.push_str(&block);
        out.push_str("\n\n");
        if item.layout.extra_bottom_margin {
            out.push('\n');
        }
    }

    out
}

fn render_title(projection: &ArticleProjection) -> String {
    let article = projection.article();
    let mut lines = Vec::new();

    if let Some(ref title) = article.title {
        lines.push(title.to_uppercase());
    }
    if let Some(ref author) = article.author {
        lines.push(format!("by {}", author));
    }
    if article.source.is_some() {
        if let Some(ref domain) = article.domain {
            lines.push(domain.clone());
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentNode;
    use crate::domain::Article;

    fn projection() -> ArticleProjection {
        let mut article = Article::new("https://example.com/a");
        article.title = Some("Hello".into());
        article.author = Some("Ada".into());
        article.source = Some("Example".into());
        article.domain = Some("example.com".into());

        let mut projection = ArticleProjection::new(article);
        projection
            .append_content(vec![
                ContentNode::paragraph("First paragraph."),
                ContentNode::new("h2", "Section"),
                ContentNode::new("li", "one").with_parent("ol"),
                ContentNode::new("li", "two").with_parent("ol"),
                ContentNode::new("li", "dot").with_parent("ul"),
                ContentNode::new("blockquote", "Wise words"),
                ContentNode::image("data:image/png;base64,AAAA"),
                ContentNode::image("https://x/photo.jpg"),
            ])
            .unwrap();
        projection
    }

    #[test]
    fn test_render_text_covers_every_kind() {
        let text = render_text(&projection());

        assert!(text.starts_with(IMAGE_PLACEHOLDER));
        assert!(text.contains("HELLO\nby Ada\nexample.com"));
        assert!(text.contains("First paragraph."));
        assert!(text.contains("## Section"));
        assert!(text.contains("  1. one"));
        assert!(text.contains("  2. two"));
        assert!(text.contains("  • dot"));
        assert!(text.contains("> Wise words"));
        assert!(text.contains("[image: https://x/photo.jpg]"));
        assert!(!text.contains("data:"));
    }

    #[test]
    fn test_preformatted_keeps_layout() {
        let mut projection = ArticleProjection::new(Article::new("https://example.com/a"));
        projection
            .append_content(crate::content::select_content(
                "<p>Run this:</p><pre>\nif ready {\n    go();\n}\n</pre>",
            ))
            .unwrap();

        let pre = projection.item(3).unwrap();
        assert_eq!(pre.kind, ReaderItemKind::Preformatted);
        assert_eq!(
            render_item(&projection, &pre).as_deref(),
            Some("if ready {\n    go();\n}")
        );
    }

    #[test]
    fn test_hidden_item_renders_nothing() {
        let projection = projection();
        let hidden = projection.item(8).unwrap();
        assert!(!hidden.layout.visible);
        assert_eq!(render_item(&projection, &hidden), None);
    }

    #[test]
    fn test_header_image_uses_article_image() {
        let mut article = Article::new("https://example.com/a");
        article.image = Some("https://x/hero.jpg".into());
        let projection = ArticleProjection::new(article);

        let header = projection.item(0).unwrap();
        assert_eq!(
            render_item(&projection, &header).as_deref(),
            Some("[image: https://x/hero.jpg]")
        );
    }
}
