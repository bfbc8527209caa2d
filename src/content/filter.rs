use tracing::debug;

use super::image_url::{decode_image_url, is_image_url};
use super::ContentNode;
use crate::domain::Article;

/// Extractions with fewer nodes than this are checked against [`MIN_CONTENT_CHARS`].
pub const MIN_CONTENT_NODES: usize = 7;

/// Minimum visible text for a short extraction to count as an article.
pub const MIN_CONTENT_CHARS: usize = 100;

const NOISE_TEXT: [&str; 2] = ["Advertisement", "Sponsored"];

/// Strip boilerplate from selected nodes.
///
/// Returns `None` when what is left is too thin to be worth rendering; the
/// caller should hand the url to an external viewer instead.
pub fn filter_content(mut nodes: Vec<ContentNode>, article: &Article) -> Option<Vec<ContentNode>> {
    let selected = nodes.len();

    // Removal rewinds: the successor of a removed node is examined at the
    // same index, so the leading rule keeps applying to each new head.
    let mut i = 0;
    while i < nodes.len() {
        if should_remove(&nodes, i, article) {
            nodes.remove(i);
        } else {
            i += 1;
        }
    }

    while nodes
        .last()
        .is_some_and(|last| !last.is_paragraph() && !last.is_image())
    {
        nodes.pop();
    }

    if nodes.len() < MIN_CONTENT_NODES && visible_text_len(&nodes) < MIN_CONTENT_CHARS {
        debug!(
            "Discarding extraction for {}: {} of {} nodes left, too little text",
            article.url,
            nodes.len(),
            selected
        );
        return None;
    }

    debug!("Kept {} of {} nodes for {}", nodes.len(), selected, article.url);
    Some(nodes)
}

fn should_remove(nodes: &[ContentNode], i: usize, article: &Article) -> bool {
    let node = &nodes[i];

    if i == 0 && is_junk_leader(node, article.title.as_deref()) {
        return true;
    }

    if node.is_image() {
        return !is_inline_image(node.src.as_deref(), article.image.as_deref());
    }

    let text = node.text.trim();
    text.is_empty()
        || NOISE_TEXT.contains(&text)
        || (i > 0 && text == nodes[i - 1].text.trim())
}

/// Pages often repeat the headline as their first paragraph, or open with
/// a byline or kicker that is not a paragraph at all.
///
/// A blank title means there is nothing to match, so only the tag counts.
fn is_junk_leader(node: &ContentNode, title: Option<&str>) -> bool {
    let title = title.map(str::trim).filter(|t| !t.is_empty());
    !node.is_paragraph() || title.is_some_and(|title| node.text.contains(title))
}

fn is_inline_image(src: Option<&str>, header_image: Option<&str>) -> bool {
    let Some(src) = src.filter(|s| !s.is_empty()) else {
        return false;
    };

    if !is_image_url(src) {
        return false;
    }

    match header_image.filter(|h| !h.is_empty()) {
        Some(header) => {
            src != header && decode_image_url(Some(src)) != decode_image_url(Some(header))
        }
        None => true,
    }
}

fn visible_text_len(nodes: &[ContentNode]) -> usize {
    nodes
        .iter()
        .map(|n| n.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::select_content;

    const LONG: &str = "This paragraph carries enough words that a couple of them together \
                        comfortably clear the minimum amount of visible article text.";

    fn article(title: Option<&str>) -> Article {
        let mut article = Article::new("https://example.com/story");
        article.title = title.map(String::from);
        article
    }

    fn para(text: &str) -> ContentNode {
        ContentNode::paragraph(text)
    }

    fn tags(nodes: &[ContentNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.tag.as_str()).collect()
    }

    #[test]
    fn test_title_and_data_image_removed_before_threshold() {
        let mut article = article(Some("T"));
        article.content = Some(
            "<p>T</p><p>Hello world this is enough text to pass the threshold repeated several \
             times for length</p><img src='data:abc'><p>More text here for good measure to be \
             safe across the one hundred character minimum</p>"
                .into(),
        );

        let nodes = select_content(article.content.as_deref().unwrap_or_default());
        assert_eq!(nodes.len(), 4);

        // Two long paragraphs survive: below the node count but above the
        // character count, so the extraction is kept.
        let filtered = filter_content(nodes, &article).unwrap();
        assert_eq!(tags(&filtered), vec!["p", "p"]);
        assert!(filtered[0].text.starts_with("Hello world"));
    }

    #[test]
    fn test_title_scenario_with_short_text_is_discarded() {
        let nodes = select_content(
            "<p>T</p><p>Hello world</p><img src='data:abc'><p>More text here</p>",
        );
        assert!(filter_content(nodes, &article(Some("T"))).is_none());
    }

    #[test]
    fn test_removes_leading_title_paragraph() {
        let nodes = vec![para("My Title"), para(LONG), para("Second paragraph here.")];
        let filtered = filter_content(nodes, &article(Some("My Title"))).unwrap();
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].text, LONG);
    }

    #[test]
    fn test_removes_leading_non_paragraphs_until_paragraph() {
        let nodes = vec![
            ContentNode::new("h1", "Headline"),
            ContentNode::new("h4", "By Someone"),
            para(LONG),
            para("Closing words."),
        ];
        let filtered = filter_content(nodes, &article(None)).unwrap();
        assert_eq!(tags(&filtered), vec!["p", "p"]);
    }

    #[test]
    fn test_leading_paragraph_kept_without_title() {
        let nodes = vec![para("Opening line"), para(LONG)];
        let filtered = filter_content(nodes, &article(None)).unwrap();
        assert_eq!(filtered[0].text, "Opening line");
    }

    #[test]
    fn test_blank_title_only_checks_tag() {
        let nodes = vec![para(LONG), para("A second paragraph that differs from the first.")];
        for title in ["", "   "] {
            let filtered = filter_content(nodes.clone(), &article(Some(title))).unwrap();
            assert_eq!(filtered.len(), 2, "title {title:?}");
        }

        let with_kicker = vec![ContentNode::new("h2", "Kicker"), para(LONG)];
        let filtered = filter_content(with_kicker, &article(Some(""))).unwrap();
        assert_eq!(tags(&filtered), vec!["p"]);
    }

    #[test]
    fn test_removes_noise_and_empty_text() {
        let nodes = vec![
            para(LONG),
            para("Advertisement"),
            ContentNode::new("h2", "   "),
            para("Sponsored"),
            para("The end."),
        ];
        let filtered = filter_content(nodes, &article(None)).unwrap();
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[1].text, "The end.");
    }

    #[test]
    fn test_noise_match_is_exact() {
        let nodes = vec![para(LONG), para("Advertisement: buy now")];
        let filtered = filter_content(nodes, &article(None)).unwrap();
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn test_collapses_consecutive_duplicates() {
        let nodes = vec![
            para(LONG),
            ContentNode::new("blockquote", "A caption"),
            para("A caption"),
            para("A caption"),
            para("Done."),
        ];
        let filtered = filter_content(nodes, &article(None)).unwrap();
        assert_eq!(tags(&filtered), vec!["p", "blockquote", "p"]);
    }

    #[test]
    fn test_image_rules() {
        let mut article = article(None);
        article.image = Some("https://cdn.example.com/hero.jpg".into());

        let mut missing_src = ContentNode::image("");
        missing_src.src = None;

        let nodes = vec![
            para(LONG),
            missing_src,
            ContentNode::image(""),
            ContentNode::image("https://cdn.example.com/pixel"),
            ContentNode::image("https://cdn.example.com/hero.jpg"),
            ContentNode::image("https%3A%2F%2Fcdn.example.com%2Fhero.jpg"),
            ContentNode::image("https://cdn.example.com/inline.png"),
            para("After the image."),
        ];
        let filtered = filter_content(nodes, &article).unwrap();
        assert_eq!(tags(&filtered), vec!["p", "img", "p"]);
        assert_eq!(
            filtered[1].src.as_deref(),
            Some("https://cdn.example.com/inline.png")
        );
    }

    #[test]
    fn test_trims_trailing_non_terminal_nodes() {
        let nodes = vec![
            para(LONG),
            ContentNode::image("https://x/a.gif"),
            ContentNode::new("h3", "Related"),
            ContentNode::new("li", "Another story").with_parent("ul"),
            ContentNode::new("blockquote", "Share this"),
        ];
        let filtered = filter_content(nodes, &article(None)).unwrap();
        assert_eq!(tags(&filtered), vec!["p", "img"]);
    }

    #[test]
    fn test_short_but_many_nodes_is_kept() {
        let nodes: Vec<ContentNode> = (0..7).map(|i| para(&format!("p{i}"))).collect();
        let filtered = filter_content(nodes, &article(None)).unwrap();
        assert_eq!(filtered.len(), 7);
    }

    #[test]
    fn test_few_short_nodes_is_discarded() {
        let nodes: Vec<ContentNode> = (0..6).map(|i| para(&format!("p{i}"))).collect();
        assert!(filter_content(nodes, &article(None)).is_none());
    }

    #[test]
    fn test_empty_input_is_discarded() {
        assert!(filter_content(Vec::new(), &article(None)).is_none());
        let only_junk = vec![ContentNode::new("h2", "Menu"), para("Advertisement")];
        assert!(filter_content(only_junk, &article(None)).is_none());
    }

    #[test]
    fn test_filter_is_idempotent() {
        let mut article = article(Some("Big News"));
        article.image = Some("https://x/hero.jpg".into());
        let html = r#"
            <h1>Big News</h1>
            <p>Big News</p>
            <p>Advertisement</p>
            <img src="https://x/hero.jpg">
            <p>The first real paragraph of the story with plenty of words in it.</p>
            <img src="https://x/one.jpg"><img src="https://x/two.png">
            <h2>A section</h2>
            <ol><li>first</li><li>first</li><li>second</li></ol>
            <p>The closing paragraph rounds things out with a few more words.</p>
            <img src="data:abc">
            <h3>Trailing</h3>
        "#;

        let once = filter_content(select_content(html), &article).unwrap();
        let twice = filter_content(once.clone(), &article).unwrap();
        assert_eq!(once, twice);
        assert_eq!(once[0].tag, "p");
    }

    #[test]
    fn test_last_node_is_paragraph_or_image() {
        let html = "<p>Lead paragraph long enough to make this count as an article for sure, \
                    with words and more words beyond the limit.</p><img src='https://x/a.jpg'>\
                    <ul><li>one</li></ul><h2>tail</h2>";
        let filtered = filter_content(select_content(html), &article(None)).unwrap();
        let last = filtered.last().unwrap();
        assert!(last.is_paragraph() || last.is_image());
    }
}
